// Copyright (C) 2025 Michael Herstine <sp1ff@pobox.com>
//
// This file is part of shanju.
//
// shanju is free software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// shanju is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
// even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with shanju.  If not,
// see <http://www.gnu.org/licenses/>.

//! # shanju-fe Types & Constants
//!
//! I normally loathe these sorts of "types" modules, but there really is a small set of shared
//! types for this crate: the newtypes we hang on `use_context()`.

use leptos::prelude::{LocalStorage, RwSignal, StoredValue};

use shanju_shared::Principal;

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                     shanju-fe common types                                     //
////////////////////////////////////////////////////////////////////////////////////////////////////

// A few new types for `use_context()`
#[derive(Clone, Debug)]
pub struct Api(pub String); // Make this a proper `Url`

// and a couple of type aliases for obvious reasons:
pub type Token = RwSignal<Option<String>>;
pub type Caller = RwSignal<Option<Principal>>;

/// The application client: gateway + query cache, handed to every view through context
///
/// `Client` is all `Rc` inside (UI thread only), so what actually travels through context is a
/// local `StoredValue` handle-- `Copy`, `Send`, and redeemable for the client with `get_value()`.
pub type AppClient = StoredValue<shanju_client::Client<crate::http::HttpService>, LocalStorage>;

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                      shanju-fe constants                                       //
////////////////////////////////////////////////////////////////////////////////////////////////////

pub static USER_AGENT: &str = "shanju-fe/0.0.1 (+sp1ff@pobox.com)";
