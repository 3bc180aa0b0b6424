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

//! # shanju-client
//!
//! The browser-side application core, independent of any UI binding:
//!
//! - [service::Service]: the remote-call gateway-- a typed proxy to the backend, one method per
//!   remote procedure. Implementations: gloo-net in `shanju-fe`, scripted in `shanju-test`.
//! - [query::QueryCache]: the keyed read-through cache & the mutation→keys invalidation table.
//! - [client::Client]: gateway + cache glued together, so a mutation can't succeed without its
//!   invalidations being applied.
//! - [funding::FundingFlow]: the two-step (start → verify-OTP, with resend) add-money state
//!   machine.
//! - [error]: the failure taxonomy, including the substring classifier for backend messages.
//!
//! Everything here runs on the browser's single UI thread (hence `Rc`, `RefCell` & `?Send`
//! traits throughout); nothing here knows it's usually compiled to wasm32, which is what keeps
//! the whole layer testable on the host.

pub mod client;
pub mod error;
pub mod funding;
pub mod query;
pub mod service;

pub use client::Client;
pub use error::{Error, Result, user_message};
pub use funding::{FundingFlow, FundingState};
pub use query::{KeyClass, Mutation, QueryCache, QueryKey, QueryResult, Target};
pub use service::Service;
