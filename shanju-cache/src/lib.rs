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

//! # shanju-cache
//!
//! ## Background
//!
//! The shanju frontend is installable & is expected to keep working (in a degraded,
//! stale-but-functional way) with no network. The browser gives us two things to work with: a
//! service worker, which may intercept every outgoing request the app makes, and the Cache API, a
//! persistent map from request to response shared by every tab of the origin.
//!
//! The conventional way to write this is a pile of anonymous `install`/`activate`/`fetch`
//! listeners mutating module-level globals. That's exactly the sort of thing that's miserable to
//! reason about & impossible to test off-browser, so this crate models the worker as a *named*
//! state machine, [OfflineCacheManager], over two seams:
//!
//! - [CacheStore](store::CacheStore): the named-cache storage (the browser's `CacheStorage` in
//!   production, [MemoryStore](store::MemoryStore) under test)
//! - [Network](manager::Network): plain old `fetch`
//!
//! The wasm32 binary (`shanju-sw`) is then nothing but adapters: it owns no policy at all.
//!
//! ## The policy
//!
//! Responses are stored under *generations*-- one named cache per deployed build, identified by
//! [CACHE_TAG]. Bumping the tag is the only supported cross-deploy invalidation mechanism:
//! activation of a new worker purges every generation but its own.
//!
//! Navigations go network-first (users should see the latest shell when online), falling back to
//! the cached entry page, then the cached app root. Everything else goes cache-first (a stale
//! asset beats a round trip), populating the cache on first successful fetch. Writing to the
//! cache is always best-effort: a storage failure must never fail the user-visible request.

pub mod manager;
pub mod store;

pub use manager::{FetchMode, FetchRequest, Network, OfflineCacheManager, Phase};
pub use store::{CacheStore, CachedResponse, MemoryStore, ResponseKind};

/// The current build's cache namespace. Bump on deploy; the activate step does the rest.
pub static CACHE_TAG: &str = "shanju-v1";

/// Shell assets pre-seeded at install time: the app root, the entry document & the two install
/// icons. This set is fixed; everything else is cached lazily as it's first fetched.
pub static SHELL_MANIFEST: [&str; 4] = [
    "/",
    "/index.html",
    "/assets/generated/shanju-logo.dim_192x192.png",
    "/assets/generated/shanju-logo.dim_512x512.png",
];
