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

//! # the cache-store seam
//!
//! [CacheStore] wraps the browser's named-cache storage: open/delete whole generations by tag,
//! put & match individual responses. Callers must treat *any* adapter failure as a cache miss and
//! fall through to the network-- there is no error recovery at this layer beyond propagating the
//! underlying storage failure.

use async_trait::async_trait;
use snafu::{Backtrace, Snafu};
use tap::Pipe;

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

type StdResult<T, E> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("The underlying cache storage failed: {message}"))]
    Storage { message: String, backtrace: Backtrace },
}

pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                         CachedResponse                                         //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// The browser's response-type taxonomy, as far as this crate cares about it
///
/// Only `Basic` (same-origin) responses are eligible for caching; we decline to mirror redirects,
/// errors & cross-origin opaque responses, whose bodies we may not even be allowed to read.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResponseKind {
    /// Same-origin
    Basic,
    /// Cross-origin, CORS-approved
    Cors,
    /// Synthesized in-worker (the browser calls this type "default")
    Default,
    /// Cross-origin, no CORS; status & body are hidden from us
    Opaque,
}

/// A stored (status, kind, body) triple-- the unit of cache currency
///
/// Entries are written on first successful fetch of a cacheable request (or pre-seeded at install
/// time) and overwritten on every subsequent successful fetch of the same key: the cache is a
/// write-through mirror of the network, not a fixed snapshot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CachedResponse {
    pub status: u16,
    pub kind: ResponseKind,
    pub body: Vec<u8>,
}

impl CachedResponse {
    /// A same-origin 200 carrying `body`
    pub fn ok(body: impl Into<Vec<u8>>) -> CachedResponse {
        CachedResponse {
            status: 200,
            kind: ResponseKind::Basic,
            body: body.into(),
        }
    }
    /// The synthetic timeout-class response served for cross-origin navigation failures
    pub fn request_timeout() -> CachedResponse {
        CachedResponse {
            status: 408,
            kind: ResponseKind::Default,
            body: b"Network error".to_vec(),
        }
    }
    /// Only successful, same-origin responses get mirrored into the store
    pub fn cacheable(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                        CacheStore trait                                        //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Named-cache storage, persistent across process restarts (browser-provided)
///
/// `?Send` because the production implementation lives on the worker's single-threaded event
/// loop, wrapping thoroughly non-`Send` JS handles.
#[async_trait(?Send)]
pub trait CacheStore {
    /// Ensure the generation named by `tag` exists
    async fn open(&self, tag: &str) -> Result<()>;
    /// Write `response` under (`tag`, `key`), overwriting any previous entry
    async fn put(&self, tag: &str, key: &str, response: &CachedResponse) -> Result<()>;
    /// Look `key` up across *all* generations (the browser's `caches.match` semantics)
    async fn match_any(&self, key: &str) -> Result<Option<CachedResponse>>;
    /// All extant generation tags
    async fn list(&self) -> Result<Vec<String>>;
    /// Drop the generation named by `tag` wholesale; true if it existed
    async fn delete(&self, tag: &str) -> Result<bool>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                          MemoryStore                                           //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// In-memory [CacheStore]: the reference semantics, and what the tests run against
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    // BTreeMap for deterministic iteration order in `match_any` & `list`
    generations: Arc<Mutex<BTreeMap<String, BTreeMap<String, CachedResponse>>>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
    /// Entry count in generation `tag` (zero if absent); test convenience
    pub fn len(&self, tag: &str) -> usize {
        self.generations
            .lock()
            .expect("Poisoned mutex!")
            .get(tag)
            .map(|entries| entries.len())
            .unwrap_or(0)
    }
    pub fn is_empty(&self, tag: &str) -> bool {
        self.len(tag) == 0
    }
}

#[async_trait(?Send)]
impl CacheStore for MemoryStore {
    async fn open(&self, tag: &str) -> Result<()> {
        self.generations
            .lock()
            .expect("Poisoned mutex!")
            .entry(tag.to_string())
            .or_default();
        Ok(())
    }
    async fn put(&self, tag: &str, key: &str, response: &CachedResponse) -> Result<()> {
        self.generations
            .lock()
            .expect("Poisoned mutex!")
            .entry(tag.to_string())
            .or_default()
            .insert(key.to_string(), response.clone());
        Ok(())
    }
    async fn match_any(&self, key: &str) -> Result<Option<CachedResponse>> {
        self.generations
            .lock()
            .expect("Poisoned mutex!")
            .values()
            .find_map(|entries| entries.get(key))
            .cloned()
            .pipe(Ok)
    }
    async fn list(&self) -> Result<Vec<String>> {
        self.generations
            .lock()
            .expect("Poisoned mutex!")
            .keys()
            .cloned()
            .collect::<Vec<_>>()
            .pipe(Ok)
    }
    async fn delete(&self, tag: &str) -> Result<bool> {
        Ok(self
            .generations
            .lock()
            .expect("Poisoned mutex!")
            .remove(tag)
            .is_some())
    }
}

/// A [CacheStore] that fails every operation; for exercising the "storage is broken" paths
#[derive(Clone, Copy, Debug, Default)]
pub struct BrokenStore;

#[async_trait(?Send)]
impl CacheStore for BrokenStore {
    async fn open(&self, _tag: &str) -> Result<()> {
        StorageSnafu { message: "quota exceeded" }.fail()
    }
    async fn put(&self, _tag: &str, _key: &str, _response: &CachedResponse) -> Result<()> {
        StorageSnafu { message: "quota exceeded" }.fail()
    }
    async fn match_any(&self, _key: &str) -> Result<Option<CachedResponse>> {
        StorageSnafu { message: "quota exceeded" }.fail()
    }
    async fn list(&self) -> Result<Vec<String>> {
        StorageSnafu { message: "quota exceeded" }.fail()
    }
    async fn delete(&self, _tag: &str) -> Result<bool> {
        StorageSnafu { message: "quota exceeded" }.fail()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use futures::executor::block_on;

    #[test]
    fn memory_store() {
        block_on(async {
            let store = MemoryStore::new();
            assert!(store.list().await.unwrap().is_empty());
            store.open("v1").await.unwrap();
            assert_eq!(store.list().await.unwrap(), vec!["v1".to_string()]);

            let rsp = CachedResponse::ok(&b"<html/>"[..]);
            store.put("v1", "https://x.test/index.html", &rsp).await.unwrap();
            assert_eq!(
                store.match_any("https://x.test/index.html").await.unwrap(),
                Some(rsp.clone())
            );
            // Overwrite, not append
            store.put("v1", "https://x.test/index.html", &rsp).await.unwrap();
            assert_eq!(store.len("v1"), 1);

            assert!(store.delete("v1").await.unwrap());
            assert!(!store.delete("v1").await.unwrap());
            assert_eq!(store.match_any("https://x.test/index.html").await.unwrap(), None);
        });
    }

    #[test]
    fn cacheability() {
        assert!(CachedResponse::ok(&b"x"[..]).cacheable());
        assert!(
            !CachedResponse {
                status: 404,
                kind: ResponseKind::Basic,
                body: vec![]
            }
            .cacheable()
        );
        assert!(
            !CachedResponse {
                status: 200,
                kind: ResponseKind::Opaque,
                body: vec![]
            }
            .cacheable()
        );
        assert!(!CachedResponse::request_timeout().cacheable());
    }
}
