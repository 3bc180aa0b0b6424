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

//! # the offline cache manager
//!
//! The service worker's lifecycle, modelled as an explicit state machine:
//!
//! ```text
//! Installing --install()--> WaitingToActivate --activate()--> Active
//!                                                               |
//!                                              handle_fetch() (steady state)
//! ```
//!
//! The three externally-triggered phases map one-to-one onto the browser's `install`, `activate`
//! & `fetch` events; the wasm binary merely forwards them here. Requests are classified along a
//! single axis-- navigation or not-- and that classification picks the strategy:
//!
//! - *navigation*: network-first. Freshness matters most for the app shell; when the network is
//!   gone we fall back to the cached entry page, then the cached app root (same-origin only--
//!   cross-origin navigation failures get a synthetic timeout-class response rather than a silent
//!   nothing).
//! - *everything else*: cache-first, no revalidation. A hit never touches the network; a miss
//!   fetches & mirrors successful same-origin ("basic") 200s into the current generation.
//!
//! One rule trumps all others here: caching is never allowed to fail the user-visible request.
//! Every write is best-effort; a broken store just degrades us to network-only behavior.

use async_trait::async_trait;
use snafu::{Backtrace, ResultExt, Snafu, ensure};
use tracing::{debug, info, warn};
use url::Url;

use std::cell::Cell;

use crate::store::{self, CacheStore, CachedResponse};
use crate::{CACHE_TAG, SHELL_MANIFEST};

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                       module Error type                                        //
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Install failed on manifest entry {path} (status {status})"))]
    Install {
        path: String,
        status: u16,
        backtrace: Backtrace,
    },
    #[snafu(display("Fetching {url} over the network: {message}"))]
    Network {
        url: String,
        message: String,
        backtrace: Backtrace,
    },
    #[snafu(display("While purging stale cache generations: {source}"))]
    Purge {
        source: store::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("While seeding the shell manifest: {source}"))]
    Seed {
        source: store::Error,
        backtrace: Backtrace,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                       fetch classification                                     //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// The one & only classification axis: browser-initiated page loads versus everything else
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FetchMode {
    Navigate,
    Resource,
}

/// An intercepted outgoing request
#[derive(Clone, Debug)]
pub struct FetchRequest {
    pub url: Url,
    pub mode: FetchMode,
}

impl FetchRequest {
    pub fn navigation(url: Url) -> FetchRequest {
        FetchRequest {
            url,
            mode: FetchMode::Navigate,
        }
    }
    pub fn resource(url: Url) -> FetchRequest {
        FetchRequest {
            url,
            mode: FetchMode::Resource,
        }
    }
    /// The cache key under which this request's response is stored
    pub fn key(&self) -> &str {
        self.url.as_str()
    }
}

/// The network seam: plain old `fetch`
///
/// `Err` means the network is unavailable (or the fetch failed outright); HTTP-level failures
/// come back as `Ok` responses carrying their status, exactly as the browser reports them.
#[async_trait(?Send)]
pub trait Network {
    async fn fetch(&self, request: &FetchRequest) -> Result<CachedResponse>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                       OfflineCacheManager                                      //
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Installing,
    WaitingToActivate,
    Active,
}

/// The service worker's brain: owns the strategy, delegates all I/O to its two seams
pub struct OfflineCacheManager<S, N> {
    store: S,
    net: N,
    origin: Url,
    tag: String,
    manifest: Vec<String>,
    phase: Cell<Phase>,
}

impl<S, N> OfflineCacheManager<S, N>
where
    S: CacheStore,
    N: Network,
{
    /// Production configuration: [CACHE_TAG] & [SHELL_MANIFEST]
    pub fn new(store: S, net: N, origin: Url) -> OfflineCacheManager<S, N> {
        OfflineCacheManager::custom(store, net, origin, CACHE_TAG, &SHELL_MANIFEST)
    }
    /// Arbitrary generation tag & manifest; the tests use this
    pub fn custom(
        store: S,
        net: N,
        origin: Url,
        tag: impl Into<String>,
        manifest: &[&str],
    ) -> OfflineCacheManager<S, N> {
        OfflineCacheManager {
            store,
            net,
            origin,
            tag: tag.into(),
            manifest: manifest.iter().map(|path| path.to_string()).collect(),
            phase: Cell::new(Phase::Installing),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    pub fn generation(&self) -> &str {
        &self.tag
    }

    /// Populate a new generation with the shell manifest
    ///
    /// The manifest is treated as atomic: every entry is fetched *before* anything is written, so
    /// a single failure means no new generation & no partial coverage masquerading as success.
    pub async fn install(&self) -> Result<()> {
        let mut seeded = Vec::with_capacity(self.manifest.len());
        for path in &self.manifest {
            let url = self.origin.join(path).unwrap(/* known-good manifest paths */);
            let request = FetchRequest::resource(url);
            let response = self.net.fetch(&request).await?;
            ensure!(
                response.status == 200,
                InstallSnafu {
                    path: path.clone(),
                    status: response.status
                }
            );
            seeded.push((request, response));
        }
        self.store.open(&self.tag).await.context(SeedSnafu)?;
        for (request, response) in &seeded {
            self.store
                .put(&self.tag, request.key(), response)
                .await
                .context(SeedSnafu)?;
        }
        info!("Installed generation {} ({} shell assets)", self.tag, seeded.len());
        self.phase.set(Phase::WaitingToActivate);
        Ok(())
    }

    /// Purge every generation whose tag differs from ours
    ///
    /// After this returns, the store contains only entries belonging to the current generation.
    /// The *caller* then claims any open pages (that part is irreducibly browser business).
    pub async fn activate(&self) -> Result<Vec<String>> {
        let mut purged = Vec::new();
        for tag in self.store.list().await.context(PurgeSnafu)? {
            if tag != self.tag {
                self.store.delete(&tag).await.context(PurgeSnafu)?;
                purged.push(tag);
            }
        }
        info!("Activated generation {}; purged {:?}", self.tag, purged);
        self.phase.set(Phase::Active);
        Ok(purged)
    }

    /// One decision per intercepted request (steady state)
    ///
    /// `Err` here means "we have nothing to serve"-- the caller lets the failure reach the page.
    pub async fn handle_fetch(&self, request: &FetchRequest) -> Result<CachedResponse> {
        match request.mode {
            FetchMode::Navigate => self.fetch_navigation(request).await,
            FetchMode::Resource => self.fetch_resource(request).await,
        }
    }

    // Network-first with shell fallback
    async fn fetch_navigation(&self, request: &FetchRequest) -> Result<CachedResponse> {
        match self.net.fetch(request).await {
            Ok(response) => {
                if response.status == 200 {
                    self.mirror(request.key(), &response).await;
                }
                Ok(response)
            }
            Err(err) if self.same_origin(&request.url) => {
                debug!("Navigation to {} failed ({err}); trying the cached shell", request.url);
                for path in ["/index.html", "/"] {
                    let key = self.origin.join(path).unwrap(/* known good */);
                    if let Ok(Some(cached)) = self.store.match_any(key.as_str()).await {
                        return Ok(cached);
                    }
                }
                Err(err)
            }
            Err(err) => {
                // Cross-origin: we have no shell to offer; answer *something* rather than
                // silently dropping the request
                debug!("Cross-origin navigation to {} failed: {err}", request.url);
                Ok(CachedResponse::request_timeout())
            }
        }
    }

    // Cache-first, no revalidation
    async fn fetch_resource(&self, request: &FetchRequest) -> Result<CachedResponse> {
        match self.store.match_any(request.key()).await {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => (),
            Err(err) => debug!("Cache store failed ({err}); treating {} as a miss", request.url),
        }
        let response = self.net.fetch(request).await?;
        if response.cacheable() {
            self.mirror(request.key(), &response).await;
        }
        Ok(response)
    }

    // Best-effort write-through; the response goes back to the page no matter what
    async fn mirror(&self, key: &str, response: &CachedResponse) {
        if let Err(err) = self.store.put(&self.tag, key, response).await {
            warn!("Failed to cache {key}: {err}; serving the response anyway");
        }
    }

    fn same_origin(&self, url: &Url) -> bool {
        url.origin() == self.origin.origin()
    }
}
