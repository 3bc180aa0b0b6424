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

//! # browser adapters for the offline cache manager
//!
//! The two seams of `shanju-cache`, realized over web-sys: [DomCacheStore] over the browser's
//! `CacheStorage`, [DomNetwork] over worker-global `fetch`. No policy lives here-- just plumbing
//! between `CachedResponse` (bytes we own) & `web_sys::Response` (handles we don't).

use async_trait::async_trait;
use js_sys::Uint8Array;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Cache, CacheStorage, Response, ResponseInit, ServiceWorkerGlobalScope};

use shanju_cache::{
    manager::{self, FetchRequest, Network, NetworkSnafu},
    store::{self, CacheStore, CachedResponse, ResponseKind, StorageSnafu},
};

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                          conversions                                           //
////////////////////////////////////////////////////////////////////////////////////////////////////

fn kind_of(rsp: &Response) -> ResponseKind {
    match rsp.type_() {
        web_sys::ResponseType::Basic => ResponseKind::Basic,
        web_sys::ResponseType::Cors => ResponseKind::Cors,
        web_sys::ResponseType::Opaque | web_sys::ResponseType::Opaqueredirect => {
            ResponseKind::Opaque
        }
        _ => ResponseKind::Default,
    }
}

/// Buffer a browser response into a [CachedResponse]; consumes the body
pub async fn from_dom(rsp: Response) -> Result<CachedResponse, JsValue> {
    let kind = kind_of(&rsp);
    let status = rsp.status();
    let body = if kind == ResponseKind::Opaque {
        Vec::new() // opaque bodies are not ours to read
    } else {
        let buf = JsFuture::from(rsp.array_buffer()?).await?;
        Uint8Array::new(&buf).to_vec()
    };
    Ok(CachedResponse { status, kind, body })
}

/// Rebuild a browser response from stored bytes
pub fn to_dom(cached: &CachedResponse) -> Result<Response, JsValue> {
    let init = ResponseInit::new();
    init.set_status(cached.status);
    let mut body = cached.body.clone();
    Response::new_with_opt_u8_array_and_init(Some(&mut body), &init)
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                          DomCacheStore                                         //
////////////////////////////////////////////////////////////////////////////////////////////////////

fn storage_err(err: JsValue) -> store::Error {
    StorageSnafu {
        message: format!("{err:?}"),
    }
    .build()
}

pub struct DomCacheStore {
    caches: CacheStorage,
}

impl DomCacheStore {
    pub fn new(scope: &ServiceWorkerGlobalScope) -> DomCacheStore {
        DomCacheStore {
            caches: scope.caches().expect("No CacheStorage in this scope!?"),
        }
    }
}

#[async_trait(?Send)]
impl CacheStore for DomCacheStore {
    async fn open(&self, tag: &str) -> store::Result<()> {
        JsFuture::from(self.caches.open(tag))
            .await
            .map(|_| ())
            .map_err(storage_err)
    }
    async fn put(&self, tag: &str, key: &str, response: &CachedResponse) -> store::Result<()> {
        let cache: Cache = JsFuture::from(self.caches.open(tag))
            .await
            .map_err(storage_err)?
            .dyn_into()
            .map_err(storage_err)?;
        let rsp = to_dom(response).map_err(storage_err)?;
        JsFuture::from(cache.put_with_str(key, &rsp))
            .await
            .map(|_| ())
            .map_err(storage_err)
    }
    async fn match_any(&self, key: &str) -> store::Result<Option<CachedResponse>> {
        let hit = JsFuture::from(self.caches.match_with_str(key))
            .await
            .map_err(storage_err)?;
        if hit.is_undefined() {
            return Ok(None);
        }
        let rsp: Response = hit.dyn_into().map_err(storage_err)?;
        Ok(Some(from_dom(rsp).await.map_err(storage_err)?))
    }
    async fn list(&self) -> store::Result<Vec<String>> {
        let keys = JsFuture::from(self.caches.keys())
            .await
            .map_err(storage_err)?;
        js_sys::Array::from(&keys)
            .iter()
            .map(|tag| tag.as_string().ok_or_else(|| storage_err(tag.clone())))
            .collect()
    }
    async fn delete(&self, tag: &str) -> store::Result<bool> {
        JsFuture::from(self.caches.delete(tag))
            .await
            .map(|deleted| deleted.as_bool().unwrap_or(false))
            .map_err(storage_err)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                           DomNetwork                                           //
////////////////////////////////////////////////////////////////////////////////////////////////////

pub struct DomNetwork {
    scope: ServiceWorkerGlobalScope,
}

impl DomNetwork {
    pub fn new(scope: ServiceWorkerGlobalScope) -> DomNetwork {
        DomNetwork { scope }
    }
}

#[async_trait(?Send)]
impl Network for DomNetwork {
    // Fetch by URL: this seam only ever sees same-origin requests (main.rs hands cross-origin
    // traffic straight through), for which the URL is the whole story
    async fn fetch(&self, request: &FetchRequest) -> manager::Result<CachedResponse> {
        let err = |e: JsValue| {
            NetworkSnafu {
                url: request.url.to_string(),
                message: format!("{e:?}"),
            }
            .build()
        };
        let rsp: Response = JsFuture::from(self.scope.fetch_with_str(request.url.as_str()))
            .await
            .map_err(err)?
            .dyn_into()
            .map_err(err)?;
        from_dom(rsp).await.map_err(err)
    }
}
