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

//! # the shanju service worker
//!
//! Compiled for wasm32 & registered by the frontend as `/sw.js`. All of the actual thinking
//! happens in `shanju-cache`; this binary just wires the browser's lifecycle events into the
//! [OfflineCacheManager] and shuttles requests & responses across the JS boundary:
//!
//! - `install` → [OfflineCacheManager::install], then `skipWaiting()` so the fresh worker doesn't
//!   idle behind an old one
//! - `activate` → [OfflineCacheManager::activate], then `clients.claim()` so already-open pages
//!   come under the new version without a reload
//! - `fetch` → [OfflineCacheManager::handle_fetch] for same-origin traffic
//!
//! Cross-origin traffic is the one thing handled *here* rather than in the manager: opaque
//! responses can't be rebuilt from stored bytes, so we hand those requests straight through to
//! the network (we'd never cache them anyway), keeping the manager's synthetic-timeout rule for
//! failed cross-origin navigations.

use tracing::{error, info};
use tracing_subscriber::fmt;
use tracing_subscriber_wasm::MakeConsoleWriter;
use url::Url;
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use wasm_bindgen_futures::{JsFuture, future_to_promise};
use web_sys::{ExtendableEvent, FetchEvent, Request, RequestMode, ServiceWorkerGlobalScope};

use std::rc::Rc;

use shanju_cache::{CachedResponse, FetchRequest, OfflineCacheManager};

mod dom;

use dom::{DomCacheStore, DomNetwork, to_dom};

type Manager = OfflineCacheManager<DomCacheStore, DomNetwork>;

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{err}"))
}

async fn on_install(scope: ServiceWorkerGlobalScope, manager: Rc<Manager>) -> Result<JsValue, JsValue> {
    manager.install().await.map_err(js_err)?;
    // Don't idle in "waiting" behind a previous worker
    JsFuture::from(scope.skip_waiting()?).await?;
    Ok(JsValue::UNDEFINED)
}

async fn on_activate(scope: ServiceWorkerGlobalScope, manager: Rc<Manager>) -> Result<JsValue, JsValue> {
    manager.activate().await.map_err(js_err)?;
    // Govern already-open pages without a reload
    JsFuture::from(scope.clients().claim()).await?;
    Ok(JsValue::UNDEFINED)
}

async fn on_fetch(
    scope: ServiceWorkerGlobalScope,
    manager: Rc<Manager>,
    request: Request,
) -> Result<JsValue, JsValue> {
    let url = Url::parse(&request.url()).map_err(js_err)?;
    let navigate = request.mode() == RequestMode::Navigate;
    if url.origin().ascii_serialization() != scope.location().origin() {
        // Straight through; see the module docs
        return match JsFuture::from(scope.fetch_with_request(&request)).await {
            Ok(rsp) => Ok(rsp),
            Err(_) if navigate => to_dom(&CachedResponse::request_timeout()).map(JsValue::from),
            Err(err) => Err(err),
        };
    }
    let request = if navigate {
        FetchRequest::navigation(url)
    } else {
        FetchRequest::resource(url)
    };
    match manager.handle_fetch(&request).await {
        Ok(cached) => to_dom(&cached).map(JsValue::from),
        Err(err) => Err(js_err(err)),
    }
}

fn main() {
    fmt()
        .with_writer(MakeConsoleWriter::default().map_trace_level_to(tracing::Level::DEBUG))
        .without_time()
        .with_ansi(false)
        .init();
    console_error_panic_hook::set_once();

    let scope: ServiceWorkerGlobalScope = js_sys::global()
        .dyn_into()
        .expect("Not running in a service-worker scope!?");
    let origin =
        Url::parse(&scope.location().origin()).expect("The worker's own origin should parse");
    let manager = Rc::new(OfflineCacheManager::new(
        DomCacheStore::new(&scope),
        DomNetwork::new(scope.clone()),
        origin,
    ));
    info!("shanju service worker starting ({})", manager.generation());

    let install = Closure::<dyn FnMut(ExtendableEvent)>::new({
        let scope = scope.clone();
        let manager = Rc::clone(&manager);
        move |event: ExtendableEvent| {
            let promise = future_to_promise(on_install(scope.clone(), Rc::clone(&manager)));
            if let Err(err) = event.wait_until(&promise) {
                error!("wait_until(install) failed: {err:?}");
            }
        }
    });
    scope
        .add_event_listener_with_callback("install", install.as_ref().unchecked_ref())
        .expect("Failed to register the install listener");
    install.forget();

    let activate = Closure::<dyn FnMut(ExtendableEvent)>::new({
        let scope = scope.clone();
        let manager = Rc::clone(&manager);
        move |event: ExtendableEvent| {
            let promise = future_to_promise(on_activate(scope.clone(), Rc::clone(&manager)));
            if let Err(err) = event.wait_until(&promise) {
                error!("wait_until(activate) failed: {err:?}");
            }
        }
    });
    scope
        .add_event_listener_with_callback("activate", activate.as_ref().unchecked_ref())
        .expect("Failed to register the activate listener");
    activate.forget();

    let fetch = Closure::<dyn FnMut(FetchEvent)>::new({
        let scope = scope.clone();
        let manager = Rc::clone(&manager);
        move |event: FetchEvent| {
            let promise = future_to_promise(on_fetch(
                scope.clone(),
                Rc::clone(&manager),
                event.request(),
            ));
            if let Err(err) = event.respond_with(&promise) {
                error!("respond_with failed: {err:?}");
            }
        }
    });
    scope
        .add_event_listener_with_callback("fetch", fetch.as_ref().unchecked_ref())
        .expect("Failed to register the fetch listener");
    fetch.forget();
}
