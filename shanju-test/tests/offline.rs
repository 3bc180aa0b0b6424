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

//! # offline cache manager tests
//!
//! The service-worker strategy, exercised natively: install atomicity, generation isolation on
//! activate, network-first-with-fallback navigation, cache-first sub-resources, and the
//! caching-never-fails-the-request rule. [StubNetwork]'s fetch log is the witness for "no
//! network call was made".

use url::Url;

use shanju_cache::{
    CACHE_TAG, FetchRequest, MemoryStore, OfflineCacheManager, Phase, SHELL_MANIFEST,
    store::{BrokenStore, CacheStore, CachedResponse, ResponseKind},
};
use shanju_test::StubNetwork;

fn origin() -> Url {
    Url::parse("https://shanju.test").unwrap()
}

fn url(path: &str) -> String {
    origin().join(path).unwrap().to_string()
}

fn navigation(path: &str) -> FetchRequest {
    FetchRequest::navigation(origin().join(path).unwrap())
}

fn resource(path: &str) -> FetchRequest {
    FetchRequest::resource(origin().join(path).unwrap())
}

/// A network with the whole shell manifest routed
fn shell_network() -> StubNetwork {
    let net = StubNetwork::new();
    net.route_ok(&url("/"), b"<app-root/>");
    net.route_ok(&url("/index.html"), b"<entry/>");
    net.route_ok(&url("/assets/generated/shanju-logo.dim_192x192.png"), b"png192");
    net.route_ok(&url("/assets/generated/shanju-logo.dim_512x512.png"), b"png512");
    net
}

#[tokio::test]
async fn install_seeds_the_whole_manifest() {
    let store = MemoryStore::new();
    let net = shell_network();
    let manager = OfflineCacheManager::new(store.clone(), net, origin());
    assert_eq!(manager.phase(), Phase::Installing);

    manager.install().await.unwrap();
    assert_eq!(manager.phase(), Phase::WaitingToActivate);
    assert_eq!(store.len(CACHE_TAG), SHELL_MANIFEST.len());
    for path in SHELL_MANIFEST {
        assert!(store.match_any(&url(path)).await.unwrap().is_some(), "{path} not seeded");
    }
}

#[tokio::test]
async fn install_is_atomic() {
    // One manifest entry 404s (the stub's default for unrouted URLs): the whole install fails &
    // no generation appears
    let store = MemoryStore::new();
    let net = shell_network();
    net.route(
        &url("/index.html"),
        CachedResponse {
            status: 404,
            kind: ResponseKind::Basic,
            body: Vec::new(),
        },
    );
    let manager = OfflineCacheManager::new(store.clone(), net, origin());
    assert!(manager.install().await.is_err());
    assert_eq!(manager.phase(), Phase::Installing);
    assert!(store.list().await.unwrap().is_empty());

    // Same story if the network is down outright
    let store = MemoryStore::new();
    let net = shell_network();
    net.set_offline(true);
    let manager = OfflineCacheManager::new(store.clone(), net, origin());
    assert!(manager.install().await.is_err());
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn activation_purges_stale_generations() {
    let store = MemoryStore::new();
    let relic = CachedResponse::ok(&b"old-shell"[..]);
    store.put("shanju-v0", &url("/old.js"), &relic).await.unwrap();

    let manager = OfflineCacheManager::new(store.clone(), shell_network(), origin());
    manager.install().await.unwrap();
    let purged = manager.activate().await.unwrap();

    assert_eq!(manager.phase(), Phase::Active);
    assert_eq!(purged, vec!["shanju-v0".to_string()]);
    assert_eq!(store.list().await.unwrap(), vec![CACHE_TAG.to_string()]);
    // Nothing from v0 is fetchable any more
    assert_eq!(store.match_any(&url("/old.js")).await.unwrap(), None);
}

#[tokio::test]
async fn navigation_prefers_the_network() {
    let store = MemoryStore::new();
    let net = shell_network();
    let manager = OfflineCacheManager::new(store.clone(), net.clone(), origin());
    manager.install().await.unwrap();
    manager.activate().await.unwrap();

    net.route_ok(&url("/payments"), b"payments-page");
    let rsp = manager.handle_fetch(&navigation("/payments")).await.unwrap();
    assert_eq!(rsp.body, b"payments-page");
    assert_eq!(net.fetches(&url("/payments")), 1);

    // ...and mirrors what it fetched, write-through style: a redeploy changes the page, the
    // next online navigation overwrites the cached copy
    assert!(store.match_any(&url("/payments")).await.unwrap().is_some());
    net.route_ok(&url("/payments"), b"payments-page-v2");
    let rsp = manager.handle_fetch(&navigation("/payments")).await.unwrap();
    assert_eq!(rsp.body, b"payments-page-v2");
    assert_eq!(
        store.match_any(&url("/payments")).await.unwrap().unwrap().body,
        b"payments-page-v2"
    );
}

#[tokio::test]
async fn navigation_falls_back_to_the_cached_entry_page() {
    let store = MemoryStore::new();
    let net = shell_network();
    let manager = OfflineCacheManager::new(store, net.clone(), origin());
    manager.install().await.unwrap();
    manager.activate().await.unwrap();

    net.set_offline(true);
    let rsp = manager.handle_fetch(&navigation("/payments")).await.unwrap();
    // Byte-identical to the cached entry page
    assert_eq!(rsp.status, 200);
    assert_eq!(rsp.body, b"<entry/>");
}

#[tokio::test]
async fn navigation_falls_back_to_the_app_root_without_an_entry_page() {
    let store = MemoryStore::new();
    let net = StubNetwork::new();
    net.route_ok(&url("/"), b"<app-root/>");
    // A manifest with no /index.html, so the first fallback misses
    let manager = OfflineCacheManager::custom(store, net.clone(), origin(), CACHE_TAG, &["/"]);
    manager.install().await.unwrap();
    manager.activate().await.unwrap();

    net.set_offline(true);
    let rsp = manager.handle_fetch(&navigation("/payments")).await.unwrap();
    assert_eq!(rsp.body, b"<app-root/>");
}

#[tokio::test]
async fn cross_origin_navigation_failures_get_a_synthetic_timeout() {
    let net = StubNetwork::new();
    net.set_offline(true);
    let manager = OfflineCacheManager::new(MemoryStore::new(), net, origin());
    let elsewhere = FetchRequest::navigation(Url::parse("https://elsewhere.test/pay").unwrap());
    let rsp = manager.handle_fetch(&elsewhere).await.unwrap();
    assert_eq!(rsp.status, 408);
    assert_ne!(rsp.status, 200);
}

#[tokio::test]
async fn same_origin_navigation_with_an_empty_cache_propagates_the_failure() {
    let net = StubNetwork::new();
    net.set_offline(true);
    let manager = OfflineCacheManager::new(MemoryStore::new(), net, origin());
    assert!(manager.handle_fetch(&navigation("/payments")).await.is_err());
}

#[tokio::test]
async fn sub_resources_are_cache_first() {
    let store = MemoryStore::new();
    let net = shell_network();
    let manager = OfflineCacheManager::new(store.clone(), net.clone(), origin());
    manager.install().await.unwrap();
    manager.activate().await.unwrap();

    net.route_ok(&url("/assets/app.js"), b"js-v1");
    let first = manager.handle_fetch(&resource("/assets/app.js")).await.unwrap();
    assert_eq!(first.body, b"js-v1");
    assert_eq!(net.fetches(&url("/assets/app.js")), 1);

    // A hit never touches the network, even though the origin now serves something newer
    net.route_ok(&url("/assets/app.js"), b"js-v2");
    let second = manager.handle_fetch(&resource("/assets/app.js")).await.unwrap();
    assert_eq!(second.body, b"js-v1");
    assert_eq!(net.fetches(&url("/assets/app.js")), 1);

    // Caching the same response again leaves the store as it was
    assert_eq!(store.len(CACHE_TAG), SHELL_MANIFEST.len() + 1);

    // The shell itself is served cache-first, too
    let icon = manager
        .handle_fetch(&resource("/assets/generated/shanju-logo.dim_192x192.png"))
        .await
        .unwrap();
    assert_eq!(icon.body, b"png192");
    assert_eq!(net.fetches(&url("/assets/generated/shanju-logo.dim_192x192.png")), 1); // install only
}

#[tokio::test]
async fn error_and_opaque_responses_are_not_cached() {
    let store = MemoryStore::new();
    let net = StubNetwork::new();
    let manager = OfflineCacheManager::new(store.clone(), net.clone(), origin());

    // 404: returned unmodified, never cached
    let rsp = manager.handle_fetch(&resource("/missing.js")).await.unwrap();
    assert_eq!(rsp.status, 404);
    manager.handle_fetch(&resource("/missing.js")).await.unwrap();
    assert_eq!(net.fetches(&url("/missing.js")), 2);

    // A cross-origin opaque 200: same story
    net.route(
        &url("/opaque.js"),
        CachedResponse {
            status: 200,
            kind: ResponseKind::Opaque,
            body: Vec::new(),
        },
    );
    manager.handle_fetch(&resource("/opaque.js")).await.unwrap();
    manager.handle_fetch(&resource("/opaque.js")).await.unwrap();
    assert_eq!(net.fetches(&url("/opaque.js")), 2);

    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn a_broken_store_never_fails_the_request() {
    let net = shell_network();
    net.route_ok(&url("/assets/app.js"), b"js");
    let manager = OfflineCacheManager::new(BrokenStore, net.clone(), origin());

    // Sub-resource: the store fails on match *and* on put; the page still gets its bytes
    let rsp = manager.handle_fetch(&resource("/assets/app.js")).await.unwrap();
    assert_eq!(rsp.body, b"js");

    // Navigation, same deal
    let rsp = manager.handle_fetch(&navigation("/")).await.unwrap();
    assert_eq!(rsp.status, 200);
    assert_eq!(rsp.body, b"<app-root/>");
}
