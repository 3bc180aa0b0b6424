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

//! # shanju frontend
//!
//! The browser-side face of the shanju payments/wallet application, built with [Leptos]. The
//! views in this crate are deliberately thin: all reads go through the query cache & all
//! mutations through the gateway (both in `shanju-client`), so a component here is little more
//! than a form, a `LocalResource` or two, and an `Action` that calls into the core. If you find
//! yourself wanting to put policy in a view, it probably belongs a crate down.
//!
//! The one piece of machinery owned here is bootstrapping: building the HTTP gateway, hanging the
//! shared bits on context (token, caller, client), and registering the service worker that keeps
//! the whole thing usable offline.
//!
//! [Leptos]: https://book.leptos.dev

use leptos::{either::Either, prelude::*, reactive::spawn_local};
use leptos_router::{
    components::{ProtectedRoute, Route, Router, Routes},
    hooks::use_location,
    path,
};
use thaw::{Layout, LayoutHeader, Link, Tab, TabList};
use tracing::{error, info};
use tracing_subscriber::fmt;
use tracing_subscriber_wasm::MakeConsoleWriter;

use shanju_client::Client;

mod account;
#[path = "add-money.rs"]
mod add_money;
mod admin;
mod connectors;
mod dashboard;
mod http;
mod payments;
mod signin;
mod types;
mod wallet;

use http::HttpService;
use types::{Api, AppClient, Caller, Token};

/// Ask the browser to install our service worker; failure is logged & otherwise ignored (the app
/// works fine online without it)
fn register_service_worker() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let container = window.navigator().service_worker();
    spawn_local(async move {
        match wasm_bindgen_futures::JsFuture::from(container.register("/sw.js")).await {
            Ok(_) => info!("Service worker registered"),
            Err(err) => error!("Service worker registration failed: {err:?}"),
        }
    });
}

/// [shanju-fe](crate) root component
#[component]
fn App() -> impl IntoView {
    // The identity provider hands us a bearer token at sign-in; until then we're a guest. Both
    // the token & the caller's principal live in context so every view (and the HTTP gateway)
    // can reach them without prop drilling.
    let token: Token = RwSignal::new(None);
    provide_context(token);
    let caller: Caller = RwSignal::new(None);
    provide_context(caller);

    // Same-origin API; the service worker sees (& declines to cache) these calls as ordinary
    // sub-resource traffic
    let api = Api(String::new());
    provide_context(api.clone());

    // One client-- one gateway, one query cache-- for the whole app
    let client: AppClient = StoredValue::new_local(Client::new(HttpService::new(api.0, token)));
    provide_context(client);

    // Only admins get the Admin tab; everyone else shouldn't even see the door
    let is_admin = LocalResource::new(move || {
        // Read the token *synchronously* so the resource re-runs on sign-in/out
        let signed_in = token.get().is_some();
        let client = client.get_value();
        async move {
            match (signed_in, client.is_admin().await) {
                (true, Ok(flag)) => *flag,
                _ => false,
            }
        }
    });

    let selected_value = RwSignal::new("dashboard".to_owned());

    view! {
        <Layout>
            <LayoutHeader class="banner">
                <h1 class="logo">shanju</h1>
                <Show when=move || token.get().is_some() >
                    <TabList selected_value class="tab-list">
                        <Tab value="dashboard" class="tab"><Link href="/">"Dashboard"</Link></Tab>
                        <Tab value="wallet" class="tab"><Link href="/wallet">"Wallet"</Link></Tab>
                        <Tab value="payments" class="tab"><Link href="/payments">"Payments"</Link></Tab>
                        <Tab value="integrations" class="tab"><Link href="/integrations">"Integrations"</Link></Tab>
                        <Tab value="account" class="tab"><Link href="/account">"Account"</Link></Tab>
                        {move || {
                            if is_admin.get().unwrap_or(false) {
                                Either::Left(view!{
                                    <Tab value="admin" class="tab"><Link href="/admin">"Admin"</Link></Tab>
                                })
                            } else {
                                Either::Right(())
                            }
                        }}
                    </TabList>
                </Show>
                <Show when = move || token.get().is_none() && use_location().pathname.get() != "/signin" >
                    <div class="auth-actions">
                        <ul style="list-style-type: none; font-size: smaller;">
                        <li><Link href="/signin">"sign-in"</Link></li>
                        </ul>
                    </div>
                </Show>
            </LayoutHeader>
            <Layout>
                <main>
                    <Router>
                        <Routes fallback=signin::SignIn>
                            <Route path=path!("/signin") view=signin::SignIn />
                            <ProtectedRoute
                                path=path!("/")
                                // Some(true) means display, Some(false) means do *not* display,
                                // and None means that this information is still loading
                                condition = move || Some(token.get().is_some())
                                redirect_path = || "/signin"
                                view=dashboard::Dashboard
                            />
                            <ProtectedRoute
                                path=path!("/wallet")
                                condition = move || Some(token.get().is_some())
                                redirect_path = || "/signin"
                                view=wallet::Wallet
                            />
                            <ProtectedRoute
                                path=path!("/payments")
                                condition = move || Some(token.get().is_some())
                                redirect_path = || "/signin"
                                view=payments::Payments
                            />
                            <ProtectedRoute
                                path=path!("/integrations")
                                condition = move || Some(token.get().is_some())
                                redirect_path = || "/signin"
                                view=connectors::Integrations
                            />
                            <ProtectedRoute
                                path=path!("/account")
                                condition = move || Some(token.get().is_some())
                                redirect_path = || "/signin"
                                view=account::Account
                            />
                            <ProtectedRoute
                                path=path!("/admin")
                                condition = move || Some(token.get().is_some())
                                redirect_path = || "/signin"
                                view=admin::Admin
                            />
                        </Routes>
                    </Router>
                </main>
            </Layout>
        </Layout>
    }
}

fn main() {
    // A bog standard tracing-subscriber `Subscriber`, configured to output to the browser
    // console:
    fmt()
        .with_writer(MakeConsoleWriter::default().map_trace_level_to(tracing::Level::DEBUG))
        .without_time()
        .with_ansi(false)
        .init();
    // With `console_error_panic_hook` we get an actual Rust stack trace out of a panic instead of
    // "Unreachable executed" & a pointer into the WASM binary.
    console_error_panic_hook::set_once();
    register_service_worker();
    leptos::mount::mount_to_body(App);
}
