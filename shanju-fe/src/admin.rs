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

//! # shanju-fe admin panel
//!
//! All payments, all users, and a per-user account lookup. Strictly read-only (role assignment
//! aside); whether the caller is *actually* an admin is enforced by the backend on every one of
//! these calls-- hiding the tab in `main.rs` is courtesy, not security.

use leptos::{html, prelude::*};
use tracing::debug;

use shanju_shared::{
    Principal,
    api::UserSummary,
    entities::Payment,
};

use crate::types::AppClient;

#[component]
fn AllPayments() -> impl IntoView {
    let client = use_context::<AppClient>().expect("No client!?");
    let payments = LocalResource::new(move || {
        let client = client.get_value();
        async move {
            client
                .all_payments()
                .await
                .map(|payments| (*payments).clone())
                .map_err(|err| format!("{err}"))
        }
    });
    view! {
        <div class="card">
            <p class="card-title">"All payments"</p>
            {move || match payments.get() {
                None => view! { <p>"Loading..."</p> }.into_any(),
                Some(Err(err)) => view! { <div style="color: red;">{ err }</div> }.into_any(),
                Some(Ok(payments)) => view! {
                    <table class="activity">
                        <thead>
                            <tr><th>"id"</th><th>"payer"</th><th>"payee"</th><th>"amount"</th><th>"status"</th></tr>
                        </thead>
                        <tbody>
                            <For each=move || payments.clone()
                                 key=|payment: &Payment| payment.id
                                 let:payment>
                                <tr>
                                    <td>{ payment.id }</td>
                                    <td style="font-family: monospace;">{ payment.payer.to_string() }</td>
                                    <td style="font-family: monospace;">{ payment.payee.to_string() }</td>
                                    <td>{ format!("{} {}", payment.currency, payment.amount) }</td>
                                    <td>{ format!("{:?}", payment.status).to_lowercase() }</td>
                                </tr>
                            </For>
                        </tbody>
                    </table>
                }.into_any(),
            }}
        </div>
    }
}

#[component]
fn AllUsers() -> impl IntoView {
    let client = use_context::<AppClient>().expect("No client!?");
    let users = LocalResource::new(move || {
        let client = client.get_value();
        async move {
            client
                .all_users()
                .await
                .map(|users| (*users).clone())
                .map_err(|err| format!("{err}"))
        }
    });
    view! {
        <div class="card">
            <p class="card-title">"All users"</p>
            {move || match users.get() {
                None => view! { <p>"Loading..."</p> }.into_any(),
                Some(Err(err)) => view! { <div style="color: red;">{ err }</div> }.into_any(),
                Some(Ok(users)) => view! {
                    <table class="activity">
                        <thead>
                            <tr><th>"principal"</th><th>"name"</th><th>"phone"</th></tr>
                        </thead>
                        <tbody>
                            <For each=move || users.clone()
                                 key=|user: &UserSummary| user.principal.clone()
                                 let:user>
                                <tr>
                                    <td style="font-family: monospace;">{ user.principal.to_string() }</td>
                                    <td>{ user.profile.as_ref().map(|profile| profile.name.clone()).unwrap_or_default() }</td>
                                    <td>{ user.personal_account.as_ref().map(|account| account.phone.clone()).unwrap_or_default() }</td>
                                </tr>
                            </For>
                        </tbody>
                    </table>
                }.into_any(),
            }}
        </div>
    }
}

#[component]
fn UserLookup() -> impl IntoView {
    let client = use_context::<AppClient>().expect("No client!?");
    let lookup_element: NodeRef<html::Input> = NodeRef::new();
    let result: RwSignal<Option<Result<String, String>>> = RwSignal::new(None);

    let on_lookup = Action::new_local(move |_: &()| {
        let client = client.get_value();
        let text = lookup_element
            .get()
            .expect("<lookup> should be mounted")
            .value();
        async move {
            let principal = match Principal::new(text.trim()) {
                Ok(principal) => principal,
                Err(err) => {
                    result.set(Some(Err(format!("{err}"))));
                    return;
                }
            };
            match client.user_account(&principal).await {
                Ok(account) => {
                    let name = account
                        .profile
                        .as_ref()
                        .map(|profile| profile.name.clone())
                        .unwrap_or_else(|| "(no profile)".to_string());
                    let balances = account
                        .wallet_balances
                        .as_ref()
                        .map(|balances| balances.len())
                        .unwrap_or(0);
                    let transactions = account
                        .transactions
                        .as_ref()
                        .map(|transactions| transactions.len())
                        .unwrap_or(0);
                    result.set(Some(Ok(format!(
                        "{name}: {balances} balance(s), {transactions} transaction(s)"
                    ))));
                }
                Err(err) => result.set(Some(Err(err.user_message("look up users")))),
            }
        }
    });

    view! {
        <form class="wallet-form" on:submit=move |ev| {
            ev.prevent_default();
            on_lookup.dispatch(());
        }>
            <p class="card-title">"User lookup"</p>
            <div style="margin-bottom: 8px;">
                <label for="lookup">"Principal"</label><br/>
                <input type="text" id="lookup" node_ref=lookup_element required style="width: 90%;"/>
            </div>
            <input type="submit" value="Look up" disabled=move || on_lookup.pending().get()/>
            {move || match result.get() {
                Some(Ok(text)) => view! { <div>{text}</div> }.into_any(),
                Some(Err(text)) => view! { <div style="color: red;">{text}</div> }.into_any(),
                None => view! { <div/> }.into_any(),
            }}
        </form>
    }
}

/// The admin panel
#[component]
pub fn Admin() -> impl IntoView {
    debug!("Admin invoked.");
    view! {
        <div style="display: flex; gap: 1em; padding: 8px; flex-wrap: wrap;">
            <AllPayments/>
            <AllUsers/>
            <UserLookup/>
        </div>
    }
}
