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

//! # shanju-fe account page
//!
//! The caller's profile & personal (KYC-ish) details. Saving the personal account runs through
//! the consistency layer (it owns a row in the invalidation table); the display-name profile does
//! not, so after saving it we invalidate its key by hand before re-reading.

use leptos::{html, prelude::*};
use tracing::debug;

use shanju_client::QueryKey;
use shanju_shared::entities::{PersonalAccount, UserProfile};

use crate::types::AppClient;

fn read_input(node: &NodeRef<html::Input>, what: &str) -> String {
    node.get().unwrap_or_else(|| panic!("<{what}> should be mounted")).value()
}

#[component]
fn ProfileForm() -> impl IntoView {
    let client = use_context::<AppClient>().expect("No client!?");
    let refresh = RwSignal::new(0u32);
    let message: RwSignal<Option<Result<String, String>>> = RwSignal::new(None);
    let name_element: NodeRef<html::Input> = NodeRef::new();

    let profile = LocalResource::new(move || {
        refresh.get();
        let client = client.get_value();
        async move {
            client
                .user_profile()
                .await
                .map(|profile| (*profile).clone().unwrap_or_default())
                .map_err(|err| format!("{err}"))
        }
    });

    let on_submit = Action::new_local(move |_: &()| {
        let client = client.get_value();
        let name = read_input(&name_element, "display name").trim().to_string();
        async move {
            match client.save_user_profile(&UserProfile { name }).await {
                Ok(()) => {
                    // Not a row in the invalidation table, so stale-mark by hand & re-read
                    client.cache().invalidate(&QueryKey::UserProfile);
                    refresh.update(|n| *n += 1);
                    message.set(Some(Ok("Profile saved".to_string())));
                }
                Err(err) => message.set(Some(Err(err.user_message("save your profile")))),
            }
        }
    });

    view! {
        <form class="wallet-form" on:submit=move |ev| {
            ev.prevent_default();
            on_submit.dispatch(());
        }>
            <p class="card-title">"Profile"</p>
            {move || match profile.get() {
                None => view! { <p>"Loading..."</p> }.into_any(),
                Some(Err(err)) => view! { <div style="color: red;">{ err }</div> }.into_any(),
                Some(Ok(profile)) => view! {
                    <div style="margin-bottom: 8px;">
                        <label for="display-name">"Display name"</label><br/>
                        <input type="text" id="display-name" value=profile.name node_ref=name_element style="width: 90%;"/>
                    </div>
                }.into_any(),
            }}
            <input type="submit" value="Save" disabled=move || on_submit.pending().get()/>
            {move || match message.get() {
                Some(Ok(text)) => view! { <div style="color: green;">{text}</div> }.into_any(),
                Some(Err(text)) => view! { <div style="color: red;">{text}</div> }.into_any(),
                None => view! { <div/> }.into_any(),
            }}
        </form>
    }
}

#[component]
fn PersonalAccountForm() -> impl IntoView {
    let client = use_context::<AppClient>().expect("No client!?");
    let message: RwSignal<Option<Result<String, String>>> = RwSignal::new(None);

    let full_name_element: NodeRef<html::Input> = NodeRef::new();
    let email_element: NodeRef<html::Input> = NodeRef::new();
    let phone_element: NodeRef<html::Input> = NodeRef::new();
    let address_element: NodeRef<html::Input> = NodeRef::new();
    let nid_element: NodeRef<html::Input> = NodeRef::new();
    let tax_id_element: NodeRef<html::Input> = NodeRef::new();
    let password_element: NodeRef<html::Input> = NodeRef::new();

    let account = LocalResource::new(move || {
        let client = client.get_value();
        async move {
            client
                .personal_account()
                .await
                .map(|account| (*account).clone().unwrap_or_default())
                .map_err(|err| format!("{err}"))
        }
    });

    let on_submit = Action::new_local(move |_: &()| {
        let client = client.get_value();
        let account = PersonalAccount {
            full_name: read_input(&full_name_element, "full name").trim().to_string(),
            email: read_input(&email_element, "email").trim().to_string(),
            phone: read_input(&phone_element, "phone").trim().to_string(),
            address: read_input(&address_element, "address").trim().to_string(),
            nid: read_input(&nid_element, "nid").trim().to_string(),
            tax_id: read_input(&tax_id_element, "tax id").trim().to_string(),
            password: read_input(&password_element, "password").to_string(),
        };
        async move {
            // Invalidation of `currentPersonalAccount` rides along on success
            match client.save_personal_account(&account).await {
                Ok(()) => message.set(Some(Ok("Personal account saved".to_string()))),
                Err(err) => message.set(Some(Err(err.user_message("save your account")))),
            }
        }
    });

    view! {
        <form class="wallet-form" on:submit=move |ev| {
            ev.prevent_default();
            on_submit.dispatch(());
        }>
            <p class="card-title">"Personal account"</p>
            {move || match account.get() {
                None => view! { <p>"Loading..."</p> }.into_any(),
                Some(Err(err)) => view! { <div style="color: red;">{ err }</div> }.into_any(),
                Some(Ok(account)) => view! {
                    <div>
                        <div style="margin-bottom: 8px;">
                            <label for="full-name">"Full name"</label><br/>
                            <input type="text" id="full-name" value=account.full_name node_ref=full_name_element required style="width: 90%;"/>
                        </div>
                        <div style="margin-bottom: 8px;">
                            <label for="email">"Email"</label><br/>
                            <input type="email" id="email" value=account.email node_ref=email_element style="width: 90%;"/>
                        </div>
                        <div style="margin-bottom: 8px;">
                            <label for="account-phone">"Phone"</label><br/>
                            <input type="text" id="account-phone" value=account.phone node_ref=phone_element style="width: 90%;"/>
                        </div>
                        <div style="margin-bottom: 8px;">
                            <label for="address">"Address"</label><br/>
                            <input type="text" id="address" value=account.address node_ref=address_element style="width: 90%;"/>
                        </div>
                        <div style="margin-bottom: 8px;">
                            <label for="nid">"National ID"</label><br/>
                            <input type="text" id="nid" value=account.nid node_ref=nid_element/>
                        </div>
                        <div style="margin-bottom: 8px;">
                            <label for="tax-id">"Tax ID"</label><br/>
                            <input type="text" id="tax-id" value=account.tax_id node_ref=tax_id_element/>
                        </div>
                        <div style="margin-bottom: 8px;">
                            <label for="account-password">"Password"</label><br/>
                            <input type="password" id="account-password" node_ref=password_element/>
                        </div>
                    </div>
                }.into_any(),
            }}
            <input type="submit" value="Save" disabled=move || on_submit.pending().get()/>
            {move || match message.get() {
                Some(Ok(text)) => view! { <div style="color: green;">{text}</div> }.into_any(),
                Some(Err(text)) => view! { <div style="color: red;">{text}</div> }.into_any(),
                None => view! { <div/> }.into_any(),
            }}
        </form>
    }
}

/// The account page
#[component]
pub fn Account() -> impl IntoView {
    debug!("Account invoked.");
    view! {
        <div style="display: flex; gap: 1em; padding: 8px; flex-wrap: wrap;">
            <ProfileForm/>
            <PersonalAccountForm/>
        </div>
    }
}
