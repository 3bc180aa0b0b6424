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

//! # shanju-fe "sign-in" page
//!
//! Identity is the identity *provider's* business, not ours; all we do here is trade credentials
//! for a bearer token & the caller's principal, park both in context, and get out of the way.

use gloo_net::http::Request;
use leptos::{
    html::{self},
    prelude::*,
};
use serde::Deserialize;
use tracing::{debug, error, info};

use shanju_shared::Principal;

use crate::types::{Api, Caller, Token, USER_AGENT};

#[derive(Clone, Debug, Deserialize)]
struct LoginRsp {
    token: String,
    principal: Principal,
}

async fn login(api: &str, phone: String, password: String) -> Result<LoginRsp, String> {
    let rsp = Request::post(&format!("{api}/api/v1/auth/login"))
        .header("User-Agent", USER_AGENT)
        .json(&serde_json::json!({ "phone": phone, "password": password }))
        .map_err(|err| format!("{err}"))?
        .send()
        .await
        .map_err(|err| err.to_string())?;
    if rsp.status() < 200 || rsp.status() >= 300 {
        return Err(rsp.status_text());
    }
    let rsp = rsp.json::<LoginRsp>().await.map_err(|err| err.to_string())?;
    info!("Sign-in successful");
    Ok(rsp)
}

/// The shanju sign-in page
#[component]
pub fn SignIn() -> impl IntoView {
    debug!("SignIn invoked.");
    let api = use_context::<Api>()
        .expect("No context for the API location!?")
        .0;

    let phone_element: NodeRef<html::Input> = NodeRef::new();
    let password_element: NodeRef<html::Input> = NodeRef::new();

    let (error, set_error): (ReadSignal<Option<String>>, WriteSignal<Option<String>>) =
        signal(None);

    let token = use_context::<Token>().expect("No token Cell!?");
    let caller = use_context::<Caller>().expect("No caller Cell!?");

    let navigate = leptos_router::hooks::use_navigate();

    let on_submit = Action::new_local(move |_: &()| {
        let phone = phone_element
            .get()
            .expect("<phone> should be mounted")
            .value();
        let password = password_element
            .get()
            .expect("<password> should be mounted")
            .value();
        let api_val = api.clone();
        async move { login(&api_val, phone, password).await }
    });

    Effect::new(move |_| {
        match on_submit.value().get() {
            Some(Ok(rsp)) => {
                token.set(Some(rsp.token));
                caller.set(Some(rsp.principal));
                navigate("/", Default::default())
            }
            Some(Err(err)) => {
                error!("Sign-in failed: {err:?}");
                set_error.set(Some(err))
            }
            None => debug!("Effect invoked with no value!?"),
        }
    });

    view! {
        <div style="display: flex; align-items: center; justify-content: space-around; flex-direction: column;">
            <form style="padding: 1em;" on:submit=move |ev| {
                // If I don't say this, the damn page reloads before the HTTP call returns
                ev.prevent_default();
                on_submit.dispatch(());
            }>
                <div style="margin-bottom: 8px;">
                    <label for="phone" style="width: 100px; display: inline-block;">"Phone:"</label>
                    <input type="text" id="phone" name="phone" node_ref=phone_element required />
                </div>
                <div style="margin-bottom: 12px;">
                    <label for="password" style="width: 100px; display: inline-block;">"Password:"</label>
                    <input type="password" id="password" name="password" node_ref=password_element required />
                </div>
                <div style="display: flex; align-items: center; justify-content: space-around;">
                    <input type="submit" value="Sign in" />
                </div>
            </form>
            <Show when=move || error.get().is_some()>
                <div style="color: red;">
                { move || error.get().unwrap() }
                </div>
            </Show>
        </div>
    }
}
