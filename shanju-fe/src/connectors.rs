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

//! # shanju-fe integrations page
//!
//! Platform connectors: the API credentials that let an e-commerce storefront collect through
//! shanju. One form serves both create & update-- "edit" loads a row into it & flips the submit
//! path over to `update_connection`.

use leptos::{html, prelude::*};
use tracing::debug;

use shanju_shared::{
    ConnectionId,
    api::ConnectionReq,
    entities::{PlatformConnection, PlatformType},
};

use crate::types::AppClient;

fn read_input(node: &NodeRef<html::Input>, what: &str) -> String {
    node.get().unwrap_or_else(|| panic!("<{what}> should be mounted")).value()
}

fn platform_label(platform: PlatformType) -> &'static str {
    match platform {
        PlatformType::Shopify => "Shopify",
        PlatformType::WordpressWoo => "WordPress / WooCommerce",
        PlatformType::OtherPlatform => "Other",
    }
}

/// The integrations page
#[component]
pub fn Integrations() -> impl IntoView {
    debug!("Integrations invoked.");
    let client = use_context::<AppClient>().expect("No client!?");

    let refresh = RwSignal::new(0u32);
    // Some(id) while the form is editing an existing connector
    let editing: RwSignal<Option<ConnectionId>> = RwSignal::new(None);
    let message: RwSignal<Option<Result<String, String>>> = RwSignal::new(None);

    let name_element: NodeRef<html::Input> = NodeRef::new();
    let platform_element: NodeRef<html::Select> = NodeRef::new();
    let api_key_element: NodeRef<html::Input> = NodeRef::new();
    let api_secret_element: NodeRef<html::Input> = NodeRef::new();

    let connectors = LocalResource::new(move || {
        refresh.get();
        let client = client.get_value();
        async move {
            client
                .connectors()
                .await
                .map(|connectors| (*connectors).clone())
                .map_err(|err| format!("{err}"))
        }
    });

    let on_submit = Action::new_local(move |_: &()| {
        let client = client.get_value();
        let req = ConnectionReq {
            name: read_input(&name_element, "name").trim().to_string(),
            platform_type: match platform_element
                .get()
                .expect("<platform> should be mounted")
                .value()
                .as_str()
            {
                "shopify" => PlatformType::Shopify,
                "wordpress_woo" => PlatformType::WordpressWoo,
                _ => PlatformType::OtherPlatform,
            },
            api_key: read_input(&api_key_element, "api key").trim().to_string(),
            api_secret: read_input(&api_secret_element, "api secret").trim().to_string(),
        };
        let target = editing.get_untracked();
        async move {
            if req.name.is_empty() {
                message.set(Some(Err("A connector needs a name".to_string())));
                return;
            }
            let result = match target {
                Some(id) => client
                    .update_connection(id, &req)
                    .await
                    .map(|()| format!("Connector {} updated", req.name)),
                None => client
                    .create_connection(&req)
                    .await
                    .map(|id| format!("Connector {id} created")),
            };
            match result {
                Ok(text) => {
                    editing.set(None);
                    for element in [&name_element, &api_key_element, &api_secret_element] {
                        element.get().map(|elt| elt.set_value(""));
                    }
                    refresh.update(|n| *n += 1);
                    message.set(Some(Ok(text)));
                }
                Err(err) => message.set(Some(Err(err.user_message("manage connectors")))),
            }
        }
    });

    let on_delete = Action::new_local(move |id: &ConnectionId| {
        let client = client.get_value();
        let id = *id;
        async move {
            match client.delete_connection(id).await {
                Ok(()) => refresh.update(|n| *n += 1),
                Err(err) => message.set(Some(Err(err.user_message("manage connectors")))),
            }
        }
    });

    let edit = move |connector: PlatformConnection| {
        name_element.get().map(|elt| elt.set_value(&connector.name));
        api_key_element.get().map(|elt| elt.set_value(&connector.api_key));
        api_secret_element.get().map(|elt| elt.set_value(&connector.api_secret));
        editing.set(Some(connector.id));
    };

    view! {
        <div style="display: flex; gap: 1em; padding: 8px; flex-wrap: wrap;">
            <form class="wallet-form" on:submit=move |ev| {
                ev.prevent_default();
                on_submit.dispatch(());
            }>
                <p class="card-title">
                    {move || if editing.get().is_some() { "Edit connector" } else { "New connector" }}
                </p>
                <div style="margin-bottom: 8px;">
                    <label for="connector-name">"Name"</label><br/>
                    <input type="text" id="connector-name" node_ref=name_element required style="width: 90%;"/>
                </div>
                <div style="margin-bottom: 8px;">
                    <label for="platform">"Platform"</label><br/>
                    <select id="platform" node_ref=platform_element>
                        <option value="shopify">"Shopify"</option>
                        <option value="wordpress_woo">"WordPress / WooCommerce"</option>
                        <option value="other">"Other"</option>
                    </select>
                </div>
                <div style="margin-bottom: 8px;">
                    <label for="api-key">"API key"</label><br/>
                    <input type="text" id="api-key" node_ref=api_key_element required style="width: 90%;"/>
                </div>
                <div style="margin-bottom: 8px;">
                    <label for="api-secret">"API secret"</label><br/>
                    <input type="password" id="api-secret" node_ref=api_secret_element required style="width: 90%;"/>
                </div>
                <input type="submit"
                       value=move || if editing.get().is_some() { "Update" } else { "Create" }
                       disabled=move || on_submit.pending().get()/>
                {move || editing.get().is_some().then(|| view! {
                    <button on:click=move |ev| {
                        ev.prevent_default();
                        editing.set(None);
                        for element in [&name_element, &api_key_element, &api_secret_element] {
                            element.get().map(|elt| elt.set_value(""));
                        }
                    }>"Cancel edit"</button>
                })}
                {move || match message.get() {
                    Some(Ok(text)) => view! { <div style="color: green;">{text}</div> }.into_any(),
                    Some(Err(text)) => view! { <div style="color: red;">{text}</div> }.into_any(),
                    None => view! { <div/> }.into_any(),
                }}
            </form>

            <div class="card">
                <p class="card-title">"Your connectors"</p>
                {move || match connectors.get() {
                    None => view! { <p>"Loading..."</p> }.into_any(),
                    Some(Err(err)) => view! { <div style="color: red;">{ err }</div> }.into_any(),
                    Some(Ok(connectors)) if connectors.is_empty() => view! {
                        <p>"No connectors yet."</p>
                    }.into_any(),
                    Some(Ok(connectors)) => view! {
                        <table class="activity">
                            <thead>
                                <tr><th>"name"</th><th>"platform"</th><th>"api key"</th><th/></tr>
                            </thead>
                            <tbody>
                                <For each=move || connectors.clone()
                                     key=|connector: &PlatformConnection| connector.id
                                     let:connector>
                                    <tr>
                                        <td>{ connector.name.clone() }</td>
                                        <td>{ platform_label(connector.platform_type) }</td>
                                        <td style="font-family: monospace;">{ connector.api_key.clone() }</td>
                                        <td>
                                            {
                                                let id = connector.id;
                                                let row = connector.clone();
                                                view! {
                                                    <button on:click=move |_| edit(row.clone())>"edit"</button>
                                                    " "
                                                    <button on:click=move |_| { on_delete.dispatch(id); }>"delete"</button>
                                                }
                                            }
                                        </td>
                                    </tr>
                                </For>
                            </tbody>
                        </table>
                    }.into_any(),
                }}
            </div>
        </div>
    }
}
