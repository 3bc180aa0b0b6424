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

//! # shanju-fe wallet page
//!
//! Send money, add money, cash out. Each form validates *shape* locally (amount parses, the
//! recipient looks like a principal or a phone number) before anything goes over the wire;
//! everything of substance-- balances, duplicate phones, whether the recipient exists-- is the
//! backend's call, and its answer is surfaced through the substring classifier.

use leptos::{html, prelude::*};
use tracing::debug;

use shanju_shared::{
    PhoneNumber, Principal,
    api::{CashOutRequest, InternalTransferByPhoneRequest, InternalTransferRequest},
    currency::{from_code, parse_amount},
    entities::CashOutProvider,
};

use crate::{add_money::AddMoneyForm, types::AppClient};

fn read_input(node: &NodeRef<html::Input>, what: &str) -> String {
    node.get().unwrap_or_else(|| panic!("<{what}> should be mounted")).value()
}

#[component]
fn SendMoneyForm() -> impl IntoView {
    let client = use_context::<AppClient>().expect("No client!?");

    let recipient_element: NodeRef<html::Input> = NodeRef::new();
    let amount_element: NodeRef<html::Input> = NodeRef::new();
    let currency_element: NodeRef<html::Select> = NodeRef::new();
    let reference_element: NodeRef<html::Input> = NodeRef::new();

    let (message, set_message): (
        ReadSignal<Option<Result<String, String>>>,
        WriteSignal<Option<Result<String, String>>>,
    ) = signal(None);

    let on_submit = Action::new_local(move |_: &()| {
        let client = client.get_value();
        let recipient = read_input(&recipient_element, "recipient");
        let amount = read_input(&amount_element, "amount");
        let currency = currency_element
            .get()
            .expect("<currency> should be mounted")
            .value();
        let reference = read_input(&reference_element, "reference");
        async move {
            let currency = from_code(&currency);
            let amount = parse_amount(&amount, &currency).map_err(|err| format!("{err}"))?;
            let reference = (!reference.trim().is_empty()).then(|| reference.trim().to_string());
            // Principal first, phone second; if it's neither, nothing goes over the wire
            let result = if let Ok(principal) = Principal::new(recipient.trim()) {
                client
                    .transfer(&InternalTransferRequest {
                        recipient: principal,
                        amount,
                        currency,
                        reference,
                    })
                    .await
            } else if let Ok(phone) = PhoneNumber::new(recipient.trim()) {
                client
                    .transfer_by_phone(&InternalTransferByPhoneRequest {
                        phone_number: phone,
                        amount,
                        currency,
                        reference,
                    })
                    .await
            } else {
                return Err(format!(
                    "{recipient} is neither an identity reference nor a phone number"
                ));
            };
            result
                .map(|_| "Money sent successfully".to_string())
                .map_err(|err| err.user_message("send money"))
        }
    });

    Effect::new(move |_| {
        if let Some(outcome) = on_submit.value().get() {
            if outcome.is_ok() {
                recipient_element.get().map(|elt| elt.set_value(""));
                amount_element.get().map(|elt| elt.set_value(""));
                reference_element.get().map(|elt| elt.set_value(""));
            }
            set_message.set(Some(outcome));
        }
    });

    view! {
        <form class="wallet-form" on:submit=move |ev| {
            ev.prevent_default();
            on_submit.dispatch(());
        }>
            <p class="card-title">"Send Money"</p>
            <div style="margin-bottom: 8px;">
                <label for="recipient">"Recipient (principal or phone)"</label><br/>
                <input type="text" id="recipient" node_ref=recipient_element required style="width: 90%;"/>
            </div>
            <div style="margin-bottom: 8px;">
                <label for="send-amount">"Amount"</label><br/>
                <input type="text" id="send-amount" node_ref=amount_element required/>
                <select id="send-currency" node_ref=currency_element>
                    <option value="USD">"USD"</option>
                    <option value="BDT">"BDT"</option>
                    <option value="BTC">"BTC"</option>
                    <option value="ETH">"ETH"</option>
                    <option value="USDT">"USDT"</option>
                </select>
            </div>
            <div style="margin-bottom: 8px;">
                <label for="send-reference">"Reference (optional)"</label><br/>
                <input type="text" id="send-reference" node_ref=reference_element style="width: 90%;"/>
            </div>
            <input type="submit" value="Send" disabled=move || on_submit.pending().get()/>
            {move || match message.get() {
                Some(Ok(text)) => view! { <div style="color: green;">{text}</div> }.into_any(),
                Some(Err(text)) => view! { <div style="color: red;">{text}</div> }.into_any(),
                None => view! { <div/> }.into_any(),
            }}
        </form>
    }
}

#[component]
fn CashOutForm() -> impl IntoView {
    let client = use_context::<AppClient>().expect("No client!?");

    let provider_element: NodeRef<html::Select> = NodeRef::new();
    let destination_element: NodeRef<html::Input> = NodeRef::new();
    let amount_element: NodeRef<html::Input> = NodeRef::new();
    let currency_element: NodeRef<html::Select> = NodeRef::new();

    let (message, set_message): (
        ReadSignal<Option<Result<String, String>>>,
        WriteSignal<Option<Result<String, String>>>,
    ) = signal(None);

    let on_submit = Action::new_local(move |_: &()| {
        let client = client.get_value();
        let provider = provider_element
            .get()
            .expect("<provider> should be mounted")
            .value();
        let destination = read_input(&destination_element, "destination");
        let amount = read_input(&amount_element, "amount");
        let currency = currency_element
            .get()
            .expect("<currency> should be mounted")
            .value();
        async move {
            let provider = match provider.as_str() {
                "bkash" => CashOutProvider::Bkash,
                "nagad" => CashOutProvider::Nagad,
                "rocket" => CashOutProvider::Rocket,
                "upay" => CashOutProvider::Upay,
                "payoneer" => CashOutProvider::Payoneer,
                _ => CashOutProvider::Paypal,
            };
            let currency = from_code(&currency);
            let amount = parse_amount(&amount, &currency).map_err(|err| format!("{err}"))?;
            if destination.trim().is_empty() {
                return Err("A destination account is required".to_string());
            }
            client
                .cash_out(&CashOutRequest {
                    amount,
                    currency,
                    provider,
                    destination: destination.trim().to_string(),
                    reference: None,
                })
                .await
                .map(|_| "Cash out request submitted successfully".to_string())
                .map_err(|err| err.user_message("cash out"))
        }
    });

    Effect::new(move |_| {
        if let Some(outcome) = on_submit.value().get() {
            if outcome.is_ok() {
                destination_element.get().map(|elt| elt.set_value(""));
                amount_element.get().map(|elt| elt.set_value(""));
            }
            set_message.set(Some(outcome));
        }
    });

    view! {
        <form class="wallet-form" on:submit=move |ev| {
            ev.prevent_default();
            on_submit.dispatch(());
        }>
            <p class="card-title">"Cash Out"</p>
            <div style="margin-bottom: 8px;">
                <label for="provider">"Provider"</label><br/>
                <select id="provider" node_ref=provider_element>
                    <option value="paypal">"PayPal"</option>
                    <option value="payoneer">"Payoneer"</option>
                    <option value="bkash">"bKash"</option>
                    <option value="nagad">"Nagad"</option>
                    <option value="rocket">"Rocket"</option>
                    <option value="upay">"Upay"</option>
                </select>
            </div>
            <div style="margin-bottom: 8px;">
                <label for="destination">"Destination account"</label><br/>
                <input type="text" id="destination" node_ref=destination_element required style="width: 90%;"/>
            </div>
            <div style="margin-bottom: 8px;">
                <label for="cashout-amount">"Amount"</label><br/>
                <input type="text" id="cashout-amount" node_ref=amount_element required/>
                <select id="cashout-currency" node_ref=currency_element>
                    <option value="USD">"USD"</option>
                    <option value="BDT">"BDT"</option>
                    <option value="BTC">"BTC"</option>
                    <option value="ETH">"ETH"</option>
                    <option value="USDT">"USDT"</option>
                </select>
            </div>
            <input type="submit" value="Cash out" disabled=move || on_submit.pending().get()/>
            {move || match message.get() {
                Some(Ok(text)) => view! { <div style="color: green;">{text}</div> }.into_any(),
                Some(Err(text)) => view! { <div style="color: red;">{text}</div> }.into_any(),
                None => view! { <div/> }.into_any(),
            }}
        </form>
    }
}

/// The wallet page: send, add, cash out
#[component]
pub fn Wallet() -> impl IntoView {
    debug!("Wallet invoked.");
    view! {
        <div style="display: flex; gap: 1em; padding: 8px; flex-wrap: wrap;">
            <SendMoneyForm/>
            <AddMoneyForm/>
            <CashOutForm/>
        </div>
    }
}
