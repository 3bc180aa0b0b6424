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

//! # shanju-fe payments page
//!
//! Create a payment (addressed by principal or phone), review your history, settle or cancel
//! pending ones. The refresh trick: the list resource also watches a counter that the mutations
//! bump on success-- the bump re-runs the resource, whose read then hits the *invalidated* cache
//! key and so goes back to the network.

use leptos::{html, prelude::*};
use tracing::debug;

use shanju_shared::{
    PhoneNumber, Principal,
    api::{CreatePaymentByPhoneReq, CreatePaymentReq},
    currency::{from_code, parse_amount},
    entities::{Payment, PaymentStatus},
};

use crate::types::{AppClient, Caller};

fn read_input(node: &NodeRef<html::Input>, what: &str) -> String {
    node.get().unwrap_or_else(|| panic!("<{what}> should be mounted")).value()
}

#[component]
fn CreatePaymentForm(refresh: RwSignal<u32>) -> impl IntoView {
    let client = use_context::<AppClient>().expect("No client!?");

    let payee_element: NodeRef<html::Input> = NodeRef::new();
    let amount_element: NodeRef<html::Input> = NodeRef::new();
    let currency_element: NodeRef<html::Select> = NodeRef::new();
    let description_element: NodeRef<html::Input> = NodeRef::new();

    let (message, set_message): (
        ReadSignal<Option<Result<String, String>>>,
        WriteSignal<Option<Result<String, String>>>,
    ) = signal(None);

    let on_submit = Action::new_local(move |_: &()| {
        let client = client.get_value();
        let payee = read_input(&payee_element, "payee");
        let amount = read_input(&amount_element, "amount");
        let currency = currency_element
            .get()
            .expect("<currency> should be mounted")
            .value();
        let description = read_input(&description_element, "description");
        async move {
            let amount = parse_amount(&amount, &from_code(&currency)).map_err(|err| format!("{err}"))?;
            let result = if let Ok(principal) = Principal::new(payee.trim()) {
                client
                    .create_payment(&CreatePaymentReq {
                        payee: principal,
                        amount,
                        currency: currency.clone(),
                        description: description.trim().to_string(),
                    })
                    .await
            } else if let Ok(phone) = PhoneNumber::new(payee.trim()) {
                client
                    .create_payment_by_phone(&CreatePaymentByPhoneReq {
                        phone_number: phone,
                        amount,
                        currency: currency.clone(),
                        description: description.trim().to_string(),
                    })
                    .await
            } else {
                return Err(format!(
                    "{payee} is neither an identity reference nor a phone number"
                ));
            };
            result
                .map(|id| format!("Payment {id} created"))
                .map_err(|err| err.user_message("create a payment"))
        }
    });

    Effect::new(move |_| {
        if let Some(outcome) = on_submit.value().get() {
            if outcome.is_ok() {
                payee_element.get().map(|elt| elt.set_value(""));
                amount_element.get().map(|elt| elt.set_value(""));
                description_element.get().map(|elt| elt.set_value(""));
                refresh.update(|n| *n += 1);
            }
            set_message.set(Some(outcome));
        }
    });

    view! {
        <form class="wallet-form" on:submit=move |ev| {
            ev.prevent_default();
            on_submit.dispatch(());
        }>
            <p class="card-title">"New payment"</p>
            <div style="margin-bottom: 8px;">
                <label for="payee">"Payee (principal or phone)"</label><br/>
                <input type="text" id="payee" node_ref=payee_element required style="width: 90%;"/>
            </div>
            <div style="margin-bottom: 8px;">
                <label for="payment-amount">"Amount"</label><br/>
                <input type="text" id="payment-amount" node_ref=amount_element required/>
                <select id="payment-currency" node_ref=currency_element>
                    <option value="USD">"USD"</option>
                    <option value="BDT">"BDT"</option>
                    <option value="BTC">"BTC"</option>
                    <option value="ETH">"ETH"</option>
                    <option value="USDT">"USDT"</option>
                </select>
            </div>
            <div style="margin-bottom: 8px;">
                <label for="description">"Description"</label><br/>
                <input type="text" id="description" node_ref=description_element style="width: 90%;"/>
            </div>
            <input type="submit" value="Create" disabled=move || on_submit.pending().get()/>
            {move || match message.get() {
                Some(Ok(text)) => view! { <div style="color: green;">{text}</div> }.into_any(),
                Some(Err(text)) => view! { <div style="color: red;">{text}</div> }.into_any(),
                None => view! { <div/> }.into_any(),
            }}
        </form>
    }
}

#[component]
fn PaymentsTable(refresh: RwSignal<u32>) -> impl IntoView {
    let client = use_context::<AppClient>().expect("No client!?");
    let caller = use_context::<Caller>().expect("No caller!?");

    let payments = LocalResource::new(move || {
        refresh.get(); // re-run on every bump
        let caller = caller.get();
        let client = client.get_value();
        async move {
            let Some(principal) = caller else {
                return Ok(Vec::new());
            };
            client
                .payments_for(&principal)
                .await
                .map(|payments| (*payments).clone())
                .map_err(|err| format!("{err}"))
        }
    });

    let on_status = Action::new_local(move |input: &(u64, PaymentStatus)| {
        let client = client.get_value();
        let (id, status) = *input;
        async move {
            match client.update_payment_status(id, status).await {
                Ok(()) => refresh.update(|n| *n += 1),
                Err(err) => debug!("Failed to update payment {id}: {err}"),
            }
        }
    });

    view! {
        <div class="card">
            <p class="card-title">"Your payments"</p>
            {move || match payments.get() {
                None => view! { <p>"Loading..."</p> }.into_any(),
                Some(Err(err)) => view! { <div style="color: red;">{ err }</div> }.into_any(),
                Some(Ok(payments)) if payments.is_empty() => view! {
                    <p>"No payments yet."</p>
                }.into_any(),
                Some(Ok(payments)) => view! {
                    <table class="activity">
                        <thead>
                            <tr><th>"id"</th><th>"payee"</th><th>"amount"</th><th>"description"</th><th>"status"</th><th/></tr>
                        </thead>
                        <tbody>
                            <For each=move || payments.clone()
                                 key=|payment: &Payment| (payment.id, payment.status)
                                 let:payment>
                                <tr>
                                    <td>{ payment.id }</td>
                                    <td style="font-family: monospace;">{ payment.payee.to_string() }</td>
                                    <td>{ format!("{} {}", payment.currency, payment.amount) }</td>
                                    <td>{ payment.description.clone() }</td>
                                    <td>{ format!("{:?}", payment.status).to_lowercase() }</td>
                                    <td>
                                        {
                                            let id = payment.id;
                                            (payment.status == PaymentStatus::Pending).then(|| view! {
                                                <button on:click=move |_| { on_status.dispatch((id, PaymentStatus::Completed)); }>"settle"</button>
                                                " "
                                                <button on:click=move |_| { on_status.dispatch((id, PaymentStatus::Cancelled)); }>"cancel"</button>
                                            })
                                        }
                                    </td>
                                </tr>
                            </For>
                        </tbody>
                    </table>
                }.into_any(),
            }}
        </div>
    }
}

/// The payments page
#[component]
pub fn Payments() -> impl IntoView {
    debug!("Payments invoked.");
    // Bumped by mutations, watched by the table
    let refresh = RwSignal::new(0u32);
    view! {
        <div style="display: flex; gap: 1em; padding: 8px; flex-wrap: wrap;">
            <CreatePaymentForm refresh/>
            <PaymentsTable refresh/>
        </div>
    }
}
