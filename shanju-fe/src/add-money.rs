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

//! # shanju-fe "add money" form & OTP dialog
//!
//! The one genuinely stateful form in the app. Submitting the form runs `start` on the
//! [FundingFlow]; a reference id coming back opens the OTP dialog, which then drives `verify` /
//! `resend` / cancel against the same flow. The flow object owns the state machine & the cache
//! invalidation rules-- this module just renders its surface.

use leptos::{html, prelude::*};
use tracing::debug;

use std::{cell::RefCell, rc::Rc};

use shanju_shared::{
    ReferenceId,
    api::FundingRequest,
    currency::{from_code, parse_amount},
    entities::{BankAccountDetails, CardDetails, FundingMethod},
};

use crate::{
    http::HttpService,
    types::AppClient,
};

type Flow = Rc<RefCell<shanju_client::FundingFlow<HttpService>>>;

fn read_input(node: &NodeRef<html::Input>, what: &str) -> String {
    node.get().unwrap_or_else(|| panic!("<{what}> should be mounted")).value()
}

/// Fund the wallet from an (entirely simulated) external source
#[component]
pub fn AddMoneyForm() -> impl IntoView {
    debug!("AddMoneyForm invoked.");
    let client = use_context::<AppClient>().expect("No client!?");
    let flow: Flow = Rc::new(RefCell::new(client.get_value().funding_flow()));

    // Which funding method's fields to show
    let method = RwSignal::new("visa".to_string());
    // Some(reference) <=> the OTP dialog is up
    let reference: RwSignal<Option<ReferenceId>> = RwSignal::new(None);
    let otp = RwSignal::new(String::new());
    let dialog_error: RwSignal<Option<String>> = RwSignal::new(None);
    let message: RwSignal<Option<Result<String, String>>> = RwSignal::new(None);

    let card_number_element: NodeRef<html::Input> = NodeRef::new();
    let card_holder_element: NodeRef<html::Input> = NodeRef::new();
    let expiry_element: NodeRef<html::Input> = NodeRef::new();
    let cvv_element: NodeRef<html::Input> = NodeRef::new();
    let account_number_element: NodeRef<html::Input> = NodeRef::new();
    let account_holder_element: NodeRef<html::Input> = NodeRef::new();
    let bank_name_element: NodeRef<html::Input> = NodeRef::new();
    let routing_number_element: NodeRef<html::Input> = NodeRef::new();
    let amount_element: NodeRef<html::Input> = NodeRef::new();
    let currency_element: NodeRef<html::Select> = NodeRef::new();
    let note_element: NodeRef<html::Input> = NodeRef::new();

    let reset_form = move || {
        for element in [
            &card_number_element,
            &card_holder_element,
            &expiry_element,
            &cvv_element,
            &account_number_element,
            &account_holder_element,
            &bank_name_element,
            &routing_number_element,
            &amount_element,
            &note_element,
        ] {
            element.get().map(|elt| elt.set_value(""));
        }
    };

    let on_start = Action::new_local({
        let flow = Rc::clone(&flow);
        move |_: &()| {
            let flow = Rc::clone(&flow);
            let method = method.get_untracked();
            let amount = read_input(&amount_element, "amount");
            let currency = currency_element
                .get()
                .expect("<currency> should be mounted")
                .value();
            let note = read_input(&note_element, "note");
            let funding_method = match method.as_str() {
                "bank" => FundingMethod::BankAccount(BankAccountDetails {
                    account_number: read_input(&account_number_element, "account number").trim().to_string(),
                    account_holder: read_input(&account_holder_element, "account holder").trim().to_string(),
                    bank_name: read_input(&bank_name_element, "bank name").trim().to_string(),
                    routing_number: read_input(&routing_number_element, "routing number").trim().to_string(),
                }),
                kind => {
                    let card = CardDetails {
                        card_number: read_input(&card_number_element, "card number").trim().to_string(),
                        card_holder: read_input(&card_holder_element, "card holder").trim().to_string(),
                        expiry: read_input(&expiry_element, "expiry").trim().to_string(),
                        cvv: read_input(&cvv_element, "cvv").trim().to_string(),
                    };
                    if kind == "mastercard" {
                        FundingMethod::Mastercard(card)
                    } else {
                        FundingMethod::Visa(card)
                    }
                }
            };
            async move {
                let currency = from_code(&currency);
                let amount = parse_amount(&amount, &currency).map_err(|err| format!("{err}"))?;
                if let FundingMethod::BankAccount(details) = &funding_method {
                    if details.account_number.is_empty() {
                        return Err("Account number is required for bank transfers".to_string());
                    }
                }
                let request = FundingRequest {
                    amount,
                    currency,
                    method: funding_method,
                    reference: {
                        let note = note.trim();
                        (!note.is_empty()).then(|| note.to_string())
                    },
                };
                match flow.borrow_mut().start(&request).await {
                    Ok(id) => {
                        otp.set(String::new());
                        dialog_error.set(None);
                        reference.set(Some(id));
                        Ok(())
                    }
                    Err(err) => Err(err.user_message("add money")),
                }
            }
        }
    });

    Effect::new(move |_| {
        if let Some(Err(err)) = on_start.value().get() {
            message.set(Some(Err(err)));
        }
    });

    let on_verify = Action::new_local({
        let flow = Rc::clone(&flow);
        move |_: &()| {
            let flow = Rc::clone(&flow);
            let code = otp.get_untracked();
            async move {
                let Some(id) = reference.get_untracked() else {
                    return;
                };
                // The flow rejects anything that isn't six digits *before* calling out; the
                // dialog's disabled button is belt, this is suspenders
                match flow.borrow_mut().verify(id, &code).await {
                    Ok(_) => {
                        reference.set(None);
                        dialog_error.set(None);
                        message.set(Some(Ok("Money added successfully".to_string())));
                        reset_form();
                    }
                    Err(err) => dialog_error.set(Some(err.user_message("add money"))),
                }
            }
        }
    });

    let on_resend = Action::new_local({
        let flow = Rc::clone(&flow);
        move |_: &()| {
            let flow = Rc::clone(&flow);
            async move {
                let Some(id) = reference.get_untracked() else {
                    return;
                };
                otp.set(String::new());
                match flow.borrow_mut().resend(id).await {
                    Ok(()) => dialog_error.set(None),
                    Err(err) => dialog_error.set(Some(err.user_message("add money"))),
                }
            }
        }
    });

    // An action (rather than a plain handler) so the dialog's view captures only Send handles
    let on_cancel = Action::new_local({
        let flow = Rc::clone(&flow);
        move |_: &()| {
            let flow = Rc::clone(&flow);
            async move {
                flow.borrow_mut().cancel();
                reference.set(None);
                otp.set(String::new());
                dialog_error.set(None);
            }
        }
    });

    view! {
        <form class="wallet-form" on:submit=move |ev| {
            ev.prevent_default();
            on_start.dispatch(());
        }>
            <p class="card-title">"Add Money"</p>
            <div style="margin-bottom: 8px;">
                <label for="method">"Payment method"</label><br/>
                <select id="method" on:change=move |ev| method.set(event_target_value(&ev))>
                    <option value="visa">"Visa card"</option>
                    <option value="mastercard">"Mastercard"</option>
                    <option value="bank">"Bank account"</option>
                </select>
            </div>
            <div style=move || if method.get() == "bank" { "display: none;" } else { "" }>
                <div style="margin-bottom: 8px;">
                    <label for="card-number">"Card number"</label><br/>
                    <input type="text" id="card-number" node_ref=card_number_element style="width: 90%;"/>
                </div>
                <div style="margin-bottom: 8px;">
                    <label for="card-holder">"Card holder"</label><br/>
                    <input type="text" id="card-holder" node_ref=card_holder_element style="width: 90%;"/>
                </div>
                <div style="margin-bottom: 8px; display: flex; gap: 1em;">
                    <span>
                        <label for="expiry">"Expiry"</label><br/>
                        <input type="text" id="expiry" placeholder="MM/YY" node_ref=expiry_element size="5"/>
                    </span>
                    <span>
                        <label for="cvv">"CVV"</label><br/>
                        <input type="password" id="cvv" node_ref=cvv_element size="4" maxlength="4"/>
                    </span>
                </div>
            </div>
            <div style=move || if method.get() == "bank" { "" } else { "display: none;" }>
                <div style="margin-bottom: 8px;">
                    <label for="account-number">"Account number"</label><br/>
                    <input type="text" id="account-number" node_ref=account_number_element style="width: 90%;"/>
                </div>
                <div style="margin-bottom: 8px;">
                    <label for="account-holder">"Account holder"</label><br/>
                    <input type="text" id="account-holder" node_ref=account_holder_element style="width: 90%;"/>
                </div>
                <div style="margin-bottom: 8px;">
                    <label for="bank-name">"Bank name"</label><br/>
                    <input type="text" id="bank-name" node_ref=bank_name_element style="width: 90%;"/>
                </div>
                <div style="margin-bottom: 8px;">
                    <label for="routing-number">"Routing number"</label><br/>
                    <input type="text" id="routing-number" node_ref=routing_number_element/>
                </div>
            </div>
            <div style="margin-bottom: 8px;">
                <label for="add-amount">"Amount"</label><br/>
                <input type="text" id="add-amount" node_ref=amount_element required/>
                <select id="add-currency" node_ref=currency_element>
                    <option value="USD">"USD"</option>
                    <option value="BDT">"BDT"</option>
                    <option value="BTC">"BTC"</option>
                    <option value="ETH">"ETH"</option>
                    <option value="USDT">"USDT"</option>
                </select>
            </div>
            <div style="margin-bottom: 8px;">
                <label for="add-note">"Reference (optional)"</label><br/>
                <input type="text" id="add-note" placeholder="Last 4 digits of card or transaction reference" node_ref=note_element style="width: 90%;"/>
            </div>
            <input type="submit" value="Add money" disabled=move || on_start.pending().get()/>
            {move || match message.get() {
                Some(Ok(text)) => view! { <div style="color: green;">{text}</div> }.into_any(),
                Some(Err(text)) => view! { <div style="color: red;">{text}</div> }.into_any(),
                None => view! { <div/> }.into_any(),
            }}
        </form>

        // The OTP dialog; up exactly while we hold a reference id
        <Show when=move || reference.get().is_some()>
            <div class="dialog-backdrop" style="position: fixed; inset: 0; background: rgba(0,0,0,0.4); display: flex; align-items: center; justify-content: center;">
                <div class="dialog" style="background: white; padding: 1.5em; max-width: 24em;">
                    <p class="card-title">"Verify your transaction"</p>
                    <p style="font-size: smaller;">
                        "Enter the 6-digit OTP code sent by your bank to complete the transaction."
                    </p>
                    <p style="font-size: smaller; color: #888;">
                        "Reference ID: " { move || reference.get().map(|id| id.to_string()) }
                    </p>
                    <input
                        type="text"
                        inputmode="numeric"
                        maxlength="6"
                        prop:value=move || otp.get()
                        on:input=move |ev| otp.set(event_target_value(&ev))
                        style="font-family: monospace; font-size: larger; letter-spacing: 0.5em; width: 8em;"
                    />
                    <p style="font-size: smaller; color: #888;">
                        "For demo purposes, use OTP: 123456"
                    </p>
                    {move || match dialog_error.get() {
                        Some(err) => view! { <div style="color: red;">{err}</div> }.into_any(),
                        None => view! { <div/> }.into_any(),
                    }}
                    <div style="display: flex; gap: 1em; margin-top: 1em;">
                        <button on:click=move |_| { on_cancel.dispatch(()); }
                                disabled=move || on_verify.pending().get() || on_resend.pending().get()>
                            "Cancel"
                        </button>
                        <button on:click=move |_| { on_resend.dispatch(()); }
                                disabled=move || on_verify.pending().get() || on_resend.pending().get()>
                            { move || if on_resend.pending().get() { "Resending..." } else { "Resend OTP" } }
                        </button>
                        <button on:click=move |_| { on_verify.dispatch(()); }
                                disabled=move || otp.get().len() != 6 || on_verify.pending().get() || on_resend.pending().get()>
                            { move || if on_verify.pending().get() { "Verifying..." } else { "Verify & add money" } }
                        </button>
                    </div>
                </div>
            </div>
        </Show>
    }
}
