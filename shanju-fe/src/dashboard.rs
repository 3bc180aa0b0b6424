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

//! # shanju-fe dashboard
//!
//! Balances & recent activity, read through the query cache. Note that this page issues no
//! mutations at all: when a transfer elsewhere invalidates `walletBalance`, simply re-visiting
//! this page is what triggers the fresh fetch.

use leptos::prelude::*;
use tracing::debug;

use shanju_shared::{
    currency::format_amount,
    entities::{Transaction, TransactionType, WalletBalance},
};

use crate::types::AppClient;

fn type_label(transaction: &Transaction) -> String {
    match &transaction.transaction_type {
        TransactionType::Deposit => "deposit".to_string(),
        TransactionType::Withdrawal => "withdrawal".to_string(),
        TransactionType::TransferIn => "received".to_string(),
        TransactionType::TransferOut => "sent".to_string(),
        TransactionType::Funding => "add money".to_string(),
        TransactionType::CashOut { provider, .. } => format!("cash out ({provider:?})"),
    }
}

#[component]
fn BalancesCard() -> impl IntoView {
    let client = use_context::<AppClient>().expect("No client!?");
    // `QueryResult` values are `Rc`-shared for the cache's benefit; clone them out so the view
    // side deals in plain owned (& Send) data
    let balances = LocalResource::new(move || {
        let client = client.get_value();
        async move {
            client
                .wallet_balance()
                .await
                .map(|balances| (*balances).clone())
                .map_err(|err| format!("{err}"))
        }
    });
    view! {
        <div class="card">
            <p class="card-title">"Balances"</p>
            {move || match balances.get() {
                None => view! { <p>"Loading..."</p> }.into_any(),
                Some(Err(err)) => view! {
                    <div style="color: red;">{ err }</div>
                }.into_any(),
                Some(Ok(balances)) if balances.is_empty() => view! {
                    <p>"No balances yet-- add money to get started."</p>
                }.into_any(),
                Some(Ok(balances)) => view! {
                    <ul style="list-style-type: none;">
                        <For each=move || balances.clone()
                             key=|balance: &WalletBalance| balance.currency.clone()
                             let:balance>
                            <li class="balance">{ format_amount(balance.amount, &balance.currency) }</li>
                        </For>
                    </ul>
                }.into_any(),
            }}
        </div>
    }
}

#[component]
fn RecentActivity() -> impl IntoView {
    let client = use_context::<AppClient>().expect("No client!?");
    let history = LocalResource::new(move || {
        let client = client.get_value();
        async move {
            client
                .transaction_history()
                .await
                .map(|transactions| {
                    // Newest first; the backend already sorts, but don't count on it
                    let mut recent = (*transactions).clone();
                    recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                    recent.truncate(5);
                    recent
                })
                .map_err(|err| format!("{err}"))
        }
    });
    view! {
        <div class="card">
            <p class="card-title">"Recent activity"</p>
            {move || match history.get() {
                None => view! { <p>"Loading..."</p> }.into_any(),
                Some(Err(err)) => view! {
                    <div style="color: red;">{ err }</div>
                }.into_any(),
                Some(Ok(recent)) => view! {
                    <table class="activity">
                        <thead>
                            <tr><th>"when"</th><th>"what"</th><th>"amount"</th><th>"status"</th></tr>
                        </thead>
                        <tbody>
                            <For each=move || recent.clone()
                                 key=|transaction: &Transaction| transaction.id
                                 let:transaction>
                                <tr>
                                    <td>{ transaction.timestamp.format("%Y-%m-%d %H:%M:%S").to_string() }</td>
                                    <td>{ type_label(&transaction) }</td>
                                    <td>{ format_amount(transaction.amount, &transaction.currency) }</td>
                                    <td>{ format!("{:?}", transaction.status).to_lowercase() }</td>
                                </tr>
                            </For>
                        </tbody>
                    </table>
                }.into_any()
            }}
        </div>
    }
}

/// The shanju landing page
#[component]
pub fn Dashboard() -> impl IntoView {
    debug!("Dashboard invoked.");
    view! {
        <div style="display: flex; gap: 1em; padding: 8px;">
            <BalancesCard/>
            <RecentActivity/>
        </div>
    }
}
