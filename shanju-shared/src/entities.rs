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

//! # shanju entities
//!
//! The value objects the backend serves up. I normally loathe these sorts of "entities" modules,
//! but here the set really is shared: the frontend renders these, the client core caches them, and
//! the test harness fabricates them. The client never computes or mutates their authoritative
//! state-- amounts, statuses & timestamps all come from (and go back to) the backend verbatim.
//!
//! Monetary amounts are everywhere expressed in the *smallest unit* of their currency (cents,
//! satoshis); see [crate::currency] for the conversion rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ConnectionId, PaymentId, Principal, TransactionId};

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                            Currency                                            //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// The network on which a USDT balance lives
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UsdtNetwork {
    Eth,
    Bnb,
    Op,
    Etc,
    Star,
}

/// A currency in which a wallet may hold a balance
///
/// The `Other` variant is the escape hatch for currencies the backend learns about after this
/// client shipped; we render the code it gives us & otherwise treat it as fiat.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    Usd,
    Bdt,
    Btc,
    Eth,
    Usdt(UsdtNetwork),
    Other(String),
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                            Payments                                            //
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Cancelled,
}

/// A payment from one principal to another
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Payment {
    pub id: PaymentId,
    pub payer: Principal,
    pub payee: Principal,
    pub amount: u64,
    pub currency: String,
    pub description: String,
    pub status: PaymentStatus,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                          Transactions                                          //
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

/// A cash-out destination
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CashOutProvider {
    Bkash,
    Nagad,
    Rocket,
    Upay,
    Paypal,
    Payoneer,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    TransferIn,
    TransferOut,
    Funding,
    CashOut {
        provider: CashOutProvider,
        destination: String,
    },
}

/// One entry in a wallet's transaction history
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Transaction {
    pub id: TransactionId,
    pub owner: Principal,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub amount: u64,
    pub currency: Currency,
    pub timestamp: DateTime<Utc>,
    pub sender: Option<Principal>,
    pub receiver: Option<Principal>,
    pub reference: Option<String>,
}

/// A single per-currency balance; a wallet is a `Vec` of these
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WalletBalance {
    pub currency: Currency,
    pub amount: u64,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                     platform integrations                                      //
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformType {
    Shopify,
    WordpressWoo,
    OtherPlatform,
}

/// An e-commerce platform connector owned by the caller
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformConnection {
    pub id: ConnectionId,
    pub owner: Principal,
    pub name: String,
    pub platform_type: PlatformType,
    pub api_key: String,
    pub api_secret: String,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                       profiles & accounts                                      //
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UserProfile {
    pub name: String,
}

/// The caller's KYC-ish personal details
// The backend stores `password` as given; that's its problem, not ours, but let's at least not
// Debug-print it all over the console.
#[derive(Clone, Default, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PersonalAccount {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub nid: String,
    pub tax_id: String,
    pub password: String,
}

impl std::fmt::Debug for PersonalAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersonalAccount")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("address", &self.address)
            .field("nid", &self.nid)
            .field("tax_id", &self.tax_id)
            .field("password", &"<elided>")
            .finish()
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
    Guest,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                        funding methods                                         //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Card details, as typed into the form
///
/// These are simulated stand-ins; no gateway ever sees them. We carry them through to the backend
/// verbatim & unvalidated beyond "the fields are present".
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CardDetails {
    pub card_number: String,
    pub card_holder: String,
    pub expiry: String,
    pub cvv: String,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BankAccountDetails {
    pub account_number: String,
    pub account_holder: String,
    pub bank_name: String,
    pub routing_number: String,
}

/// How an add-money request is to be funded
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FundingMethod {
    Visa(CardDetails),
    Mastercard(CardDetails),
    BankAccount(BankAccountDetails),
}
