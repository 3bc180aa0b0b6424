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

//! # Requests & responses for the shanju backend API
//!
//! One struct per wire shape. These are the *contracts*; the operation-per-method surface that
//! sends them lives in `shanju-client`. `deny_unknown_fields` throughout: if the backend starts
//! sending fields we don't know about, I want to hear about it in testing, not find out in
//! production that we've been silently dropping data.

use serde::{Deserialize, Serialize};

use crate::{
    PaymentId, PhoneNumber, Principal, ReferenceId,
    entities::{
        CashOutProvider, Currency, FundingMethod, PaymentStatus, PersonalAccount,
        PlatformType, Transaction, UserProfile, UserRole, WalletBalance,
    },
};

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                         wallet requests                                        //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// An in-progress add-money transaction, as submitted to `start-add-money`
///
/// Identity is established only once the backend answers with a [ReferenceId]; until then this is
/// just form state.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FundingRequest {
    /// Amount in the smallest unit of `currency`
    pub amount: u64,
    pub currency: Currency,
    pub method: FundingMethod,
    pub reference: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CashOutRequest {
    pub amount: u64,
    pub currency: Currency,
    pub provider: CashOutProvider,
    pub destination: String,
    pub reference: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InternalTransferRequest {
    pub recipient: Principal,
    pub amount: u64,
    pub currency: Currency,
    pub reference: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InternalTransferByPhoneRequest {
    pub phone_number: PhoneNumber,
    pub amount: u64,
    pub currency: Currency,
    pub reference: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyAddMoneyReq {
    pub reference: ReferenceId,
    /// Numeric on the wire; see `shanju_shared::Otp` for why the client-side type is a string
    pub otp: u64,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResendAddMoneyOtpReq {
    pub reference: ReferenceId,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                        payment requests                                        //
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePaymentReq {
    pub payee: Principal,
    pub amount: u64,
    pub currency: String,
    pub description: String,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePaymentByPhoneReq {
    pub phone_number: PhoneNumber,
    pub amount: u64,
    pub currency: String,
    pub description: String,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePaymentStatusReq {
    pub id: PaymentId,
    pub status: PaymentStatus,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                       connector requests                                       //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Create & update share a shape; update additionally carries the id in the path
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionReq {
    pub name: String,
    pub platform_type: PlatformType,
    pub api_key: String,
    pub api_secret: String,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                       admin & auth shapes                                      //
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssignRoleReq {
    pub user: Principal,
    pub role: UserRole,
}

/// The admin user-lookup response: whatever slices of the account the backend cares to share
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UserAccountRsp {
    pub wallet_balances: Option<Vec<WalletBalance>>,
    pub personal_account: Option<PersonalAccount>,
    pub transactions: Option<Vec<Transaction>>,
    pub profile: Option<UserProfile>,
}

/// One row of the admin "all users" listing
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UserSummary {
    pub principal: Principal,
    pub personal_account: Option<PersonalAccount>,
    pub profile: Option<UserProfile>,
}

/// Newly-created resources come back as a bare id wrapped in a struct, the way the backend likes it
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CreatedRsp {
    pub id: u64,
}
