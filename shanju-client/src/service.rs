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

//! # the remote-call gateway
//!
//! A typed proxy to the backend's remote procedures: one method per operation, nothing more.
//! Everything above this trait (the query cache, the funding flow, the views) goes through it and
//! never around it. Deliberately *no* retries & *no* timeouts at this layer: a failed call
//! surfaces immediately and the caller decides whether the user gets to re-submit.
//!
//! The production implementation (gloo-net over `/api/v1`) lives in `shanju-fe`; the scripted one
//! lives in `shanju-test`. `?Send` throughout-- this runs on the browser's single thread.

use async_trait::async_trait;

use shanju_shared::{
    ConnectionId, PaymentId, Principal, ReferenceId, TransactionId,
    api::{
        CashOutRequest, ConnectionReq, CreatePaymentByPhoneReq, CreatePaymentReq, FundingRequest,
        InternalTransferByPhoneRequest, InternalTransferRequest, UserAccountRsp, UserSummary,
    },
    entities::{
        Payment, PaymentStatus, PersonalAccount, PlatformConnection, Transaction, UserProfile,
        UserRole, WalletBalance,
    },
};

use crate::error::Result;

#[async_trait(?Send)]
pub trait Service {
    // payments
    async fn create_payment(&self, req: &CreatePaymentReq) -> Result<PaymentId>;
    async fn create_payment_by_phone(&self, req: &CreatePaymentByPhoneReq) -> Result<PaymentId>;
    async fn get_payment(&self, id: PaymentId) -> Result<Payment>;
    async fn list_payments_for_user(&self, user: &Principal) -> Result<Vec<Payment>>;
    async fn list_all_payments(&self) -> Result<Vec<Payment>>;
    async fn update_payment_status(&self, id: PaymentId, status: PaymentStatus) -> Result<()>;

    // wallet
    async fn get_caller_wallet_balance(&self) -> Result<Vec<WalletBalance>>;
    async fn get_caller_transaction_history(&self) -> Result<Vec<Transaction>>;
    async fn process_internal_transfer(&self, req: &InternalTransferRequest)
    -> Result<TransactionId>;
    async fn process_internal_transfer_by_phone(
        &self,
        req: &InternalTransferByPhoneRequest,
    ) -> Result<TransactionId>;
    async fn start_add_money(&self, req: &FundingRequest) -> Result<ReferenceId>;
    async fn verify_add_money(&self, reference: ReferenceId, otp: u64) -> Result<TransactionId>;
    async fn resend_add_money_otp(&self, reference: ReferenceId) -> Result<()>;
    async fn process_cash_out(&self, req: &CashOutRequest) -> Result<TransactionId>;

    // platform connectors
    async fn create_connection(&self, req: &ConnectionReq) -> Result<ConnectionId>;
    async fn get_connection(&self, id: ConnectionId) -> Result<PlatformConnection>;
    async fn update_connection(&self, id: ConnectionId, req: &ConnectionReq) -> Result<()>;
    async fn delete_connection(&self, id: ConnectionId) -> Result<()>;
    async fn get_caller_connections(&self) -> Result<Vec<PlatformConnection>>;

    // profile & personal account
    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>>;
    async fn save_caller_user_profile(&self, profile: &UserProfile) -> Result<()>;
    async fn get_caller_personal_account(&self) -> Result<Option<PersonalAccount>>;
    async fn save_caller_personal_account(&self, account: &PersonalAccount) -> Result<()>;
    async fn get_user_account(&self, user: &Principal) -> Result<UserAccountRsp>;
    async fn list_all_users(&self) -> Result<Vec<UserSummary>>;

    // auth
    async fn get_caller_user_role(&self) -> Result<UserRole>;
    async fn assign_caller_user_role(&self, user: &Principal, role: UserRole) -> Result<()>;
    async fn is_caller_admin(&self) -> Result<bool>;
}
