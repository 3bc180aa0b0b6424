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

//! # shanju-fe HTTP gateway
//!
//! [HttpService] is the production implementation of the remote-call gateway: one method per
//! backend procedure, each a thin gloo-net request against `{api}/api/v1/...`. Failure mapping is
//! uniform across all of them: transport errors become [Error::Net], non-2xx statuses surface the
//! backend's message text verbatim as [Error::Backend] (the substring classifier picks it apart
//! later, or doesn't), and a body we can't make sense of is [Error::De].

use gloo_net::http::{Request, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use snafu::prelude::*;

use shanju_client::{
    Service,
    error::{BackendSnafu, DeSnafu, Error, NetSnafu, Result},
};
use shanju_shared::{
    ConnectionId, PaymentId, Principal, ReferenceId, TransactionId,
    api::{
        AssignRoleReq, CashOutRequest, ConnectionReq, CreatePaymentByPhoneReq, CreatePaymentReq,
        CreatedRsp, FundingRequest, InternalTransferByPhoneRequest, InternalTransferRequest,
        ResendAddMoneyOtpReq, UserAccountRsp, UserSummary, VerifyAddMoneyReq,
    },
    entities::{
        Payment, PaymentStatus, PersonalAccount, PlatformConnection, Transaction, UserProfile,
        UserRole, WalletBalance,
    },
};

use crate::types::{Token, USER_AGENT};

use async_trait::async_trait;
use leptos::prelude::GetUntracked;

pub struct HttpService {
    api: String,
    token: Token,
}

impl HttpService {
    pub fn new(api: impl Into<String>, token: Token) -> HttpService {
        HttpService {
            api: api.into(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.api, path)
    }

    fn decorate(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header("User-Agent", USER_AGENT);
        match self.token.get_untracked() {
            Some(token) => builder.header("Authorization", &format!("Bearer {token}")),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let rsp = self
            .decorate(Request::get(&self.url(path)))
            .send()
            .await
            .map_err(net_err)?;
        recv_json(rsp).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let rsp = self
            .decorate(Request::post(&self.url(path)))
            .json(body)
            .map_err(net_err)?
            .send()
            .await
            .map_err(net_err)?;
        recv_json(rsp).await
    }

    async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        let rsp = self
            .decorate(Request::post(&self.url(path)))
            .json(body)
            .map_err(net_err)?
            .send()
            .await
            .map_err(net_err)?;
        recv_unit(rsp).await
    }

    async fn put_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        let rsp = self
            .decorate(Request::put(&self.url(path)))
            .json(body)
            .map_err(net_err)?
            .send()
            .await
            .map_err(net_err)?;
        recv_unit(rsp).await
    }

    async fn delete_unit(&self, path: &str) -> Result<()> {
        let rsp = self
            .decorate(Request::delete(&self.url(path)))
            .send()
            .await
            .map_err(net_err)?;
        recv_unit(rsp).await
    }
}

fn net_err(err: gloo_net::Error) -> Error {
    NetSnafu {
        message: format!("{err}"),
    }
    .build()
}

// 2xx or the body text *is* the error (that's the contract the classifier leans on)
async fn ensure_ok(rsp: Response) -> Result<String> {
    let status = rsp.status();
    let text = rsp.text().await.unwrap_or_default();
    if (200..300).contains(&status) {
        Ok(text)
    } else {
        BackendSnafu {
            message: if text.is_empty() {
                rsp.status_text()
            } else {
                text
            },
        }
        .fail()
    }
}

async fn recv_json<T: DeserializeOwned>(rsp: Response) -> Result<T> {
    let text = ensure_ok(rsp).await?;
    serde_json::from_str(&text).context(DeSnafu)
}

async fn recv_unit(rsp: Response) -> Result<()> {
    ensure_ok(rsp).await.map(|_| ())
}

#[async_trait(?Send)]
impl Service for HttpService {
    // payments
    async fn create_payment(&self, req: &CreatePaymentReq) -> Result<PaymentId> {
        self.post_json::<_, CreatedRsp>("/payments", req).await.map(|rsp| rsp.id)
    }
    async fn create_payment_by_phone(&self, req: &CreatePaymentByPhoneReq) -> Result<PaymentId> {
        self.post_json::<_, CreatedRsp>("/payments/by-phone", req)
            .await
            .map(|rsp| rsp.id)
    }
    async fn get_payment(&self, id: PaymentId) -> Result<Payment> {
        self.get_json(&format!("/payments/{id}")).await
    }
    async fn list_payments_for_user(&self, user: &Principal) -> Result<Vec<Payment>> {
        self.get_json(&format!("/payments?user={user}")).await
    }
    async fn list_all_payments(&self) -> Result<Vec<Payment>> {
        self.get_json("/admin/payments").await
    }
    async fn update_payment_status(&self, id: PaymentId, status: PaymentStatus) -> Result<()> {
        self.post_unit(&format!("/payments/{id}/status"), &status).await
    }

    // wallet
    async fn get_caller_wallet_balance(&self) -> Result<Vec<WalletBalance>> {
        self.get_json("/wallet/balance").await
    }
    async fn get_caller_transaction_history(&self) -> Result<Vec<Transaction>> {
        self.get_json("/wallet/history").await
    }
    async fn process_internal_transfer(
        &self,
        req: &InternalTransferRequest,
    ) -> Result<TransactionId> {
        self.post_json::<_, CreatedRsp>("/wallet/transfer", req)
            .await
            .map(|rsp| rsp.id)
    }
    async fn process_internal_transfer_by_phone(
        &self,
        req: &InternalTransferByPhoneRequest,
    ) -> Result<TransactionId> {
        self.post_json::<_, CreatedRsp>("/wallet/transfer/by-phone", req)
            .await
            .map(|rsp| rsp.id)
    }
    async fn start_add_money(&self, req: &FundingRequest) -> Result<ReferenceId> {
        self.post_json::<_, CreatedRsp>("/wallet/add-money", req)
            .await
            .map(|rsp| rsp.id)
    }
    async fn verify_add_money(&self, reference: ReferenceId, otp: u64) -> Result<TransactionId> {
        self.post_json::<_, CreatedRsp>(
            "/wallet/add-money/verify",
            &VerifyAddMoneyReq { reference, otp },
        )
        .await
        .map(|rsp| rsp.id)
    }
    async fn resend_add_money_otp(&self, reference: ReferenceId) -> Result<()> {
        self.post_unit("/wallet/add-money/resend", &ResendAddMoneyOtpReq { reference })
            .await
    }
    async fn process_cash_out(&self, req: &CashOutRequest) -> Result<TransactionId> {
        self.post_json::<_, CreatedRsp>("/wallet/cash-out", req)
            .await
            .map(|rsp| rsp.id)
    }

    // platform connectors
    async fn create_connection(&self, req: &ConnectionReq) -> Result<ConnectionId> {
        self.post_json::<_, CreatedRsp>("/connections", req)
            .await
            .map(|rsp| rsp.id)
    }
    async fn get_connection(&self, id: ConnectionId) -> Result<PlatformConnection> {
        self.get_json(&format!("/connections/{id}")).await
    }
    async fn update_connection(&self, id: ConnectionId, req: &ConnectionReq) -> Result<()> {
        self.put_unit(&format!("/connections/{id}"), req).await
    }
    async fn delete_connection(&self, id: ConnectionId) -> Result<()> {
        self.delete_unit(&format!("/connections/{id}")).await
    }
    async fn get_caller_connections(&self) -> Result<Vec<PlatformConnection>> {
        self.get_json("/connections").await
    }

    // profile & personal account
    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>> {
        self.get_json("/profile").await
    }
    async fn save_caller_user_profile(&self, profile: &UserProfile) -> Result<()> {
        self.put_unit("/profile", profile).await
    }
    async fn get_caller_personal_account(&self) -> Result<Option<PersonalAccount>> {
        self.get_json("/account").await
    }
    async fn save_caller_personal_account(&self, account: &PersonalAccount) -> Result<()> {
        self.put_unit("/account", account).await
    }
    async fn get_user_account(&self, user: &Principal) -> Result<UserAccountRsp> {
        self.get_json(&format!("/admin/users/{user}")).await
    }
    async fn list_all_users(&self) -> Result<Vec<UserSummary>> {
        self.get_json("/admin/users").await
    }

    // auth
    async fn get_caller_user_role(&self) -> Result<UserRole> {
        self.get_json("/auth/role").await
    }
    async fn assign_caller_user_role(&self, user: &Principal, role: UserRole) -> Result<()> {
        self.post_unit(
            "/auth/role",
            &AssignRoleReq {
                user: user.clone(),
                role,
            },
        )
        .await
    }
    async fn is_caller_admin(&self) -> Result<bool> {
        self.get_json("/auth/is-admin").await
    }
}
