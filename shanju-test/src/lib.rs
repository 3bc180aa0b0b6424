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

//! # shanju-test
//!
//! Test doubles for the shanju client core: [MockService], a scripted in-memory rendition of the
//! backend with per-operation call counters (the tests in `tests/` lean on those counters to
//! prove what did & did not go over the "wire"), and [StubNetwork], the counting network seam for
//! exercising the offline cache manager.

use async_trait::async_trait;
use chrono::Utc;
use snafu::prelude::*;

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use shanju_cache::{
    manager::{self, FetchRequest, Network, NetworkSnafu},
    store::{CachedResponse, ResponseKind},
};
use shanju_client::{
    Service,
    error::{BackendSnafu, Result},
};
use shanju_shared::{
    ConnectionId, PaymentId, PhoneNumber, Principal, ReferenceId, TransactionId,
    api::{
        CashOutRequest, ConnectionReq, CreatePaymentByPhoneReq, CreatePaymentReq, FundingRequest,
        InternalTransferByPhoneRequest, InternalTransferRequest, UserAccountRsp, UserSummary,
    },
    entities::{
        Currency, Payment, PaymentStatus, PersonalAccount, PlatformConnection, Transaction,
        TransactionStatus, TransactionType, UserProfile, UserRole, WalletBalance,
    },
};

/// The demo OTP the scripted backend accepts, mirroring the UI copy
pub const DEMO_OTP: u64 = 123456;

/// The principal the mock treats as "the caller"
pub fn caller() -> Principal {
    Principal::new("w7x7r-cok77-xa").unwrap(/* known good */)
}

pub fn payee() -> Principal {
    Principal::new("rrkah-fqaaa-aaaaa-aaaaq-cai").unwrap(/* known good */)
}

pub fn phone() -> PhoneNumber {
    PhoneNumber::new("+8801712345678").unwrap(/* known good */)
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                          MockService                                           //
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Default)]
struct Pending {
    requests: HashMap<ReferenceId, FundingRequest>,
}

/// A scripted, in-memory stand-in for the backend
///
/// Single-threaded by design, like everything above the gateway. Every operation bumps a counter
/// under its own name before doing anything else; `fail_next` poisons exactly one subsequent
/// mutation with a backend-style error message.
#[derive(Default)]
pub struct MockService {
    calls: RefCell<HashMap<&'static str, usize>>,
    next_id: Cell<u64>,
    fail_next: RefCell<Option<String>>,
    balances: RefCell<Vec<WalletBalance>>,
    history: RefCell<Vec<Transaction>>,
    payments: RefCell<Vec<Payment>>,
    connections: RefCell<Vec<PlatformConnection>>,
    personal_account: RefCell<Option<PersonalAccount>>,
    profile: RefCell<Option<UserProfile>>,
    pending: RefCell<Pending>,
    admin: Cell<bool>,
}

impl MockService {
    pub fn new() -> MockService {
        MockService {
            next_id: Cell::new(1),
            ..Default::default()
        }
    }

    /// Seed a starting balance
    pub fn with_balance(self, currency: Currency, amount: u64) -> MockService {
        self.balances.borrow_mut().push(WalletBalance { currency, amount });
        self
    }

    pub fn make_admin(&self) {
        self.admin.set(true);
    }

    /// Poison the next gated operation with `message`
    pub fn fail_next(&self, message: impl Into<String>) {
        *self.fail_next.borrow_mut() = Some(message.into());
    }

    /// How many times has `op` been called?
    pub fn calls(&self, op: &str) -> usize {
        self.calls.borrow().get(op).copied().unwrap_or(0)
    }

    pub fn balance_of(&self, currency: &Currency) -> u64 {
        self.balances
            .borrow()
            .iter()
            .find(|balance| &balance.currency == currency)
            .map(|balance| balance.amount)
            .unwrap_or(0)
    }

    fn bump(&self, op: &'static str) {
        *self.calls.borrow_mut().entry(op).or_insert(0) += 1;
    }

    fn gate(&self) -> Result<()> {
        if let Some(message) = self.fail_next.borrow_mut().take() {
            return BackendSnafu { message }.fail();
        }
        Ok(())
    }

    fn fresh_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    fn credit(&self, currency: &Currency, amount: u64) {
        let mut balances = self.balances.borrow_mut();
        match balances.iter_mut().find(|balance| &balance.currency == currency) {
            Some(balance) => balance.amount += amount,
            None => balances.push(WalletBalance {
                currency: currency.clone(),
                amount,
            }),
        }
    }

    fn debit(&self, currency: &Currency, amount: u64) -> Result<()> {
        let mut balances = self.balances.borrow_mut();
        let balance = balances
            .iter_mut()
            .find(|balance| &balance.currency == currency)
            .filter(|balance| balance.amount >= amount);
        match balance {
            Some(balance) => {
                balance.amount -= amount;
                Ok(())
            }
            None => BackendSnafu {
                message: "Insufficient funds",
            }
            .fail(),
        }
    }

    fn record(&self, transaction_type: TransactionType, currency: Currency, amount: u64) -> TransactionId {
        let id = self.fresh_id();
        self.history.borrow_mut().push(Transaction {
            id,
            owner: caller(),
            transaction_type,
            status: TransactionStatus::Completed,
            amount,
            currency,
            timestamp: Utc::now(),
            sender: None,
            receiver: None,
            reference: None,
        });
        id
    }
}

#[async_trait(?Send)]
impl Service for MockService {
    async fn create_payment(&self, req: &CreatePaymentReq) -> Result<PaymentId> {
        self.bump("createPayment");
        self.gate()?;
        let id = self.fresh_id();
        self.payments.borrow_mut().push(Payment {
            id,
            payer: caller(),
            payee: req.payee.clone(),
            amount: req.amount,
            currency: req.currency.clone(),
            description: req.description.clone(),
            status: PaymentStatus::Pending,
        });
        Ok(id)
    }
    async fn create_payment_by_phone(&self, req: &CreatePaymentByPhoneReq) -> Result<PaymentId> {
        self.bump("createPaymentByPhone");
        self.gate()?;
        let id = self.fresh_id();
        self.payments.borrow_mut().push(Payment {
            id,
            payer: caller(),
            payee: payee(),
            amount: req.amount,
            currency: req.currency.clone(),
            description: req.description.clone(),
            status: PaymentStatus::Pending,
        });
        Ok(id)
    }
    async fn get_payment(&self, id: PaymentId) -> Result<Payment> {
        self.bump("getPayment");
        self.payments
            .borrow()
            .iter()
            .find(|payment| payment.id == id)
            .cloned()
            .context(BackendSnafu {
                message: format!("No payment with id {id}"),
            })
    }
    async fn list_payments_for_user(&self, user: &Principal) -> Result<Vec<Payment>> {
        self.bump("listPaymentsForUser");
        Ok(self
            .payments
            .borrow()
            .iter()
            .filter(|payment| &payment.payer == user || &payment.payee == user)
            .cloned()
            .collect())
    }
    async fn list_all_payments(&self) -> Result<Vec<Payment>> {
        self.bump("listAllPayments");
        Ok(self.payments.borrow().clone())
    }
    async fn update_payment_status(&self, id: PaymentId, status: PaymentStatus) -> Result<()> {
        self.bump("updatePaymentStatus");
        self.gate()?;
        let mut payments = self.payments.borrow_mut();
        let payment = payments
            .iter_mut()
            .find(|payment| payment.id == id)
            .context(BackendSnafu {
                message: format!("No payment with id {id}"),
            })?;
        payment.status = status;
        Ok(())
    }

    async fn get_caller_wallet_balance(&self) -> Result<Vec<WalletBalance>> {
        self.bump("walletBalance");
        Ok(self.balances.borrow().clone())
    }
    async fn get_caller_transaction_history(&self) -> Result<Vec<Transaction>> {
        self.bump("transactionHistory");
        Ok(self.history.borrow().clone())
    }
    async fn process_internal_transfer(
        &self,
        req: &InternalTransferRequest,
    ) -> Result<TransactionId> {
        self.bump("processInternalTransfer");
        self.gate()?;
        self.debit(&req.currency, req.amount)?;
        Ok(self.record(TransactionType::TransferOut, req.currency.clone(), req.amount))
    }
    async fn process_internal_transfer_by_phone(
        &self,
        req: &InternalTransferByPhoneRequest,
    ) -> Result<TransactionId> {
        self.bump("processInternalTransferByPhone");
        self.gate()?;
        self.debit(&req.currency, req.amount)?;
        Ok(self.record(TransactionType::TransferOut, req.currency.clone(), req.amount))
    }
    async fn start_add_money(&self, req: &FundingRequest) -> Result<ReferenceId> {
        self.bump("startAddMoney");
        self.gate()?;
        let reference = self.fresh_id();
        self.pending
            .borrow_mut()
            .requests
            .insert(reference, req.clone());
        Ok(reference)
    }
    async fn verify_add_money(&self, reference: ReferenceId, otp: u64) -> Result<TransactionId> {
        self.bump("verifyAddMoney");
        self.gate()?;
        let request = self
            .pending
            .borrow()
            .requests
            .get(&reference)
            .cloned()
            .context(BackendSnafu {
                message: format!("Funding reference {reference} has expired"),
            })?;
        ensure!(otp == DEMO_OTP, BackendSnafu { message: "Invalid OTP" });
        self.pending.borrow_mut().requests.remove(&reference);
        self.credit(&request.currency, request.amount);
        Ok(self.record(TransactionType::Funding, request.currency, request.amount))
    }
    async fn resend_add_money_otp(&self, reference: ReferenceId) -> Result<()> {
        self.bump("resendAddMoneyOtp");
        self.gate()?;
        ensure!(
            self.pending.borrow().requests.contains_key(&reference),
            BackendSnafu {
                message: format!("Funding reference {reference} has expired")
            }
        );
        Ok(())
    }
    async fn process_cash_out(&self, req: &CashOutRequest) -> Result<TransactionId> {
        self.bump("processCashOut");
        self.gate()?;
        self.debit(&req.currency, req.amount)?;
        Ok(self.record(
            TransactionType::CashOut {
                provider: req.provider,
                destination: req.destination.clone(),
            },
            req.currency.clone(),
            req.amount,
        ))
    }

    async fn create_connection(&self, req: &ConnectionReq) -> Result<ConnectionId> {
        self.bump("createConnection");
        self.gate()?;
        let id = self.fresh_id();
        self.connections.borrow_mut().push(PlatformConnection {
            id,
            owner: caller(),
            name: req.name.clone(),
            platform_type: req.platform_type,
            api_key: req.api_key.clone(),
            api_secret: req.api_secret.clone(),
        });
        Ok(id)
    }
    async fn get_connection(&self, id: ConnectionId) -> Result<PlatformConnection> {
        self.bump("getConnection");
        self.connections
            .borrow()
            .iter()
            .find(|connection| connection.id == id)
            .cloned()
            .context(BackendSnafu {
                message: format!("No connection with id {id}"),
            })
    }
    async fn update_connection(&self, id: ConnectionId, req: &ConnectionReq) -> Result<()> {
        self.bump("updateConnection");
        self.gate()?;
        let mut connections = self.connections.borrow_mut();
        let connection = connections
            .iter_mut()
            .find(|connection| connection.id == id)
            .context(BackendSnafu {
                message: format!("No connection with id {id}"),
            })?;
        connection.name = req.name.clone();
        connection.platform_type = req.platform_type;
        connection.api_key = req.api_key.clone();
        connection.api_secret = req.api_secret.clone();
        Ok(())
    }
    async fn delete_connection(&self, id: ConnectionId) -> Result<()> {
        self.bump("deleteConnection");
        self.gate()?;
        self.connections
            .borrow_mut()
            .retain(|connection| connection.id != id);
        Ok(())
    }
    async fn get_caller_connections(&self) -> Result<Vec<PlatformConnection>> {
        self.bump("connectors");
        Ok(self.connections.borrow().clone())
    }

    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>> {
        self.bump("userProfile");
        Ok(self.profile.borrow().clone())
    }
    async fn save_caller_user_profile(&self, profile: &UserProfile) -> Result<()> {
        self.bump("saveUserProfile");
        self.gate()?;
        *self.profile.borrow_mut() = Some(profile.clone());
        Ok(())
    }
    async fn get_caller_personal_account(&self) -> Result<Option<PersonalAccount>> {
        self.bump("currentPersonalAccount");
        Ok(self.personal_account.borrow().clone())
    }
    async fn save_caller_personal_account(&self, account: &PersonalAccount) -> Result<()> {
        self.bump("savePersonalAccount");
        self.gate()?;
        *self.personal_account.borrow_mut() = Some(account.clone());
        Ok(())
    }
    async fn get_user_account(&self, _user: &Principal) -> Result<UserAccountRsp> {
        self.bump("getUserAccount");
        Ok(UserAccountRsp {
            wallet_balances: Some(self.balances.borrow().clone()),
            personal_account: self.personal_account.borrow().clone(),
            transactions: Some(self.history.borrow().clone()),
            profile: self.profile.borrow().clone(),
        })
    }
    async fn list_all_users(&self) -> Result<Vec<UserSummary>> {
        self.bump("listAllUsers");
        Ok(vec![UserSummary {
            principal: caller(),
            personal_account: self.personal_account.borrow().clone(),
            profile: self.profile.borrow().clone(),
        }])
    }

    async fn get_caller_user_role(&self) -> Result<UserRole> {
        self.bump("callerRole");
        Ok(if self.admin.get() {
            UserRole::Admin
        } else {
            UserRole::User
        })
    }
    async fn assign_caller_user_role(&self, _user: &Principal, _role: UserRole) -> Result<()> {
        self.bump("assignRole");
        self.gate()
    }
    async fn is_caller_admin(&self) -> Result<bool> {
        self.bump("isAdmin");
        Ok(self.admin.get())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                          StubNetwork                                           //
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Default)]
struct StubNetworkInner {
    routes: RefCell<HashMap<String, CachedResponse>>,
    log: RefCell<Vec<String>>,
    offline: Cell<bool>,
}

/// A scripted network: URL -> canned response, with a fetch log & an "unplug" switch
#[derive(Clone, Default)]
pub struct StubNetwork {
    inner: Rc<StubNetworkInner>,
}

impl StubNetwork {
    pub fn new() -> StubNetwork {
        StubNetwork::default()
    }
    /// Serve `response` for `url`
    pub fn route(&self, url: &str, response: CachedResponse) {
        self.inner
            .routes
            .borrow_mut()
            .insert(url.to_string(), response);
    }
    /// Serve a same-origin 200 bearing `body` for `url`
    pub fn route_ok(&self, url: &str, body: &[u8]) {
        self.route(url, CachedResponse::ok(body));
    }
    /// Yank the cable
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.set(offline);
    }
    /// How many fetches of `url` have we seen?
    pub fn fetches(&self, url: &str) -> usize {
        self.inner
            .log
            .borrow()
            .iter()
            .filter(|fetched| fetched.as_str() == url)
            .count()
    }
    pub fn total_fetches(&self) -> usize {
        self.inner.log.borrow().len()
    }
}

#[async_trait(?Send)]
impl Network for StubNetwork {
    async fn fetch(&self, request: &FetchRequest) -> manager::Result<CachedResponse> {
        self.inner.log.borrow_mut().push(request.key().to_string());
        if self.inner.offline.get() {
            return NetworkSnafu {
                url: request.key().to_string(),
                message: "network unavailable",
            }
            .fail();
        }
        Ok(self
            .inner
            .routes
            .borrow()
            .get(request.key())
            .cloned()
            .unwrap_or(CachedResponse {
                status: 404,
                kind: ResponseKind::Basic,
                body: Vec::new(),
            }))
    }
}
