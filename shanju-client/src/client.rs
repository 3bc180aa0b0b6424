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

//! # the mutation-consistency layer
//!
//! [Client] is what the views actually hold: a [Service] implementation plus the [QueryCache],
//! glued together so the invalidation table can't be forgotten at a call site. Reads go through
//! the cache; mutations go to the gateway and, *iff* they succeed, apply their row of the table.
//! If the user navigates away mid-mutation the call still completes server-side-- the
//! invalidation just happens in a cache nobody re-reads, which is harmless.

use std::rc::Rc;

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

use crate::{
    error::Result,
    funding::FundingFlow,
    query::{Mutation, QueryCache, QueryKey, QueryResult},
    service::Service,
};

pub struct Client<S> {
    service: Rc<S>,
    cache: Rc<QueryCache>,
}

// Hand-rolled so as not to demand `S: Clone`-- we're cloning the handles, not the service
impl<S> Clone for Client<S> {
    fn clone(&self) -> Self {
        Client {
            service: Rc::clone(&self.service),
            cache: Rc::clone(&self.cache),
        }
    }
}

impl<S: Service + 'static> Client<S> {
    pub fn new(service: S) -> Client<S> {
        Client {
            service: Rc::new(service),
            cache: Rc::new(QueryCache::new()),
        }
    }

    pub fn service(&self) -> Rc<S> {
        Rc::clone(&self.service)
    }

    pub fn cache(&self) -> Rc<QueryCache> {
        Rc::clone(&self.cache)
    }

    /// A fresh add-money flow over this client's gateway & cache
    pub fn funding_flow(&self) -> FundingFlow<S> {
        FundingFlow::new(Rc::clone(&self.service), Rc::clone(&self.cache))
    }

    ////////////////////////////////////////////////////////////////////////////////////////////////
    //                                  reads (through the cache)                                 //
    ////////////////////////////////////////////////////////////////////////////////////////////////

    pub async fn wallet_balance(&self) -> QueryResult<Vec<WalletBalance>> {
        let service = Rc::clone(&self.service);
        self.cache
            .read(QueryKey::WalletBalance, move || async move {
                service.get_caller_wallet_balance().await
            })
            .await
    }

    pub async fn transaction_history(&self) -> QueryResult<Vec<Transaction>> {
        let service = Rc::clone(&self.service);
        self.cache
            .read(QueryKey::TransactionHistory, move || async move {
                service.get_caller_transaction_history().await
            })
            .await
    }

    pub async fn payments_for(&self, user: &Principal) -> QueryResult<Vec<Payment>> {
        let service = Rc::clone(&self.service);
        let key = QueryKey::Payments(user.clone());
        let user = user.clone();
        self.cache
            .read(key, move || async move {
                service.list_payments_for_user(&user).await
            })
            .await
    }

    pub async fn payment(&self, id: PaymentId) -> QueryResult<Payment> {
        let service = Rc::clone(&self.service);
        self.cache
            .read(QueryKey::Payment(id), move || async move {
                service.get_payment(id).await
            })
            .await
    }

    pub async fn connectors(&self) -> QueryResult<Vec<PlatformConnection>> {
        let service = Rc::clone(&self.service);
        self.cache
            .read(QueryKey::Connectors, move || async move {
                service.get_caller_connections().await
            })
            .await
    }

    pub async fn connector(&self, id: ConnectionId) -> QueryResult<PlatformConnection> {
        let service = Rc::clone(&self.service);
        self.cache
            .read(QueryKey::Connector(id), move || async move {
                service.get_connection(id).await
            })
            .await
    }

    pub async fn personal_account(&self) -> QueryResult<Option<PersonalAccount>> {
        let service = Rc::clone(&self.service);
        self.cache
            .read(QueryKey::CurrentPersonalAccount, move || async move {
                service.get_caller_personal_account().await
            })
            .await
    }

    pub async fn user_profile(&self) -> QueryResult<Option<UserProfile>> {
        let service = Rc::clone(&self.service);
        self.cache
            .read(QueryKey::UserProfile, move || async move {
                service.get_caller_user_profile().await
            })
            .await
    }

    pub async fn caller_role(&self) -> QueryResult<UserRole> {
        let service = Rc::clone(&self.service);
        self.cache
            .read(QueryKey::CallerRole, move || async move {
                service.get_caller_user_role().await
            })
            .await
    }

    pub async fn is_admin(&self) -> QueryResult<bool> {
        let service = Rc::clone(&self.service);
        self.cache
            .read(QueryKey::IsAdmin, move || async move {
                service.is_caller_admin().await
            })
            .await
    }

    pub async fn all_payments(&self) -> QueryResult<Vec<Payment>> {
        let service = Rc::clone(&self.service);
        self.cache
            .read(QueryKey::AdminAllPayments, move || async move {
                service.list_all_payments().await
            })
            .await
    }

    pub async fn all_users(&self) -> QueryResult<Vec<UserSummary>> {
        let service = Rc::clone(&self.service);
        self.cache
            .read(QueryKey::AdminAllUsers, move || async move {
                service.list_all_users().await
            })
            .await
    }

    pub async fn user_account(&self, user: &Principal) -> QueryResult<UserAccountRsp> {
        let service = Rc::clone(&self.service);
        let key = QueryKey::AdminUserAccount(user.clone());
        let user = user.clone();
        self.cache
            .read(key, move || async move { service.get_user_account(&user).await })
            .await
    }

    ////////////////////////////////////////////////////////////////////////////////////////////////
    //                             mutations (invalidate on success)                              //
    ////////////////////////////////////////////////////////////////////////////////////////////////

    pub async fn create_payment(&self, req: &CreatePaymentReq) -> Result<PaymentId> {
        let id = self.service.create_payment(req).await?;
        self.cache.apply(&Mutation::CreatePayment);
        Ok(id)
    }

    pub async fn create_payment_by_phone(&self, req: &CreatePaymentByPhoneReq) -> Result<PaymentId> {
        let id = self.service.create_payment_by_phone(req).await?;
        self.cache.apply(&Mutation::CreatePayment);
        Ok(id)
    }

    pub async fn update_payment_status(
        &self,
        id: PaymentId,
        status: PaymentStatus,
    ) -> Result<()> {
        self.service.update_payment_status(id, status).await?;
        self.cache.apply(&Mutation::UpdatePaymentStatus(id));
        Ok(())
    }

    pub async fn transfer(&self, req: &InternalTransferRequest) -> Result<TransactionId> {
        let id = self.service.process_internal_transfer(req).await?;
        self.cache.apply(&Mutation::InternalTransfer);
        Ok(id)
    }

    pub async fn transfer_by_phone(
        &self,
        req: &InternalTransferByPhoneRequest,
    ) -> Result<TransactionId> {
        let id = self.service.process_internal_transfer_by_phone(req).await?;
        self.cache.apply(&Mutation::InternalTransfer);
        Ok(id)
    }

    pub async fn cash_out(&self, req: &CashOutRequest) -> Result<TransactionId> {
        let id = self.service.process_cash_out(req).await?;
        self.cache.apply(&Mutation::ProcessCashOut);
        Ok(id)
    }

    pub async fn create_connection(&self, req: &ConnectionReq) -> Result<ConnectionId> {
        let id = self.service.create_connection(req).await?;
        self.cache.apply(&Mutation::CreateConnector);
        Ok(id)
    }

    pub async fn update_connection(&self, id: ConnectionId, req: &ConnectionReq) -> Result<()> {
        self.service.update_connection(id, req).await?;
        self.cache.apply(&Mutation::UpdateConnector(id));
        Ok(())
    }

    pub async fn delete_connection(&self, id: ConnectionId) -> Result<()> {
        self.service.delete_connection(id).await?;
        self.cache.apply(&Mutation::DeleteConnector);
        Ok(())
    }

    pub async fn save_personal_account(&self, account: &PersonalAccount) -> Result<()> {
        self.service.save_caller_personal_account(account).await?;
        self.cache.apply(&Mutation::SavePersonalAccount);
        Ok(())
    }

    // Not in the invalidation table; the profile's one consumer re-reads explicitly after saving
    pub async fn save_user_profile(&self, profile: &UserProfile) -> Result<()> {
        self.service.save_caller_user_profile(profile).await
    }

    pub async fn assign_role(&self, user: &Principal, role: UserRole) -> Result<()> {
        self.service.assign_caller_user_role(user, role).await
    }

    /// Start an add-money request; see [FundingFlow] for the stateful conversation
    pub async fn start_add_money(&self, req: &FundingRequest) -> Result<ReferenceId> {
        self.service.start_add_money(req).await
    }
}
