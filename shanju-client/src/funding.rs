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

//! # the add-money flow
//!
//! Funding a wallet is the one multi-step conversation in the app: `start` submits the method &
//! amount and the backend answers with a reference id; `verify` closes the deal with the OTP the
//! user's bank (notionally) sent them; `resend` asks for a fresh code against the same reference.
//! A short-lived state machine, then:
//!
//! ```text
//! Idle --start--> Started(r) --verify--> Verifying(r) --ok--> Completed(r)
//!                  ^   |  ^                    |
//!                  |   |  +----- error --------+
//!                  +-resend
//! ```
//!
//! plus "any state → Idle" on cancellation, which is purely local: the server-side pending
//! request (if any) is simply abandoned & expires on its own schedule. The server is
//! authoritative on expiry; we track nothing about it client-side.
//!
//! Two cache rules worth calling out: `start` touches *nothing* (no money has moved yet), and
//! only a successful `verify` invalidates `walletBalance`/`transactionHistory`. `resend` never
//! does-- no state changed.

use snafu::prelude::*;
use tracing::debug;

use std::rc::Rc;

use shanju_shared::{Otp, ReferenceId, TransactionId, api::FundingRequest};

use crate::{
    error::{InputSnafu, NoFundingInProgressSnafu, ReferenceMismatchSnafu, Result},
    query::{Mutation, QueryCache},
    service::Service,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FundingState {
    Idle,
    Started { reference: ReferenceId },
    Verifying { reference: ReferenceId },
    Completed { reference: ReferenceId },
}

/// Coordinates one add-money transaction at a time against the remote gateway & the query cache
pub struct FundingFlow<S> {
    service: Rc<S>,
    cache: Rc<QueryCache>,
    state: FundingState,
}

impl<S: Service> FundingFlow<S> {
    pub fn new(service: Rc<S>, cache: Rc<QueryCache>) -> FundingFlow<S> {
        FundingFlow {
            service,
            cache,
            state: FundingState::Idle,
        }
    }

    pub fn state(&self) -> FundingState {
        self.state
    }

    /// The reference id of the in-progress request, if any
    pub fn reference(&self) -> Option<ReferenceId> {
        match self.state {
            FundingState::Started { reference } | FundingState::Verifying { reference } => {
                Some(reference)
            }
            _ => None,
        }
    }

    /// Submit the funding request; on success we hold the server-issued reference id
    ///
    /// Deliberately does *not* touch the wallet/transaction caches: no money has moved.
    pub async fn start(&mut self, request: &FundingRequest) -> Result<ReferenceId> {
        if self.state != FundingState::Idle {
            // Re-submitting the form abandons whatever came before, same as cancel-then-start
            debug!("Starting a new funding request from {:?}", self.state);
        }
        let reference = self.service.start_add_money(request).await?;
        self.state = FundingState::Started { reference };
        Ok(reference)
    }

    /// Verify the OTP for `reference`, completing the transaction
    ///
    /// The six-digit shape check happens *before* any remote call-- it's an input guard, not a
    /// stand-in for the server's authoritative OTP check. On a backend failure (wrong code,
    /// expired, already completed...) we stay `Started` & surface the server's error verbatim;
    /// the caller may try again or resend.
    pub async fn verify(&mut self, reference: ReferenceId, otp: &str) -> Result<TransactionId> {
        let otp = Otp::new(otp).context(InputSnafu)?;
        let current = self.reference().context(NoFundingInProgressSnafu)?;
        ensure!(
            current == reference,
            ReferenceMismatchSnafu {
                given: reference,
                current
            }
        );
        self.state = FundingState::Verifying { reference };
        match self.service.verify_add_money(reference, otp.as_u64()).await {
            Ok(transaction) => {
                // Money moved; invalidation happens-after the success response, never before
                self.cache.apply(&Mutation::VerifyAddMoney);
                self.state = FundingState::Completed { reference };
                Ok(transaction)
            }
            Err(err) => {
                self.state = FundingState::Started { reference };
                Err(err)
            }
        }
    }

    /// Ask the backend to re-send the OTP for `reference`
    ///
    /// No state changes on the server beyond the code itself, so no cache invalidation-- ever.
    pub async fn resend(&mut self, reference: ReferenceId) -> Result<()> {
        let current = self.reference().context(NoFundingInProgressSnafu)?;
        ensure!(
            current == reference,
            ReferenceMismatchSnafu {
                given: reference,
                current
            }
        );
        self.service.resend_add_money_otp(reference).await
    }

    /// Walk away: discard the local reference & let the server-side request age out
    ///
    /// Issues no remote call.
    pub fn cancel(&mut self) {
        debug!("Cancelling the funding flow (was {:?})", self.state);
        self.state = FundingState::Idle;
    }
}
