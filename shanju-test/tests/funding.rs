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

//! # add-money flow tests
//!
//! The start → verify-OTP conversation, end-to-end against the scripted backend: state
//! transitions, the six-digit input guard, and-- the part that's easy to get wrong-- exactly
//! which steps do & do not invalidate the wallet caches.

use shanju_client::{Client, FundingState, error::Error};
use shanju_shared::{
    api::FundingRequest,
    entities::{CardDetails, Currency, FundingMethod},
};
use shanju_test::MockService;

fn visa_request() -> FundingRequest {
    FundingRequest {
        amount: 500,
        currency: Currency::Usd,
        method: FundingMethod::Visa(CardDetails {
            card_number: "4111111111111111".to_string(),
            card_holder: "Jane Doe".to_string(),
            expiry: "12/27".to_string(),
            cvv: "123".to_string(),
        }),
        reference: None,
    }
}

#[tokio::test]
async fn add_money_end_to_end() {
    let client = Client::new(MockService::new());
    let mock = client.service();
    let mut flow = client.funding_flow();

    // Prime the caches so we can observe (non-)invalidation below
    client.wallet_balance().await.unwrap();
    client.transaction_history().await.unwrap();
    assert_eq!(mock.calls("walletBalance"), 1);
    assert_eq!(mock.calls("transactionHistory"), 1);

    let reference = flow.start(&visa_request()).await.unwrap();
    assert_eq!(flow.state(), FundingState::Started { reference });
    // No money has moved yet: the cached balance must still be served
    client.wallet_balance().await.unwrap();
    assert_eq!(mock.calls("walletBalance"), 1);

    // A wrong (but well-formed) OTP: invalid-OTP-class error, flow stays Started, wallet cache
    // still un-invalidated
    let err = flow.verify(reference, "000000").await.unwrap_err();
    assert!(format!("{err}").contains("Invalid OTP"));
    assert!(err.user_message("add money").starts_with("Invalid OTP code"));
    assert_eq!(flow.state(), FundingState::Started { reference });
    client.wallet_balance().await.unwrap();
    assert_eq!(mock.calls("walletBalance"), 1);

    // The demo OTP: flow completes, both wallet keys are invalidated, and the next reads fetch
    // fresh state reflecting the credit
    flow.verify(reference, "123456").await.unwrap();
    assert_eq!(flow.state(), FundingState::Completed { reference });
    let balances = client.wallet_balance().await.unwrap();
    assert_eq!(mock.calls("walletBalance"), 2);
    assert_eq!(
        balances
            .iter()
            .find(|balance| balance.currency == Currency::Usd)
            .map(|balance| balance.amount),
        Some(500)
    );
    let history = client.transaction_history().await.unwrap();
    assert_eq!(mock.calls("transactionHistory"), 2);
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn otp_shape_guard() {
    let client = Client::new(MockService::new());
    let mock = client.service();
    let mut flow = client.funding_flow();
    let reference = flow.start(&visa_request()).await.unwrap();

    for bad in ["", "12345", "1234567", "12345a", "12 456", "①②③④⑤⑥"] {
        let err = flow.verify(reference, bad).await.unwrap_err();
        assert!(matches!(err, Error::Input { .. }), "{bad:?} got through!?");
        assert_eq!(flow.state(), FundingState::Started { reference });
    }
    // The guard is client-side: nothing ever went over the wire
    assert_eq!(mock.calls("verifyAddMoney"), 0);
}

#[tokio::test]
async fn resend_leaves_wallet_caches_alone() {
    let client = Client::new(MockService::new());
    let mock = client.service();
    let mut flow = client.funding_flow();

    client.wallet_balance().await.unwrap();
    client.transaction_history().await.unwrap();

    let reference = flow.start(&visa_request()).await.unwrap();
    flow.resend(reference).await.unwrap();
    assert_eq!(mock.calls("resendAddMoneyOtp"), 1);
    assert_eq!(flow.state(), FundingState::Started { reference });

    // Resend changed nothing server-side; the caches must not have been touched
    client.wallet_balance().await.unwrap();
    client.transaction_history().await.unwrap();
    assert_eq!(mock.calls("walletBalance"), 1);
    assert_eq!(mock.calls("transactionHistory"), 1);
}

#[tokio::test]
async fn cancellation_is_local() {
    let client = Client::new(MockService::new());
    let mock = client.service();
    let mut flow = client.funding_flow();

    let reference = flow.start(&visa_request()).await.unwrap();
    flow.cancel();
    assert_eq!(flow.state(), FundingState::Idle);

    // No remote traffic beyond the original start; the server-side request is simply abandoned
    assert_eq!(mock.calls("startAddMoney"), 1);
    assert_eq!(mock.calls("verifyAddMoney"), 0);

    let err = flow.verify(reference, "123456").await.unwrap_err();
    assert!(matches!(err, Error::NoFundingInProgress { .. }));
    assert_eq!(mock.calls("verifyAddMoney"), 0);
}

#[tokio::test]
async fn reference_ids_must_match() {
    let client = Client::new(MockService::new());
    let mock = client.service();
    let mut flow = client.funding_flow();

    let reference = flow.start(&visa_request()).await.unwrap();
    let err = flow.verify(reference + 1, "123456").await.unwrap_err();
    assert!(matches!(err, Error::ReferenceMismatch { .. }));
    assert_eq!(flow.state(), FundingState::Started { reference });
    assert_eq!(mock.calls("verifyAddMoney"), 0);

    let err = flow.resend(reference + 1).await.unwrap_err();
    assert!(matches!(err, Error::ReferenceMismatch { .. }));
    assert_eq!(mock.calls("resendAddMoneyOtp"), 0);
}

#[tokio::test]
async fn restarting_supersedes_the_old_reference() {
    let client = Client::new(MockService::new());
    let mut flow = client.funding_flow();

    let first = flow.start(&visa_request()).await.unwrap();
    let second = flow.start(&visa_request()).await.unwrap();
    assert_ne!(first, second);
    assert_eq!(flow.state(), FundingState::Started { reference: second });

    // The superseded reference no longer verifies
    let err = flow.verify(first, "123456").await.unwrap_err();
    assert!(matches!(err, Error::ReferenceMismatch { .. }));
}
