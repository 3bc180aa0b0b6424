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

//! # invalidation-completeness tests
//!
//! For every mutation in the table, after the mutation succeeds: one fresh fetch per listed key
//! on next read, *and* no fetch at all for keys the table doesn't list. The per-operation call
//! counters in [MockService] are the witness-- a read that was served from cache never shows up
//! in them.

use shanju_client::Client;
use shanju_shared::{
    api::{
        CashOutRequest, ConnectionReq, CreatePaymentByPhoneReq, CreatePaymentReq,
        InternalTransferByPhoneRequest, InternalTransferRequest,
    },
    entities::{CashOutProvider, Currency, PaymentStatus, PersonalAccount, PlatformType},
};
use shanju_test::{MockService, caller, payee, phone};

fn connection_req(name: &str) -> ConnectionReq {
    ConnectionReq {
        name: name.to_string(),
        platform_type: PlatformType::Shopify,
        api_key: "key".to_string(),
        api_secret: "secret".to_string(),
    }
}

/// Read every key the tests below care about, exactly once each, so subsequent reads are
/// cache-or-refetch decisions
async fn prime(client: &Client<MockService>, payment: u64, connection: u64) {
    client.wallet_balance().await.unwrap();
    client.transaction_history().await.unwrap();
    client.payments_for(&caller()).await.unwrap();
    client.payment(payment).await.unwrap();
    client.connectors().await.unwrap();
    client.connector(connection).await.unwrap();
    client.personal_account().await.unwrap();
}

/// A client over a mock with one payment, one connection, a USD balance & a saved account
async fn fixture() -> (Client<MockService>, u64, u64) {
    let client = Client::new(MockService::new().with_balance(Currency::Usd, 100_000));
    let payment = client
        .create_payment(&CreatePaymentReq {
            payee: payee(),
            amount: 1_000,
            currency: "USD".to_string(),
            description: "fixture".to_string(),
        })
        .await
        .unwrap();
    let connection = client.create_connection(&connection_req("fixture")).await.unwrap();
    prime(&client, payment, connection).await;
    (client, payment, connection)
}

#[tokio::test]
async fn create_payment_invalidates_payment_lists() {
    let (client, payment, connection) = fixture().await;
    let mock = client.service();
    let lists_before = mock.calls("listPaymentsForUser");

    client
        .create_payment(&CreatePaymentReq {
            payee: payee(),
            amount: 2_000,
            currency: "USD".to_string(),
            description: "again".to_string(),
        })
        .await
        .unwrap();

    // payments[*] refetches...
    client.payments_for(&caller()).await.unwrap();
    assert_eq!(mock.calls("listPaymentsForUser"), lists_before + 1);
    // ...and nothing else does
    prime(&client, payment, connection).await;
    assert_eq!(mock.calls("walletBalance"), 1);
    assert_eq!(mock.calls("getPayment"), 1);
    assert_eq!(mock.calls("connectors"), 1);
}

#[tokio::test]
async fn update_payment_status_invalidates_lists_and_the_payment() {
    let (client, payment, connection) = fixture().await;
    let mock = client.service();

    client
        .update_payment_status(payment, PaymentStatus::Completed)
        .await
        .unwrap();

    prime(&client, payment, connection).await;
    assert_eq!(mock.calls("listPaymentsForUser"), 2);
    assert_eq!(mock.calls("getPayment"), 2);
    // The fresh read reflects the new status
    assert_eq!(
        client.payment(payment).await.unwrap().status,
        PaymentStatus::Completed
    );
    assert_eq!(mock.calls("walletBalance"), 1);
    assert_eq!(mock.calls("connectors"), 1);
    assert_eq!(mock.calls("getConnection"), 1);
}

#[tokio::test]
async fn transfers_invalidate_wallet_and_history() {
    let (client, payment, connection) = fixture().await;
    let mock = client.service();

    client
        .transfer(&InternalTransferRequest {
            recipient: payee(),
            amount: 2_500,
            currency: Currency::Usd,
            reference: None,
        })
        .await
        .unwrap();

    prime(&client, payment, connection).await;
    assert_eq!(mock.calls("walletBalance"), 2);
    assert_eq!(mock.calls("transactionHistory"), 2);
    assert_eq!(mock.calls("listPaymentsForUser"), 1);
    assert_eq!(mock.calls("connectors"), 1);
    // And the fresh balance shows the debit
    assert_eq!(mock.balance_of(&Currency::Usd), 97_500);
}

#[tokio::test]
async fn transfers_by_phone_invalidate_the_same_keys() {
    let (client, payment, connection) = fixture().await;
    let mock = client.service();

    client
        .transfer_by_phone(&InternalTransferByPhoneRequest {
            phone_number: phone(),
            amount: 1_000,
            currency: Currency::Usd,
            reference: None,
        })
        .await
        .unwrap();

    prime(&client, payment, connection).await;
    assert_eq!(mock.calls("walletBalance"), 2);
    assert_eq!(mock.calls("transactionHistory"), 2);
    assert_eq!(mock.calls("listPaymentsForUser"), 1);
}

#[tokio::test]
async fn cash_out_invalidates_wallet_and_history() {
    let (client, payment, connection) = fixture().await;
    let mock = client.service();

    client
        .cash_out(&CashOutRequest {
            amount: 5_000,
            currency: Currency::Usd,
            provider: CashOutProvider::Bkash,
            destination: "01712345678".to_string(),
            reference: None,
        })
        .await
        .unwrap();

    prime(&client, payment, connection).await;
    assert_eq!(mock.calls("walletBalance"), 2);
    assert_eq!(mock.calls("transactionHistory"), 2);
    assert_eq!(mock.calls("currentPersonalAccount"), 1);
}

#[tokio::test]
async fn connector_mutations_invalidate_connector_keys() {
    let (client, payment, connection) = fixture().await;
    let mock = client.service();

    // create: connectors[*] only
    client.create_connection(&connection_req("second")).await.unwrap();
    prime(&client, payment, connection).await;
    assert_eq!(mock.calls("connectors"), 2);
    assert_eq!(mock.calls("getConnection"), 1);

    // update: connectors[*] plus connector[id]
    client
        .update_connection(connection, &connection_req("renamed"))
        .await
        .unwrap();
    prime(&client, payment, connection).await;
    assert_eq!(mock.calls("connectors"), 3);
    assert_eq!(mock.calls("getConnection"), 2);
    assert_eq!(client.connector(connection).await.unwrap().name, "renamed");

    // delete: connectors[*] only
    client.delete_connection(connection + 1_000).await.unwrap();
    prime(&client, payment, connection).await;
    assert_eq!(mock.calls("connectors"), 4);
    assert_eq!(mock.calls("getConnection"), 2);

    // None of the above touched the wallet
    assert_eq!(mock.calls("walletBalance"), 1);
}

#[tokio::test]
async fn saving_the_personal_account_invalidates_it() {
    let (client, payment, connection) = fixture().await;
    let mock = client.service();

    client
        .save_personal_account(&PersonalAccount {
            full_name: "Jane Doe".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    prime(&client, payment, connection).await;
    assert_eq!(mock.calls("currentPersonalAccount"), 2);
    let account = (*client.personal_account().await.unwrap()).clone();
    assert_eq!(
        account.map(|account| account.full_name),
        Some("Jane Doe".to_string())
    );
    assert_eq!(mock.calls("walletBalance"), 1);
    assert_eq!(mock.calls("listPaymentsForUser"), 1);
}

#[tokio::test]
async fn failed_mutations_invalidate_nothing() {
    let (client, payment, connection) = fixture().await;
    let mock = client.service();

    mock.fail_next("Insufficient funds: balance is 0");
    let err = client
        .transfer(&InternalTransferRequest {
            recipient: payee(),
            amount: 1,
            currency: Currency::Usd,
            reference: None,
        })
        .await
        .unwrap_err();
    assert_eq!(
        err.user_message("transfer"),
        "Insufficient funds for this transfer"
    );

    // Invalidation happens-after success, so a failure leaves every key warm
    prime(&client, payment, connection).await;
    assert_eq!(mock.calls("walletBalance"), 1);
    assert_eq!(mock.calls("transactionHistory"), 1);
}
