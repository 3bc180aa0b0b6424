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

//! # the query cache
//!
//! ## Background
//!
//! Every view in the app reads backend state through this cache, and every mutation that changes
//! backend state tells it which keys are now suspect. The fashionable shape of this idea
//! (framework query hooks dispatching over a shared cache by stringly-typed key) buys convenience
//! at the price of making the consistency rules invisible; here the cache is an explicit object
//! with a typed key space & the rules written down in one place ([Mutation::invalidates]).
//!
//! The contract per key:
//!
//! - `read` returns the cached value *immediately* if present & not invalidated; otherwise it
//!   fetches through the remote gateway. Concurrent reads of a key mid-fetch share the single
//!   in-flight fetch-- never two outbound calls for the same key.
//! - `invalidate` marks the key stale & returns; no eager re-fetch, no blocking. The next read
//!   does the work.
//!
//! ## The invalidation table
//!
//! This is the core correctness contract of the layer:
//!
//! | mutation | invalidates |
//! |---|---|
//! | create payment | `payments[*]` |
//! | update payment status | `payments[*]`, `payment[id]` |
//! | internal transfer (by principal or phone) | `walletBalance`, `transactionHistory` |
//! | verify add-money OTP | `walletBalance`, `transactionHistory` |
//! | process cash-out | `walletBalance`, `transactionHistory` |
//! | create/update/delete connector | `connectors[*]` (update also `connector[id]`) |
//! | save personal account | `currentPersonalAccount` |
//!
//! Invalidation happens-after the mutation's success response, never speculatively before it--
//! that wiring lives in [crate::client::Client] and [crate::funding::FundingFlow].

use futures::{
    FutureExt,
    future::{LocalBoxFuture, Shared},
};
use tracing::debug;

use std::{
    any::Any,
    cell::{Cell, RefCell},
    collections::HashMap,
    future::Future,
    rc::Rc,
};

use shanju_shared::{ConnectionId, PaymentId, Principal};

use crate::error::Error;

type StdResult<T, E> = std::result::Result<T, E>;

/// What `read` hands back: the value (or error) is shared among every reader that joined the
/// fetch, hence the `Rc`s
pub type QueryResult<T> = StdResult<Rc<T>, Rc<Error>>;

type Fetched = StdResult<Rc<dyn Any>, Rc<Error>>;
type SharedFetch = Shared<LocalBoxFuture<'static, Fetched>>;

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                            the keys                                            //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A logical cache key: entity plus scoping parameter
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum QueryKey {
    WalletBalance,
    TransactionHistory,
    /// The caller's payments, scoped by principal
    Payments(Principal),
    Payment(PaymentId),
    Connectors,
    Connector(ConnectionId),
    CurrentPersonalAccount,
    UserProfile,
    CallerRole,
    IsAdmin,
    AdminAllPayments,
    AdminAllUsers,
    AdminUserAccount(Principal),
}

/// The entity axis of [QueryKey], for `entity[*]`-style invalidation
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyClass {
    WalletBalance,
    TransactionHistory,
    Payments,
    Payment,
    Connectors,
    Connector,
    CurrentPersonalAccount,
    UserProfile,
    CallerRole,
    IsAdmin,
    AdminAllPayments,
    AdminAllUsers,
    AdminUserAccount,
}

impl QueryKey {
    pub fn class(&self) -> KeyClass {
        match self {
            QueryKey::WalletBalance => KeyClass::WalletBalance,
            QueryKey::TransactionHistory => KeyClass::TransactionHistory,
            QueryKey::Payments(_) => KeyClass::Payments,
            QueryKey::Payment(_) => KeyClass::Payment,
            QueryKey::Connectors => KeyClass::Connectors,
            QueryKey::Connector(_) => KeyClass::Connector,
            QueryKey::CurrentPersonalAccount => KeyClass::CurrentPersonalAccount,
            QueryKey::UserProfile => KeyClass::UserProfile,
            QueryKey::CallerRole => KeyClass::CallerRole,
            QueryKey::IsAdmin => KeyClass::IsAdmin,
            QueryKey::AdminAllPayments => KeyClass::AdminAllPayments,
            QueryKey::AdminAllUsers => KeyClass::AdminAllUsers,
            QueryKey::AdminUserAccount(_) => KeyClass::AdminUserAccount,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                           mutations                                            //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// The mutations the backend supports, as far as cache consistency is concerned
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Mutation {
    CreatePayment,
    UpdatePaymentStatus(PaymentId),
    /// By principal or by phone; the cache doesn't care which
    InternalTransfer,
    VerifyAddMoney,
    ProcessCashOut,
    CreateConnector,
    UpdateConnector(ConnectionId),
    DeleteConnector,
    SavePersonalAccount,
}

/// One row's worth of invalidation: a whole entity class, or one exact key
#[derive(Clone, Debug, PartialEq)]
pub enum Target {
    Class(KeyClass),
    Key(QueryKey),
}

impl Mutation {
    /// The table from the module docs, in executable form
    pub fn invalidates(&self) -> Vec<Target> {
        use Target::*;
        match self {
            Mutation::CreatePayment => vec![Class(KeyClass::Payments)],
            Mutation::UpdatePaymentStatus(id) => {
                vec![Class(KeyClass::Payments), Key(QueryKey::Payment(*id))]
            }
            Mutation::InternalTransfer | Mutation::VerifyAddMoney | Mutation::ProcessCashOut => {
                vec![
                    Class(KeyClass::WalletBalance),
                    Class(KeyClass::TransactionHistory),
                ]
            }
            Mutation::CreateConnector | Mutation::DeleteConnector => {
                vec![Class(KeyClass::Connectors)]
            }
            Mutation::UpdateConnector(id) => {
                vec![Class(KeyClass::Connectors), Key(QueryKey::Connector(*id))]
            }
            Mutation::SavePersonalAccount => vec![Class(KeyClass::CurrentPersonalAccount)],
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                           QueryCache                                           //
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Default)]
struct Entry {
    // Type-erased so one map can hold every entity; each key always carries the same `T`, so the
    // downcasts in `read` can't miss
    value: Option<Rc<dyn Any>>,
    stale: bool,
    // (fetch id, the fetch): the id lets late awakers tell whether the fetch they joined is still
    // the one on record (an invalidation mid-flight clears it)
    inflight: Option<(u64, SharedFetch)>,
}

/// The keyed read-through cache; one per application, UI thread only
#[derive(Default)]
pub struct QueryCache {
    entries: RefCell<HashMap<QueryKey, Entry>>,
    fetches: Cell<u64>,
}

impl QueryCache {
    pub fn new() -> QueryCache {
        QueryCache::default()
    }

    /// Read `key`, fetching through `fetch` on absence or staleness
    ///
    /// `fetch` is only invoked to *construct* the future (synchronously; it must not re-enter the
    /// cache while doing so); the future itself runs un-borrowed. Readers that find a fetch
    /// already in flight join it rather than issuing their own.
    pub async fn read<T, F, Fut>(&self, key: QueryKey, fetch: F) -> QueryResult<T>
    where
        T: 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = crate::error::Result<T>> + 'static,
    {
        let (fid, shared) = {
            let mut entries = self.entries.borrow_mut();
            let entry = entries.entry(key.clone()).or_default();
            if let Some((fid, shared)) = entry.inflight.as_ref() {
                debug!("Sharing the in-flight fetch for {key:?}");
                (*fid, shared.clone())
            } else {
                if !entry.stale {
                    if let Some(value) = entry.value.as_ref() {
                        return Ok(Rc::clone(value)
                            .downcast::<T>()
                            .ok()
                            .unwrap(/* one T per key, always */));
                    }
                }
                let fid = self.fetches.get();
                self.fetches.set(fid + 1);
                debug!("Fetching {key:?} (fetch {fid})");
                let shared = fetch()
                    .map(|res| res.map(|v| Rc::new(v) as Rc<dyn Any>).map_err(Rc::new))
                    .boxed_local()
                    .shared();
                entry.inflight = Some((fid, shared.clone()));
                (fid, shared)
            }
        };

        let outcome = shared.await; // suspension point; the map is not borrowed across it

        // Write-back. Any of the sharers may get here first; whoever does retires the fetch. If
        // an invalidation landed mid-flight the fetch is no longer on record & the result is
        // *not* stored-- it may predate the mutation that invalidated us.
        {
            let mut entries = self.entries.borrow_mut();
            if let Some(entry) = entries.get_mut(&key) {
                if matches!(entry.inflight.as_ref(), Some((cur, _)) if *cur == fid) {
                    entry.inflight = None;
                    if let Ok(value) = outcome.as_ref() {
                        entry.value = Some(Rc::clone(value));
                        entry.stale = false;
                    }
                }
            }
        }

        outcome.map(|v| v.downcast::<T>().ok().unwrap(/* one T per key, always */))
    }

    /// Mark `key` stale; the next read re-fetches. Does not block, does not eagerly re-fetch.
    pub fn invalidate(&self, key: &QueryKey) {
        if let Some(entry) = self.entries.borrow_mut().get_mut(key) {
            entry.stale = true;
            entry.inflight = None;
        }
    }

    /// Mark every key of `class` stale (`entity[*]` invalidation)
    pub fn invalidate_class(&self, class: KeyClass) {
        for (key, entry) in self.entries.borrow_mut().iter_mut() {
            if key.class() == class {
                entry.stale = true;
                entry.inflight = None;
            }
        }
    }

    /// Apply the invalidation table for a successfully-completed `mutation`
    pub fn apply(&self, mutation: &Mutation) {
        debug!("Invalidating for {mutation:?}");
        for target in mutation.invalidates() {
            match target {
                Target::Class(class) => self.invalidate_class(class),
                Target::Key(key) => self.invalidate(&key),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::BackendSnafu;

    use futures::executor::block_on;

    use std::{
        pin::Pin,
        task::{Context, Poll},
    };

    // Ready on the second poll; forces both sides of a `join!` to get going before either
    // read's fetch resolves
    struct YieldOnce(bool);

    impl Future for YieldOnce {
        type Output = ();
        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    #[test]
    fn read_through_and_cache() {
        block_on(async {
            let cache = QueryCache::new();
            let calls = Cell::new(0usize);
            for _ in 0..3 {
                let value = cache
                    .read(QueryKey::WalletBalance, || {
                        calls.set(calls.get() + 1);
                        async { Ok(42u64) }
                    })
                    .await
                    .unwrap();
                assert_eq!(*value, 42);
            }
            // Three reads, one fetch
            assert_eq!(calls.get(), 1);
        });
    }

    #[test]
    fn invalidate_forces_refetch() {
        block_on(async {
            let cache = QueryCache::new();
            let calls = Cell::new(0usize);
            let read = |val: u64| {
                let calls = &calls;
                cache.read(QueryKey::WalletBalance, move || {
                    calls.set(calls.get() + 1);
                    async move { Ok(val) }
                })
            };
            assert_eq!(*read(1).await.unwrap(), 1);
            assert_eq!(*read(2).await.unwrap(), 1); // still cached
            cache.invalidate(&QueryKey::WalletBalance);
            assert_eq!(*read(3).await.unwrap(), 3); // exactly one fresh fetch
            assert_eq!(calls.get(), 2);
        });
    }

    #[test]
    fn failed_fetch_not_cached() {
        block_on(async {
            let cache = QueryCache::new();
            let calls = Cell::new(0usize);
            let err = cache
                .read::<u64, _, _>(QueryKey::WalletBalance, || {
                    calls.set(calls.get() + 1);
                    async { BackendSnafu { message: "boom" }.fail() }
                })
                .await;
            assert!(err.is_err());
            let value = cache
                .read(QueryKey::WalletBalance, || {
                    calls.set(calls.get() + 1);
                    async { Ok(7u64) }
                })
                .await
                .unwrap();
            assert_eq!(*value, 7);
            assert_eq!(calls.get(), 2);
        });
    }

    #[test]
    fn concurrent_reads_share_one_fetch() {
        block_on(async {
            let cache = QueryCache::new();
            let calls = Cell::new(0usize);
            let read = || {
                cache.read(QueryKey::TransactionHistory, || {
                    calls.set(calls.get() + 1);
                    async {
                        YieldOnce(false).await;
                        Ok("history".to_string())
                    }
                })
            };
            let (a, b) = futures::join!(read(), read());
            assert_eq!(*a.unwrap(), "history");
            assert_eq!(*b.unwrap(), "history");
            assert_eq!(calls.get(), 1);
        });
    }

    #[test]
    fn class_invalidation_spares_other_entities() {
        block_on(async {
            let cache = QueryCache::new();
            let calls = Cell::new(0usize);
            let read = |key: QueryKey| {
                cache.read(key, || {
                    calls.set(calls.get() + 1);
                    async { Ok(0u64) }
                })
            };
            read(QueryKey::Payment(1)).await.unwrap();
            read(QueryKey::Payment(2)).await.unwrap();
            read(QueryKey::Connectors).await.unwrap();
            assert_eq!(calls.get(), 3);
            cache.invalidate_class(KeyClass::Payment);
            read(QueryKey::Payment(1)).await.unwrap();
            read(QueryKey::Payment(2)).await.unwrap();
            read(QueryKey::Connectors).await.unwrap(); // untouched
            assert_eq!(calls.get(), 5);
        });
    }

    #[test]
    fn the_table() {
        use Target::*;
        // The §4.3 contract, row by row
        assert_eq!(
            Mutation::CreatePayment.invalidates(),
            vec![Class(KeyClass::Payments)]
        );
        assert_eq!(
            Mutation::UpdatePaymentStatus(17).invalidates(),
            vec![Class(KeyClass::Payments), Key(QueryKey::Payment(17))]
        );
        for m in [
            Mutation::InternalTransfer,
            Mutation::VerifyAddMoney,
            Mutation::ProcessCashOut,
        ] {
            assert_eq!(
                m.invalidates(),
                vec![
                    Class(KeyClass::WalletBalance),
                    Class(KeyClass::TransactionHistory)
                ]
            );
        }
        assert_eq!(
            Mutation::CreateConnector.invalidates(),
            vec![Class(KeyClass::Connectors)]
        );
        assert_eq!(
            Mutation::UpdateConnector(3).invalidates(),
            vec![Class(KeyClass::Connectors), Key(QueryKey::Connector(3))]
        );
        assert_eq!(
            Mutation::DeleteConnector.invalidates(),
            vec![Class(KeyClass::Connectors)]
        );
        assert_eq!(
            Mutation::SavePersonalAccount.invalidates(),
            vec![Class(KeyClass::CurrentPersonalAccount)]
        );
    }
}
