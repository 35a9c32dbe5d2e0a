//! The library facade.
//!
//! [`Library`] owns the [`Store`] and the [`Policy`]. Every workflow
//! operation is a method on it, spread across the `book`, `member`,
//! `lending`, `reservation` and `search` modules. Reads hand back owned
//! snapshots; the only way to change state is through these methods.

use crate::{catalog, Store};

/// Tunable constants of the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Policy {
    /// Days between borrowing and the due date
    pub loan_period_days: i64,
    /// Confirmed reservations a member may hold at once
    pub reservation_limit: usize,
    /// Days each queued reservation ahead is expected to take
    pub queue_slot_days: i64,
    /// Default reservation lifetime when the request names none
    pub max_wait_days: u32,
    /// Added to the priority score of premium reservations
    pub premium_bonus: f64,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            loan_period_days: 14,
            reservation_limit: 2,
            queue_slot_days: 7,
            max_wait_days: 14,
            premium_bonus: 2.0,
        }
    }
}

/// Entry point for every library operation.
#[derive(Debug, Clone)]
pub struct Library {
    pub(crate) store: Store,
    pub(crate) policy: Policy,
}

impl Default for Library {
    fn default() -> Self {
        Self::new(Policy::default())
    }
}

impl Library {
    /// Create a library over an empty store.
    pub fn new(policy: Policy) -> Self {
        Self::with_store(Store::new(), policy)
    }

    /// Create a library over an existing store.
    pub fn with_store(store: Store, policy: Policy) -> Self {
        Self { store, policy }
    }

    /// Create a library stocked with the sample catalog.
    pub fn with_sample_catalog(policy: Policy) -> Self {
        let mut store = Store::new();
        for book in catalog::sample_books() {
            store.books.insert(book);
        }
        Self::with_store(store, policy)
    }

    /// Read-only view of the underlying store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The constants this library was built with.
    pub fn policy(&self) -> &Policy {
        &self.policy
    }
}
