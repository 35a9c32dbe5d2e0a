//! Atomic id sequences.
//!
//! Transaction and reservation ids are drawn from sequences owned by the
//! store. A sequence only ever moves forward, so ids are never reused.

use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing counter.
///
/// `next` is a single atomic read-modify-write, so concurrent callers never
/// observe the same value.
#[derive(Debug, Default)]
pub struct Sequence {
    last: AtomicU64,
}

impl Sequence {
    /// Create a sequence whose first value is 1.
    pub fn new() -> Self {
        Self::starting_after(0)
    }

    /// Create a sequence whose first value is `floor + 1`.
    pub fn starting_after(floor: u64) -> Self {
        Self {
            last: AtomicU64::new(floor),
        }
    }

    /// Advance the sequence and return the new value.
    pub fn next(&self) -> u64 {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The most recently issued value (or the floor if none was issued).
    pub fn last(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }
}

impl Clone for Sequence {
    fn clone(&self) -> Self {
        Self::starting_after(self.last())
    }
}
