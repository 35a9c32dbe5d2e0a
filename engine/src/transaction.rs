//! Borrowing transactions.

use crate::{store::Entity, BookId, MemberId, Timestamp, TransactionId};
use serde::{Deserialize, Serialize};

/// Lifecycle of a transaction. `Returned` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Active,
    Returned,
}

/// A single borrow of one book by one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub member_id: MemberId,
    pub book_id: BookId,
    pub borrowed_at: Timestamp,
    pub returned_at: Option<Timestamp>,
    pub status: TransactionStatus,
}

impl Transaction {
    /// Open an active transaction.
    pub fn new(
        transaction_id: TransactionId,
        member_id: MemberId,
        book_id: BookId,
        borrowed_at: Timestamp,
    ) -> Self {
        Self {
            transaction_id,
            member_id,
            book_id,
            borrowed_at,
            returned_at: None,
            status: TransactionStatus::Active,
        }
    }

    /// Check if the book is still out.
    pub fn is_active(&self) -> bool {
        self.status == TransactionStatus::Active
    }

    /// Close the transaction. Returned transactions are left untouched.
    pub(crate) fn mark_returned(&mut self, at: Timestamp) {
        if self.is_active() {
            self.returned_at = Some(at);
            self.status = TransactionStatus::Returned;
        }
    }
}

impl Entity for Transaction {
    type Key = TransactionId;

    fn key(&self) -> TransactionId {
        self.transaction_id
    }
}
