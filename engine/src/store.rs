//! Store - the in-memory state container.
//!
//! The Store owns one table per entity kind plus the id sequences. Tables are
//! ordered by key, so listing a table always yields the same order for the
//! same contents.

use crate::{
    Book, BookId, Member, MemberId, Reservation, ReservationId, Sequence, Transaction,
    TransactionId,
};
use std::collections::BTreeMap;

/// First transaction id is one above this floor.
pub const TRANSACTION_ID_FLOOR: TransactionId = 500;

/// A record that can live in a [`Table`].
pub trait Entity: Clone {
    /// Key type the record is stored under.
    type Key: Ord + Clone;

    /// The record's key.
    fn key(&self) -> Self::Key;
}

/// A keyed table of records.
#[derive(Debug, Clone)]
pub struct Table<E: Entity> {
    records: BTreeMap<E::Key, E>,
}

impl<E: Entity> Default for Table<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Table<E> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    /// Get a record by key.
    pub fn get(&self, key: &E::Key) -> Option<&E> {
        self.records.get(key)
    }

    /// Get a mutable record by key.
    pub(crate) fn get_mut(&mut self, key: &E::Key) -> Option<&mut E> {
        self.records.get_mut(key)
    }

    /// Insert a record, replacing any record under the same key.
    pub fn insert(&mut self, record: E) -> Option<E> {
        self.records.insert(record.key(), record)
    }

    /// Remove a record by key.
    pub fn remove(&mut self, key: &E::Key) -> Option<E> {
        self.records.remove(key)
    }

    /// Check if a record exists.
    pub fn contains(&self, key: &E::Key) -> bool {
        self.records.contains_key(key)
    }

    /// All records in key order.
    pub fn values(&self) -> impl Iterator<Item = &E> {
        self.records.values()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The main store holding all state.
#[derive(Debug, Clone)]
pub struct Store {
    pub books: Table<Book>,
    pub members: Table<Member>,
    pub transactions: Table<Transaction>,
    pub reservations: Table<Reservation>,
    transaction_ids: Sequence,
    reservation_ids: Sequence,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            books: Table::new(),
            members: Table::new(),
            transactions: Table::new(),
            reservations: Table::new(),
            transaction_ids: Sequence::starting_after(TRANSACTION_ID_FLOOR),
            reservation_ids: Sequence::new(),
        }
    }

    /// Allocate the next transaction id.
    pub fn next_transaction_id(&self) -> TransactionId {
        self.transaction_ids.next()
    }

    /// Allocate the next reservation sequence number.
    pub fn next_reservation_seq(&self) -> u64 {
        self.reservation_ids.next()
    }

    /// The active transaction for a member/book pair, if any.
    pub fn active_transaction(&self, member_id: MemberId, book_id: BookId) -> Option<&Transaction> {
        self.transactions
            .values()
            .find(|t| t.member_id == member_id && t.book_id == book_id && t.is_active())
    }

    /// The active transaction holding a book, if any.
    pub fn active_transaction_for_book(&self, book_id: BookId) -> Option<&Transaction> {
        self.transactions
            .values()
            .find(|t| t.book_id == book_id && t.is_active())
    }

    /// Every transaction (active or returned) for a book.
    pub fn borrowing_count(&self, book_id: BookId) -> usize {
        self.transactions
            .values()
            .filter(|t| t.book_id == book_id)
            .count()
    }

    /// Every transaction (active or returned) for a member.
    pub fn member_transactions(&self, member_id: MemberId) -> impl Iterator<Item = &Transaction> {
        self.transactions
            .values()
            .filter(move |t| t.member_id == member_id)
    }

    /// Reservations for a book that still hold a place in its queue.
    pub fn queue_depth(&self, book_id: BookId) -> usize {
        self.reservations
            .values()
            .filter(|r| r.book_id == book_id && !r.is_expired())
            .count()
    }

    /// Confirmed reservations held by a member.
    pub fn confirmed_reservations(&self, member_id: MemberId) -> usize {
        self.reservations
            .values()
            .filter(|r| r.member_id == member_id && r.is_confirmed())
            .count()
    }

    /// Look up a reservation by id.
    pub fn reservation(&self, id: &ReservationId) -> Option<&Reservation> {
        self.reservations.get(id)
    }
}
