//! # Stacks Engine
//!
//! The lending and reservation core of the Stacks library service.
//!
//! This crate holds every rule about books, members, loans and reservations.
//! It keeps all state in memory and never performs IO; the caller supplies
//! the current time, so the same calls always produce the same results.
//!
//! ## Design Principles
//!
//! - **No IO**: no files, network, clocks or logging
//! - **Deterministic**: `now` is an argument, ids come from store-owned sequences
//! - **Snapshots out**: reads return owned values, never references into the store
//! - **Typed errors**: every failure is an [`Error`] variant with an [`ErrorKind`]
//!
//! ## Core Concepts
//!
//! ### Store
//!
//! The [`Store`] owns one [`Table`] per entity kind (books, members,
//! transactions, reservations) and the atomic [`Sequence`]s that hand out
//! transaction and reservation ids.
//!
//! ### Loans
//!
//! Borrowing opens a [`Transaction`] and flips `Member::has_borrowed` and
//! `Book::is_available` together. A member holds at most one book and a
//! book has at most one borrower.
//!
//! ### Reservations
//!
//! A reservation on an available book is confirmed; on a lent book it joins
//! the queue. Requests are validated as a whole and a refusal lists every
//! problem found.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use stacks_engine::{Library, LoanRequest, NewMember, Policy, ReservationRequest, ReservationStatus};
//!
//! let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
//! let mut library = Library::with_sample_catalog(Policy::default());
//!
//! library.create_member(NewMember::new(1, "Ada", 36)).unwrap();
//! library.create_member(NewMember::new(2, "Grace", 45)).unwrap();
//!
//! let loan = library.borrow(LoanRequest::new(1, 101), now).unwrap();
//! assert_eq!(loan.transaction_id, 501);
//!
//! let reservation = library
//!     .create_reservation(ReservationRequest::new(2, 101), now)
//!     .unwrap();
//! assert_eq!(reservation.reservation_status, ReservationStatus::Queued);
//! assert_eq!(reservation.queue_position, 1);
//! ```

pub mod book;
pub mod catalog;
pub mod error;
pub mod lending;
pub mod library;
pub mod member;
pub mod reservation;
pub mod search;
pub mod sequence;
pub mod store;
pub mod transaction;

// Re-export main types at crate root
pub use book::{Book, BookView, Deleted, NewBook};
pub use error::{Error, ErrorKind, Result};
pub use lending::{Loan, LoanRequest, OverdueLoan};
pub use library::{Library, Policy};
pub use member::{HistoryEntry, Member, MemberHistory, MemberSummary, MemberUpdate, NewMember};
pub use reservation::{
    PaymentInfo, Reservation, ReservationRejection, ReservationRequest, ReservationStatus,
    ReservationType, ValidationIssue,
};
pub use search::{BookHit, Pagination, QueryRejection, SearchAnalytics, SearchQuery, SearchResults};
pub use sequence::Sequence;
pub use store::{Entity, Store, Table};
pub use transaction::{Transaction, TransactionStatus};

/// Type aliases for clarity
pub type BookId = i64;
pub type MemberId = i64;
pub type TransactionId = u64;
pub type ReservationId = String;
pub type Timestamp = chrono::DateTime<chrono::Utc>;
