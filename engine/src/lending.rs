//! Borrowing workflow.
//!
//! A borrow touches three records: it opens a transaction and flips the
//! member's `has_borrowed` and the book's `is_available`. A return closes the
//! transaction and flips both flags back. All checks run before the first
//! write, so a rejected request leaves the store exactly as it was.

use crate::{
    book::book_not_found, error::Result, member::member_not_found, BookId, Error, Library,
    MemberId, Timestamp, Transaction, TransactionId,
};
use chrono::Duration;
use serde::{Deserialize, Serialize};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Request body for borrow and return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub member_id: Option<MemberId>,
    pub book_id: Option<BookId>,
}

impl LoanRequest {
    pub fn new(member_id: MemberId, book_id: BookId) -> Self {
        Self {
            member_id: Some(member_id),
            book_id: Some(book_id),
        }
    }

    fn ids(&self) -> Result<(MemberId, BookId)> {
        match (self.member_id, self.book_id) {
            (Some(member_id), Some(book_id)) => Ok((member_id, book_id)),
            _ => Err(Error::Validation(
                "Missing required fields: member_id, book_id".to_string(),
            )),
        }
    }
}

/// An active loan joined with member and book names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub transaction_id: TransactionId,
    pub member_id: MemberId,
    pub member_name: String,
    pub book_id: BookId,
    pub book_title: String,
    pub borrowed_at: Timestamp,
    pub due_date: Timestamp,
}

/// An active loan past its due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdueLoan {
    #[serde(flatten)]
    pub loan: Loan,
    pub days_overdue: i64,
}

/// Whole days between two instants, rounding any partial day up.
pub fn days_between(a: Timestamp, b: Timestamp) -> i64 {
    let millis = (b - a).num_milliseconds().abs();
    (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

impl Library {
    /// Lend a book to a member.
    pub fn borrow(&mut self, request: LoanRequest, now: Timestamp) -> Result<Transaction> {
        let (member_id, book_id) = request.ids()?;

        let member = self
            .store
            .members
            .get(&member_id)
            .ok_or_else(|| member_not_found(member_id))?;
        let book = self
            .store
            .books
            .get(&book_id)
            .ok_or_else(|| book_not_found(book_id))?;

        if member.has_borrowed {
            return Err(Error::Conflict(format!(
                "member with id: {member_id} has already borrowed a book"
            )));
        }
        if !book.is_available {
            return Err(Error::Conflict(format!(
                "book with id: {book_id} is not available"
            )));
        }

        let transaction = Transaction::new(
            self.store.next_transaction_id(),
            member_id,
            book_id,
            now,
        );
        self.store.transactions.insert(transaction.clone());
        self.set_loan_flags(member_id, book_id, true)?;
        Ok(transaction)
    }

    /// Take a book back from the member who holds it.
    pub fn return_book(&mut self, request: LoanRequest, now: Timestamp) -> Result<Transaction> {
        let (member_id, book_id) = request.ids()?;

        let transaction_id = self
            .store
            .active_transaction(member_id, book_id)
            .map(|t| t.transaction_id)
            .ok_or_else(|| {
                Error::Conflict(format!(
                    "member with id: {member_id} has not borrowed book with id: {book_id}"
                ))
            })?;

        let transaction = self
            .store
            .transactions
            .get_mut(&transaction_id)
            .ok_or_else(|| Error::Inconsistent(format!("transaction {transaction_id} vanished")))?;
        transaction.mark_returned(now);
        let transaction = transaction.clone();

        self.set_loan_flags(member_id, book_id, false)?;
        Ok(transaction)
    }

    /// Every active loan with its due date.
    pub fn borrowed(&self) -> Result<Vec<Loan>> {
        self.store
            .transactions
            .values()
            .filter(|t| t.is_active())
            .map(|t| self.loan(t))
            .collect()
    }

    /// Active loans whose due date has passed.
    pub fn overdue(&self, now: Timestamp) -> Result<Vec<OverdueLoan>> {
        Ok(self
            .borrowed()?
            .into_iter()
            .filter(|loan| now > loan.due_date)
            .map(|loan| OverdueLoan {
                days_overdue: days_between(loan.due_date, now),
                loan,
            })
            .collect())
    }

    fn loan(&self, t: &Transaction) -> Result<Loan> {
        let member = self.store.members.get(&t.member_id).ok_or_else(|| {
            Error::Inconsistent(format!(
                "member {} holds transaction {} but is missing",
                t.member_id, t.transaction_id
            ))
        })?;
        let book = self.store.books.get(&t.book_id).ok_or_else(|| {
            Error::Inconsistent(format!(
                "book {} is lent by transaction {} but is missing",
                t.book_id, t.transaction_id
            ))
        })?;

        Ok(Loan {
            transaction_id: t.transaction_id,
            member_id: t.member_id,
            member_name: member.name.clone(),
            book_id: t.book_id,
            book_title: book.title.clone(),
            borrowed_at: t.borrowed_at,
            due_date: t.borrowed_at + Duration::days(self.policy.loan_period_days),
        })
    }

    fn set_loan_flags(&mut self, member_id: MemberId, book_id: BookId, lent: bool) -> Result<()> {
        let member = self
            .store
            .members
            .get_mut(&member_id)
            .ok_or_else(|| Error::Inconsistent(format!("member {member_id} vanished")))?;
        member.has_borrowed = lent;

        let book = self
            .store
            .books
            .get_mut(&book_id)
            .ok_or_else(|| Error::Inconsistent(format!("book {book_id} vanished")))?;
        book.is_available = !lent;
        Ok(())
    }
}
