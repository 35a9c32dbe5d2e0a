//! Borrow and return handlers.

use super::SharedLibrary;
use crate::error::Result;
use chrono::Utc;
use serde::Serialize;
use stacks_engine::{Loan, LoanRequest, OverdueLoan, Transaction};

/// Response for the list of open loans.
#[derive(Debug, Serialize)]
pub struct BorrowedResponse {
    pub borrowed_books: Vec<Loan>,
}

/// Response for the list of overdue loans.
#[derive(Debug, Serialize)]
pub struct OverdueResponse {
    pub overdue_books: Vec<OverdueLoan>,
}

pub async fn handle_borrow(library: &SharedLibrary, request: LoanRequest) -> Result<Transaction> {
    let transaction = library.write().await.borrow(request, Utc::now())?;
    tracing::info!(
        transaction_id = transaction.transaction_id,
        member_id = transaction.member_id,
        book_id = transaction.book_id,
        "book borrowed"
    );
    Ok(transaction)
}

pub async fn handle_return(library: &SharedLibrary, request: LoanRequest) -> Result<Transaction> {
    let transaction = library.write().await.return_book(request, Utc::now())?;
    tracing::info!(
        transaction_id = transaction.transaction_id,
        member_id = transaction.member_id,
        book_id = transaction.book_id,
        "book returned"
    );
    Ok(transaction)
}

pub async fn handle_borrowed(library: &SharedLibrary) -> Result<BorrowedResponse> {
    Ok(BorrowedResponse {
        borrowed_books: library.read().await.borrowed()?,
    })
}

/// Open loans past their due date as of now.
pub async fn handle_overdue(library: &SharedLibrary) -> Result<OverdueResponse> {
    Ok(OverdueResponse {
        overdue_books: library.read().await.overdue(Utc::now())?,
    })
}
