//! Book handlers.

use super::SharedLibrary;
use crate::error::Result;
use stacks_engine::{BookId, BookView, Deleted, NewBook, SearchQuery, SearchResults};
use std::time::Instant;

pub async fn handle_add_book(library: &SharedLibrary, request: NewBook) -> Result<BookView> {
    let book = library.write().await.add_book(request)?;
    tracing::info!(book_id = book.book_id, title = %book.title, "book added");
    Ok(book)
}

pub async fn handle_get_book(library: &SharedLibrary, book_id: BookId) -> Result<BookView> {
    Ok(library.read().await.book(book_id)?)
}

pub async fn handle_delete_book(library: &SharedLibrary, book_id: BookId) -> Result<Deleted> {
    let deleted = library.write().await.delete_book(book_id)?;
    tracing::info!(book_id, "book deleted");
    Ok(deleted)
}

/// Run a catalog search, filling in the elapsed time when analytics were
/// requested.
pub async fn handle_search_books(
    library: &SharedLibrary,
    query: SearchQuery,
) -> Result<SearchResults> {
    let started = Instant::now();
    let mut results = library.read().await.search_books(&query)?;

    if let Some(analytics) = results.analytics.as_mut() {
        let elapsed = started.elapsed().as_millis();
        analytics.search_time_ms = Some(u64::try_from(elapsed).unwrap_or(u64::MAX));
    }

    tracing::debug!(
        hits = results.books.len(),
        total = results.pagination.total_results,
        "search completed"
    );
    Ok(results)
}
