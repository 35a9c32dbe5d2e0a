//! Book records and the book lifecycle.

use crate::{error::Result, store::Entity, BookId, Error, Library};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Category given to books added through the API.
pub const DEFAULT_CATEGORY: &str = "General";

/// A book in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    /// False while exactly one active transaction holds the book
    pub is_available: bool,
    pub category: String,
    pub published_date: Option<NaiveDate>,
    pub rating: f64,
}

impl Book {
    /// Create an available book with catalog defaults.
    pub fn new(
        book_id: BookId,
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: Option<String>,
    ) -> Self {
        Self {
            book_id,
            title: title.into(),
            author: author.into(),
            isbn,
            is_available: true,
            category: DEFAULT_CATEGORY.to_string(),
            published_date: None,
            rating: 0.0,
        }
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the publication date.
    pub fn with_published_date(mut self, date: NaiveDate) -> Self {
        self.published_date = Some(date);
        self
    }

    /// Set the rating.
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    /// Compact projection returned by simple book endpoints.
    pub fn view(&self) -> BookView {
        BookView {
            book_id: self.book_id,
            title: self.title.clone(),
            author: self.author.clone(),
            isbn: self.isbn.clone(),
            is_available: self.is_available,
        }
    }
}

impl Entity for Book {
    type Key = BookId;

    fn key(&self) -> BookId {
        self.book_id
    }
}

/// Compact projection of a [`Book`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookView {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub is_available: bool,
}

/// Request body for adding a book.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBook {
    pub book_id: Option<BookId>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
}

/// Confirmation returned by delete endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deleted {
    pub message: String,
}

pub(crate) fn book_not_found(book_id: BookId) -> Error {
    Error::NotFound(format!("book with id: {book_id} was not found"))
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl Library {
    /// Add a book to the catalog.
    pub fn add_book(&mut self, request: NewBook) -> Result<BookView> {
        let (Some(book_id), Some(title), Some(author)) = (
            request.book_id.filter(|id| *id != 0),
            required(request.title),
            required(request.author),
        ) else {
            return Err(Error::Validation(
                "Missing required fields: book_id, title, author".to_string(),
            ));
        };

        if self.store.books.contains(&book_id) {
            return Err(Error::Duplicate(format!(
                "book with id: {book_id} already exists"
            )));
        }

        let book = Book::new(book_id, title, author, request.isbn);
        let view = book.view();
        self.store.books.insert(book);
        Ok(view)
    }

    /// Look up a book.
    pub fn book(&self, book_id: BookId) -> Result<BookView> {
        self.store
            .books
            .get(&book_id)
            .map(Book::view)
            .ok_or_else(|| book_not_found(book_id))
    }

    /// Remove a book that is not currently borrowed.
    pub fn delete_book(&mut self, book_id: BookId) -> Result<Deleted> {
        let book = self
            .store
            .books
            .get(&book_id)
            .ok_or_else(|| book_not_found(book_id))?;

        if !book.is_available {
            return Err(Error::Conflict(format!(
                "cannot delete book with id: {book_id}, book is currently borrowed"
            )));
        }

        self.store.books.remove(&book_id);
        Ok(Deleted {
            message: format!("book with id: {book_id} has been deleted successfully"),
        })
    }
}
