//! Sample catalog used to seed a fresh library.

use crate::Book;
use chrono::NaiveDate;

fn published(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn seed(
    book_id: i64,
    title: &str,
    author: &str,
    isbn: &str,
    category: &str,
    date: Option<NaiveDate>,
    rating: f64,
) -> Book {
    let book = Book::new(book_id, title, author, Some(isbn.to_string()))
        .with_category(category)
        .with_rating(rating);
    match date {
        Some(date) => book.with_published_date(date),
        None => book,
    }
}

/// The three books every demo library starts with.
pub fn sample_books() -> Vec<Book> {
    vec![
        seed(
            101,
            "The Great Gatsby",
            "F. Scott Fitzgerald",
            "978-0-7432-7356-5",
            "Classic Literature",
            published(1925, 4, 10),
            4.2,
        ),
        seed(
            102,
            "To Kill a Mockingbird",
            "Harper Lee",
            "978-0-06-112008-4",
            "Classic Literature",
            published(1960, 7, 11),
            4.3,
        ),
        seed(
            103,
            "1984",
            "George Orwell",
            "978-0-452-28423-4",
            "Dystopian Fiction",
            published(1949, 6, 8),
            4.4,
        ),
    ]
}
