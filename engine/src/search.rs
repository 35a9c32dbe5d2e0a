//! Catalog search.
//!
//! Query parameters arrive as raw strings and are parsed here, so every bad
//! parameter can be reported in a single rejection.

use crate::{error::Result, Book, Error, Library};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 20;

const DATE_RANGE_MESSAGE: &str =
    "Invalid date range: published_after cannot be later than published_before";

/// Raw search parameters, as found in the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub availability: Option<String>,
    pub min_rating: Option<String>,
    pub max_rating: Option<String>,
    pub published_after: Option<String>,
    pub published_before: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub include_analytics: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Availability {
    #[default]
    All,
    Available,
    Borrowed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    Title,
    Author,
    Rating,
    Popularity,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// A fully parsed search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter {
    pub text: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub availability: Availability,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
    pub published_after: Option<NaiveDate>,
    pub published_before: Option<NaiveDate>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub page: usize,
    pub limit: usize,
    pub include_analytics: bool,
}

/// One problem with a search parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryIssue {
    pub param: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryErrorDetails {
    pub invalid_params: Vec<String>,
    pub issues: Vec<QueryIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_corrections: Option<BTreeMap<String, String>>,
}

/// Every problem found in a search query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRejection {
    pub message: String,
    pub details: QueryErrorDetails,
}

/// A book in search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookHit {
    #[serde(flatten)]
    pub book: Book,
    /// Transactions ever opened for the book, active or returned
    pub borrowing_count: usize,
    /// `borrowing_count * 0.1 + rating`, to one decimal
    pub popularity_score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_results: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySummary {
    pub available: usize,
    pub borrowed: usize,
    /// Matching books with at least one reservation still in their queue
    pub reserved: usize,
}

/// Optional analytics block. Figures are derived on the fly and are not
/// guaranteed to be stable between calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchAnalytics {
    /// Filled in by whoever timed the call
    pub search_time_ms: Option<u64>,
    pub filters_applied: Vec<String>,
    pub availability_summary: AvailabilitySummary,
    pub best_effort: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub books: Vec<BookHit>,
    pub pagination: Pagination,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics: Option<SearchAnalytics>,
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[derive(Default)]
struct Issues {
    issues: Vec<QueryIssue>,
    suggested_corrections: Option<BTreeMap<String, String>>,
}

impl Issues {
    fn push(&mut self, param: &str, reason: impl Into<String>) {
        self.issues.push(QueryIssue {
            param: param.to_string(),
            reason: reason.into(),
        });
    }

    fn parse<T>(&mut self, param: &str, raw: Option<&str>, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        let raw = raw?;
        let parsed = parse(raw);
        if parsed.is_none() {
            self.push(param, format!("'{raw}' is not a valid value for {param}"));
        }
        parsed
    }

    fn into_result<T>(self, value: T) -> Result<T> {
        if self.issues.is_empty() {
            return Ok(value);
        }

        let mut invalid_params: Vec<String> = Vec::new();
        let mut reasons: Vec<&str> = Vec::new();
        for issue in &self.issues {
            if !invalid_params.contains(&issue.param) {
                invalid_params.push(issue.param.clone());
            }
            if !reasons.contains(&issue.reason.as_str()) {
                reasons.push(&issue.reason);
            }
        }
        let message = reasons.join("; ");

        Err(Error::InvalidQuery(Box::new(QueryRejection {
            message,
            details: QueryErrorDetails {
                invalid_params,
                issues: self.issues,
                suggested_corrections: self.suggested_corrections,
            },
        })))
    }
}

impl SearchQuery {
    /// Parse and check every parameter.
    pub fn parse(&self) -> Result<SearchFilter> {
        let mut issues = Issues::default();

        let availability = issues
            .parse("availability", non_empty(&self.availability), |s| match s {
                "all" => Some(Availability::All),
                "available" => Some(Availability::Available),
                "borrowed" => Some(Availability::Borrowed),
                _ => None,
            })
            .unwrap_or_default();

        let rating = |s: &str| s.parse::<f64>().ok().filter(|r| r.is_finite());
        let min_rating = issues.parse("min_rating", non_empty(&self.min_rating), rating);
        let max_rating = issues.parse("max_rating", non_empty(&self.max_rating), rating);
        if let (Some(min), Some(max)) = (min_rating, max_rating) {
            if min > max {
                issues.push("min_rating", "min_rating cannot be greater than max_rating");
            }
        }

        let date = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
        let published_after = issues.parse("published_after", non_empty(&self.published_after), date);
        let published_before =
            issues.parse("published_before", non_empty(&self.published_before), date);
        if let (Some(after), Some(before)) = (published_after, published_before) {
            if after > before {
                issues.push("published_after", DATE_RANGE_MESSAGE);
                issues.push("published_before", DATE_RANGE_MESSAGE);
                issues.suggested_corrections = Some(BTreeMap::from([
                    ("published_after".to_string(), before.to_string()),
                    ("published_before".to_string(), after.to_string()),
                ]));
            }
        }

        let sort_by = issues
            .parse("sort_by", non_empty(&self.sort_by), |s| match s {
                "title" => Some(SortBy::Title),
                "author" => Some(SortBy::Author),
                "rating" => Some(SortBy::Rating),
                "popularity" => Some(SortBy::Popularity),
                _ => None,
            })
            .unwrap_or_default();
        let sort_order = issues
            .parse("sort_order", non_empty(&self.sort_order), |s| match s {
                "asc" => Some(SortOrder::Asc),
                "desc" => Some(SortOrder::Desc),
                _ => None,
            })
            .unwrap_or_default();

        let positive = |s: &str| s.parse::<usize>().ok().filter(|n| *n >= 1);
        let page = issues
            .parse("page", non_empty(&self.page), positive)
            .unwrap_or(DEFAULT_PAGE);
        let limit = issues
            .parse("limit", non_empty(&self.limit), positive)
            .unwrap_or(DEFAULT_LIMIT);

        let include_analytics = issues
            .parse("include_analytics", non_empty(&self.include_analytics), |s| match s {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            })
            .unwrap_or(false);

        issues.into_result(SearchFilter {
            text: non_empty(&self.q).map(str::to_lowercase),
            category: non_empty(&self.category).map(str::to_lowercase),
            author: non_empty(&self.author).map(str::to_lowercase),
            availability,
            min_rating,
            max_rating,
            published_after,
            published_before,
            sort_by,
            sort_order,
            page,
            limit,
            include_analytics,
        })
    }
}

impl SearchFilter {
    /// Check a book against every filter.
    pub fn matches(&self, book: &Book) -> bool {
        if let Some(text) = &self.text {
            let hit = contains_ci(&book.title, text)
                || contains_ci(&book.author, text)
                || contains_ci(&book.category, text);
            if !hit {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !contains_ci(&book.category, category) {
                return false;
            }
        }
        if let Some(author) = &self.author {
            if !contains_ci(&book.author, author) {
                return false;
            }
        }
        match self.availability {
            Availability::All => {}
            Availability::Available if !book.is_available => return false,
            Availability::Borrowed if book.is_available => return false,
            _ => {}
        }
        if self.min_rating.is_some_and(|min| book.rating < min) {
            return false;
        }
        if self.max_rating.is_some_and(|max| book.rating > max) {
            return false;
        }
        if self.published_after.is_some() || self.published_before.is_some() {
            let Some(published) = book.published_date else {
                return false;
            };
            if self.published_after.is_some_and(|after| published < after) {
                return false;
            }
            if self.published_before.is_some_and(|before| published > before) {
                return false;
            }
        }
        true
    }

    /// Names of the filters in effect.
    pub fn filters_applied(&self) -> Vec<String> {
        let flags = [
            ("q", self.text.is_some()),
            ("category", self.category.is_some()),
            ("author", self.author.is_some()),
            ("availability", self.availability != Availability::All),
            ("min_rating", self.min_rating.is_some()),
            ("max_rating", self.max_rating.is_some()),
            ("published_after", self.published_after.is_some()),
            ("published_before", self.published_before.is_some()),
        ];
        flags
            .into_iter()
            .filter(|(_, on)| *on)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    fn compare(&self, a: &BookHit, b: &BookHit) -> Ordering {
        let ordering = match self.sort_by {
            SortBy::Title => a.book.title.to_lowercase().cmp(&b.book.title.to_lowercase()),
            SortBy::Author => a.book.author.to_lowercase().cmp(&b.book.author.to_lowercase()),
            SortBy::Rating => a.book.rating.total_cmp(&b.book.rating),
            SortBy::Popularity => a.popularity_score.total_cmp(&b.popularity_score),
        };
        match self.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

impl Library {
    /// Filter, sort and paginate the catalog.
    pub fn search_books(&self, query: &SearchQuery) -> Result<SearchResults> {
        let filter = query.parse()?;

        let mut hits: Vec<BookHit> = self
            .store
            .books
            .values()
            .filter(|book| filter.matches(book))
            .map(|book| {
                let borrowing_count = self.store.borrowing_count(book.book_id);
                BookHit {
                    popularity_score: round_one_decimal(borrowing_count as f64 * 0.1 + book.rating),
                    borrowing_count,
                    book: book.clone(),
                }
            })
            .collect();
        // Stable, so ties keep catalog order.
        hits.sort_by(|a, b| filter.compare(a, b));

        let total_results = hits.len();
        let total_pages = total_results.div_ceil(filter.limit);
        let analytics = filter.include_analytics.then(|| SearchAnalytics {
            search_time_ms: None,
            filters_applied: filter.filters_applied(),
            availability_summary: AvailabilitySummary {
                available: hits.iter().filter(|h| h.book.is_available).count(),
                borrowed: hits.iter().filter(|h| !h.book.is_available).count(),
                reserved: hits
                    .iter()
                    .filter(|h| self.store.queue_depth(h.book.book_id) > 0)
                    .count(),
            },
            best_effort: true,
        });

        let start = (filter.page - 1).saturating_mul(filter.limit);
        let books = hits.into_iter().skip(start).take(filter.limit).collect();

        Ok(SearchResults {
            books,
            pagination: Pagination {
                current_page: filter.page,
                total_pages,
                total_results,
                has_next: filter.page < total_pages,
                has_previous: filter.page > 1,
            },
            analytics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LoanRequest, NewMember, Policy, ReservationRequest};
    use chrono::{TimeZone, Utc};

    fn query() -> SearchQuery {
        SearchQuery::default()
    }

    fn ids(results: &SearchResults) -> Vec<i64> {
        results.books.iter().map(|h| h.book.book_id).collect()
    }

    fn rejection(err: Error) -> QueryRejection {
        match err {
            Error::InvalidQuery(rejection) => *rejection,
            other => panic!("expected invalid query, got {other:?}"),
        }
    }

    #[test]
    fn default_sort_is_title_ascending() {
        let library = Library::with_sample_catalog(Policy::default());
        let results = library.search_books(&query()).unwrap();
        // "1984" < "the great gatsby" < "to kill a mockingbird"
        assert_eq!(ids(&results), vec![103, 101, 102]);
        assert_eq!(results.pagination.total_results, 3);
        assert_eq!(results.pagination.total_pages, 1);
        assert!(results.analytics.is_none());
    }

    #[test]
    fn min_rating_is_inclusive() {
        let library = Library::with_sample_catalog(Policy::default());
        let results = library
            .search_books(&SearchQuery {
                min_rating: Some("4.3".into()),
                ..query()
            })
            .unwrap();
        assert_eq!(ids(&results), vec![103, 102]);
        assert!(results.books.iter().all(|h| h.book.rating >= 4.3));
    }

    #[test]
    fn text_and_field_filters() {
        let library = Library::with_sample_catalog(Policy::default());
        let by_text = library
            .search_books(&SearchQuery {
                q: Some("DYSTOPIAN".into()),
                ..query()
            })
            .unwrap();
        assert_eq!(ids(&by_text), vec![103]);

        let by_author = library
            .search_books(&SearchQuery {
                author: Some("lee".into()),
                ..query()
            })
            .unwrap();
        assert_eq!(ids(&by_author), vec![102]);

        let by_category = library
            .search_books(&SearchQuery {
                category: Some("classic".into()),
                sort_by: Some("rating".into()),
                sort_order: Some("desc".into()),
                ..query()
            })
            .unwrap();
        assert_eq!(ids(&by_category), vec![102, 101]);
    }

    #[test]
    fn availability_filter() {
        let mut library = Library::with_sample_catalog(Policy::default());
        library.create_member(NewMember::new(1, "Ada", 30)).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        library.borrow(LoanRequest::new(1, 102), now).unwrap();

        let borrowed = library
            .search_books(&SearchQuery {
                availability: Some("borrowed".into()),
                ..query()
            })
            .unwrap();
        assert_eq!(ids(&borrowed), vec![102]);

        let available = library
            .search_books(&SearchQuery {
                availability: Some("available".into()),
                ..query()
            })
            .unwrap();
        assert_eq!(ids(&available), vec![103, 101]);
    }

    #[test]
    fn published_date_bounds() {
        let library = Library::with_sample_catalog(Policy::default());
        let results = library
            .search_books(&SearchQuery {
                published_after: Some("1940-01-01".into()),
                published_before: Some("1960-07-11".into()),
                ..query()
            })
            .unwrap();
        assert_eq!(ids(&results), vec![103, 102]);
    }

    #[test]
    fn inverted_date_range_is_rejected() {
        let library = Library::with_sample_catalog(Policy::default());
        let err = library
            .search_books(&SearchQuery {
                published_after: Some("2000-01-01".into()),
                published_before: Some("1990-01-01".into()),
                ..query()
            })
            .unwrap_err();
        let rejection = rejection(err);
        assert_eq!(rejection.message, DATE_RANGE_MESSAGE);
        assert_eq!(
            rejection.details.invalid_params,
            vec!["published_after".to_string(), "published_before".to_string()]
        );
        let corrections = rejection.details.suggested_corrections.unwrap();
        assert_eq!(corrections["published_after"], "1990-01-01");
        assert_eq!(corrections["published_before"], "2000-01-01");
    }

    #[test]
    fn every_bad_param_is_reported() {
        let library = Library::with_sample_catalog(Policy::default());
        let err = library
            .search_books(&SearchQuery {
                sort_by: Some("pages".into()),
                sort_order: Some("sideways".into()),
                page: Some("0".into()),
                min_rating: Some("high".into()),
                ..query()
            })
            .unwrap_err();
        let rejection = rejection(err);
        assert_eq!(
            rejection.details.invalid_params,
            vec!["min_rating", "sort_by", "sort_order", "page"]
        );
        assert!(rejection.details.suggested_corrections.is_none());
    }

    #[test]
    fn pagination() {
        let library = Library::with_sample_catalog(Policy::default());
        let page2 = library
            .search_books(&SearchQuery {
                page: Some("2".into()),
                limit: Some("2".into()),
                ..query()
            })
            .unwrap();
        assert_eq!(ids(&page2), vec![102]);
        assert_eq!(
            page2.pagination,
            Pagination {
                current_page: 2,
                total_pages: 2,
                total_results: 3,
                has_next: false,
                has_previous: true,
            }
        );

        let beyond = library
            .search_books(&SearchQuery {
                page: Some("9".into()),
                ..query()
            })
            .unwrap();
        assert!(beyond.books.is_empty());
        assert_eq!(beyond.pagination.total_results, 3);
    }

    #[test]
    fn popularity_counts_all_transactions() {
        let mut library = Library::with_sample_catalog(Policy::default());
        library.create_member(NewMember::new(1, "Ada", 30)).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for _ in 0..3 {
            library.borrow(LoanRequest::new(1, 101), now).unwrap();
            library.return_book(LoanRequest::new(1, 101), now).unwrap();
        }

        let results = library
            .search_books(&SearchQuery {
                sort_by: Some("popularity".into()),
                sort_order: Some("desc".into()),
                ..query()
            })
            .unwrap();
        assert_eq!(ids(&results), vec![101, 103, 102]);
        assert_eq!(results.books[0].borrowing_count, 3);
        assert_eq!(results.books[0].popularity_score, 4.5);
    }

    #[test]
    fn analytics_block() {
        let mut library = Library::with_sample_catalog(Policy::default());
        library.create_member(NewMember::new(1, "Ada", 30)).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        library
            .create_reservation(ReservationRequest::new(1, 103), now)
            .unwrap();

        let results = library
            .search_books(&SearchQuery {
                min_rating: Some("4".into()),
                include_analytics: Some("true".into()),
                ..query()
            })
            .unwrap();
        let analytics = results.analytics.unwrap();
        assert!(analytics.best_effort);
        assert_eq!(analytics.filters_applied, vec!["min_rating".to_string()]);
        assert_eq!(
            analytics.availability_summary,
            AvailabilitySummary {
                available: 3,
                borrowed: 0,
                reserved: 1,
            }
        );
    }

    #[test]
    fn hit_serializes_flat() {
        let library = Library::with_sample_catalog(Policy::default());
        let results = library.search_books(&query()).unwrap();
        let json = serde_json::to_value(&results).unwrap();
        let first = &json["books"][0];
        assert_eq!(first["book_id"], 103);
        assert_eq!(first["published_date"], "1949-06-08");
        assert_eq!(first["borrowing_count"], 0);
        assert!(json.get("analytics").is_none());
    }
}
