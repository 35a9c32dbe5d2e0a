//! Error types for the Stacks engine.

use crate::search::QueryRejection;
use crate::reservation::ReservationRejection;
use thiserror::Error;

/// Broad classification of an [`Error`], used by callers to pick a response
/// without inspecting message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input.
    Validation,
    /// Unique-key collision.
    Duplicate,
    /// Unknown id.
    NotFound,
    /// Valid request that the current state forbids.
    Conflict,
    /// The store broke one of its own invariants.
    Internal,
}

/// All possible errors from the Stacks engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    // Input errors
    #[error("{0}")]
    Validation(String),

    #[error("{}", .0.message)]
    InvalidQuery(Box<QueryRejection>),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    NotFound(String),

    // State errors
    #[error("{0}")]
    Conflict(String),

    #[error("{}", .0.message)]
    ReservationConflict(Box<ReservationRejection>),

    #[error("inconsistent store: {0}")]
    Inconsistent(String),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) | Error::InvalidQuery(_) => ErrorKind::Validation,
            Error::Duplicate(_) => ErrorKind::Duplicate,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Conflict(_) | Error::ReservationConflict(_) => ErrorKind::Conflict,
            Error::Inconsistent(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
