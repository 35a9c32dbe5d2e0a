//! Unified error handling for the server.
//!
//! Engine errors are mapped to status codes by their [`ErrorKind`], never by
//! message text.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use stacks_engine::{Error as EngineError, ErrorKind};

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Body for simple errors.
#[derive(Serialize)]
struct MessageBody {
    message: String,
}

/// Body for errors that carry structured details.
#[derive(Serialize)]
struct DetailedBody<T: Serialize> {
    error: &'static str,
    message: String,
    details: T,
}

fn message(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(MessageBody {
            message: message.into(),
        }),
    )
        .into_response()
}

fn internal(reason: &str) -> Response {
    tracing::error!("Internal error: {}", reason);
    message(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

fn engine_response(err: EngineError) -> Response {
    match err {
        EngineError::InvalidQuery(rejection) => {
            tracing::warn!(invalid_params = ?rejection.details.invalid_params, "search rejected");
            (
                StatusCode::BAD_REQUEST,
                Json(DetailedBody {
                    error: "invalid_query_parameters",
                    message: rejection.message,
                    details: rejection.details,
                }),
            )
                .into_response()
        }
        EngineError::ReservationConflict(rejection) => {
            tracing::warn!(
                failures = rejection.details.validation_errors.len(),
                "reservation rejected"
            );
            (
                StatusCode::CONFLICT,
                Json(DetailedBody {
                    error: "reservation_conflict",
                    message: rejection.message,
                    details: rejection.details,
                }),
            )
                .into_response()
        }
        other => {
            let status = match other.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::Duplicate | ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Internal => return internal(&other.to_string()),
            };
            tracing::warn!("Engine error: {}", other);
            message(status, other.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Engine(err) => engine_response(err),
            AppError::BadRequest(msg) => message(StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => message(StatusCode::NOT_FOUND, msg),
        }
    }
}

/// Result type alias for handlers.
pub type Result<T> = std::result::Result<T, AppError>;
