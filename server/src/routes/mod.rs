//! HTTP route definitions.

mod books;
mod health;
mod lending;
mod members;
mod reservations;

use crate::error::{AppError, Result};
use crate::AppState;
use axum::Router;

/// Create all application routes.
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(members::routes())
        .merge(books::routes())
        .merge(lending::routes())
        .merge(reservations::routes())
}

/// Routes plus the catch-all for unknown endpoints, bound to `state`.
pub fn app(state: AppState) -> Router {
    create_routes().fallback(not_found).with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound("Endpoint not found".to_string())
}

/// Parse a numeric path id. Anything that is not a number names a record
/// that cannot exist, so it is reported as not found.
fn parse_id(entity: &str, raw: &str) -> Result<i64> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("{entity} with id: {raw} was not found")))
}
