//! Borrow and return endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use stacks_engine::{LoanRequest, Transaction};

use crate::error::Result;
use crate::handlers::{
    handle_borrow, handle_borrowed, handle_overdue, handle_return, BorrowedResponse,
    OverdueResponse,
};
use crate::AppState;

/// Create lending routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/borrow", post(borrow_handler))
        .route("/api/return", post(return_handler))
        .route("/api/borrowed", get(borrowed_handler))
        .route("/api/overdue", get(overdue_handler))
}

/// POST /api/borrow
async fn borrow_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoanRequest>, JsonRejection>,
) -> Result<Json<Transaction>> {
    let Json(request) = payload?;
    Ok(Json(handle_borrow(&state.library, request).await?))
}

/// POST /api/return
async fn return_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoanRequest>, JsonRejection>,
) -> Result<Json<Transaction>> {
    let Json(request) = payload?;
    Ok(Json(handle_return(&state.library, request).await?))
}

/// GET /api/borrowed
async fn borrowed_handler(State(state): State<AppState>) -> Result<Json<BorrowedResponse>> {
    Ok(Json(handle_borrowed(&state.library).await?))
}

/// GET /api/overdue
async fn overdue_handler(State(state): State<AppState>) -> Result<Json<OverdueResponse>> {
    Ok(Json(handle_overdue(&state.library).await?))
}
