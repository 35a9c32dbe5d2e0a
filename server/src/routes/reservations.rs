//! Reservation endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use stacks_engine::{Reservation, ReservationRequest};

use crate::error::Result;
use crate::handlers::handle_create_reservation;
use crate::AppState;

/// Create reservation routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/reservations", post(create_handler))
}

/// POST /api/reservations
async fn create_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ReservationRequest>, JsonRejection>,
) -> Result<Json<Reservation>> {
    let Json(request) = payload?;
    Ok(Json(
        handle_create_reservation(&state.library, request).await?,
    ))
}
