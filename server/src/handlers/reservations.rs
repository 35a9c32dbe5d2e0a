//! Reservation handler.

use super::SharedLibrary;
use crate::error::Result;
use chrono::Utc;
use stacks_engine::{Reservation, ReservationRequest};

/// Place a reservation. Confirmed or queued is decided by the engine under
/// the write lock, so concurrent requests for one book get distinct queue
/// positions.
pub async fn handle_create_reservation(
    library: &SharedLibrary,
    request: ReservationRequest,
) -> Result<Reservation> {
    let reservation = library
        .write()
        .await
        .create_reservation(request, Utc::now())?;
    tracing::info!(
        reservation_id = %reservation.reservation_id,
        member_id = reservation.member_id,
        book_id = reservation.book_id,
        status = ?reservation.reservation_status,
        queue_position = reservation.queue_position,
        "reservation created"
    );
    Ok(reservation)
}
