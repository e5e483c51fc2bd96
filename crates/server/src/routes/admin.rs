//! Admin route handlers.
//!
//! Every handler takes [`RequireAdmin`]; authority comes from the session
//! role claim.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use storycuts_core::{BookingId, BookingStatus};

use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::models::Booking;
use crate::state::AppState;

/// Status override request.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: BookingStatus,
}

/// All bookings, newest first.
///
/// # Errors
///
/// Returns a server error if the query fails.
pub async fn list_bookings(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = state.bookings().list().await?;
    Ok(Json(bookings))
}

/// Move a booking to a new lifecycle status.
///
/// # Errors
///
/// Returns 404 for an unknown booking and 409 when the lifecycle graph
/// forbids the move.
pub async fn set_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<BookingId>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.bookings().set_status(id, request.status).await?;

    tracing::info!(
        booking_id = %id,
        status = %request.status,
        admin = %admin.identity_id,
        "admin status override"
    );

    Ok(Json(booking))
}
