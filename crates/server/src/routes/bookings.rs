//! Booking route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use storycuts_core::BookingId;

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::Booking;
use crate::services::BookingRequest;
use crate::state::AppState;

/// Create a booking for the signed-in user.
///
/// The price is computed server-side from the catalog and the user's offer
/// state; nothing price-shaped is accepted from the client.
///
/// # Errors
///
/// Returns a field-level 400 for invalid input, or a server error if the
/// insert fails.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = state
        .bookings()
        .create(&user.identity_id, &user.email, request)
        .await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

/// The signed-in user's bookings, newest first.
///
/// # Errors
///
/// Returns a server error if the query fails.
pub async fn list_mine(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = state.bookings().list_for_owner(&user.identity_id).await?;
    Ok(Json(bookings))
}

/// A single booking, visible to its owner and to admins.
///
/// # Errors
///
/// Returns 404 for an unknown booking and 403 when the caller is neither
/// the owner nor an admin.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<BookingId>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.bookings().get(id).await?;

    if booking.owner != user.identity_id && !user.is_admin() {
        return Err(AppError::Forbidden("not your booking".to_string()));
    }

    Ok(Json(booking))
}
