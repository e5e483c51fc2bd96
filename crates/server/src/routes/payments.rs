//! Payment route handlers.
//!
//! Order creation requires the signed-in owner (or an admin). The verify
//! endpoint takes no session: the HMAC signature over the callback is its
//! authenticator, and gateway redirects may arrive without our cookie.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use storycuts_core::BookingId;

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::Booking;
use crate::services::payments::bridge::{CheckoutOrder, PaymentCallback};
use crate::state::AppState;

/// Order creation request.
///
/// `booking_id` is optional at the wire level so a missing value produces a
/// field-level 400 instead of a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub booking_id: Option<BookingId>,
}

/// Reconciliation response.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub booking: Booking,
}

/// Create a gateway order for a booking.
///
/// # Errors
///
/// Returns 400 for a missing booking id or non-positive stored amount,
/// 404 for an unknown booking, 403 when the caller is neither owner nor
/// admin, and a server error when the gateway call fails.
pub async fn create_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<OrderRequest>,
) -> Result<Json<CheckoutOrder>, AppError> {
    let booking_id = request.booking_id.ok_or(AppError::Validation {
        field: "booking_id",
        message: "Booking id is required".to_string(),
    })?;

    let booking = state.bookings().get(booking_id).await?;
    if booking.owner != user.identity_id && !user.is_admin() {
        return Err(AppError::Forbidden("not your booking".to_string()));
    }

    let order = state.payments().create_order(booking_id).await?;
    Ok(Json(order))
}

/// Verify a signed payment callback and record the payment.
///
/// Idempotent: a re-delivered callback for an already-paid booking succeeds
/// without side effects.
///
/// # Errors
///
/// Returns 400 for a signature that does not verify, 404 for an unknown
/// booking, and a server error if the confirmation transaction fails.
pub async fn verify(
    State(state): State<AppState>,
    Json(callback): Json<PaymentCallback>,
) -> Result<Json<VerifyResponse>, AppError> {
    let outcome = state.payments().reconcile(callback).await?;

    Ok(Json(VerifyResponse {
        success: true,
        booking: outcome.booking,
    }))
}
