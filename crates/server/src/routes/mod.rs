//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST /auth/session             - Exchange a provider token for a session
//! GET  /auth/me                  - Current session user
//! POST /auth/logout              - End the session
//!
//! # Bookings (requires auth)
//! POST /bookings                 - Create a booking
//! GET  /bookings                 - The caller's bookings
//! GET  /bookings/{id}            - One booking (owner or admin)
//!
//! # Payments
//! POST /api/payments/order       - Create a gateway order (owner or admin)
//! POST /api/payments/verify      - Verify a signed payment callback
//!
//! # Admin (requires admin role)
//! GET  /admin/bookings           - All bookings
//! POST /admin/bookings/{id}/status - Override booking status
//! ```

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod payments;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/session", post(auth::establish))
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout))
}

/// Create the booking routes router.
pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(bookings::create).get(bookings::list_mine))
        .route("/{id}", get(bookings::show))
}

/// Create the payment API routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/order", post(payments::create_order))
        .route("/verify", post(payments::verify))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(admin::list_bookings))
        .route("/bookings/{id}/status", post(admin::set_status))
}

/// Create all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/bookings", booking_routes())
        .nest("/api/payments", payment_routes())
        .nest("/admin", admin_routes())
}
