//! Persistence layer.
//!
//! The booking/payment core talks to storage through two narrow traits,
//! [`bookings::BookingStore`] and [`profiles::ProfileStore`], so the state
//! machine is testable against in-memory fakes. The production
//! implementations here are `PostgreSQL` via sqlx.
//!
//! ## Tables
//!
//! - `user_profiles` - One row per authenticated identity (offer-used flag, role)
//! - `bookings` - One row per shoot request (prices, statuses, payment ref)
//! - `tower_sessions.session` - Session storage for tower-sessions
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p storycuts-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod bookings;
pub mod profiles;

pub use bookings::{BookingStore, PaymentOutcome, PgBookingStore};
pub use profiles::{PgProfileStore, ProfileStore};

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate identity).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
