//! Database migration command.
//!
//! Migrations are embedded at compile time from `crates/server/migrations/`
//! and applied in order; already-applied migrations are skipped.

use super::CliError;

/// Run all pending database migrations.
///
/// # Errors
///
/// Returns error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = super::connect().await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
