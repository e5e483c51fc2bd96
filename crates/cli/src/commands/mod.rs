//! CLI command implementations.

use thiserror::Error;

pub mod admin;
pub mod migrate;

/// Errors shared by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("No profile found for {0}")]
    ProfileNotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Connect to the service database using `STORYCUTS_DATABASE_URL`.
pub(crate) async fn connect() -> Result<sqlx::PgPool, CliError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STORYCUTS_DATABASE_URL")
        .map_err(|_| CliError::MissingEnvVar("STORYCUTS_DATABASE_URL"))?;

    Ok(sqlx::PgPool::connect(&database_url).await?)
}
