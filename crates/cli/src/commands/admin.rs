//! Admin role management commands.
//!
//! Roles live on `user_profiles`; a change takes effect at the user's next
//! session establishment. The identity provider's admin claim still wins
//! over the stored role.

use storycuts_core::Email;

use super::CliError;

/// Grant the admin role to the profile with this email.
///
/// # Errors
///
/// Returns error for an invalid email, a missing profile, or a database
/// failure.
pub async fn grant(email: &str) -> Result<(), CliError> {
    set_role(email, "admin").await
}

/// Revoke the admin role, returning the profile to customer.
///
/// # Errors
///
/// Returns error for an invalid email, a missing profile, or a database
/// failure.
pub async fn revoke(email: &str) -> Result<(), CliError> {
    set_role(email, "customer").await
}

async fn set_role(email: &str, role: &str) -> Result<(), CliError> {
    let email = Email::parse(email).map_err(|e| CliError::InvalidEmail(e.to_string()))?;

    let pool = super::connect().await?;

    let result = sqlx::query("UPDATE user_profiles SET role = $1 WHERE email = $2")
        .bind(role)
        .bind(email.as_str())
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(CliError::ProfileNotFound(email.as_str().to_string()));
    }

    tracing::info!(email = %email, role, "profile role updated");
    Ok(())
}
