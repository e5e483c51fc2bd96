//! User profile store.
//!
//! Profiles are created lazily on first session establishment and mutated in
//! exactly two places: the payment-confirmation transaction (offer-used
//! flag, see `bookings::confirm_payment`) and role grants from the CLI.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use storycuts_core::{Email, IdentityId, UserRole};

use super::RepositoryError;
use crate::models::user::{NewProfile, UserProfile};

/// Storage seam for user profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a profile by identity id.
    async fn get(&self, identity_id: &IdentityId) -> Result<Option<UserProfile>, RepositoryError>;

    /// Create the profile if it does not exist yet, then return it.
    ///
    /// Never overwrites an existing row; the offer-used flag and role of a
    /// returning user are preserved.
    async fn ensure(&self, new: &NewProfile) -> Result<UserProfile, RepositoryError>;

    /// Set the role for the profile with the given email.
    async fn set_role(&self, email: &Email, role: UserRole) -> Result<(), RepositoryError>;
}

/// `PostgreSQL`-backed profile store.
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    /// Create a new store over the shared pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    identity_id: String,
    email: String,
    display_name: String,
    role: String,
    offer_used: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for UserProfile {
    type Error = RepositoryError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role: UserRole = row.role.parse().map_err(|e: String| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;

        Ok(Self {
            identity_id: IdentityId::new(row.identity_id),
            email,
            display_name: row.display_name,
            role,
            offer_used: row.offer_used,
            created_at: row.created_at,
        })
    }
}

const PROFILE_COLUMNS: &str = "identity_id, email, display_name, role, offer_used, created_at";

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get(&self, identity_id: &IdentityId) -> Result<Option<UserProfile>, RepositoryError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE identity_id = $1");

        let row: Option<ProfileRow> = sqlx::query_as(&sql)
            .bind(identity_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserProfile::try_from).transpose()
    }

    async fn ensure(&self, new: &NewProfile) -> Result<UserProfile, RepositoryError> {
        sqlx::query(
            "INSERT INTO user_profiles (identity_id, email, display_name, role) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (identity_id) DO NOTHING",
        )
        .bind(new.identity_id.as_str())
        .bind(new.email.as_str())
        .bind(&new.display_name)
        .bind(new.role.to_string())
        .execute(&self.pool)
        .await?;

        self.get(&new.identity_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn set_role(&self, email: &Email, role: UserRole) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE user_profiles SET role = $2 WHERE email = $1")
            .bind(email.as_str())
            .bind(role.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
