//! User profile and session identity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storycuts_core::{Email, IdentityId, UserRole};

/// Session storage keys.
pub mod session_keys {
    /// Key under which the authenticated user is stored in the session.
    pub const CURRENT_USER: &str = "current_user";
}

/// Profile record for an authenticated identity.
///
/// Created on first session establishment. `offer_used` starts false and is
/// flipped exactly once, inside the transaction that confirms an
/// offer-priced payment; it is never reset.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub identity_id: IdentityId,
    pub email: Email,
    pub display_name: String,
    pub role: UserRole,
    pub offer_used: bool,
    pub created_at: DateTime<Utc>,
}

/// Profile fields known at first sign-in.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub identity_id: IdentityId,
    pub email: Email,
    pub display_name: String,
    pub role: UserRole,
}

/// The authenticated user attached to the current session.
///
/// The role claim is fixed at session establishment; administrative routes
/// check it through [`CurrentUser::is_admin`], never by comparing emails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub identity_id: IdentityId,
    pub email: Email,
    pub display_name: String,
    pub role: UserRole,
}

impl CurrentUser {
    /// Whether this identity may override booking status.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
