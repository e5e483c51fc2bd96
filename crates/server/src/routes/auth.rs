//! Session route handlers.
//!
//! Exchanges a provider-issued sign-in token for a server session. The role
//! claim is fixed here, at session establishment: the provider's admin
//! assertion wins, otherwise the stored profile role applies.

use axum::{Json, extract::State};
use serde::Deserialize;
use tower_sessions::Session;

use storycuts_core::UserRole;

use crate::error::AppError;
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, NewProfile};
use crate::state::AppState;

/// Sign-in request carrying the provider token.
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub token: String,
}

/// Establish a session from a provider-issued sign-in token.
///
/// # Errors
///
/// Returns 401 for a token the provider rejects, and a server error if the
/// provider is unreachable or the profile write fails.
pub async fn establish(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<SessionRequest>,
) -> Result<Json<CurrentUser>, AppError> {
    let verified = state.identity().verify_token(&body.token).await?;

    let display_name = verified
        .display_name
        .unwrap_or_else(|| verified.email.as_str().to_string());

    let profile = state
        .profiles()
        .ensure(&NewProfile {
            identity_id: verified.identity_id.clone(),
            email: verified.email.clone(),
            display_name: display_name.clone(),
            role: if verified.admin {
                UserRole::Admin
            } else {
                UserRole::Customer
            },
        })
        .await?;

    // Provider admin claim wins over whatever the profile holds
    let role = if verified.admin {
        UserRole::Admin
    } else {
        profile.role
    };

    let user = CurrentUser {
        identity_id: verified.identity_id,
        email: verified.email,
        display_name: profile.display_name,
        role,
    };

    set_current_user(&session, &user)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;

    tracing::info!(identity = %user.identity_id, %role, "session established");

    Ok(Json(user))
}

/// The signed-in user for the current session.
pub async fn me(RequireAuth(user): RequireAuth) -> Json<CurrentUser> {
    Json(user)
}

/// End the current session.
///
/// # Errors
///
/// Returns a server error if the session store rejects the write.
pub async fn logout(session: Session) -> Result<Json<serde_json::Value>, AppError> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;

    Ok(Json(serde_json::json!({ "success": true })))
}
