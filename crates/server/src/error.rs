//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding. All route handlers return `Result<T, AppError>`.
//! Payment-path failures are deliberately generic toward the client;
//! validation failures are specific and field-level.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use storycuts_core::BookingStatus;

use crate::db::RepositoryError;
use crate::services::identity::IdentityError;
use crate::services::payments::GatewayError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Payment gateway operation failed.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Identity provider operation failed.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Customer input failed validation; `field` names the first failure.
    #[error("Validation failed on {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stored booking amount is missing or non-positive.
    #[error("Invalid booking amount")]
    InvalidAmount,

    /// Payment callback signature did not verify.
    #[error("Invalid payment signature")]
    SignatureMismatch,

    /// Booking-status transition not permitted by the lifecycle graph.
    #[error("Cannot transition booking from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but lacks the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Gateway(_) | Self::Identity(_) | Self::Internal(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            // Upstream failures are surfaced as a generic retryable failure
            Self::Database(_) | Self::Gateway(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Identity(err) => match err {
                IdentityError::InvalidToken => StatusCode::UNAUTHORIZED,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation { .. } | Self::InvalidAmount | Self::SignatureMismatch => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        };

        // Don't expose internal error details to clients
        let (message, field) = match &self {
            Self::Database(RepositoryError::NotFound) => ("Not found".to_string(), None),
            Self::Database(_) | Self::Internal(_) => ("Internal server error".to_string(), None),
            Self::Gateway(_) => ("Payment failed, please try again".to_string(), None),
            Self::Identity(IdentityError::InvalidToken) => ("Invalid session".to_string(), None),
            Self::Identity(_) => ("Sign-in failed, please try again".to_string(), None),
            Self::Validation { field, message } => (message.clone(), Some(*field)),
            Self::InvalidAmount => ("Invalid booking amount".to_string(), None),
            Self::SignatureMismatch => ("Invalid signature".to_string(), None),
            _ => (self.to_string(), None),
        };

        (status, Json(ErrorBody { error: message, field })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
