//! External identity resolver.
//!
//! Sign-in tokens minted by the identity vendor are exchanged here for a
//! verified identity. The vendor is behind the [`IdentityProvider`] trait so
//! session logic can be tested without it.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use storycuts_core::{Email, IdentityId};

use crate::config::IdentityConfig;

/// Errors that can occur when resolving an identity token.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider rejected the token.
    #[error("invalid identity token")]
    InvalidToken,

    /// Provider returned an error response.
    #[error("identity provider error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Provider response could not be interpreted.
    #[error("parse error: {0}")]
    Parse(String),
}

/// An identity the provider has vouched for.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub identity_id: IdentityId,
    pub email: Email,
    pub display_name: Option<String>,
    /// Provider-asserted admin claim.
    pub admin: bool,
}

/// Seam for the identity vendor.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange a client-supplied sign-in token for a verified identity.
    async fn verify_token(&self, token: &str) -> Result<VerifiedIdentity, IdentityError>;
}

/// Identity provider REST client.
#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: SecretString,
}

#[derive(Serialize)]
struct VerifyTokenBody<'a> {
    token: &'a str,
}

#[derive(Deserialize)]
struct VerifyTokenResponse {
    id: String,
    email: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    admin: bool,
}

impl HttpIdentityProvider {
    /// Create a new identity client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let url = format!("{}/verify", self.api_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.api_key.expose_secret())
            .json(&VerifyTokenBody { token })
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(IdentityError::InvalidToken);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(IdentityError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: VerifyTokenResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::Parse(e.to_string()))?;

        let email = Email::parse(&body.email)
            .map_err(|e| IdentityError::Parse(format!("bad email in provider response: {e}")))?;

        Ok(VerifiedIdentity {
            identity_id: IdentityId::from(body.id),
            email,
            display_name: body.name,
            admin: body.admin,
        })
    }
}
