//! Customer notifications.
//!
//! Confirmation messages go out through a vendor API behind the
//! [`Notifier`] trait. Notification is best-effort: callers log failures
//! and move on, and deployments without vendor credentials run the
//! [`NullNotifier`].

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;

use crate::config::NotifyConfig;
use crate::models::Booking;

/// Errors that can occur when sending a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Vendor returned an error response.
    #[error("notification vendor error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Seam for the notification vendor.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Tell the customer their booking is confirmed.
    async fn booking_confirmed(&self, booking: &Booking) -> Result<(), NotifyError>;
}

/// Notification vendor REST client.
#[derive(Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    api_url: String,
    api_key: SecretString,
}

#[derive(Serialize)]
struct ConfirmationMessage<'a> {
    to: &'a str,
    template: &'static str,
    booking_id: String,
    full_name: &'a str,
    package: &'a str,
    shoot_date: String,
    shoot_time: String,
}

impl HttpNotifier {
    /// Create a new notifier client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &NotifyConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn booking_confirmed(&self, booking: &Booking) -> Result<(), NotifyError> {
        let url = format!("{}/messages", self.api_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.api_key.expose_secret())
            .json(&ConfirmationMessage {
                to: booking.details.phone.as_str(),
                template: "booking_confirmed",
                booking_id: booking.id.to_string(),
                full_name: &booking.details.full_name,
                package: booking.package.title(),
                shoot_date: booking.details.shoot_date.to_string(),
                shoot_time: booking.details.shoot_time.format("%H:%M").to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

/// No-op notifier for deployments without vendor credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn booking_confirmed(&self, booking: &Booking) -> Result<(), NotifyError> {
        tracing::debug!(booking_id = %booking.id, "notifications disabled, skipping");
        Ok(())
    }
}
