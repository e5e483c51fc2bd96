//! Shared application state.

use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use crate::config::ServerConfig;
use crate::db::{PgBookingStore, PgProfileStore, ProfileStore};
use crate::services::identity::IdentityError;
use crate::services::notify::NotifyError;
use crate::services::payments::GatewayError;
use crate::services::{
    BookingService, HttpIdentityProvider, HttpNotifier, HttpPaymentGateway, IdentityProvider,
    NullNotifier, Notifier, OfferEngine, PaymentBridge,
};

/// Errors that can occur while wiring up state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to build gateway client: {0}")]
    Gateway(#[from] GatewayError),

    #[error("failed to build identity client: {0}")]
    Identity(#[from] IdentityError),

    #[error("failed to build notifier client: {0}")]
    Notify(#[from] NotifyError),
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
    bookings: BookingService,
    payments: PaymentBridge,
}

/// Shared application state, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

impl AppState {
    /// Wire services over the vendor clients the config describes.
    ///
    /// # Errors
    ///
    /// Returns error if any vendor HTTP client fails to build.
    pub fn new(config: ServerConfig, pool: PgPool) -> Result<Self, StateError> {
        let booking_store = Arc::new(PgBookingStore::new(pool.clone()));
        let profiles: Arc<dyn ProfileStore> = Arc::new(PgProfileStore::new(pool.clone()));

        let identity: Arc<dyn IdentityProvider> =
            Arc::new(HttpIdentityProvider::new(&config.identity)?);

        let notifier: Arc<dyn Notifier> = match &config.notify {
            Some(notify) => Arc::new(HttpNotifier::new(notify)?),
            None => {
                tracing::info!("no notification credentials configured, notifications disabled");
                Arc::new(NullNotifier)
            }
        };

        let offers = OfferEngine::new(booking_store.clone(), profiles.clone());
        let bookings = BookingService::new(booking_store, offers);

        let gateway = Arc::new(HttpPaymentGateway::new(&config.gateway)?);
        let payments = PaymentBridge::new(
            gateway,
            bookings.clone(),
            notifier,
            config.gateway.key_id.clone(),
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                identity,
                profiles,
                bookings,
                payments,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.inner.identity
    }

    #[must_use]
    pub fn profiles(&self) -> &Arc<dyn ProfileStore> {
        &self.inner.profiles
    }

    #[must_use]
    pub fn bookings(&self) -> &BookingService {
        &self.inner.bookings
    }

    #[must_use]
    pub fn payments(&self) -> &PaymentBridge {
        &self.inner.payments
    }
}
