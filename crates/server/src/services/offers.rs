//! Offer eligibility engine.
//!
//! Decides whether the fixed first-booking price applies to a selection.
//! Read-only: the offer-used flag is only ever flipped by the payment
//! confirmation transaction in the booking store.

use std::sync::Arc;

use serde::Serialize;

use storycuts_core::{IdentityId, OFFER_PRICE, Price, ShootPackage, VehicleCategory};

use crate::db::{BookingStore, ProfileStore, RepositoryError};

/// A priced selection, ready to be persisted on a booking.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Quote {
    pub base_price: Price,
    pub final_price: Price,
    pub offer_applied: bool,
}

/// Computes prices from identity state and the package catalog.
#[derive(Clone)]
pub struct OfferEngine {
    bookings: Arc<dyn BookingStore>,
    profiles: Arc<dyn ProfileStore>,
}

impl OfferEngine {
    /// Create an engine over the two stores it consults.
    #[must_use]
    pub fn new(bookings: Arc<dyn BookingStore>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { bookings, profiles }
    }

    /// Price the selection for this identity.
    ///
    /// If identity state cannot be read the offer is withheld (fail-closed):
    /// a transient store error must not grant the promotional price.
    pub async fn quote(
        &self,
        identity: &IdentityId,
        vehicle: VehicleCategory,
        package: ShootPackage,
    ) -> Quote {
        Self::price(self.offer_available(identity).await, vehicle, package)
    }

    /// Whether the first-booking offer is still available to this identity,
    /// withholding it on any store error (fail-closed).
    pub async fn offer_available(&self, identity: &IdentityId) -> bool {
        match self.identity_eligible(identity).await {
            Ok(eligible) => eligible,
            Err(err) => {
                tracing::warn!(
                    identity = %identity,
                    error = %err,
                    "offer eligibility check failed, withholding offer"
                );
                false
            }
        }
    }

    /// Pure pricing rule: the offer applies only to an eligible identity on
    /// an offer-eligible package.
    #[must_use]
    pub fn price(
        identity_eligible: bool,
        vehicle: VehicleCategory,
        package: ShootPackage,
    ) -> Quote {
        let base_price = package.base_price(vehicle);
        let offer_applied = identity_eligible && package.offer_eligible();

        Quote {
            base_price,
            final_price: if offer_applied { OFFER_PRICE } else { base_price },
            offer_applied,
        }
    }

    /// Whether this identity still has the first-booking offer available.
    ///
    /// Consults both representations: the profile flag (authoritative once
    /// set, kept in sync by the confirmation transaction) and the presence
    /// of any paid booking.
    async fn identity_eligible(&self, identity: &IdentityId) -> Result<bool, RepositoryError> {
        if let Some(profile) = self.profiles.get(identity).await?
            && profile.offer_used
        {
            return Ok(false);
        }

        Ok(!self.bookings.has_paid_booking(identity).await?)
    }
}
