//! Order/payment bridge.
//!
//! Connects booking records to the payment gateway: creates gateway orders
//! from stored prices (never from client-supplied amounts) and reconciles
//! signed payment callbacks back onto the booking.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use storycuts_core::{BookingId, Price};

use crate::db::PaymentOutcome;
use crate::error::AppError;
use crate::models::Booking;
use crate::services::bookings::BookingService;
use crate::services::notify::Notifier;

use super::PaymentGateway;

/// Everything the client needs to open the gateway checkout.
///
/// The key id is the gateway's public identifier; the key secret never
/// appears here or anywhere else client-visible.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutOrder {
    pub order_id: String,
    /// Amount in the gateway's minor unit (paise).
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
    pub booking_id: BookingId,
}

/// Signed payment callback from the gateway checkout.
#[derive(Debug, Deserialize)]
pub struct PaymentCallback {
    pub booking_id: BookingId,
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// The result of reconciling a payment callback.
#[derive(Debug)]
pub struct Reconciliation {
    pub booking: Booking,
    /// False when the callback was a re-delivery for an already-paid booking.
    pub newly_paid: bool,
}

/// Bridges bookings to the payment gateway.
#[derive(Clone)]
pub struct PaymentBridge {
    gateway: Arc<dyn PaymentGateway>,
    bookings: BookingService,
    notifier: Arc<dyn Notifier>,
    key_id: String,
}

impl PaymentBridge {
    #[must_use]
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        bookings: BookingService,
        notifier: Arc<dyn Notifier>,
        key_id: String,
    ) -> Self {
        Self {
            gateway,
            bookings,
            notifier,
            key_id,
        }
    }

    /// Create a gateway order for the booking's stored final price.
    ///
    /// An offer-priced pending booking is re-checked against the owner's
    /// current offer state first, so a quote that went stale (the owner paid
    /// for another booking meanwhile) is charged at base price. The amount
    /// then comes from the booking record, converted to minor units; the
    /// booking id rides along as the gateway receipt.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown booking, `InvalidAmount` if the
    /// stored price is not positive, and a gateway error if order creation
    /// fails upstream.
    pub async fn create_order(&self, booking_id: BookingId) -> Result<CheckoutOrder, AppError> {
        let booking = self.bookings.get(booking_id).await?;
        let booking = self.bookings.refresh_offer_pricing(booking).await?;

        if !booking.final_price.is_positive() {
            tracing::error!(
                %booking_id,
                final_price = %booking.final_price,
                "refusing to create order for non-positive amount"
            );
            return Err(AppError::InvalidAmount);
        }

        let order = self
            .gateway
            .create_order(
                booking.final_price.minor_units(),
                Price::CURRENCY,
                &booking_id.to_string(),
            )
            .await?;

        tracing::info!(
            %booking_id,
            order_id = %order.id,
            amount = order.amount,
            "gateway order created"
        );

        Ok(CheckoutOrder {
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            key_id: self.key_id.clone(),
            booking_id,
        })
    }

    /// Verify a payment callback and record it on the booking.
    ///
    /// The signature check is the sole authenticator for this path. On a
    /// genuine first confirmation the customer is notified; a re-delivered
    /// callback is acknowledged without side effects. Notification failures
    /// are logged, never surfaced: the payment is already committed.
    ///
    /// # Errors
    ///
    /// Returns `SignatureMismatch` for a forged or corrupted callback,
    /// `NotFound` for an unknown booking, and a database error if the
    /// confirmation transaction fails.
    pub async fn reconcile(&self, callback: PaymentCallback) -> Result<Reconciliation, AppError> {
        if !self.gateway.verify_signature(
            &callback.order_id,
            &callback.payment_id,
            &callback.signature,
        ) {
            tracing::warn!(
                booking_id = %callback.booking_id,
                order_id = %callback.order_id,
                "payment callback signature mismatch"
            );
            return Err(AppError::SignatureMismatch);
        }

        let outcome = self
            .bookings
            .mark_paid(callback.booking_id, &callback.payment_id)
            .await?;

        match outcome {
            PaymentOutcome::Confirmed(booking) => {
                tracing::info!(
                    booking_id = %booking.id,
                    payment_id = %callback.payment_id,
                    "payment confirmed"
                );

                if let Err(err) = self.notifier.booking_confirmed(&booking).await {
                    tracing::warn!(
                        booking_id = %booking.id,
                        error = %err,
                        "confirmation notification failed"
                    );
                }

                Ok(Reconciliation {
                    booking,
                    newly_paid: true,
                })
            }
            PaymentOutcome::AlreadyPaid(booking) => {
                tracing::info!(
                    booking_id = %booking.id,
                    payment_id = %callback.payment_id,
                    "duplicate payment callback acknowledged"
                );

                Ok(Reconciliation {
                    booking,
                    newly_paid: false,
                })
            }
        }
    }
}
