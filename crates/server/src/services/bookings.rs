//! Booking record manager.
//!
//! Validates customer input field by field, prices the selection through the
//! offer engine, and owns the booking lifecycle graph. Status changes go
//! through conditional writes so concurrent admin actions cannot skip states.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

use storycuts_core::{
    BookingId, BookingStatus, Email, IdentityId, PaymentStatus, Phone, ShootPackage,
    VehicleCategory,
};

use crate::db::{BookingStore, PaymentOutcome, RepositoryError};
use crate::error::AppError;
use crate::models::{Booking, CustomerDetails, NewBooking};
use crate::services::offers::OfferEngine;

const MAX_TEXT_FIELD: usize = 200;
const MAX_NOTES: usize = 1000;

/// Raw booking submission, exactly as the client sends it.
///
/// Everything is accepted as strings so a malformed value produces a
/// field-level validation error instead of a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct BookingRequest {
    pub vehicle: String,
    pub package: String,
    pub full_name: String,
    pub phone: String,
    pub city: String,
    pub location: String,
    pub vehicle_model: String,
    pub shoot_date: String,
    pub shoot_time: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Creates bookings and drives them through the status graph.
#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn BookingStore>,
    offers: OfferEngine,
}

impl BookingService {
    #[must_use]
    pub fn new(store: Arc<dyn BookingStore>, offers: OfferEngine) -> Self {
        Self { store, offers }
    }

    /// Validate, price, and persist a new booking for `owner`.
    ///
    /// # Errors
    ///
    /// Returns a field-level validation error for the first invalid field,
    /// or a database error if the insert fails.
    pub async fn create(
        &self,
        owner: &IdentityId,
        owner_email: &Email,
        request: BookingRequest,
    ) -> Result<Booking, AppError> {
        let (vehicle, package, details) = validate(request)?;

        let quote = self.offers.quote(owner, vehicle, package).await;

        let booking = self
            .store
            .insert(NewBooking {
                owner: owner.clone(),
                owner_email: owner_email.clone(),
                vehicle,
                package,
                base_price: quote.base_price,
                final_price: quote.final_price,
                offer_applied: quote.offer_applied,
                details,
            })
            .await?;

        tracing::info!(
            booking_id = %booking.id,
            package = %booking.package,
            offer_applied = booking.offer_applied,
            "booking created"
        );

        Ok(booking)
    }

    /// Fetch a single booking.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no booking has this id.
    pub async fn get(&self, id: BookingId) -> Result<Booking, AppError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("booking {id}")))
    }

    /// All bookings, newest first.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn list(&self) -> Result<Vec<Booking>, AppError> {
        Ok(self.store.list().await?)
    }

    /// Bookings belonging to `owner`, newest first.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn list_for_owner(&self, owner: &IdentityId) -> Result<Vec<Booking>, AppError> {
        Ok(self.store.list_for_owner(owner).await?)
    }

    /// Move a booking to `to`, enforcing the lifecycle graph.
    ///
    /// The write is conditional on the status the graph check saw, so a
    /// concurrent change loses cleanly instead of overwriting.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown booking and `InvalidTransition`
    /// when the graph forbids the move (including after losing a race).
    pub async fn set_status(
        &self,
        id: BookingId,
        to: BookingStatus,
    ) -> Result<Booking, AppError> {
        let booking = self.get(id).await?;
        let from = booking.booking_status;

        if !from.can_transition_to(to) {
            return Err(AppError::InvalidTransition { from, to });
        }

        match self.store.update_status(id, from, to).await? {
            Some(updated) => {
                tracing::info!(booking_id = %id, %from, %to, "booking status changed");
                Ok(updated)
            }
            // Lost a race: someone moved the booking after our read
            None => {
                let current = self.get(id).await?;
                Err(AppError::InvalidTransition {
                    from: current.booking_status,
                    to,
                })
            }
        }
    }

    /// Re-check an offer-priced pending booking against the owner's current
    /// offer state, dropping the promotional price when the offer has been
    /// consumed since the quote.
    ///
    /// A booking quoted at the promotional price can go stale: the owner pays
    /// for a different booking first, consuming the offer. Re-evaluating here
    /// keeps at most one promotional-price completion per identity.
    ///
    /// # Errors
    ///
    /// Returns a database error if the repricing write fails.
    pub async fn refresh_offer_pricing(&self, booking: Booking) -> Result<Booking, AppError> {
        if !booking.offer_applied || booking.payment_status != PaymentStatus::Pending {
            return Ok(booking);
        }
        if self.offers.offer_available(&booking.owner).await {
            return Ok(booking);
        }

        tracing::info!(
            booking_id = %booking.id,
            "offer consumed since quote, repricing to base"
        );

        match self.store.reprice_to_base(booking.id).await? {
            Some(repriced) => Ok(repriced),
            // Lost a race with the payment itself; charge what was committed
            None => self.get(booking.id).await,
        }
    }

    /// Record a verified payment against the booking.
    ///
    /// Delegates to the store's single-transaction confirmation, which also
    /// consumes the owner's offer when one was applied.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown booking and a database error if the
    /// transaction fails.
    pub async fn mark_paid(
        &self,
        id: BookingId,
        payment_ref: &str,
    ) -> Result<PaymentOutcome, AppError> {
        match self.store.confirm_payment(id, payment_ref).await {
            Ok(outcome) => Ok(outcome),
            Err(RepositoryError::NotFound) => {
                Err(AppError::NotFound(format!("booking {id}")))
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn validate(
    request: BookingRequest,
) -> Result<(VehicleCategory, ShootPackage, CustomerDetails), AppError> {
    let full_name = required_text("full_name", &request.full_name)?;
    let phone = Phone::parse(request.phone.trim()).map_err(|_| AppError::Validation {
        field: "phone",
        message: "Enter a valid 10-digit mobile number".to_string(),
    })?;
    let city = required_text("city", &request.city)?;
    let location = required_text("location", &request.location)?;

    let vehicle: VehicleCategory =
        request
            .vehicle
            .trim()
            .parse()
            .map_err(|_| AppError::Validation {
                field: "vehicle",
                message: "Choose a vehicle type".to_string(),
            })?;
    let vehicle_model = required_text("vehicle_model", &request.vehicle_model)?;
    let package: ShootPackage =
        request
            .package
            .trim()
            .parse()
            .map_err(|_| AppError::Validation {
                field: "package",
                message: "Choose a shoot package".to_string(),
            })?;

    let shoot_date = NaiveDate::parse_from_str(request.shoot_date.trim(), "%Y-%m-%d").map_err(
        |_| AppError::Validation {
            field: "shoot_date",
            message: "Pick a shoot date".to_string(),
        },
    )?;
    let shoot_time = parse_time(request.shoot_time.trim()).ok_or(AppError::Validation {
        field: "shoot_time",
        message: "Pick a shoot time".to_string(),
    })?;

    let notes = match request.notes.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(notes) if notes.len() > MAX_NOTES => {
            return Err(AppError::Validation {
                field: "notes",
                message: format!("Notes must be at most {MAX_NOTES} characters"),
            });
        }
        Some(notes) => Some(notes.to_string()),
    };

    Ok((
        vehicle,
        package,
        CustomerDetails {
            full_name,
            phone,
            city,
            location,
            vehicle_model,
            shoot_date,
            shoot_time,
            notes,
        },
    ))
}

fn required_text(field: &'static str, value: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation {
            field,
            message: "This field is required".to_string(),
        });
    }
    if value.len() > MAX_TEXT_FIELD {
        return Err(AppError::Validation {
            field,
            message: format!("Must be at most {MAX_TEXT_FIELD} characters"),
        });
    }
    Ok(value.to_string())
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> BookingRequest {
        BookingRequest {
            vehicle: "bike".to_string(),
            package: "cinematic".to_string(),
            full_name: "Asha Verma".to_string(),
            phone: "9876543210".to_string(),
            city: "Pune".to_string(),
            location: "FC Road".to_string(),
            vehicle_model: "RE Classic 350".to_string(),
            shoot_date: "2026-09-12".to_string(),
            shoot_time: "17:30".to_string(),
            notes: None,
        }
    }

    fn failing_field(request: BookingRequest) -> &'static str {
        match validate(request) {
            Err(AppError::Validation { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        let (vehicle, package, details) =
            validate(valid_request()).expect("valid request rejected");
        assert_eq!(vehicle, VehicleCategory::Bike);
        assert_eq!(package, ShootPackage::Cinematic);
        assert_eq!(details.full_name, "Asha Verma");
        assert_eq!(details.phone.as_str(), "9876543210");
        assert_eq!(details.notes, None);
    }

    #[test]
    fn test_fields_are_trimmed() {
        let mut request = valid_request();
        request.full_name = "  Asha Verma  ".to_string();
        request.notes = Some("  night shoot  ".to_string());

        let (_, _, details) = validate(request).expect("valid request rejected");
        assert_eq!(details.full_name, "Asha Verma");
        assert_eq!(details.notes.as_deref(), Some("night shoot"));
    }

    #[test]
    fn test_first_failing_field_reported() {
        // Both name and phone invalid: name is reported first
        let mut request = valid_request();
        request.full_name = "   ".to_string();
        request.phone = "123".to_string();
        assert_eq!(failing_field(request), "full_name");

        let mut request = valid_request();
        request.phone = "123".to_string();
        request.city = String::new();
        assert_eq!(failing_field(request), "phone");
    }

    #[test]
    fn test_bad_phone_rejected() {
        for phone in ["", "12345", "98765432100", "98765abc10"] {
            let mut request = valid_request();
            request.phone = phone.to_string();
            assert_eq!(failing_field(request), "phone", "phone {phone:?} accepted");
        }
    }

    #[test]
    fn test_unknown_vehicle_and_package_rejected() {
        let mut request = valid_request();
        request.vehicle = "truck".to_string();
        assert_eq!(failing_field(request), "vehicle");

        let mut request = valid_request();
        request.package = "platinum".to_string();
        assert_eq!(failing_field(request), "package");
    }

    #[test]
    fn test_bad_date_and_time_rejected() {
        let mut request = valid_request();
        request.shoot_date = "12-09-2026".to_string();
        assert_eq!(failing_field(request), "shoot_date");

        let mut request = valid_request();
        request.shoot_time = "5pm".to_string();
        assert_eq!(failing_field(request), "shoot_time");
    }

    #[test]
    fn test_seconds_accepted_in_time() {
        let mut request = valid_request();
        request.shoot_time = "17:30:00".to_string();
        assert!(validate(request).is_ok());
    }

    #[test]
    fn test_empty_notes_normalized_to_none() {
        let mut request = valid_request();
        request.notes = Some("   ".to_string());
        let (_, _, details) = validate(request).expect("valid request rejected");
        assert_eq!(details.notes, None);
    }
}
