//! Booking record model.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use storycuts_core::{
    BookingId, BookingStatus, Email, IdentityId, PaymentStatus, Phone, Price, ShootPackage,
    VehicleCategory,
};

/// A customer's request for a shoot.
///
/// Price fields are written once at creation and never mutated afterwards;
/// status fields are owned by the payment bridge and admin overrides. A
/// booking is never deleted.
#[derive(Debug, Clone, Serialize)]
pub struct Booking {
    pub id: BookingId,
    /// Identity that created the booking; read access is scoped to it.
    pub owner: IdentityId,
    pub owner_email: Email,
    pub vehicle: VehicleCategory,
    pub package: ShootPackage,
    /// Listed price for the vehicle/package selection.
    pub base_price: Price,
    /// Price actually payable; equals the promotional price when
    /// `offer_applied` is set, the base price otherwise.
    pub final_price: Price,
    pub offer_applied: bool,
    #[serde(flatten)]
    pub details: CustomerDetails,
    pub booking_status: BookingStatus,
    pub payment_status: PaymentStatus,
    /// Gateway payment id. Present if and only if `payment_status` is paid.
    pub payment_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Customer-supplied booking form fields, already validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub full_name: String,
    pub phone: Phone,
    pub city: String,
    pub location: String,
    pub vehicle_model: String,
    pub shoot_date: NaiveDate,
    pub shoot_time: NaiveTime,
    pub notes: Option<String>,
}

/// A booking about to be persisted.
///
/// Carries the quoted price; the store stamps the id, the initial
/// `new`/`pending` statuses, and the creation timestamp.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub owner: IdentityId,
    pub owner_email: Email,
    pub vehicle: VehicleCategory,
    pub package: ShootPackage,
    pub base_price: Price,
    pub final_price: Price,
    pub offer_applied: bool,
    pub details: CustomerDetails,
}
