//! Business logic, behind trait seams for each external vendor.

pub mod bookings;
pub mod identity;
pub mod notify;
pub mod offers;
pub mod payments;

pub use bookings::{BookingRequest, BookingService};
pub use identity::{HttpIdentityProvider, IdentityProvider, VerifiedIdentity};
pub use notify::{HttpNotifier, Notifier, NullNotifier};
pub use offers::{OfferEngine, Quote};
pub use payments::{HttpPaymentGateway, PaymentBridge, PaymentGateway};
