//! Domain models for the booking service.

pub mod booking;
pub mod user;

pub use booking::{Booking, CustomerDetails, NewBooking};
pub use user::{CurrentUser, NewProfile, UserProfile, session_keys};
