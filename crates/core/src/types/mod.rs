//! Core types for StoryCuts.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod email;
pub mod id;
pub mod phone;
pub mod price;
pub mod status;

pub use catalog::{OFFER_PRICE, ShootPackage, VehicleCategory};
pub use email::{Email, EmailError};
pub use id::*;
pub use phone::{Phone, PhoneError};
pub use price::Price;
pub use status::*;
