//! StoryCuts Core - Shared domain types.
//!
//! This crate provides common types used across all StoryCuts components:
//! - `server` - Booking and payment HTTP service
//! - `cli` - Command-line tools for migrations and role management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. Pricing and lifecycle rules that must hold everywhere (the
//! base-price catalog, the booking-status transition graph) live here so the
//! server and its tests share one definition.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, contact fields, prices,
//!   the package catalog, and booking/payment statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
