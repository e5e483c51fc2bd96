//! StoryCuts server library.
//!
//! This crate provides the booking/payment service as a library, allowing
//! the state machine and payment reconciliation to be tested against
//! in-memory stores and gateways.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
