//! Booking service module
//!
//! This module provides the availability engine for rental bookings:
//! - Day-by-day peak reservation computation
//! - Hold creation with atomic availability checks
//! - Booking lifecycle transitions (confirm, cancel, complete)
//! - Expiry sweep for lapsed holds

pub mod availability;
mod config;
mod service;
mod sweep;

#[cfg(test)]
mod tests;

pub use availability::{peak_reserved, PeakReservation};
pub use config::BookingServiceConfig;
pub use service::BookingService;
pub use sweep::{BookingSweepService, SweepConfig, SweepResult};
