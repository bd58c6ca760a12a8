//! Business logic services.
//!
//! Services contain the lifecycle rules, separated from HTTP handlers and
//! from the store implementations.

pub mod event_service;
pub mod notifier;
pub mod otp_service;
