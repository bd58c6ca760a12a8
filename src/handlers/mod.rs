//! HTTP request handlers (route handlers).
//!
//! Handlers extract request data, call into `services`, and map results to
//! JSON responses. Lifecycle rules live in the services, not here.

/// Event lifecycle and OTP endpoints
pub mod events;
/// Service health probe
pub mod health;
/// Mock vendor login
pub mod vendors;
