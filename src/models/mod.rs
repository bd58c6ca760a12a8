//! Data models for stored records and API payloads.

/// Event record and lifecycle table
pub mod event;
/// One-time code record
pub mod otp;
/// Vendor login payloads
pub mod vendor;
