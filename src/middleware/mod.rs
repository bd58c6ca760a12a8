//! HTTP middleware components.

/// Vendor identity claim extraction
pub mod vendor;
