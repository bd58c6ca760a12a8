//! Vendor login models.
//!
//! Login is a mock: it echoes the configured vendor identity and issues no
//! session token. Callers present that identity later in `x-vendor-id`.

use serde::{Deserialize, Serialize};

/// Request body for `POST /api/v1/vendors/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub name: String,
}

/// Response body for vendor login.
///
/// ```json
/// { "vendorId": "vendor_123", "name": "Acme Stalls" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub vendor_id: String,
    pub name: String,
}
