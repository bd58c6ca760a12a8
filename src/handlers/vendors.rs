//! Vendor login handler.

use crate::{
    models::vendor::{LoginRequest, LoginResponse},
    state::AppState,
};
use axum::{Json, extract::State};

/// Mock vendor login.
///
/// # Endpoint
///
/// `POST /api/v1/vendors/login`
///
/// # Response (200)
///
/// ```json
/// { "vendorId": "vendor_123", "name": "Acme Stalls" }
/// ```
///
/// Every caller receives the configured mock vendor id. No token is issued;
/// later requests present the id in `x-vendor-id`.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Json<LoginResponse> {
    tracing::info!(name = %request.name, "Vendor login (mock)");

    Json(LoginResponse {
        vendor_id: state.mock_vendor_id.clone(),
        name: request.name,
    })
}
