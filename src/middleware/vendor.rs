//! Vendor identity claim middleware.
//!
//! Vendor-gated routes carry the caller's identity in the `x-vendor-id`
//! header. This middleware lifts it into a `VendorClaim` extension; the
//! services then compare it with the event owner.
//!
//! A missing header is not rejected here. It becomes an empty claim, which
//! never owns an event, so the request still fails `Forbidden` but only after
//! the event id has parsed and resolved.

use axum::{extract::Request, middleware::Next, response::Response};

/// Header carrying the caller's vendor identity.
pub const VENDOR_ID_HEADER: &str = "x-vendor-id";

/// Vendor identity claimed by the current request.
///
/// This is a claim, not an authenticated identity: it only has to match the
/// vendor id the event was checked in with. Empty when the header is absent.
#[derive(Debug, Clone)]
pub struct VendorClaim {
    pub vendor_id: String,
}

/// Extract `x-vendor-id` into a `VendorClaim` extension.
///
/// Missing, blank, or non UTF-8 headers all yield an empty claim.
pub async fn vendor_claim_middleware(mut request: Request, next: Next) -> Response {
    let vendor_id = request
        .headers()
        .get(VENDOR_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    if vendor_id.is_empty() {
        tracing::debug!(path = %request.uri().path(), "No vendor identity on request");
    }

    request.extensions_mut().insert(VendorClaim { vendor_id });

    next.run(request).await
}
