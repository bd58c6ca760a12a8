//! HTTP router assembly.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handlers, middleware, state::AppState};

/// Build the full application router.
///
/// # Route Groups
///
/// - Open: health, mock login, check-in, OTP issue and verify
/// - Vendor-gated (`x-vendor-id` required): pre-setup, post-setup, event lookup
pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;

    let vendor_routes = Router::new()
        .route(
            "/api/v1/events/{event_id}",
            get(handlers::events::get_event),
        )
        .route(
            "/api/v1/events/{event_id}/pre-setup",
            post(handlers::events::pre_setup),
        )
        .route(
            "/api/v1/events/{event_id}/post-setup",
            post(handlers::events::post_setup),
        )
        .route_layer(axum_middleware::from_fn(
            middleware::vendor::vendor_claim_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/v1/vendors/login", post(handlers::vendors::login))
        .route("/api/v1/events/check-in", post(handlers::events::check_in))
        .route(
            "/api/v1/events/{event_id}/send-otp",
            post(handlers::events::send_otp),
        )
        .route(
            "/api/v1/events/{event_id}/verify-otp",
            post(handlers::events::verify_otp),
        )
        .merge(vendor_routes)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        // Browser client is served from a different origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
