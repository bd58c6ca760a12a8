//! Event lifecycle HTTP handlers.
//!
//! This module implements the event-related API endpoints:
//! - POST /api/v1/events/check-in - Create an event (multipart)
//! - POST /api/v1/events/{event_id}/send-otp - Issue a one-time code
//! - POST /api/v1/events/{event_id}/verify-otp - Redeem the code and start the event
//! - POST /api/v1/events/{event_id}/pre-setup - Record pre-setup photo and notes (multipart)
//! - POST /api/v1/events/{event_id}/post-setup - Record post-setup and complete (multipart)
//! - GET /api/v1/events/{event_id} - Fetch an event
//!
//! Photo uploads are reduced to the client filename; the bytes are discarded.

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State, multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    error::AppError,
    middleware::vendor::VendorClaim,
    models::{
        event::{CheckInRequest, EventResponse, MessageResponse, SetupRequest},
        otp::{IssueOtpResponse, VerifyOtpRequest},
    },
    services::{event_service, otp_service},
    state::AppState,
};

const PHOTO_FIELD: &str = "photo";

/// Check a vendor in at a location.
///
/// # Request Body (multipart/form-data)
///
/// - `vendorId` (required)
/// - `latitude`, `longitude` (required, numeric)
/// - `photo` (optional file)
///
/// # Response
///
/// - **Success (201 Created)**: The new event in `CHECKED_IN`
/// - **Error (400)**: Missing or malformed field
pub async fn check_in(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<EventResponse>), AppError> {
    let form = read_form(multipart).await?;

    let request = CheckInRequest {
        vendor_id: form.required("vendorId")?.to_string(),
        latitude: form.coordinate("latitude")?,
        longitude: form.coordinate("longitude")?,
        photo: form.photo,
    };

    let event = event_service::check_in(state.events.as_ref(), request).await?;

    Ok((StatusCode::CREATED, Json(event.into())))
}

/// Issue a one-time code for an event.
///
/// # Response (200)
///
/// ```json
/// { "message": "OTP sent (mock)", "otp": "4821" }
/// ```
///
/// The code is returned directly because delivery is mocked.
pub async fn send_otp(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<IssueOtpResponse>, AppError> {
    let issued = otp_service::issue_otp(
        state.otps.as_ref(),
        state.notifier.as_ref(),
        state.otp_ttl,
        &event_id,
    )
    .await?;

    Ok(Json(IssueOtpResponse {
        message: "OTP sent (mock)".to_string(),
        otp: issued.code,
    }))
}

/// Redeem a one-time code, moving the event to `STARTED`.
///
/// # Request Body
///
/// ```json
/// { "otp": "4821" }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: `{ "message": "Event started" }`
/// - **Error (400)**: Invalid or expired OTP, or a body without a string `otp`
/// - **Error (404)**: Code matched but the event no longer exists
pub async fn verify_otp(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    payload: Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(request) = payload?;

    otp_service::verify_otp(
        state.otps.as_ref(),
        state.events.as_ref(),
        &event_id,
        &request.otp,
    )
    .await?;

    Ok(Json(MessageResponse::new("Event started")))
}

/// Record pre-setup evidence.
///
/// # Headers
///
/// `x-vendor-id` must match the vendor that checked in. A missing header is
/// only rejected once the event is known to exist.
///
/// # Request Body (multipart/form-data)
///
/// - `photo` (optional file)
/// - `notes` (optional text)
///
/// # Response
///
/// - **Success (200 OK)**: `{ "message": "Pre-setup saved" }`
/// - **Error (403)**: Vendor mismatch
/// - **Error (404)**: Event not found
/// - **Error (409)**: OTP not verified yet, or event completed
pub async fn pre_setup(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Extension(claim): Extension<VendorClaim>,
    multipart: Multipart,
) -> Result<Json<MessageResponse>, AppError> {
    let event_id = event_service::parse_event_id(&event_id)?;
    let form = read_form(multipart).await?;

    event_service::pre_setup(
        state.events.as_ref(),
        event_id,
        &claim.vendor_id,
        form.into_setup(),
    )
    .await?;

    Ok(Json(MessageResponse::new("Pre-setup saved")))
}

/// Record post-setup evidence and complete the event.
///
/// Same headers, body and errors as pre-setup.
pub async fn post_setup(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Extension(claim): Extension<VendorClaim>,
    multipart: Multipart,
) -> Result<Json<MessageResponse>, AppError> {
    let event_id = event_service::parse_event_id(&event_id)?;
    let form = read_form(multipart).await?;

    event_service::post_setup(
        state.events.as_ref(),
        event_id,
        &claim.vendor_id,
        form.into_setup(),
    )
    .await?;

    Ok(Json(MessageResponse::new("Event completed successfully")))
}

/// Fetch an event owned by the calling vendor.
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Extension(claim): Extension<VendorClaim>,
) -> Result<Json<EventResponse>, AppError> {
    let event_id = event_service::parse_event_id(&event_id)?;

    let event = event_service::get_event(state.events.as_ref(), event_id, &claim.vendor_id).await?;

    Ok(Json(event.into()))
}

/// Text fields and photo reference collected from a multipart body.
#[derive(Debug, Default)]
struct FormFields {
    text: HashMap<String, String>,
    photo: Option<String>,
}

impl FormFields {
    fn required(&self, name: &str) -> Result<&str, AppError> {
        self.text
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| AppError::InvalidArgument(format!("{name} is required")))
    }

    fn coordinate(&self, name: &str) -> Result<f64, AppError> {
        self.required(name)?
            .trim()
            .parse::<f64>()
            .map_err(|_| AppError::InvalidArgument(format!("{name} must be a number")))
    }

    fn into_setup(mut self) -> SetupRequest {
        SetupRequest {
            photo: self.photo,
            notes: self.text.remove("notes"),
        }
    }
}

async fn read_form(mut multipart: Multipart) -> Result<FormFields, AppError> {
    let mut form = FormFields::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == PHOTO_FIELD {
            let file_name = field
                .file_name()
                .filter(|n| !n.is_empty())
                .map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;
            tracing::debug!(file_name = ?file_name, size = bytes.len(), "Photo received");
            form.photo = file_name;
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            form.text.insert(name, value);
        }
    }

    Ok(form)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::InvalidArgument(err.body_text())
    }
}
