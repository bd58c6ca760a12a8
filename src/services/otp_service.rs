//! OTP authority.
//!
//! Issues and redeems four digit one-time codes that gate the
//! CHECKED_IN → STARTED transition.
//!
//! # Guarantees
//!
//! - At most one live code per event: issuing replaces any previous code
//! - Single use: the mark-verified step is one atomic conditional update,
//!   so concurrent attempts with the same code yield at most one success
//! - Expired codes never verify, whether or not the sweeper has purged them
//! - Failures are undifferentiated: wrong, expired and reused codes all
//!   surface as `InvalidOrExpiredOtp`

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::Rng;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::event::Event;
use crate::models::otp::{NewOneTimeCode, OneTimeCode};
use crate::services::event_service;
use crate::services::notifier::{OtpDelivery, OtpNotifier};
use crate::store::{EventStore, OtpStore};

/// Issue a fresh code for an event.
///
/// # Process
///
/// 1. Validate that `raw_event_id` is a well-formed id
/// 2. Replace any existing codes for the event with a new one
/// 3. Hand the code to the delivery channel
///
/// The event is not looked up: a code may be issued for an id that does not
/// resolve, and verification then fails when it tries to start the event.
///
/// # Errors
///
/// - `InvalidArgument`: Malformed event id
/// - `Notification`: Delivery failed (the code is already stored)
/// - `Database`: Store error occurred
pub async fn issue_otp(
    otps: &dyn OtpStore,
    notifier: &dyn OtpNotifier,
    ttl: Duration,
    raw_event_id: &str,
) -> Result<OneTimeCode, AppError> {
    let event_id = event_service::parse_event_id(raw_event_id)?;

    let issued = otps
        .replace_codes(NewOneTimeCode {
            event_id,
            code: generate_code(),
            expires_at: Utc::now() + ttl,
        })
        .await?;

    notifier
        .deliver(&OtpDelivery {
            event_id,
            code: issued.code.clone(),
            expires_at: issued.expires_at,
        })
        .await?;

    Ok(issued)
}

/// Redeem a code and start its event.
///
/// # Process
///
/// 1. Atomically mark the matching code verified
/// 2. Delete every code for the event
/// 3. Start the event
///
/// Once step 1 succeeds the code is consumed for good. If step 3 then fails
/// (the event vanished or is already completed) the error is returned and the
/// code stays consumed.
///
/// # Errors
///
/// - `InvalidOrExpiredOtp`: No unverified, unexpired code matched
/// - `EventNotFound`: Code matched but the event does not exist
/// - `InvalidState`: Code matched but the event is already completed
pub async fn verify_otp(
    otps: &dyn OtpStore,
    events: &dyn EventStore,
    raw_event_id: &str,
    code: &str,
) -> Result<Event, AppError> {
    // A malformed id can never match a stored code
    let Ok(event_id) = Uuid::parse_str(raw_event_id) else {
        tracing::warn!(event_id = %raw_event_id, "OTP verification rejected");
        return Err(AppError::InvalidOrExpiredOtp);
    };

    if otps
        .mark_verified(event_id, code, Utc::now())
        .await?
        .is_none()
    {
        tracing::warn!(event_id = %event_id, "OTP verification rejected");
        return Err(AppError::InvalidOrExpiredOtp);
    }

    let removed = otps.delete_codes(event_id).await?;
    tracing::debug!(event_id = %event_id, removed, "Consumed OTP cleared");

    event_service::start_event(events, event_id)
        .await
        .inspect_err(|err| {
            tracing::error!(event_id = %event_id, error = %err, "OTP consumed but event could not start");
        })
}

/// Uniform four digit code in `1000..=9999`.
///
/// Not meant to be unguessable; the short TTL and single use bound exposure.
pub fn generate_code() -> String {
    rand::rng().random_range(1000..=9999u16).to_string()
}

/// Periodically delete expired codes.
///
/// Stands in for a store-level TTL index. Runs until the runtime shuts down.
pub fn spawn_expiry_sweeper(otps: Arc<dyn OtpStore>, every: std::time::Duration) -> JoinHandle<()> {
    let every = every.max(std::time::Duration::from_secs(1));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            match otps.purge_expired(Utc::now()).await {
                Ok(0) => {}
                Ok(purged) => tracing::debug!(purged, "Expired OTPs purged"),
                Err(err) => tracing::warn!(error = %err, "OTP purge failed"),
            }
        }
    })
}
