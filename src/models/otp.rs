//! One-time code models.
//!
//! A one-time code gates the CHECKED_IN → STARTED transition of exactly one
//! event. Codes are related to events only by `event_id`; deleting one never
//! touches the other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a one-time code record from the store.
///
/// # Database Table
///
/// Maps to the `one_time_codes` table. At most one row exists per
/// `event_id`; issuing a new code replaces the previous one.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct OneTimeCode {
    pub id: Uuid,

    /// Event this code authorizes. Not checked for existence at issuance.
    pub event_id: Uuid,

    /// Four digit numeric code in `1000..=9999`.
    pub code: String,

    /// Flipped to true exactly once, by the atomic mark-verified step.
    pub is_verified: bool,

    pub expires_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OneTimeCode {
    /// Whether this code can still be redeemed at `now`.
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        !self.is_verified && self.expires_at > now
    }
}

/// Fields supplied when issuing a code.
#[derive(Debug, Clone)]
pub struct NewOneTimeCode {
    pub event_id: Uuid,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Request body for `POST /api/v1/events/{event_id}/verify-otp`.
///
/// ```json
/// { "otp": "4821" }
/// ```
#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub otp: String,
}

/// Response body for `POST /api/v1/events/{event_id}/send-otp`.
///
/// The code is echoed back because delivery is a mock channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueOtpResponse {
    pub message: String,
    pub otp: String,
}
