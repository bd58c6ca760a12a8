//! Event data models, the lifecycle table, and API request/response types.
//!
//! This module defines:
//! - `Event`: Stored record of one vendor's engagement at a location
//! - `EventStatus` / `EventAction`: The closed lifecycle state machine
//! - `EventResponse`: Response body returned to clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Lifecycle status of an event.
///
/// Stored as the Postgres enum `event_status`.
///
/// ```text
/// (none) --check-in--> CHECKED_IN --[OTP verified]--> STARTED --post-setup--> COMPLETED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    CheckedIn,
    Started,
    Completed,
}

/// Actions that move an event through its lifecycle after check-in.
///
/// Check-in itself is not an action: it creates the record in `CheckedIn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    /// Driven only by a successful OTP verification.
    Start,
    PreSetup,
    PostSetup,
}

impl EventStatus {
    /// Look up the status reached by applying `action` in this status.
    ///
    /// # Transition Table
    ///
    /// | from \ action | Start   | PreSetup | PostSetup |
    /// |---------------|---------|----------|-----------|
    /// | CHECKED_IN    | STARTED | reject   | reject    |
    /// | STARTED       | STARTED | STARTED  | COMPLETED |
    /// | COMPLETED     | reject  | reject   | reject    |
    ///
    /// Start on an already started event is accepted and re-stamps `started_at`.
    ///
    /// # Errors
    ///
    /// - `InvalidState`: The action has no edge out of this status
    pub fn apply(self, action: EventAction) -> Result<EventStatus, AppError> {
        use EventAction::*;
        use EventStatus::*;

        match (self, action) {
            (CheckedIn | Started, Start) => Ok(Started),
            (Started, PreSetup) => Ok(Started),
            (Started, PostSetup) => Ok(Completed),
            (CheckedIn, PreSetup | PostSetup) => {
                Err(AppError::InvalidState("OTP not verified".to_string()))
            }
            (Completed, _) => Err(AppError::InvalidState(
                "Event already completed".to_string(),
            )),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::CheckedIn => "CHECKED_IN",
            EventStatus::Started => "STARTED",
            EventStatus::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents an event record from the store.
///
/// # Database Table
///
/// Maps to the `events` table. Location is stored flat as two columns and
/// nested back into `{ lat, lng }` by `EventResponse`.
///
/// # Field Consistency
///
/// - `started_at` is set iff `status` is `Started` or `Completed`
/// - `completed_at` is set iff `status` is `Completed`
/// - `checked_in_at <= started_at <= completed_at`
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Event {
    pub id: Uuid,

    /// Claimed owner, fixed at check-in.
    pub vendor_id: String,

    pub status: EventStatus,

    pub latitude: f64,
    pub longitude: f64,

    /// Opaque reference (client filename) of the check-in photo.
    pub check_in_photo: Option<String>,
    pub checked_in_at: DateTime<Utc>,

    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,

    pub pre_setup_photo: Option<String>,
    pub pre_setup_notes: Option<String>,
    pub post_setup_photo: Option<String>,
    pub post_setup_notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied at check-in. Everything else is derived by the store.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub vendor_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub check_in_photo: Option<String>,
    pub checked_in_at: DateTime<Utc>,
}

/// Check-in input after the multipart form has been parsed and validated.
#[derive(Debug, Clone)]
pub struct CheckInRequest {
    pub vendor_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub photo: Option<String>,
}

/// Pre-setup / post-setup input.
#[derive(Debug, Clone, Default)]
pub struct SetupRequest {
    pub photo: Option<String>,
    pub notes: Option<String>,
}

/// Latitude/longitude pair as exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

/// Response body for event endpoints.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "vendorId": "v1",
///   "status": "STARTED",
///   "location": { "lat": 12.9, "lng": 77.6 },
///   "checkInPhoto": "stall.jpg",
///   "checkedInAt": "2026-10-16T10:00:00Z",
///   "startedAt": "2026-10-16T10:02:00Z",
///   "completedAt": null,
///   "preSetupPhoto": null,
///   "preSetupNotes": null,
///   "postSetupPhoto": null,
///   "postSetupNotes": null,
///   "createdAt": "2026-10-16T10:00:00Z",
///   "updatedAt": "2026-10-16T10:02:00Z"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: Uuid,
    pub vendor_id: String,
    pub status: EventStatus,
    pub location: Location,
    pub check_in_photo: Option<String>,
    pub checked_in_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub pre_setup_photo: Option<String>,
    pub pre_setup_notes: Option<String>,
    pub post_setup_photo: Option<String>,
    pub post_setup_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            vendor_id: event.vendor_id,
            status: event.status,
            location: Location {
                lat: event.latitude,
                lng: event.longitude,
            },
            check_in_photo: event.check_in_photo,
            checked_in_at: event.checked_in_at,
            started_at: event.started_at,
            completed_at: event.completed_at,
            pre_setup_photo: event.pre_setup_photo,
            pre_setup_notes: event.pre_setup_notes,
            post_setup_photo: event.post_setup_photo,
            post_setup_notes: event.post_setup_notes,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

/// Plain `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
