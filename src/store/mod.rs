//! Persistent store abstraction.
//!
//! The lifecycle and OTP services only see these traits. Each method is a
//! single atomic step against the backing store; multi-step flows (verify,
//! then start) are composed by the services.
//!
//! - `PgStore`: PostgreSQL via sqlx
//! - `MemoryStore`: in-process maps behind a lock (development and tests)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::event::{Event, EventStatus, NewEvent};
use crate::models::otp::{NewOneTimeCode, OneTimeCode};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Event records.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Create a new event in `CheckedIn`.
    async fn insert_event(&self, new: NewEvent) -> Result<Event, AppError>;

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, AppError>;

    /// Persist the mutable fields of `event` if the stored status is still `expected`.
    ///
    /// Returns `None` when the record is gone or its status moved on.
    async fn save_event(
        &self,
        event: &Event,
        expected: EventStatus,
    ) -> Result<Option<Event>, AppError>;

    /// Cheap connectivity probe for health checks.
    async fn ping(&self) -> Result<(), AppError>;
}

/// One-time code records.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Drop every code for `new.event_id` and store `new` in their place.
    async fn replace_codes(&self, new: NewOneTimeCode) -> Result<OneTimeCode, AppError>;

    /// Atomically flag the matching code as verified.
    ///
    /// Matches on event id, code, `is_verified == false` and `expires_at > now`.
    /// Concurrent callers racing on the same code see at most one `Some`.
    async fn mark_verified(
        &self,
        event_id: Uuid,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<OneTimeCode>, AppError>;

    /// Remove all codes for an event. Returns the number removed.
    async fn delete_codes(&self, event_id: Uuid) -> Result<u64, AppError>;

    /// Remove codes whose `expires_at` is at or before `now`.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}
