//! In-memory store.
//!
//! Used when no `DATABASE_URL` is configured, and by the test suites.
//! Every operation runs under one lock per table, so each trait method is
//! atomic the same way a single SQL statement is.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::event::{Event, EventStatus, NewEvent};
use crate::models::otp::{NewOneTimeCode, OneTimeCode};
use crate::store::{EventStore, OtpStore};

/// Process-local event and OTP tables.
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: Mutex<HashMap<Uuid, Event>>,
    codes: Mutex<Vec<OneTimeCode>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of codes currently held for an event, expired or not.
    pub async fn code_count(&self, event_id: Uuid) -> usize {
        self.codes
            .lock()
            .await
            .iter()
            .filter(|c| c.event_id == event_id)
            .count()
    }

    /// Drop an event record, simulating a deletion by another writer.
    pub async fn remove_event(&self, id: Uuid) -> Option<Event> {
        self.events.lock().await.remove(&id)
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_event(&self, new: NewEvent) -> Result<Event, AppError> {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            vendor_id: new.vendor_id,
            status: EventStatus::CheckedIn,
            latitude: new.latitude,
            longitude: new.longitude,
            check_in_photo: new.check_in_photo,
            checked_in_at: new.checked_in_at,
            started_at: None,
            completed_at: None,
            pre_setup_photo: None,
            pre_setup_notes: None,
            post_setup_photo: None,
            post_setup_notes: None,
            created_at: now,
            updated_at: now,
        };

        self.events.lock().await.insert(event.id, event.clone());
        Ok(event)
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        Ok(self.events.lock().await.get(&id).cloned())
    }

    async fn save_event(
        &self,
        event: &Event,
        expected: EventStatus,
    ) -> Result<Option<Event>, AppError> {
        let mut events = self.events.lock().await;

        let Some(stored) = events.get_mut(&event.id) else {
            return Ok(None);
        };
        if stored.status != expected {
            return Ok(None);
        }

        // Identity, owner, location and check-in fields are immutable
        stored.status = event.status;
        stored.started_at = event.started_at;
        stored.completed_at = event.completed_at;
        stored.pre_setup_photo = event.pre_setup_photo.clone();
        stored.pre_setup_notes = event.pre_setup_notes.clone();
        stored.post_setup_photo = event.post_setup_photo.clone();
        stored.post_setup_notes = event.post_setup_notes.clone();
        stored.updated_at = Utc::now();

        Ok(Some(stored.clone()))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl OtpStore for MemoryStore {
    async fn replace_codes(&self, new: NewOneTimeCode) -> Result<OneTimeCode, AppError> {
        let now = Utc::now();
        let code = OneTimeCode {
            id: Uuid::new_v4(),
            event_id: new.event_id,
            code: new.code,
            is_verified: false,
            expires_at: new.expires_at,
            created_at: now,
            updated_at: now,
        };

        let mut codes = self.codes.lock().await;
        codes.retain(|c| c.event_id != new.event_id);
        codes.push(code.clone());

        Ok(code)
    }

    async fn mark_verified(
        &self,
        event_id: Uuid,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<OneTimeCode>, AppError> {
        let mut codes = self.codes.lock().await;

        let matched = codes
            .iter_mut()
            .find(|c| c.event_id == event_id && c.code == code && c.is_redeemable(now));

        Ok(matched.map(|c| {
            c.is_verified = true;
            c.updated_at = Utc::now();
            c.clone()
        }))
    }

    async fn delete_codes(&self, event_id: Uuid) -> Result<u64, AppError> {
        let mut codes = self.codes.lock().await;
        let before = codes.len();
        codes.retain(|c| c.event_id != event_id);

        Ok((before - codes.len()) as u64)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut codes = self.codes.lock().await;
        let before = codes.len();
        codes.retain(|c| c.expires_at > now);

        Ok((before - codes.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_event() -> NewEvent {
        NewEvent {
            vendor_id: "v1".to_string(),
            latitude: 12.9,
            longitude: 77.6,
            check_in_photo: None,
            checked_in_at: Utc::now(),
        }
    }

    fn new_code(event_id: Uuid, code: &str, ttl: Duration) -> NewOneTimeCode {
        NewOneTimeCode {
            event_id,
            code: code.to_string(),
            expires_at: Utc::now() + ttl,
        }
    }

    #[tokio::test]
    async fn insert_starts_checked_in() {
        let store = MemoryStore::new();
        let event = store.insert_event(new_event()).await.unwrap();

        assert_eq!(event.status, EventStatus::CheckedIn);
        assert_eq!(store.find_event(event.id).await.unwrap(), Some(event));
    }

    #[tokio::test]
    async fn save_rejects_stale_expected_status() {
        let store = MemoryStore::new();
        let mut event = store.insert_event(new_event()).await.unwrap();

        event.status = EventStatus::Started;
        event.started_at = Some(Utc::now());

        assert!(
            store
                .save_event(&event, EventStatus::Started)
                .await
                .unwrap()
                .is_none()
        );
        let saved = store
            .save_event(&event, EventStatus::CheckedIn)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved.status, EventStatus::Started);
    }

    #[tokio::test]
    async fn save_never_touches_owner_or_location() {
        let store = MemoryStore::new();
        let mut event = store.insert_event(new_event()).await.unwrap();

        event.vendor_id = "intruder".to_string();
        event.latitude = 0.0;
        let saved = store
            .save_event(&event, EventStatus::CheckedIn)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(saved.vendor_id, "v1");
        assert_eq!(saved.latitude, 12.9);
    }

    #[tokio::test]
    async fn replace_keeps_a_single_code_per_event() {
        let store = MemoryStore::new();
        let event_id = Uuid::new_v4();
        let other = Uuid::new_v4();

        store
            .replace_codes(new_code(event_id, "1111", Duration::minutes(5)))
            .await
            .unwrap();
        store
            .replace_codes(new_code(other, "3333", Duration::minutes(5)))
            .await
            .unwrap();
        store
            .replace_codes(new_code(event_id, "2222", Duration::minutes(5)))
            .await
            .unwrap();

        assert_eq!(store.code_count(event_id).await, 1);
        assert_eq!(store.code_count(other).await, 1);
        let now = Utc::now();
        assert!(store.mark_verified(event_id, "1111", now).await.unwrap().is_none());
        assert!(store.mark_verified(event_id, "2222", now).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn mark_verified_succeeds_once() {
        let store = MemoryStore::new();
        let event_id = Uuid::new_v4();
        store
            .replace_codes(new_code(event_id, "4821", Duration::minutes(5)))
            .await
            .unwrap();

        let now = Utc::now();
        let first = store.mark_verified(event_id, "4821", now).await.unwrap();
        assert!(first.is_some_and(|c| c.is_verified));
        assert!(store.mark_verified(event_id, "4821", now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn mark_verified_ignores_expired_codes() {
        let store = MemoryStore::new();
        let event_id = Uuid::new_v4();
        store
            .replace_codes(new_code(event_id, "4821", Duration::seconds(-1)))
            .await
            .unwrap();

        assert!(
            store
                .mark_verified(event_id, "4821", Utc::now())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn purge_removes_only_expired_codes() {
        let store = MemoryStore::new();
        let live = Uuid::new_v4();
        let stale = Uuid::new_v4();
        store
            .replace_codes(new_code(live, "1234", Duration::minutes(5)))
            .await
            .unwrap();
        store
            .replace_codes(new_code(stale, "5678", Duration::seconds(-30)))
            .await
            .unwrap();

        assert_eq!(store.purge_expired(Utc::now()).await.unwrap(), 1);
        assert_eq!(store.code_count(live).await, 1);
        assert_eq!(store.code_count(stale).await, 0);
    }

    #[tokio::test]
    async fn delete_codes_reports_removed_count() {
        let store = MemoryStore::new();
        let event_id = Uuid::new_v4();
        store
            .replace_codes(new_code(event_id, "1234", Duration::minutes(5)))
            .await
            .unwrap();

        assert_eq!(store.delete_codes(event_id).await.unwrap(), 1);
        assert_eq!(store.delete_codes(event_id).await.unwrap(), 0);
    }
}
