//! Event lifecycle service.
//!
//! Owns the event record and drives it through the lifecycle table in
//! `EventStatus::apply`. Every status change goes through `transition`,
//! which checks preconditions in a fixed order:
//!
//! 1. Event exists (`EventNotFound`)
//! 2. Caller owns the event (`Forbidden`), when a vendor claim applies
//! 3. Current status allows the action (`InvalidState`)
//!
//! The write is a compare-and-swap on the status read in step 3, so two
//! requests racing on the same event cannot both apply.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::event::{CheckInRequest, Event, EventAction, NewEvent, SetupRequest};
use crate::store::EventStore;

/// Parse a path segment into an event id.
///
/// # Errors
///
/// - `InvalidArgument`: Not a well-formed UUID
pub fn parse_event_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidArgument("Invalid eventId".to_string()))
}

/// Vendor ownership predicate shared by every vendor-gated operation.
///
/// # Errors
///
/// - `Forbidden`: `claimed_vendor_id` is empty or not the event's owner
pub fn ensure_vendor(event: &Event, claimed_vendor_id: &str) -> Result<(), AppError> {
    if claimed_vendor_id.is_empty() || event.vendor_id != claimed_vendor_id {
        tracing::warn!(event_id = %event.id, "Vendor does not own event");
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Create a new event in `CheckedIn`.
///
/// No ownership check applies: the caller establishes ownership by
/// supplying the vendor id.
///
/// # Errors
///
/// - `InvalidArgument`: Latitude or longitude is not a finite number
/// - `Database`: Store error occurred
pub async fn check_in(events: &dyn EventStore, request: CheckInRequest) -> Result<Event, AppError> {
    if !request.latitude.is_finite() || !request.longitude.is_finite() {
        return Err(AppError::InvalidArgument(
            "latitude and longitude must be finite numbers".to_string(),
        ));
    }

    let event = events
        .insert_event(NewEvent {
            vendor_id: request.vendor_id,
            latitude: request.latitude,
            longitude: request.longitude,
            check_in_photo: request.photo,
            checked_in_at: Utc::now(),
        })
        .await?;

    tracing::info!(event_id = %event.id, vendor_id = %event.vendor_id, "Vendor checked in");

    Ok(event)
}

/// Fetch an event on behalf of its owner.
pub async fn get_event(
    events: &dyn EventStore,
    event_id: Uuid,
    claimed_vendor_id: &str,
) -> Result<Event, AppError> {
    let event = events
        .find_event(event_id)
        .await?
        .ok_or(AppError::EventNotFound)?;

    ensure_vendor(&event, claimed_vendor_id)?;

    Ok(event)
}

/// Move an event into `Started`.
///
/// Only reachable through a successful OTP verification, so no vendor claim
/// is checked here: possession of the code is the authorization.
///
/// # Errors
///
/// - `EventNotFound`: Event id does not resolve
/// - `InvalidState`: Event is already completed
pub async fn start_event(events: &dyn EventStore, event_id: Uuid) -> Result<Event, AppError> {
    transition(events, event_id, None, EventAction::Start, |event| {
        let floor = event.checked_in_at;
        event.started_at = Some(stamp_after(floor));
    })
    .await
}

/// Record pre-setup photo and notes. Status stays `Started`.
///
/// Repeat calls overwrite the previous photo and notes.
///
/// # Errors
///
/// - `EventNotFound`, `Forbidden`, `InvalidState` (`"OTP not verified"` before start)
pub async fn pre_setup(
    events: &dyn EventStore,
    event_id: Uuid,
    claimed_vendor_id: &str,
    request: SetupRequest,
) -> Result<Event, AppError> {
    transition(
        events,
        event_id,
        Some(claimed_vendor_id),
        EventAction::PreSetup,
        |event| {
            event.pre_setup_photo = request.photo;
            event.pre_setup_notes = request.notes;
        },
    )
    .await
}

/// Record post-setup photo and notes and complete the event.
///
/// # Errors
///
/// - `EventNotFound`, `Forbidden`, `InvalidState`
pub async fn post_setup(
    events: &dyn EventStore,
    event_id: Uuid,
    claimed_vendor_id: &str,
    request: SetupRequest,
) -> Result<Event, AppError> {
    transition(
        events,
        event_id,
        Some(claimed_vendor_id),
        EventAction::PostSetup,
        |event| {
            let floor = event.started_at.unwrap_or(event.checked_in_at);
            event.post_setup_photo = request.photo;
            event.post_setup_notes = request.notes;
            event.completed_at = Some(stamp_after(floor));
        },
    )
    .await
}

async fn transition<F>(
    events: &dyn EventStore,
    event_id: Uuid,
    claimed_vendor_id: Option<&str>,
    action: EventAction,
    mutate: F,
) -> Result<Event, AppError>
where
    F: FnOnce(&mut Event) + Send,
{
    let mut event = events
        .find_event(event_id)
        .await?
        .ok_or(AppError::EventNotFound)?;

    if let Some(claimed) = claimed_vendor_id {
        ensure_vendor(&event, claimed)?;
    }

    let expected = event.status;
    event.status = expected.apply(action)?;
    mutate(&mut event);

    match events.save_event(&event, expected).await? {
        Some(saved) => {
            tracing::info!(
                event_id = %saved.id,
                action = ?action,
                from = %expected,
                to = %saved.status,
                "Event transitioned"
            );
            Ok(saved)
        }
        None => Err(lost_race(events, event_id, action).await),
    }
}

/// Classify a failed compare-and-swap after re-reading the record.
async fn lost_race(events: &dyn EventStore, event_id: Uuid, action: EventAction) -> AppError {
    match events.find_event(event_id).await {
        Ok(None) => AppError::EventNotFound,
        Ok(Some(current)) => {
            tracing::warn!(event_id = %event_id, action = ?action, status = %current.status, "Concurrent update won");
            match current.status.apply(action) {
                Err(err) => err,
                Ok(_) => AppError::InvalidState("Event was modified concurrently".to_string()),
            }
        }
        Err(err) => err,
    }
}

/// Current time, clamped so lifecycle timestamps never run backwards.
fn stamp_after(floor: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(floor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::EventStatus;
    use crate::store::MemoryStore;
    use chrono::Duration;

    fn check_in_request(vendor_id: &str) -> CheckInRequest {
        CheckInRequest {
            vendor_id: vendor_id.to_string(),
            latitude: 12.9,
            longitude: 77.6,
            photo: Some("stall.jpg".to_string()),
        }
    }

    fn notes(text: &str) -> SetupRequest {
        SetupRequest {
            photo: Some(format!("{text}.jpg")),
            notes: Some(text.to_string()),
        }
    }

    async fn started_event(store: &MemoryStore) -> Event {
        let event = check_in(store, check_in_request("v1")).await.unwrap();
        start_event(store, event.id).await.unwrap()
    }

    #[tokio::test]
    async fn check_in_creates_checked_in_event() {
        let store = MemoryStore::new();
        let event = check_in(&store, check_in_request("v1")).await.unwrap();

        assert_eq!(event.status, EventStatus::CheckedIn);
        assert_eq!(event.vendor_id, "v1");
        assert_eq!(event.check_in_photo.as_deref(), Some("stall.jpg"));
        assert!(event.started_at.is_none());
        assert!(event.completed_at.is_none());
    }

    #[tokio::test]
    async fn check_in_rejects_non_finite_coordinates() {
        let store = MemoryStore::new();
        let mut request = check_in_request("v1");
        request.latitude = f64::NAN;

        assert!(matches!(
            check_in(&store, request).await,
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn start_stamps_started_at() {
        let store = MemoryStore::new();
        let event = started_event(&store).await;

        assert_eq!(event.status, EventStatus::Started);
        assert!(event.started_at.unwrap() >= event.checked_in_at);
    }

    #[tokio::test]
    async fn start_on_missing_event_is_not_found() {
        let store = MemoryStore::new();

        assert!(matches!(
            start_event(&store, Uuid::new_v4()).await,
            Err(AppError::EventNotFound)
        ));
    }

    #[tokio::test]
    async fn setup_before_start_is_invalid_state() {
        let store = MemoryStore::new();
        let event = check_in(&store, check_in_request("v1")).await.unwrap();

        let pre = pre_setup(&store, event.id, "v1", notes("ok")).await;
        let post = post_setup(&store, event.id, "v1", notes("done")).await;

        assert!(matches!(pre, Err(AppError::InvalidState(ref m)) if m == "OTP not verified"));
        assert!(matches!(post, Err(AppError::InvalidState(ref m)) if m == "OTP not verified"));
    }

    #[tokio::test]
    async fn wrong_vendor_is_forbidden_in_every_status() {
        let store = MemoryStore::new();
        let checked_in = check_in(&store, check_in_request("v1")).await.unwrap();
        let started = started_event(&store).await;
        let completed = started_event(&store).await;
        post_setup(&store, completed.id, "v1", notes("done"))
            .await
            .unwrap();

        for id in [checked_in.id, started.id, completed.id] {
            assert!(matches!(
                pre_setup(&store, id, "v2", notes("x")).await,
                Err(AppError::Forbidden)
            ));
            assert!(matches!(
                post_setup(&store, id, "v2", notes("x")).await,
                Err(AppError::Forbidden)
            ));
            assert!(matches!(
                get_event(&store, id, "v2").await,
                Err(AppError::Forbidden)
            ));
        }
    }

    #[tokio::test]
    async fn empty_claim_never_owns_an_event() {
        let store = MemoryStore::new();
        let event = started_event(&store).await;

        assert!(matches!(
            get_event(&store, event.id, "").await,
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            get_event(&store, Uuid::new_v4(), "").await,
            Err(AppError::EventNotFound)
        ));
    }

    #[tokio::test]
    async fn restart_restamps_started_at_without_going_backwards() {
        let store = MemoryStore::new();
        let first = started_event(&store).await;

        let second = start_event(&store, first.id).await.unwrap();

        assert_eq!(second.status, EventStatus::Started);
        assert!(second.started_at.unwrap() >= first.started_at.unwrap());
        assert!(second.started_at.unwrap() >= second.checked_in_at);
        assert!(second.completed_at.is_none());
    }

    #[tokio::test]
    async fn pre_setup_records_and_can_repeat() {
        let store = MemoryStore::new();
        let event = started_event(&store).await;

        pre_setup(&store, event.id, "v1", notes("first")).await.unwrap();
        let updated = pre_setup(&store, event.id, "v1", notes("second"))
            .await
            .unwrap();

        assert_eq!(updated.status, EventStatus::Started);
        assert_eq!(updated.pre_setup_notes.as_deref(), Some("second"));
        assert_eq!(updated.pre_setup_photo.as_deref(), Some("second.jpg"));
        assert_eq!(updated.started_at, event.started_at);
    }

    #[tokio::test]
    async fn post_setup_completes_with_ordered_timestamps() {
        let store = MemoryStore::new();
        let event = started_event(&store).await;

        let done = post_setup(&store, event.id, "v1", notes("done"))
            .await
            .unwrap();

        assert_eq!(done.status, EventStatus::Completed);
        assert_eq!(done.post_setup_notes.as_deref(), Some("done"));
        let started_at = done.started_at.unwrap();
        let completed_at = done.completed_at.unwrap();
        assert!(completed_at >= started_at);
        assert!(started_at >= done.checked_in_at);
    }

    #[tokio::test]
    async fn completed_event_rejects_further_transitions() {
        let store = MemoryStore::new();
        let event = started_event(&store).await;
        post_setup(&store, event.id, "v1", notes("done"))
            .await
            .unwrap();

        assert!(matches!(
            post_setup(&store, event.id, "v1", notes("again")).await,
            Err(AppError::InvalidState(_))
        ));
        assert!(matches!(
            start_event(&store, event.id).await,
            Err(AppError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn stamps_never_precede_their_floor() {
        let future = Utc::now() + Duration::hours(1);
        assert_eq!(stamp_after(future), future);
    }

    #[test]
    fn malformed_event_id_is_invalid_argument() {
        assert!(matches!(
            parse_event_id("not-a-uuid"),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(parse_event_id(&Uuid::new_v4().to_string()).is_ok());
    }
}
