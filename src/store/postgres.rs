//! PostgreSQL implementation of the event and OTP stores.
//!
//! # Atomicity
//!
//! - Issuing a code is a single upsert on the unique `event_id`
//! - Marking a code verified is a single conditional `UPDATE ... RETURNING`
//! - Event saves compare-and-swap on the expected status

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::event::{Event, EventStatus, NewEvent};
use crate::models::otp::{NewOneTimeCode, OneTimeCode};
use crate::store::{EventStore, OtpStore};

/// Store backed by a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn insert_event(&self, new: NewEvent) -> Result<Event, AppError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (
                vendor_id,
                status,
                latitude,
                longitude,
                check_in_photo,
                checked_in_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(new.vendor_id)
        .bind(EventStatus::CheckedIn)
        .bind(new.latitude)
        .bind(new.longitude)
        .bind(new.check_in_photo)
        .bind(new.checked_in_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    async fn save_event(
        &self,
        event: &Event,
        expected: EventStatus,
    ) -> Result<Option<Event>, AppError> {
        // The status guard turns a lost race into zero rows instead of an overwrite
        let saved = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET status = $2,
                started_at = $3,
                completed_at = $4,
                pre_setup_photo = $5,
                pre_setup_notes = $6,
                post_setup_photo = $7,
                post_setup_notes = $8,
                updated_at = NOW()
            WHERE id = $1 AND status = $9
            RETURNING *
            "#,
        )
        .bind(event.id)
        .bind(event.status)
        .bind(event.started_at)
        .bind(event.completed_at)
        .bind(&event.pre_setup_photo)
        .bind(&event.pre_setup_notes)
        .bind(&event.post_setup_photo)
        .bind(&event.post_setup_notes)
        .bind(expected)
        .fetch_optional(&self.pool)
        .await?;

        Ok(saved)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl OtpStore for PgStore {
    async fn replace_codes(&self, new: NewOneTimeCode) -> Result<OneTimeCode, AppError> {
        // One row per event: the upsert both invalidates and issues
        let code = sqlx::query_as::<_, OneTimeCode>(
            r#"
            INSERT INTO one_time_codes (event_id, code, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (event_id) DO UPDATE
            SET id = gen_random_uuid(),
                code = EXCLUDED.code,
                is_verified = FALSE,
                expires_at = EXCLUDED.expires_at,
                created_at = NOW(),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(new.event_id)
        .bind(new.code)
        .bind(new.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(code)
    }

    async fn mark_verified(
        &self,
        event_id: Uuid,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<OneTimeCode>, AppError> {
        let verified = sqlx::query_as::<_, OneTimeCode>(
            r#"
            UPDATE one_time_codes
            SET is_verified = TRUE,
                updated_at = NOW()
            WHERE event_id = $1
              AND code = $2
              AND is_verified = FALSE
              AND expires_at > $3
            RETURNING *
            "#,
        )
        .bind(event_id)
        .bind(code)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(verified)
    }

    async fn delete_codes(&self, event_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM one_time_codes WHERE event_id = $1")
            .bind(event_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM one_time_codes WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
