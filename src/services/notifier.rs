//! OTP delivery channel.
//!
//! The OTP service hands every freshly issued code to an `OtpNotifier`.
//! Real delivery (SMS, email) is out of scope; `LogNotifier` writes the code
//! to the log and the API echoes it back to the caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;

/// A code ready to be sent out-of-band.
#[derive(Debug, Clone, PartialEq)]
pub struct OtpDelivery {
    pub event_id: Uuid,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Out-of-band delivery of one-time codes.
#[async_trait]
pub trait OtpNotifier: Send + Sync {
    /// Deliver a code.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Notification` if the channel rejects the message.
    async fn deliver(&self, delivery: &OtpDelivery) -> Result<(), AppError>;
}

/// Mock channel: logs the code instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl OtpNotifier for LogNotifier {
    async fn deliver(&self, delivery: &OtpDelivery) -> Result<(), AppError> {
        let expires_in = (delivery.expires_at - Utc::now()).num_seconds();

        tracing::info!(
            event_id = %delivery.event_id,
            code = %delivery.code,
            expires_in_seconds = expires_in,
            "OTP issued (mock delivery)"
        );

        Ok(())
    }
}
