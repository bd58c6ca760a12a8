//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::config::Config;
use crate::services::notifier::{LogNotifier, OtpNotifier};
use crate::store::{EventStore, MemoryStore, OtpStore};

/// Store handles and settings shared across requests.
///
/// Requests keep no session state of their own; everything lives behind the stores.
#[derive(Clone)]
pub struct AppState {
    pub events: Arc<dyn EventStore>,
    pub otps: Arc<dyn OtpStore>,
    pub notifier: Arc<dyn OtpNotifier>,
    pub otp_ttl: chrono::Duration,
    pub max_upload_bytes: usize,
    pub mock_vendor_id: String,
}

impl AppState {
    pub fn new(
        events: Arc<dyn EventStore>,
        otps: Arc<dyn OtpStore>,
        notifier: Arc<dyn OtpNotifier>,
        config: &Config,
    ) -> Self {
        Self {
            events,
            otps,
            notifier,
            otp_ttl: config.otp_ttl(),
            max_upload_bytes: config.max_upload_bytes,
            mock_vendor_id: config.mock_vendor_id.clone(),
        }
    }

    /// State backed by a fresh `MemoryStore` and the logging notifier.
    pub fn in_memory(config: &Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store, Arc::new(LogNotifier), config)
    }
}
