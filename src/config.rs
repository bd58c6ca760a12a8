//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (optional): PostgreSQL connection string; in-memory store when unset
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `OTP_TTL_SECONDS` (optional): lifetime of an issued code, defaults to 300
/// - `OTP_SWEEP_INTERVAL_SECONDS` (optional): expired-code purge period, defaults to 60
/// - `MAX_UPLOAD_BYTES` (optional): body limit for photo uploads, defaults to 5 MiB
/// - `MOCK_VENDOR_ID` (optional): identity returned by mock login, defaults to `vendor_123`
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_otp_ttl_seconds")]
    pub otp_ttl_seconds: u32,

    #[serde(default = "default_otp_sweep_interval_seconds")]
    pub otp_sweep_interval_seconds: u64,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default = "default_mock_vendor_id")]
    pub mock_vendor_id: String,
}

fn default_port() -> u16 {
    3000
}

fn default_otp_ttl_seconds() -> u32 {
    5 * 60
}

fn default_otp_sweep_interval_seconds() -> u64 {
    60
}

fn default_max_upload_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_mock_vendor_id() -> String {
    "vendor_123".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Loads an optional `.env` file first, then reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed into its type.
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        envy::from_env::<Config>()
    }

    /// OTP lifetime as a chrono duration.
    pub fn otp_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.otp_ttl_seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(vars: &[(&str, &str)]) -> Result<Config, envy::Error> {
        envy::from_iter(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = parse(&[]).unwrap();

        assert!(config.database_url.is_none());
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.otp_ttl_seconds, 300);
        assert_eq!(config.otp_ttl(), chrono::Duration::minutes(5));
        assert_eq!(config.otp_sweep_interval_seconds, 60);
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.mock_vendor_id, "vendor_123");
    }

    #[test]
    fn reads_overrides() {
        let config = parse(&[
            ("DATABASE_URL", "postgres://localhost/events"),
            ("SERVER_PORT", "8080"),
            ("OTP_TTL_SECONDS", "30"),
        ])
        .unwrap();

        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/events")
        );
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.otp_ttl(), chrono::Duration::seconds(30));
    }

    #[test]
    fn rejects_unparseable_values() {
        assert!(parse(&[("SERVER_PORT", "not-a-port")]).is_err());
    }
}
