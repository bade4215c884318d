//! Configuration for the API client.
//!
//! Provides environment-based configuration with sensible defaults for a
//! local development backend.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default base URL of the swap-matching API
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Default location of the persisted session token
pub const DEFAULT_TOKEN_FILE: &str = ".permuta/session.json";

/// Longest accepted notice lifetime (one day)
pub const MAX_NOTICE_SECONDS: u64 = 86_400;

/// Configuration for the API client and the views built on it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL every endpoint path is joined onto
    pub base_url: String,

    /// Timeout for read operations (in seconds)
    pub read_timeout_seconds: u64,

    /// Timeout for write operations (in seconds)
    pub write_timeout_seconds: u64,

    /// Connection timeout (in seconds)
    pub connect_timeout_seconds: u64,

    /// Enable per-request logging
    pub enable_detailed_logging: bool,

    /// File holding the persisted session token
    pub token_file: PathBuf,

    /// How long a user-visible notice stays up (in seconds)
    pub notice_dismiss_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            read_timeout_seconds: 10,
            write_timeout_seconds: 15,
            connect_timeout_seconds: 3,
            enable_detailed_logging: true,
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            notice_dismiss_seconds: 3,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url = env::var("PERMUTA_API_BASE_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.base_url);

        let read_timeout_seconds = parse_var("PERMUTA_READ_TIMEOUT")
            .unwrap_or(defaults.read_timeout_seconds);

        let write_timeout_seconds = parse_var("PERMUTA_WRITE_TIMEOUT")
            .unwrap_or(defaults.write_timeout_seconds);

        let connect_timeout_seconds = parse_var("PERMUTA_CONNECT_TIMEOUT")
            .unwrap_or(defaults.connect_timeout_seconds);

        let enable_detailed_logging = parse_var("PERMUTA_DETAILED_LOGGING")
            .unwrap_or(defaults.enable_detailed_logging);

        let token_file = env::var("PERMUTA_TOKEN_FILE")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.token_file);

        let notice_dismiss_seconds = parse_var("PERMUTA_NOTICE_SECONDS")
            .filter(|seconds| *seconds <= MAX_NOTICE_SECONDS)
            .unwrap_or(defaults.notice_dismiss_seconds);

        Self {
            base_url,
            read_timeout_seconds,
            write_timeout_seconds,
            connect_timeout_seconds,
            enable_detailed_logging,
            token_file,
            notice_dismiss_seconds,
        }
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_seconds)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Notice lifetime, capped at [`MAX_NOTICE_SECONDS`]
    pub fn notice_delay(&self) -> chrono::Duration {
        let seconds = self.notice_dismiss_seconds.min(MAX_NOTICE_SECONDS);
        chrono::Duration::seconds(seconds as i64)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Serializes tests that modify environment variables
#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
