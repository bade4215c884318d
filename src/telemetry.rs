//! Logging setup for the client binary.
//!
//! Diagnostics go to stderr through `tracing`, so command output on stdout
//! stays clean. `RUST_LOG` selects what is shown; `PERMUTA_LOG_FORMAT=json`
//! switches to one JSON object per line.

use std::env;

use tracing_subscriber::{EnvFilter, fmt};

/// Output format of the log subscriber
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Clone, Debug)]
pub struct LogConfig {
    pub format: LogFormat,
    /// Directive used when `RUST_LOG` is not set
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            default_filter: "warn".to_string(),
        }
    }
}

impl LogConfig {
    pub fn from_env() -> Self {
        let format = match env::var("PERMUTA_LOG_FORMAT") {
            Ok(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Self {
            format,
            ..Default::default()
        }
    }
}

/// Install the global subscriber; fails if one is already installed
pub fn init_tracing(config: &LogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    }
}
