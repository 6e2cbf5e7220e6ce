//! Structured logging initialization.

use crate::error::{TelemetryError, TelemetryResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Compact,
}

impl LogFormat {
    /// JSON when `RUST_ENV=production`, compact otherwise.
    pub fn from_env() -> Self {
        Self::from_rust_env(std::env::var("RUST_ENV").ok().as_deref())
    }

    fn from_rust_env(value: Option<&str>) -> Self {
        match value {
            Some("production") => Self::Json,
            _ => Self::Compact,
        }
    }
}

/// Build the level filter: `RUST_LOG` wins, otherwise `default_filter`.
fn build_filter(default_filter: &str) -> TelemetryResult<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(default_filter).map_err(|e| TelemetryError::InvalidFilter {
        filter: default_filter.to_string(),
        reason: e.to_string(),
    })
}

/// Initialize structured logging on stderr.
///
/// `default_filter` is used when `RUST_LOG` is unset or invalid
/// (e.g. `"info"` or `"warn,mvol_store=debug"`). Fails if a global subscriber
/// is already installed.
pub fn init_logging(default_filter: &str) -> TelemetryResult<()> {
    let env_filter = build_filter(default_filter)?;

    let result = match LogFormat::from_env() {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}
