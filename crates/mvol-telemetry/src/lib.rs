//! Structured logging for mvol.
//!
//! Logs are written to stderr so that command output on stdout stays clean:
//! - JSON lines when `RUST_ENV=production`
//! - compact human-readable lines otherwise

pub mod error;
pub mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, LogFormat};
