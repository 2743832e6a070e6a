//! # Anonset Telemetry
//!
//! Logging bootstrap for hosts embedding the anonset engine and for the
//! workspace's test binaries. The engine itself only emits `tracing` events;
//! this crate decides where they go.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use anonset_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_logging(&config).expect("Failed to init logging");
//!
//!     // Engine events are now printed
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ANONSET_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `ANONSET_JSON_LOGS` | `false` | JSON output (`true` inside containers) |
//! | `ANONSET_CONSOLE_OUTPUT` | `true` | Print events at all |
//! | `ANONSET_SERVICE_NAME` | `anonset` | Service name in the startup event |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("A global subscriber is already installed")]
    AlreadyInitialized,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Convenience macro for creating a span with component context.
///
/// # Example
///
/// ```rust,ignore
/// use anonset_telemetry::component_span;
///
/// fn analyze() {
///     let _span = component_span!("analyze", component = "host", inputs = 12).entered();
///     // ... analysis
/// }
/// ```
#[macro_export]
macro_rules! component_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
