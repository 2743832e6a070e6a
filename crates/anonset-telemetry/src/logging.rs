//! Structured logging setup.
//!
//! Events carry consistent fields so they can be filtered downstream:
//! - `service`: Service name from [`TelemetryConfig`]
//! - `component`: Engine stage or host component (`log_event!`)
//! - Additional context fields

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Install the global subscriber.
///
/// JSON output for containers/production, pretty output for development.
/// Only one subscriber can be installed per process; later calls return
/// [`TelemetryError::AlreadyInitialized`].
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Config(format!("log level '{}': {}", config.log_level, e)))?;

    let json_layer = (config.console_output && config.json_logs).then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
    });

    let pretty_layer = (config.console_output && !config.json_logs).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(true)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
        .map_err(|_| TelemetryError::AlreadyInitialized)?;

    tracing::info!(
        service = %config.service_name,
        level = %config.log_level,
        json = config.json_logs,
        "Logging initialized"
    );

    Ok(())
}

/// Helper to create structured log entries with a `component` field.
#[macro_export]
macro_rules! log_event {
    // Info level with component
    (info, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    // Warn level with component
    (warn, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    // Error level with component
    (error, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    // Debug level with component
    (debug, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a transaction analysis event with standard fields.
#[macro_export]
macro_rules! log_tx_event {
    ($level:ident, $component:expr, $msg:expr, $inputs:expr, $outputs:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            inputs = $inputs,
            outputs = $outputs,
            $($($field)*,)?
            $msg
        )
    };
}
