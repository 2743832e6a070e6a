//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for the logging stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every event
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error, or an EnvFilter directive)
    pub log_level: String,

    /// Whether to enable console output (for development)
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "anonset".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ANONSET_SERVICE_NAME`: Service name (default: anonset)
    /// - `ANONSET_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `ANONSET_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `ANONSET_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("ANONSET_SERVICE_NAME").unwrap_or_else(|| "anonset".to_string()),

            log_level: lookup("ANONSET_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or_else(|| "info".to_string()),

            console_output: lookup("ANONSET_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: lookup("ANONSET_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),
        }
    }

    /// Configuration for test binaries: quiet unless `level` says otherwise.
    pub fn for_tests(level: &str) -> Self {
        Self {
            service_name: "anonset-tests".to_string(),
            log_level: level.to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}
