//! # Anonset Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── fixtures/         # Transaction fixtures (JSON)
//! ├── benches/          # Criterion entry point
//! └── src/
//!     ├── fixtures.rs   # Fixture loading, random transactions
//!     ├── benchmarks/   # Benchmark groups
//!     └── integration/  # Host-level flows across backends
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p anonset-tests
//!
//! # Including the OpenCL backend
//! cargo test -p anonset-tests --features opencl
//!
//! # Benchmarks
//! cargo bench -p anonset-tests
//! ```

pub mod benchmarks;
pub mod fixtures;
pub mod integration;

use anonset_telemetry::{init_logging, TelemetryConfig, TelemetryError};

/// Install test logging once per binary; `ANONSET_LOG_LEVEL` overrides `warn`.
pub fn init_test_logging() {
    let mut config = TelemetryConfig::from_env();
    if std::env::var("ANONSET_LOG_LEVEL").is_err() && std::env::var("RUST_LOG").is_err() {
        config = TelemetryConfig::for_tests("warn");
    }
    match init_logging(&config) {
        Ok(()) | Err(TelemetryError::AlreadyInitialized) => {}
        Err(e) => eprintln!("test logging disabled: {}", e),
    }
}
