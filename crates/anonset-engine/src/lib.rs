//! # Anonset Engine: Exact Subset Sum Matching
//!
//! Estimates how ambiguous a transaction is by counting, for every output,
//! how many subsets of the inputs sum exactly to that output's value.
//!
//! ## Pipeline
//!
//! ```text
//! inputs ──► Partition ──► low half ──► enumerate ──┐
//!                      └─► high half ─► enumerate ──┴─► Matcher ──► ScoreAggregator
//!                                                       ▲
//! outputs ──────────────────────────────────────────────┘
//! ```
//!
//! Meet-in-the-middle keeps the work at `O(2^(n/2))` per half instead of
//! `O(2^n)`, and every half is enumerated through a [`ComputeEngine`].
//!
//! ## Backends
//!
//! | Mode | Backend | When |
//! |------|---------|------|
//! | `SingleThreaded` | [`Backend::Serial`] | Small transactions, tests |
//! | `MultiThreaded` | [`Backend::Cpu`] (Rayon) | Default |
//! | `AcceleratorOffloaded` | [`Backend::OpenCL`] | `opencl` feature, GPU present |
//!
//! Every backend produces identical results. A requested backend that is not
//! available fails with `ExecutionFailure`; there is no silent substitution.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use anonset_engine::{compute_anonymity_set, EngineConfig};
//!
//! let score = compute_anonymity_set(&[10, 20, 30], &[30], &EngineConfig::default())?;
//! assert_eq!(score.minimum(), Some(2));
//! ```

pub mod backends;
pub mod config;
#[cfg(feature = "cpu")]
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod service;
pub mod tasks;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use config::{EngineConfig, EngineConfigBuilder, ExecutionMode};
pub use domain::{
    AmountSet, AnonymityScore, DenominationProfile, MatchCount, NormalizedMatch, ScorePolicy,
    SumIndex,
};
pub use error::{AmountSide, EngineError, ErrorKind};
pub use metrics::{EngineMetrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics};
pub use service::{compute_anonymity_set, AnonymityReport, AnonymitySetService};
pub use tasks::{AnonymitySetTask, BatchAnonymitySetTask, TransactionAmounts};

/// Inputs at or below this count run single-threaded by default.
pub const SERIAL_INPUT_THRESHOLD: usize = 15;

/// Compute backend capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Backend {
    /// Calling thread only
    Serial,
    /// CPU with Rayon parallelism
    Cpu,
    /// OpenCL (portable GPU)
    OpenCL,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Serial => write!(f, "Serial"),
            Backend::Cpu => write!(f, "CPU (Rayon)"),
            Backend::OpenCL => write!(f, "OpenCL GPU"),
        }
    }
}

/// Device information
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub name: String,
    pub backend: Backend,
    pub compute_units: u32,
    pub memory_bytes: u64,
}

/// Compute engine trait - implemented by all backends
#[async_trait::async_trait]
pub trait ComputeEngine: Send + Sync {
    /// Get backend type
    fn backend(&self) -> Backend;

    /// Get device info
    fn device_info(&self) -> &DeviceInfo;

    /// Sum index of every subset of one partition half.
    async fn enumerate_sums(&self, half: &AmountSet) -> Result<SumIndex, EngineError>;

    /// Match count for every output, in output order.
    async fn count_matches(
        &self,
        low: &SumIndex,
        high: &SumIndex,
        outputs: &AmountSet,
    ) -> Result<Vec<MatchCount>, EngineError>;
}

/// Create the backend named by the configured execution mode.
pub fn create_backend(config: &EngineConfig) -> Result<Arc<dyn ComputeEngine>, EngineError> {
    config.validate()?;

    match config.execution_mode {
        ExecutionMode::SingleThreaded => Ok(Arc::new(backends::serial::SerialEngine::new(
            config.dense_histogram_limit,
        ))),
        ExecutionMode::MultiThreaded { workers } => {
            #[cfg(feature = "cpu")]
            {
                let workers = workers.unwrap_or_else(num_cpus::get);
                let engine = backends::cpu::CpuEngine::new(
                    workers,
                    config.shards_per_worker,
                    config.dense_histogram_limit,
                )?;
                tracing::debug!(workers, "Using CPU compute (Rayon)");
                Ok(Arc::new(engine))
            }
            #[cfg(not(feature = "cpu"))]
            {
                let _ = workers;
                Err(EngineError::BackendUnavailable(Backend::Cpu))
            }
        }
        ExecutionMode::AcceleratorOffloaded => {
            #[cfg(feature = "opencl")]
            {
                let engine = backends::opencl::OpenClEngine::new(config)?;
                tracing::info!(device = %engine.device_info().name, "GPU detected (OpenCL)");
                Ok(Arc::new(engine))
            }
            #[cfg(not(feature = "opencl"))]
            {
                Err(EngineError::BackendUnavailable(Backend::OpenCL))
            }
        }
    }
}

/// Execution modes compiled into this build.
///
/// Compiled-in does not mean usable: the accelerator still needs a device
/// at runtime.
pub fn available_modes() -> Vec<ExecutionMode> {
    let mut modes = vec![ExecutionMode::SingleThreaded];
    if cfg!(feature = "cpu") {
        modes.push(ExecutionMode::MultiThreaded { workers: None });
    }
    if cfg!(feature = "opencl") {
        modes.push(ExecutionMode::AcceleratorOffloaded);
    }
    modes
}

/// Recommended execution mode for a transaction size
pub fn recommended_mode_for(input_count: usize) -> ExecutionMode {
    if input_count <= SERIAL_INPUT_THRESHOLD {
        return ExecutionMode::SingleThreaded;
    }
    if cfg!(feature = "opencl") {
        ExecutionMode::AcceleratorOffloaded
    } else if cfg!(feature = "cpu") {
        ExecutionMode::MultiThreaded { workers: None }
    } else {
        ExecutionMode::SingleThreaded
    }
}
