//! Engine configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use anonset_engine::config::{EngineConfigBuilder, ExecutionMode};
//! use anonset_engine::ScorePolicy;
//!
//! let config = EngineConfigBuilder::new()
//!     .max_input_count(24)
//!     .score_policy(ScorePolicy::PerOutput)
//!     .execution_mode(ExecutionMode::MultiThreaded { workers: Some(4) })
//!     .build()?;
//! ```

use std::env;

use crate::domain::ScorePolicy;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Hard ceiling on `max_input_count`; keeps `2^n` inside a u64.
pub const HARD_MAX_INPUT_COUNT: usize = 62;

/// Default input limit (2^15 masks per half).
pub const DEFAULT_MAX_INPUT_COUNT: usize = 30;

/// Default bound on a half's sum domain for histogram accumulation.
pub const DEFAULT_DENSE_HISTOGRAM_LIMIT: u64 = 1 << 20;

/// Hard ceiling on `dense_histogram_limit` (2^26 slots, 512 MiB of counters).
pub const HARD_MAX_DENSE_HISTOGRAM_LIMIT: u64 = 1 << 26;

/// Where enumeration and matching run. A performance hint only: every mode
/// produces the same numeric result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    SingleThreaded,
    /// Rayon pool; `None` uses one worker per CPU core.
    MultiThreaded { workers: Option<usize> },
    AcceleratorOffloaded,
}

impl Default for ExecutionMode {
    fn default() -> Self {
        ExecutionMode::MultiThreaded { workers: None }
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::SingleThreaded => write!(f, "single-threaded"),
            ExecutionMode::MultiThreaded { workers: Some(n) } => {
                write!(f, "multi-threaded ({} workers)", n)
            }
            ExecutionMode::MultiThreaded { workers: None } => write!(f, "multi-threaded"),
            ExecutionMode::AcceleratorOffloaded => write!(f, "accelerator-offloaded"),
        }
    }
}

impl std::str::FromStr for ExecutionMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "single-threaded" | "serial" => Ok(ExecutionMode::SingleThreaded),
            "multi" | "multi-threaded" | "cpu" => Ok(ExecutionMode::MultiThreaded { workers: None }),
            "accelerator" | "accelerator-offloaded" | "gpu" | "opencl" => {
                Ok(ExecutionMode::AcceleratorOffloaded)
            }
            other => Err(EngineError::InvalidConfig(format!(
                "unknown execution mode '{}'",
                other
            ))),
        }
    }
}

/// Engine configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Reject transactions with more inputs than this
    pub max_input_count: usize,
    /// How match counts become the score
    pub score_policy: ScorePolicy,
    /// Backend selection
    pub execution_mode: ExecutionMode,
    /// Treat empty input or output lists as invalid input
    pub reject_empty: bool,
    /// Mask-space shards handed to each worker
    pub shards_per_worker: usize,
    /// Largest half-sum accumulated into a pre-sized histogram
    pub dense_histogram_limit: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_input_count: DEFAULT_MAX_INPUT_COUNT,
            score_policy: ScorePolicy::Minimum,
            execution_mode: ExecutionMode::default(),
            reject_empty: true,
            shards_per_worker: 4,
            dense_histogram_limit: DEFAULT_DENSE_HISTOGRAM_LIMIT,
        }
    }
}

impl EngineConfig {
    /// Validate configuration bounds
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_input_count == 0 || self.max_input_count > HARD_MAX_INPUT_COUNT {
            return Err(EngineError::InvalidConfig(format!(
                "max_input_count must be between 1 and {}, got {}",
                HARD_MAX_INPUT_COUNT, self.max_input_count
            )));
        }

        if let ExecutionMode::MultiThreaded { workers: Some(0) } = self.execution_mode {
            return Err(EngineError::InvalidConfig(
                "worker count cannot be 0".to_string(),
            ));
        }

        if self.dense_histogram_limit > HARD_MAX_DENSE_HISTOGRAM_LIMIT {
            return Err(EngineError::InvalidConfig(format!(
                "dense_histogram_limit must be at most {}, got {}",
                HARD_MAX_DENSE_HISTOGRAM_LIMIT, self.dense_histogram_limit
            )));
        }

        if self.shards_per_worker == 0 {
            return Err(EngineError::InvalidConfig(
                "shards_per_worker cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Defaults overlaid with environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ANONSET_MAX_INPUTS`: input limit (default: 30)
    /// - `ANONSET_SCORE_POLICY`: `minimum`, `per-output` or `normalized`
    /// - `ANONSET_EXECUTION_MODE`: `single`, `multi` or `accelerator`
    /// - `ANONSET_WORKERS`: worker count for `multi`
    ///
    /// Unparsable values keep the default and log a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(max) = parse_env::<usize>("ANONSET_MAX_INPUTS") {
            config.max_input_count = max;
        }
        if let Some(policy) = parse_env::<ScorePolicy>("ANONSET_SCORE_POLICY") {
            config.score_policy = policy;
        }
        if let Some(mode) = parse_env::<ExecutionMode>("ANONSET_EXECUTION_MODE") {
            config.execution_mode = mode;
        }
        if let Some(workers) = parse_env::<usize>("ANONSET_WORKERS") {
            if let ExecutionMode::MultiThreaded { .. } = config.execution_mode {
                config.execution_mode = ExecutionMode::MultiThreaded {
                    workers: Some(workers),
                };
            }
        }

        config
    }

    /// Builder-style method to set the input limit
    pub fn with_max_input_count(mut self, max: usize) -> Self {
        self.max_input_count = max;
        self
    }

    /// Builder-style method to set the score policy
    pub fn with_score_policy(mut self, policy: ScorePolicy) -> Self {
        self.score_policy = policy;
        self
    }

    /// Builder-style method to set the execution mode
    pub fn with_execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.execution_mode = mode;
        self
    }
}

fn parse_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(key).ok()?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "Ignoring unparsable setting");
            None
        }
    }
}

/// Builder for EngineConfig with validation
#[derive(Default)]
pub struct EngineConfigBuilder {
    max_input_count: Option<usize>,
    score_policy: Option<ScorePolicy>,
    execution_mode: Option<ExecutionMode>,
    reject_empty: Option<bool>,
    shards_per_worker: Option<usize>,
    dense_histogram_limit: Option<u64>,
}

impl EngineConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_input_count(mut self, max: usize) -> Self {
        self.max_input_count = Some(max);
        self
    }

    pub fn score_policy(mut self, policy: ScorePolicy) -> Self {
        self.score_policy = Some(policy);
        self
    }

    pub fn execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.execution_mode = Some(mode);
        self
    }

    pub fn reject_empty(mut self, reject: bool) -> Self {
        self.reject_empty = Some(reject);
        self
    }

    pub fn shards_per_worker(mut self, shards: usize) -> Self {
        self.shards_per_worker = Some(shards);
        self
    }

    pub fn dense_histogram_limit(mut self, limit: u64) -> Self {
        self.dense_histogram_limit = Some(limit);
        self
    }

    /// Build the EngineConfig, validating all parameters
    pub fn build(self) -> Result<EngineConfig, EngineError> {
        let defaults = EngineConfig::default();

        let config = EngineConfig {
            max_input_count: self.max_input_count.unwrap_or(defaults.max_input_count),
            score_policy: self.score_policy.unwrap_or(defaults.score_policy),
            execution_mode: self.execution_mode.unwrap_or(defaults.execution_mode),
            reject_empty: self.reject_empty.unwrap_or(defaults.reject_empty),
            shards_per_worker: self.shards_per_worker.unwrap_or(defaults.shards_per_worker),
            dense_histogram_limit: self
                .dense_histogram_limit
                .unwrap_or(defaults.dense_histogram_limit),
        };

        config.validate()?;
        Ok(config)
    }
}
