//! Error types for the anonymity set engine
//!
//! Every failure is reported as a structured [`EngineError`]. Hosts that only
//! care about the broad failure class branch on [`EngineError::kind`].

use crate::Backend;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which side of the transaction an amount belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmountSide {
    Inputs,
    Outputs,
}

impl std::fmt::Display for AmountSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmountSide::Inputs => write!(f, "input"),
            AmountSide::Outputs => write!(f, "output"),
        }
    }
}

/// Broad failure classes surfaced to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Negative or out-of-range amount, or an empty amount list.
    InvalidInput,
    /// Input count above the configured maximum.
    SizeLimitExceeded,
    /// A subset sum or multiplicity left the representable range.
    ArithmeticOverflow,
    /// The execution backend failed or is unavailable.
    ExecutionFailure,
    /// The engine configuration failed validation.
    InvalidConfig,
}

/// Anonymity set engine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Negative {side} amount {value} at index {index}")]
    NegativeAmount {
        side: AmountSide,
        index: usize,
        value: i64,
    },

    #[error("{side} amount {value} at index {index} exceeds bound {max}")]
    AmountOutOfRange {
        side: AmountSide,
        index: usize,
        value: u64,
        max: u64,
    },

    #[error("Empty {0} list")]
    EmptyAmounts(AmountSide),

    #[error("Expected {expected} amounts, got {found} amounts")]
    SideMismatch {
        expected: AmountSide,
        found: AmountSide,
    },

    #[error("Input count {count} exceeds limit {max}")]
    SizeLimitExceeded { count: usize, max: usize },

    #[error("Arithmetic overflow: {0}")]
    ArithmeticOverflow(String),

    #[error("{backend} backend failed: {reason}")]
    ExecutionFailure { backend: Backend, reason: String },

    #[error("No {0} backend available in this build")]
    BackendUnavailable(Backend),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Transaction {index} in batch failed: {source}")]
    BatchItem {
        index: usize,
        source: Box<EngineError>,
    },
}

impl EngineError {
    /// Failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::NegativeAmount { .. }
            | EngineError::AmountOutOfRange { .. }
            | EngineError::EmptyAmounts(_)
            | EngineError::SideMismatch { .. } => ErrorKind::InvalidInput,
            EngineError::SizeLimitExceeded { .. } => ErrorKind::SizeLimitExceeded,
            EngineError::ArithmeticOverflow(_) => ErrorKind::ArithmeticOverflow,
            EngineError::ExecutionFailure { .. } | EngineError::BackendUnavailable(_) => {
                ErrorKind::ExecutionFailure
            }
            EngineError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            EngineError::BatchItem { source, .. } => source.kind(),
        }
    }

    pub(crate) fn sum_overflow(context: &str) -> Self {
        EngineError::ArithmeticOverflow(format!("subset sum overflow while {}", context))
    }

    pub(crate) fn multiplicity_overflow(context: &str) -> Self {
        EngineError::ArithmeticOverflow(format!("multiplicity overflow while {}", context))
    }

    pub(crate) fn execution(backend: Backend, reason: impl Into<String>) -> Self {
        EngineError::ExecutionFailure {
            backend,
            reason: reason.into(),
        }
    }
}
