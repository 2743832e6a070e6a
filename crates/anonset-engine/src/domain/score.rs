//! # Score Aggregation
//!
//! Folds the per-output match counts into one [`AnonymityScore`] under a
//! single, explicitly reported [`ScorePolicy`].

use super::matcher::MatchCount;
use crate::error::{AmountSide, EngineError};
use serde::{Deserialize, Serialize};

/// How per-output counts become the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScorePolicy {
    /// Weakest output bounds the transaction.
    #[default]
    Minimum,
    /// Every output's count, in output order.
    PerOutput,
    /// Counts relative to the `2^n` enumerated subsets.
    Normalized,
}

impl std::fmt::Display for ScorePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScorePolicy::Minimum => write!(f, "minimum"),
            ScorePolicy::PerOutput => write!(f, "per-output"),
            ScorePolicy::Normalized => write!(f, "normalized"),
        }
    }
}

impl std::str::FromStr for ScorePolicy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimum" | "min" => Ok(ScorePolicy::Minimum),
            "per-output" | "per_output" | "vector" => Ok(ScorePolicy::PerOutput),
            "normalized" | "normalised" => Ok(ScorePolicy::Normalized),
            other => Err(EngineError::InvalidConfig(format!(
                "unknown score policy '{}'",
                other
            ))),
        }
    }
}

/// Match count of one output relative to all enumerated subsets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMatch {
    pub output_index: usize,
    pub count: u64,
    pub total_subsets: u64,
    pub ratio: f64,
}

/// Terminal artifact of one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "kebab-case")]
pub enum AnonymityScore {
    Minimum {
        count: u64,
        /// Lowest output index achieving the minimum
        output_index: usize,
    },
    PerOutput {
        counts: Vec<MatchCount>,
    },
    Normalized {
        matches: Vec<NormalizedMatch>,
        minimum_ratio: f64,
    },
}

impl AnonymityScore {
    /// Policy that produced this score.
    pub fn policy(&self) -> ScorePolicy {
        match self {
            AnonymityScore::Minimum { .. } => ScorePolicy::Minimum,
            AnonymityScore::PerOutput { .. } => ScorePolicy::PerOutput,
            AnonymityScore::Normalized { .. } => ScorePolicy::Normalized,
        }
    }

    /// The scalar minimum, when the policy produced one.
    pub fn minimum(&self) -> Option<u64> {
        match self {
            AnonymityScore::Minimum { count, .. } => Some(*count),
            _ => None,
        }
    }
}

/// Stateless aggregator for one policy.
#[derive(Debug, Clone, Copy)]
pub struct ScoreAggregator {
    policy: ScorePolicy,
}

impl ScoreAggregator {
    pub fn new(policy: ScorePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ScorePolicy {
        self.policy
    }

    /// Aggregate counts for a transaction with `input_count` inputs.
    pub fn aggregate(
        &self,
        counts: Vec<MatchCount>,
        input_count: usize,
    ) -> Result<AnonymityScore, EngineError> {
        match self.policy {
            ScorePolicy::Minimum => {
                let weakest = counts
                    .iter()
                    .min_by_key(|m| (m.count, m.output_index))
                    .ok_or(EngineError::EmptyAmounts(AmountSide::Outputs))?;
                Ok(AnonymityScore::Minimum {
                    count: weakest.count,
                    output_index: weakest.output_index,
                })
            }
            ScorePolicy::PerOutput => Ok(AnonymityScore::PerOutput { counts }),
            ScorePolicy::Normalized => {
                let total_subsets = total_subsets(input_count)?;
                let matches: Vec<NormalizedMatch> = counts
                    .iter()
                    .map(|m| NormalizedMatch {
                        output_index: m.output_index,
                        count: m.count,
                        total_subsets,
                        ratio: m.count as f64 / total_subsets as f64,
                    })
                    .collect();
                let minimum_ratio = matches
                    .iter()
                    .map(|m| m.ratio)
                    .fold(None, |acc: Option<f64>, r| Some(acc.map_or(r, |a| a.min(r))))
                    .unwrap_or(0.0);
                Ok(AnonymityScore::Normalized {
                    matches,
                    minimum_ratio,
                })
            }
        }
    }
}

/// `2^n`, the number of subsets of `n` inputs.
pub fn total_subsets(input_count: usize) -> Result<u64, EngineError> {
    1u64.checked_shl(input_count as u32)
        .filter(|_| input_count < 64)
        .ok_or_else(|| EngineError::multiplicity_overflow("counting all subsets"))
}
