//! # Matcher
//!
//! Counts the whole-input subsets that sum exactly to each output:
//!
//! ```text
//! matchCount(o) = Σ_{(sL, mL) ∈ low} mL × high.multiplicity_of(o − sL)
//! ```
//!
//! The low index is sorted, so the scan stops at the first `sL > o` instead
//! of looking up a negative residual.

use super::amounts::AmountSet;
use super::sum_index::SumIndex;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Number of input subsets summing exactly to one output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchCount {
    pub output_index: usize,
    pub count: u64,
}

/// Count input subsets summing to `target`.
pub fn count_for_target(low: &SumIndex, high: &SumIndex, target: u64) -> Result<u64, EngineError> {
    let mut total = 0u64;
    for record in low.records() {
        if record.sum > target {
            break;
        }
        let complement = high.multiplicity_of(target - record.sum);
        if complement == 0 {
            continue;
        }
        let pairs = record
            .multiplicity
            .checked_mul(complement)
            .ok_or_else(|| EngineError::multiplicity_overflow("matching an output"))?;
        total = total
            .checked_add(pairs)
            .ok_or_else(|| EngineError::multiplicity_overflow("matching an output"))?;
    }
    Ok(total)
}

/// Match one output position.
pub fn match_output(
    low: &SumIndex,
    high: &SumIndex,
    output_index: usize,
    value: u64,
) -> Result<MatchCount, EngineError> {
    Ok(MatchCount {
        output_index,
        count: count_for_target(low, high, value)?,
    })
}

/// Match every output on the calling thread, in output order.
pub fn match_all(
    low: &SumIndex,
    high: &SumIndex,
    outputs: &AmountSet,
) -> Result<Vec<MatchCount>, EngineError> {
    outputs
        .iter()
        .enumerate()
        .map(|(index, value)| match_output(low, high, index, value))
        .collect()
}
