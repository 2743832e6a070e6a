//! Compute backends
//!
//! The serial backend is always compiled. Rayon and OpenCL backends sit
//! behind the `cpu` and `opencl` features; OpenCL detects hardware at
//! runtime and reports `ExecutionFailure` when none is found.

#[cfg(feature = "cpu")]
pub mod cpu;

#[cfg(feature = "opencl")]
pub mod opencl;

pub mod serial;

use crate::domain::{count_by_dynamic_programming, counting_lane_is_cheaper, AmountSet, SumIndex};
use crate::config::HARD_MAX_DENSE_HISTOGRAM_LIMIT;
use crate::error::EngineError;

/// Sum index from the counting lane, when it is cheaper than enumeration.
///
/// `None` means the caller should enumerate masks. A half whose total
/// overflows also returns `None`; enumeration reports the overflow.
pub(crate) fn try_counting_lane(
    half: &AmountSet,
    dense_limit: u64,
) -> Result<Option<SumIndex>, EngineError> {
    let dense_limit = dense_limit.min(HARD_MAX_DENSE_HISTOGRAM_LIMIT);
    match half.total() {
        Ok(total) if counting_lane_is_cheaper(half.len(), total, dense_limit) => {
            tracing::trace!(half_len = half.len(), total, "Using counting lane");
            count_by_dynamic_programming(half, dense_limit)
        }
        _ => Ok(None),
    }
}
