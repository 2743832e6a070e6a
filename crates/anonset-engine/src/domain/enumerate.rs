//! # Subset Enumerator
//!
//! Produces the `sum -> multiplicity` mapping for one partition half.
//!
//! ## Mask Enumeration
//!
//! Each subset is the bit-mask of its member indices. Masks are visited in
//! reflected Gray-code order: step `i` visits `i ^ (i >> 1)`, which differs
//! from the previous mask in exactly bit `trailing_zeros(i)`. Every step is
//! therefore one addition or one subtraction. Any contiguous step range can
//! be enumerated independently, which is how the dispatcher shards the work.
//!
//! ## Counting Lane
//!
//! When the half's total is small, the same mapping falls out of the
//! pseudo-polynomial recurrence `counts[s] += counts[s - a]`. It is exact,
//! not an approximation, and is only chosen when `k * S < 2^k`.

use std::ops::Range;

use super::amounts::{checked_amount_add, AmountSet};
use super::sum_index::{PartialCounts, SumIndex};
use crate::error::EngineError;

/// Largest half the enumerator accepts (2^32 masks).
pub const MAX_HALF_LEN: usize = 32;

#[inline]
fn gray(step: u64) -> u64 {
    step ^ (step >> 1)
}

/// Enumerates every subset of one half.
#[derive(Clone, Copy, Debug)]
pub struct SubsetEnumerator<'a> {
    amounts: &'a [u64],
}

impl<'a> SubsetEnumerator<'a> {
    pub fn new(half: &'a AmountSet) -> Result<Self, EngineError> {
        if half.len() > MAX_HALF_LEN {
            return Err(EngineError::SizeLimitExceeded {
                count: half.len(),
                max: MAX_HALF_LEN,
            });
        }
        Ok(Self {
            amounts: half.as_slice(),
        })
    }

    /// Number of subsets, `2^k`.
    pub fn mask_count(&self) -> u64 {
        1u64 << self.amounts.len()
    }

    /// Direct (non-incremental) sum of one mask.
    pub fn sum_of_mask(&self, mask: u64) -> Result<u64, EngineError> {
        self.amounts
            .iter()
            .enumerate()
            .filter(|(bit, _)| mask & (1u64 << bit) != 0)
            .try_fold(0u64, |acc, (_, &a)| checked_amount_add(acc, a))
            .ok_or_else(|| EngineError::sum_overflow("summing a subset"))
    }

    /// Visit the sum of every subset in Gray-code steps `steps`.
    pub fn for_each_sum<F>(&self, steps: Range<u64>, mut visit: F) -> Result<(), EngineError>
    where
        F: FnMut(u64) -> Result<(), EngineError>,
    {
        if steps.start >= steps.end {
            return Ok(());
        }

        let mut sum = self.sum_of_mask(gray(steps.start))?;
        visit(sum)?;

        for step in steps.start + 1..steps.end {
            let bit = step.trailing_zeros() as usize;
            let amount = self.amounts[bit];
            if gray(step) & (1u64 << bit) != 0 {
                sum = checked_amount_add(sum, amount)
                    .ok_or_else(|| EngineError::sum_overflow("enumerating subsets"))?;
            } else {
                sum -= amount;
            }
            visit(sum)?;
        }
        Ok(())
    }

    /// Accumulate the sums of one step range into a worker-local partial.
    pub fn accumulate(&self, steps: Range<u64>) -> Result<PartialCounts, EngineError> {
        let mut partial = PartialCounts::new();
        self.for_each_sum(steps, |sum| partial.record(sum))?;
        Ok(partial)
    }

    /// Enumerate the whole half on the calling thread.
    pub fn enumerate(&self) -> Result<SumIndex, EngineError> {
        if self.amounts.is_empty() {
            return Ok(SumIndex::empty_subset());
        }
        Ok(SumIndex::from_partial(self.accumulate(0..self.mask_count())?))
    }
}

/// Whether the counting lane beats mask enumeration for a half.
pub fn counting_lane_is_cheaper(half_len: usize, total: u64, dense_limit: u64) -> bool {
    if total > dense_limit || half_len > MAX_HALF_LEN {
        return false;
    }
    let lane_cost = (half_len as u128) * (total as u128 + 1);
    lane_cost < (1u128 << half_len)
}

/// Exact subset counts by dynamic programming over the bounded sum domain.
///
/// Returns `None` when the half's total exceeds `dense_limit`.
pub fn count_by_dynamic_programming(
    half: &AmountSet,
    dense_limit: u64,
) -> Result<Option<SumIndex>, EngineError> {
    let total = half.total()?;
    if total > dense_limit {
        return Ok(None);
    }

    let mut counts = vec![0u64; total as usize + 1];
    counts[0] = 1;
    for amount in half.iter() {
        let amount = amount as usize;
        for sum in (amount..counts.len()).rev() {
            counts[sum] = counts[sum]
                .checked_add(counts[sum - amount])
                .ok_or_else(|| EngineError::multiplicity_overflow("counting subsets"))?;
        }
    }
    Ok(Some(SumIndex::from_histogram(&counts)))
}
