//! # Sum Index
//!
//! Aggregated `sum -> multiplicity` mapping for one partition half.
//!
//! Multiplicities are never deduplicated: two subsets with the same sum both
//! count, since that ambiguity is what the anonymity set measures.
//!
//! Workers accumulate into [`PartialCounts`] and the partials are merged by
//! addition, which is commutative and associative, so the finished
//! [`SumIndex`] does not depend on shard layout or completion order.

use std::collections::HashMap;

use super::amounts::checked_amount_add;
use crate::error::EngineError;
use serde::Serialize;

/// One achievable sum and how many subsets reach it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SubsetRecord {
    pub sum: u64,
    pub multiplicity: u64,
}

/// Worker-local accumulation of subset sums.
#[derive(Clone, Debug, Default)]
pub struct PartialCounts {
    counts: HashMap<u64, u64>,
}

impl PartialCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            counts: HashMap::with_capacity(capacity),
        }
    }

    /// Count one more subset reaching `sum`.
    pub fn record(&mut self, sum: u64) -> Result<(), EngineError> {
        self.add(sum, 1)
    }

    /// Add `multiplicity` subsets reaching `sum`.
    pub fn add(&mut self, sum: u64, multiplicity: u64) -> Result<(), EngineError> {
        let slot = self.counts.entry(sum).or_insert(0);
        *slot = slot
            .checked_add(multiplicity)
            .ok_or_else(|| EngineError::multiplicity_overflow("accumulating a shard"))?;
        Ok(())
    }

    /// Fold another partial into this one.
    pub fn merge(mut self, other: PartialCounts) -> Result<Self, EngineError> {
        // Merge the smaller map into the larger one.
        let (mut into, from) = if self.counts.len() >= other.counts.len() {
            (std::mem::take(&mut self), other)
        } else {
            (other, self)
        };
        for (sum, multiplicity) in from.counts {
            into.add(sum, multiplicity)?;
        }
        Ok(into)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Read-only, sorted index of subset sums for one half.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SumIndex {
    /// Sorted ascending by `sum`, one record per distinct sum.
    records: Vec<SubsetRecord>,
}

impl SumIndex {
    /// Index of the empty set: one subset (the empty one) with sum 0.
    pub fn empty_subset() -> Self {
        Self {
            records: vec![SubsetRecord {
                sum: 0,
                multiplicity: 1,
            }],
        }
    }

    /// Freeze worker partials into a sorted index.
    pub fn from_partial(partial: PartialCounts) -> Self {
        let mut records: Vec<SubsetRecord> = partial
            .counts
            .into_iter()
            .filter(|(_, multiplicity)| *multiplicity > 0)
            .map(|(sum, multiplicity)| SubsetRecord { sum, multiplicity })
            .collect();
        records.sort_unstable_by_key(|r| r.sum);
        Self { records }
    }

    /// Build from a dense histogram where slot `s` holds the count for sum `s`.
    pub fn from_histogram(histogram: &[u64]) -> Self {
        let records = histogram
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(sum, &multiplicity)| SubsetRecord {
                sum: sum as u64,
                multiplicity,
            })
            .collect();
        Self { records }
    }

    /// Subsets reaching exactly `sum` (0 when unreachable).
    pub fn multiplicity_of(&self, sum: u64) -> u64 {
        self.records
            .binary_search_by_key(&sum, |r| r.sum)
            .map(|pos| self.records[pos].multiplicity)
            .unwrap_or(0)
    }

    /// Records in ascending sum order.
    pub fn records(&self) -> &[SubsetRecord] {
        &self.records
    }

    /// Number of distinct sums.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn max_sum(&self) -> Option<u64> {
        self.records.last().map(|r| r.sum)
    }

    /// Total subsets represented; `2^k` for a half of size `k`.
    pub fn total_multiplicity(&self) -> Result<u64, EngineError> {
        self.records
            .iter()
            .try_fold(0u64, |acc, r| acc.checked_add(r.multiplicity))
            .ok_or_else(|| EngineError::multiplicity_overflow("totalling an index"))
    }

    /// Full cross-product of two halves: the index of the whole input set.
    ///
    /// Quadratic in the index sizes; the matcher never needs it, it exists to
    /// inspect the combined distribution.
    pub fn combine(&self, other: &SumIndex) -> Result<SumIndex, EngineError> {
        let mut partial = PartialCounts::with_capacity(self.len() * other.len());
        for left in &self.records {
            for right in &other.records {
                let sum = checked_amount_add(left.sum, right.sum)
                    .ok_or_else(|| EngineError::sum_overflow("combining halves"))?;
                let multiplicity = left
                    .multiplicity
                    .checked_mul(right.multiplicity)
                    .ok_or_else(|| EngineError::multiplicity_overflow("combining halves"))?;
                partial.add(sum, multiplicity)?;
            }
        }
        Ok(SumIndex::from_partial(partial))
    }
}
