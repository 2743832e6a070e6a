//! # Amount Sets
//!
//! Immutable containers for the input or output amounts of one transaction.
//! Indices are stable subset-membership identifiers; the values themselves
//! carry no uniqueness requirement.

use crate::error::{AmountSide, EngineError};
use serde::Serialize;

/// Largest representable amount and subset sum (63-bit signed range).
pub const MAX_AMOUNT: u64 = i64::MAX as u64;

/// Add two amounts, failing once the result leaves the 63-bit range.
#[inline]
pub fn checked_amount_add(a: u64, b: u64) -> Option<u64> {
    a.checked_add(b).filter(|sum| *sum <= MAX_AMOUNT)
}

/// Validated, immutable list of non-negative amounts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AmountSet {
    side: AmountSide,
    amounts: Vec<u64>,
}

impl AmountSet {
    /// Build from signed host values, rejecting negatives.
    pub fn from_signed(side: AmountSide, values: &[i64]) -> Result<Self, EngineError> {
        let mut amounts = Vec::with_capacity(values.len());
        for (index, &value) in values.iter().enumerate() {
            if value < 0 {
                return Err(EngineError::NegativeAmount { side, index, value });
            }
            amounts.push(value as u64);
        }
        Ok(Self { side, amounts })
    }

    /// Build from unsigned values, rejecting anything above [`MAX_AMOUNT`].
    pub fn from_unsigned(side: AmountSide, values: &[u64]) -> Result<Self, EngineError> {
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| **v > MAX_AMOUNT) {
            return Err(EngineError::AmountOutOfRange {
                side,
                index,
                value,
                max: MAX_AMOUNT,
            });
        }
        Ok(Self {
            side,
            amounts: values.to_vec(),
        })
    }

    pub fn inputs(values: &[u64]) -> Result<Self, EngineError> {
        Self::from_unsigned(AmountSide::Inputs, values)
    }

    pub fn outputs(values: &[u64]) -> Result<Self, EngineError> {
        Self::from_unsigned(AmountSide::Outputs, values)
    }

    pub fn side(&self) -> AmountSide {
        self.side
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.amounts
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.amounts.iter().copied()
    }

    /// Sum of every amount, i.e. the largest subset sum.
    pub fn total(&self) -> Result<u64, EngineError> {
        self.amounts
            .iter()
            .try_fold(0u64, |acc, &a| checked_amount_add(acc, a))
            .ok_or_else(|| EngineError::sum_overflow("totalling amounts"))
    }

    /// Contiguous sub-range; the amounts are already validated.
    pub(crate) fn slice(&self, range: std::ops::Range<usize>) -> Self {
        Self {
            side: self.side,
            amounts: self.amounts[range].to_vec(),
        }
    }

    pub(crate) fn require_non_empty(&self) -> Result<(), EngineError> {
        if self.amounts.is_empty() {
            return Err(EngineError::EmptyAmounts(self.side));
        }
        Ok(())
    }
}
