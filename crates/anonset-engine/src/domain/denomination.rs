//! Structural denomination profile of a transaction's outputs.
//!
//! The most frequent output value and how often it occurs. Hosts fall back
//! to this count when a transaction is too large for exact matching.

use std::collections::HashMap;

use super::amounts::AmountSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenominationProfile {
    pub denomination: u64,
    pub count: usize,
}

impl DenominationProfile {
    /// Most frequent output value; ties go to the larger value.
    pub fn from_outputs(outputs: &AmountSet) -> Option<Self> {
        let mut frequencies: HashMap<u64, usize> = HashMap::new();
        for value in outputs.iter() {
            *frequencies.entry(value).or_insert(0) += 1;
        }
        frequencies
            .into_iter()
            .max_by_key(|&(value, count)| (count, value))
            .map(|(denomination, count)| Self {
                denomination,
                count,
            })
    }

    /// Whether at least two outputs share the denomination.
    pub fn is_mixed(&self) -> bool {
        self.count > 1
    }
}
