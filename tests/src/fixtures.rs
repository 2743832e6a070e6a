//! # Test Fixtures
//!
//! Hand-checked transactions from `fixtures/transactions.json`, plus seeded
//! random transactions whose outputs are built from input subsets, the way
//! real mixing transactions pay out.

use anonset_engine::TransactionAmounts;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

const TRANSACTIONS_JSON: &str = include_str!("../fixtures/transactions.json");

/// Fixture transaction with its known minimum match count.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionFixture {
    #[serde(flatten)]
    pub amounts: TransactionAmounts,
    pub expected_minimum: u64,
}

/// Load every fixture transaction.
pub fn load_transactions() -> Vec<TransactionFixture> {
    serde_json::from_str(TRANSACTIONS_JSON).expect("fixtures/transactions.json is valid")
}

/// Deterministic random transaction.
///
/// Inputs are drawn from a handful of denominations so that equal values
/// (and therefore ambiguity) are common. Each output is the sum of a random
/// input subset.
pub fn random_transaction(seed: u64, input_count: usize, output_count: usize) -> TransactionAmounts {
    const DENOMINATIONS: [i64; 6] = [
        1_000_000, 5_000_000, 10_000_000, 50_000_000, 100_000_000, 123_456,
    ];

    let mut rng = StdRng::seed_from_u64(seed);
    let inputs: Vec<i64> = (0..input_count)
        .map(|_| DENOMINATIONS[rng.gen_range(0..DENOMINATIONS.len())])
        .collect();

    let outputs = (0..output_count)
        .map(|_| inputs.iter().filter(|_| rng.gen_bool(0.5)).sum::<i64>())
        .collect();

    TransactionAmounts {
        id: Some(format!("random-{}-{}", seed, input_count)),
        inputs,
        outputs,
    }
}

/// Transaction with `input_count` distinct amounts and outputs that are
/// unlikely to match: the hardest shape for exact enumeration.
pub fn distinct_transaction(seed: u64, input_count: usize) -> TransactionAmounts {
    let mut rng = StdRng::seed_from_u64(seed);
    let inputs: Vec<i64> = (0..input_count)
        .map(|_| rng.gen_range(1_000..1_000_000_000))
        .collect();
    let total: i64 = inputs.iter().sum();

    TransactionAmounts {
        id: Some(format!("distinct-{}-{}", seed, input_count)),
        inputs,
        outputs: vec![total / 2, total / 3, total],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_load() {
        let fixtures = load_transactions();
        assert!(fixtures.len() >= 5);
        assert!(fixtures.iter().all(|f| f.amounts.id.is_some()));
    }

    #[test]
    fn test_random_transaction_is_deterministic() {
        assert_eq!(random_transaction(7, 12, 3), random_transaction(7, 12, 3));
        assert_ne!(
            random_transaction(7, 12, 3).inputs,
            random_transaction(8, 12, 3).inputs
        );
    }
}
