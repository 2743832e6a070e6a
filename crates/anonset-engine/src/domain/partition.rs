//! # Partitioner
//!
//! Meet-in-the-middle split of the input amounts. The low half takes the
//! first `ceil(n/2)` indices and the high half the remaining `floor(n/2)`,
//! so the larger enumeration exponent is as small as possible.

use super::amounts::AmountSet;

/// Two halves of one input [`AmountSet`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    pub low: AmountSet,
    pub high: AmountSet,
}

impl Partition {
    /// Split `inputs` by index into balanced halves.
    pub fn split(inputs: &AmountSet) -> Self {
        let n = inputs.len();
        let mid = n.div_ceil(2);
        Self {
            low: inputs.slice(0..mid),
            high: inputs.slice(mid..n),
        }
    }

    /// Exponent that dominates enumeration cost.
    pub fn larger_half_len(&self) -> usize {
        self.low.len().max(self.high.len())
    }

    /// Subsets represented by the two half indexes, however they are built.
    pub fn subsets_indexed(&self) -> u64 {
        (1u64 << self.low.len()) + (1u64 << self.high.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_odd_count() {
        let inputs = AmountSet::inputs(&[1, 2, 3, 4, 5]).unwrap();
        let partition = Partition::split(&inputs);

        assert_eq!(partition.low.as_slice(), &[1, 2, 3]);
        assert_eq!(partition.high.as_slice(), &[4, 5]);
        assert_eq!(partition.larger_half_len(), 3);
        assert_eq!(partition.subsets_indexed(), 8 + 4);
    }

    #[test]
    fn test_split_even_count() {
        let inputs = AmountSet::inputs(&[7, 7, 9, 9]).unwrap();
        let partition = Partition::split(&inputs);

        assert_eq!(partition.low.as_slice(), &[7, 7]);
        assert_eq!(partition.high.as_slice(), &[9, 9]);
    }

    #[test]
    fn test_split_empty() {
        let inputs = AmountSet::inputs(&[]).unwrap();
        let partition = Partition::split(&inputs);

        assert!(partition.low.is_empty());
        assert!(partition.high.is_empty());
        assert_eq!(partition.subsets_indexed(), 2);
    }

    #[test]
    fn test_split_single() {
        let inputs = AmountSet::inputs(&[42]).unwrap();
        let partition = Partition::split(&inputs);

        assert_eq!(partition.low.as_slice(), &[42]);
        assert!(partition.high.is_empty());
    }

    #[test]
    fn test_no_amount_dropped_or_duplicated() {
        let values: Vec<u64> = (1..=13).collect();
        let inputs = AmountSet::inputs(&values).unwrap();
        let partition = Partition::split(&inputs);

        let rejoined: Vec<u64> = partition.low.iter().chain(partition.high.iter()).collect();
        assert_eq!(rejoined, values);
    }
}
