//! Domain Layer - Pure subset-sum logic
//!
//! This layer contains:
//! - Amount sets and the 63-bit amount bound
//! - Meet-in-the-middle partitioning
//! - Subset enumeration (Gray-code masks and the counting lane)
//! - Sum indexes and worker-local partial counts
//! - Output matching
//! - Score aggregation
//! - Structural denomination profile
//!
//! RULES:
//! - No I/O operations
//! - No async code
//! - No threads; parallelism lives in `dispatch`

pub mod amounts;
pub mod denomination;
pub mod enumerate;
pub mod matcher;
pub mod partition;
pub mod score;
pub mod sum_index;

pub use amounts::{checked_amount_add, AmountSet, MAX_AMOUNT};
pub use denomination::DenominationProfile;
pub use enumerate::{
    count_by_dynamic_programming, counting_lane_is_cheaper, SubsetEnumerator, MAX_HALF_LEN,
};
pub use matcher::{count_for_target, match_all, match_output, MatchCount};
pub use partition::Partition;
pub use score::{total_subsets, AnonymityScore, NormalizedMatch, ScoreAggregator, ScorePolicy};
pub use sum_index::{PartialCounts, SubsetRecord, SumIndex};
