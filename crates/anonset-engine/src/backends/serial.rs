//! Serial compute backend
//!
//! Runs everything on the calling thread. Used for small transactions and
//! as the reference the parallel backends are checked against.

use super::try_counting_lane;
use crate::domain::{match_all, AmountSet, MatchCount, SubsetEnumerator, SumIndex};
use crate::error::EngineError;
use crate::{Backend, ComputeEngine, DeviceInfo};

/// Single-threaded compute engine
pub struct SerialEngine {
    device_info: DeviceInfo,
    dense_limit: u64,
}

impl SerialEngine {
    pub fn new(dense_limit: u64) -> Self {
        Self {
            device_info: DeviceInfo {
                name: "Calling thread".to_string(),
                backend: Backend::Serial,
                compute_units: 1,
                memory_bytes: 0,
            },
            dense_limit,
        }
    }
}

impl Default for SerialEngine {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_DENSE_HISTOGRAM_LIMIT)
    }
}

#[async_trait::async_trait]
impl ComputeEngine for SerialEngine {
    fn backend(&self) -> Backend {
        Backend::Serial
    }

    fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    async fn enumerate_sums(&self, half: &AmountSet) -> Result<SumIndex, EngineError> {
        if let Some(index) = try_counting_lane(half, self.dense_limit)? {
            return Ok(index);
        }
        SubsetEnumerator::new(half)?.enumerate()
    }

    async fn count_matches(
        &self,
        low: &SumIndex,
        high: &SumIndex,
        outputs: &AmountSet,
    ) -> Result<Vec<MatchCount>, EngineError> {
        match_all(low, high, outputs)
    }
}
