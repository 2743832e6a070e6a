//! CPU compute backend using Rayon
//!
//! Owns a dedicated thread pool sized by configuration, so the engine never
//! competes with whatever else the host runs on rayon's global pool.

use rayon::ThreadPool;

use super::try_counting_lane;
use crate::dispatch::{build_pool, ParallelDispatcher};
use crate::domain::{AmountSet, MatchCount, SumIndex};
use crate::error::EngineError;
use crate::{Backend, ComputeEngine, DeviceInfo};

/// CPU-based compute engine using Rayon
pub struct CpuEngine {
    device_info: DeviceInfo,
    pool: ThreadPool,
    shard_count: usize,
    dense_limit: u64,
}

impl CpuEngine {
    pub fn new(
        workers: usize,
        shards_per_worker: usize,
        dense_limit: u64,
    ) -> Result<Self, EngineError> {
        if workers == 0 {
            return Err(EngineError::InvalidConfig(
                "worker count cannot be 0".to_string(),
            ));
        }
        let pool = build_pool(workers, Backend::Cpu)?;

        Ok(Self {
            device_info: DeviceInfo {
                name: format!("CPU ({} workers)", workers),
                backend: Backend::Cpu,
                compute_units: workers as u32,
                memory_bytes: 0, // System memory, not tracked
            },
            pool,
            shard_count: workers.saturating_mul(shards_per_worker.max(1)),
            dense_limit,
        })
    }

    fn dispatcher(&self) -> ParallelDispatcher<'_> {
        ParallelDispatcher::new(&self.pool, Backend::Cpu, self.shard_count, self.dense_limit)
    }
}

#[async_trait::async_trait]
impl ComputeEngine for CpuEngine {
    fn backend(&self) -> Backend {
        Backend::Cpu
    }

    fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    async fn enumerate_sums(&self, half: &AmountSet) -> Result<SumIndex, EngineError> {
        if let Some(index) = try_counting_lane(half, self.dense_limit)? {
            return Ok(index);
        }
        self.dispatcher().enumerate(half)
    }

    async fn count_matches(
        &self,
        low: &SumIndex,
        high: &SumIndex,
        outputs: &AmountSet,
    ) -> Result<Vec<MatchCount>, EngineError> {
        self.dispatcher().count_matches(low, high, outputs)
    }
}
