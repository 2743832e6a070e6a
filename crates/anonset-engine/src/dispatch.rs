//! # Parallel Dispatcher
//!
//! Distributes subset enumeration and output matching across a rayon pool.
//!
//! ## Enumeration: Map-Reduce over the Mask Space
//!
//! 1. Plan: split the `2^k` Gray-code steps into contiguous shards
//! 2. Map (Parallel): each shard enumerates its steps into local state
//! 3. Reduce: partials merge by addition (commutative, associative)
//!
//! Local state is either a private [`PartialCounts`] map (sparse) or, when
//! the half's sum domain is small, per-slot atomic increments into one
//! pre-sized histogram (dense). There is no other shared mutable state.
//!
//! ## Failure
//!
//! A shard error or a worker panic fails the whole call with no index
//! returned, so a partially merged result can never escape.

use std::ops::Range;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::config::HARD_MAX_DENSE_HISTOGRAM_LIMIT;
use crate::domain::{match_output, AmountSet, MatchCount, PartialCounts, SubsetEnumerator, SumIndex};
use crate::error::EngineError;
use crate::Backend;

/// Histogram slots allowed per enumerated mask before dense accumulation
/// stops paying off.
const DENSE_SLOTS_PER_MASK: u64 = 64;

/// Contiguous range of Gray-code steps owned by one unit of work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskShard {
    pub index: usize,
    pub steps: Range<u64>,
}

/// Split `mask_count` steps into at most `shard_count` non-empty shards.
pub fn plan_shards(mask_count: u64, shard_count: usize) -> Vec<MaskShard> {
    if mask_count == 0 {
        return Vec::new();
    }
    let shard_count = (shard_count.max(1) as u64).min(mask_count);
    let base = mask_count / shard_count;
    let extra = mask_count % shard_count;

    let mut shards = Vec::with_capacity(shard_count as usize);
    let mut start = 0u64;
    for index in 0..shard_count {
        let len = base + u64::from(index < extra);
        shards.push(MaskShard {
            index: index as usize,
            steps: start..start + len,
        });
        start += len;
    }
    shards
}

/// How shard results are combined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accumulation {
    /// Worker-local maps merged by reduction.
    Sparse,
    /// Atomic increments into a histogram of `domain + 1` slots.
    Dense { domain: u64 },
}

impl Accumulation {
    pub fn choose(half: &AmountSet, dense_limit: u64) -> Self {
        let dense_limit = dense_limit.min(HARD_MAX_DENSE_HISTOGRAM_LIMIT);
        let masks = 1u64 << half.len().min(63);
        match half.total() {
            Ok(total)
                if total <= dense_limit
                    && total / DENSE_SLOTS_PER_MASK <= masks =>
            {
                Accumulation::Dense { domain: total }
            }
            _ => Accumulation::Sparse,
        }
    }
}

/// Build the worker pool for a backend.
pub fn build_pool(workers: usize, backend: Backend) -> Result<ThreadPool, EngineError> {
    ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("anonset-worker-{}", i))
        .build()
        .map_err(|e| EngineError::execution(backend, format!("thread pool: {}", e)))
}

/// Runs sharded work on a borrowed pool.
pub struct ParallelDispatcher<'p> {
    pool: &'p ThreadPool,
    backend: Backend,
    shard_count: usize,
    dense_limit: u64,
}

impl<'p> ParallelDispatcher<'p> {
    pub fn new(pool: &'p ThreadPool, backend: Backend, shard_count: usize, dense_limit: u64) -> Self {
        Self {
            pool,
            backend,
            shard_count: shard_count.max(1),
            dense_limit,
        }
    }

    /// Run `work` inside the pool, turning a panic into `ExecutionFailure`.
    pub fn run<T, F>(&self, work: F) -> Result<T, EngineError>
    where
        T: Send,
        F: FnOnce() -> Result<T, EngineError> + Send,
    {
        catch_unwind(AssertUnwindSafe(|| self.pool.install(work)))
            .map_err(|payload| EngineError::execution(self.backend, panic_message(payload)))?
    }

    /// Map every shard and reduce the results. `None` when there are no shards.
    pub fn reduce_shards<T, W, M>(
        &self,
        shards: &[MaskShard],
        work: W,
        merge: M,
    ) -> Result<Option<T>, EngineError>
    where
        T: Send,
        W: Fn(&MaskShard) -> Result<T, EngineError> + Sync + Send,
        M: Fn(T, T) -> Result<T, EngineError> + Sync + Send,
    {
        self.run(|| {
            shards
                .par_iter()
                .map(|shard| work(shard))
                .try_reduce_with(|a, b| merge(a, b))
                .transpose()
        })
    }

    /// Build the sum index of one half.
    pub fn enumerate(&self, half: &AmountSet) -> Result<SumIndex, EngineError> {
        if half.is_empty() {
            return Ok(SumIndex::empty_subset());
        }

        let enumerator = SubsetEnumerator::new(half)?;
        let shards = plan_shards(enumerator.mask_count(), self.shard_count);
        let accumulation = Accumulation::choose(half, self.dense_limit);

        tracing::debug!(
            backend = %self.backend,
            half_len = half.len(),
            shards = shards.len(),
            ?accumulation,
            "Enumerating half"
        );

        match accumulation {
            Accumulation::Sparse => {
                let merged = self.reduce_shards(
                    &shards,
                    |shard| enumerator.accumulate(shard.steps.clone()),
                    |a, b| a.merge(b),
                )?;
                Ok(SumIndex::from_partial(merged.unwrap_or_else(PartialCounts::new)))
            }
            Accumulation::Dense { domain } => {
                let histogram: Vec<AtomicU64> = (0..=domain).map(|_| AtomicU64::new(0)).collect();
                self.reduce_shards(
                    &shards,
                    |shard| {
                        enumerator.for_each_sum(shard.steps.clone(), |sum| {
                            let slot = histogram.get(sum as usize).ok_or_else(|| {
                                EngineError::sum_overflow("indexing the histogram")
                            })?;
                            slot.fetch_add(1, Ordering::Relaxed);
                            Ok(())
                        })
                    },
                    |_, _| Ok(()),
                )?;
                let counts: Vec<u64> = histogram.into_iter().map(AtomicU64::into_inner).collect();
                Ok(SumIndex::from_histogram(&counts))
            }
        }
    }

    /// Match every output in parallel; results stay in output order.
    pub fn count_matches(
        &self,
        low: &SumIndex,
        high: &SumIndex,
        outputs: &AmountSet,
    ) -> Result<Vec<MatchCount>, EngineError> {
        self.run(|| {
            outputs
                .as_slice()
                .par_iter()
                .enumerate()
                .map(|(index, &value)| match_output(low, high, index, value))
                .collect::<Result<Vec<_>, _>>()
        })
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("worker panicked: {}", msg)
    } else {
        "worker panicked".to_string()
    }
}
