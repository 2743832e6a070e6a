//! OpenCL compute backend
//!
//! Offloads subset-sum enumeration to any OpenCL device (NVIDIA, AMD,
//! Intel, Apple via OpenCL 1.2). Each work item sums one mask directly, so
//! batches are independent. Sums are read back per batch and accumulated on
//! the host; matching runs on the CPU pool.
//!
//! Overflow is detected on the device and reported through a flag buffer.
//! There is no sentinel sum value.
//!
//! NOTE: OpenCL Kernel objects contain raw pointers and are not thread-safe.
//! We wrap them in a Mutex to ensure safe concurrent access.

use std::sync::Mutex;

use rayon::ThreadPool;

use crate::config::EngineConfig;
use crate::dispatch::{build_pool, ParallelDispatcher};
use crate::domain::{AmountSet, MatchCount, PartialCounts, SubsetEnumerator, SumIndex, MAX_AMOUNT};
use crate::error::EngineError;
use crate::{Backend, ComputeEngine, DeviceInfo};

/// Subset-sum kernel source
const SUBSET_SUM_KERNEL: &str = r"
__kernel void subset_sums(
    __global const ulong* amounts,
    const uint k,
    const ulong mask_start,
    const ulong max_sum,
    __global ulong* sums,
    __global int* overflow
) {
    ulong gid = get_global_id(0);
    ulong mask = mask_start + gid;
    ulong sum = 0;

    for (uint bit = 0; bit < k; bit++) {
        if (mask & (1UL << bit)) {
            ulong next = sum + amounts[bit];
            if (next < sum || next > max_sum) {
                atomic_xchg(overflow, 1);
                sums[gid] = 0;
                return;
            }
            sum = next;
        }
    }

    sums[gid] = sum;
}
";

/// Work items per kernel launch
const BATCH_SIZE: u64 = 1 << 20;

fn device_error(e: impl std::fmt::Display) -> EngineError {
    EngineError::execution(Backend::OpenCL, e.to_string())
}

/// OpenCL-based compute engine
///
/// The kernel is wrapped in a Mutex because ocl::Kernel contains raw pointers
/// that are not Sync. This ensures thread-safe access.
pub struct OpenClEngine {
    device_info: DeviceInfo,
    queue: ocl::Queue,
    /// Kernel wrapped in Mutex for thread safety (ocl::Kernel is not Sync)
    sum_kernel: Mutex<ocl::Kernel>,
    /// Host pool for matching
    pool: ThreadPool,
    shard_count: usize,
    dense_limit: u64,
}

impl OpenClEngine {
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        // get_platform_ids returns Result instead of panicking
        let platform_ids = ocl::core::get_platform_ids().map_err(|e| {
            device_error(format!(
                "Failed to get OpenCL platforms: {}. Is OpenCL installed?",
                e
            ))
        })?;

        let platform_id = platform_ids
            .first()
            .cloned()
            .ok_or(EngineError::BackendUnavailable(Backend::OpenCL))?;
        let platform = ocl::Platform::new(platform_id);

        let device = ocl::Device::list(platform, Some(ocl::flags::DeviceType::GPU))
            .map_err(device_error)?
            .into_iter()
            .next()
            .or_else(|| ocl::Device::list(platform, None).ok()?.into_iter().next())
            .ok_or(EngineError::BackendUnavailable(Backend::OpenCL))?;

        let context = ocl::Context::builder()
            .platform(platform)
            .devices(device)
            .build()
            .map_err(device_error)?;

        let queue = ocl::Queue::new(&context, device, None).map_err(device_error)?;

        let program = ocl::Program::builder()
            .src(SUBSET_SUM_KERNEL)
            .devices(device)
            .build(&context)
            .map_err(device_error)?;

        // ocl requires args declared at build time
        let sum_kernel = ocl::Kernel::builder()
            .program(&program)
            .name("subset_sums")
            .queue(queue.clone())
            .arg(None::<&ocl::Buffer<u64>>) // 0: amounts
            .arg(0u32) // 1: k
            .arg(0u64) // 2: mask_start
            .arg(MAX_AMOUNT) // 3: max_sum
            .arg(None::<&ocl::Buffer<u64>>) // 4: sums
            .arg(None::<&ocl::Buffer<i32>>) // 5: overflow
            .build()
            .map_err(device_error)?;

        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        let compute_units = device
            .info(ocl::core::DeviceInfo::MaxComputeUnits)
            .ok()
            .and_then(|v| match v {
                ocl::core::DeviceInfoResult::MaxComputeUnits(n) => Some(n),
                _ => None,
            })
            .unwrap_or(1);
        let memory = device
            .info(ocl::core::DeviceInfo::GlobalMemSize)
            .ok()
            .and_then(|v| match v {
                ocl::core::DeviceInfoResult::GlobalMemSize(n) => Some(n),
                _ => None,
            })
            .unwrap_or(0);

        let workers = num_cpus::get();
        let pool = build_pool(workers, Backend::OpenCL)?;

        Ok(Self {
            device_info: DeviceInfo {
                name: device_name,
                backend: Backend::OpenCL,
                compute_units,
                memory_bytes: memory,
            },
            queue,
            sum_kernel: Mutex::new(sum_kernel),
            pool,
            shard_count: workers.saturating_mul(config.shards_per_worker.max(1)),
            dense_limit: config.dense_histogram_limit,
        })
    }

    fn enumerate_on_device(&self, half: &AmountSet) -> Result<SumIndex, EngineError> {
        // Validates the half length and gives 2^k
        let mask_count = SubsetEnumerator::new(half)?.mask_count();

        let amounts_buf = ocl::Buffer::builder()
            .queue(self.queue.clone())
            .flags(ocl::flags::MemFlags::new().read_only().copy_host_ptr())
            .len(half.len())
            .copy_host_slice(half.as_slice())
            .build()
            .map_err(device_error)?;

        let overflow_buf = ocl::Buffer::<i32>::builder()
            .queue(self.queue.clone())
            .flags(ocl::flags::MemFlags::new().read_write().copy_host_ptr())
            .len(1)
            .copy_host_slice(&[0i32])
            .build()
            .map_err(device_error)?;

        let kernel = self
            .sum_kernel
            .lock()
            .map_err(|e| device_error(format!("Kernel lock poisoned: {}", e)))?;

        kernel.set_arg(0, &amounts_buf).map_err(device_error)?;
        kernel.set_arg(1, half.len() as u32).map_err(device_error)?;
        kernel.set_arg(3, MAX_AMOUNT).map_err(device_error)?;
        kernel.set_arg(5, &overflow_buf).map_err(device_error)?;

        let mut partial = PartialCounts::new();
        let mut mask_start = 0u64;

        while mask_start < mask_count {
            let work_size = std::cmp::min(BATCH_SIZE, mask_count - mask_start) as usize;

            let sums_buf = ocl::Buffer::<u64>::builder()
                .queue(self.queue.clone())
                .flags(ocl::flags::MemFlags::new().write_only())
                .len(work_size)
                .build()
                .map_err(device_error)?;

            kernel.set_arg(2, mask_start).map_err(device_error)?;
            kernel.set_arg(4, &sums_buf).map_err(device_error)?;

            // SAFETY: every argument is bound above and the sums buffer holds
            // exactly `work_size` elements, one per work item.
            unsafe {
                kernel
                    .cmd()
                    .global_work_size(work_size)
                    .enq()
                    .map_err(device_error)?;
            }

            self.queue.finish().map_err(device_error)?;

            // ocl requires slices for reads, not arrays
            let mut overflow = vec![0i32; 1];
            overflow_buf.read(&mut overflow).enq().map_err(device_error)?;
            if overflow[0] != 0 {
                return Err(EngineError::sum_overflow("enumerating subsets on device"));
            }

            let mut sums = vec![0u64; work_size];
            sums_buf.read(&mut sums).enq().map_err(device_error)?;
            for sum in sums {
                partial.record(sum)?;
            }

            mask_start += work_size as u64;
        }

        Ok(SumIndex::from_partial(partial))
    }
}

#[async_trait::async_trait]
impl ComputeEngine for OpenClEngine {
    fn backend(&self) -> Backend {
        Backend::OpenCL
    }

    fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    async fn enumerate_sums(&self, half: &AmountSet) -> Result<SumIndex, EngineError> {
        // Zero-length device buffers are invalid
        if half.is_empty() {
            return Ok(SumIndex::empty_subset());
        }
        self.enumerate_on_device(half)
    }

    async fn count_matches(
        &self,
        low: &SumIndex,
        high: &SumIndex,
        outputs: &AmountSet,
    ) -> Result<Vec<MatchCount>, EngineError> {
        // Sorted-scan matching is branchy; it stays on the host pool
        ParallelDispatcher::new(&self.pool, Backend::OpenCL, self.shard_count, self.dense_limit)
            .count_matches(low, high, outputs)
    }
}
