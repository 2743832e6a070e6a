//! # Engine Benchmarks
//!
//! Claims to Validate:
//! - Meet-in-the-middle: a 28-input transaction costs ~2 x 2^14 masks, not 2^28
//! - Parallel enumeration scales with workers on sparse domains
//! - The counting lane beats enumeration on small denominations
//!
//! Brutal Conditions:
//! - Distinct 1e9-scale amounts (no dense histogram, no counting lane)
//! - Many outputs against one index pair

use std::time::Duration;

use anonset_engine::backends::cpu::CpuEngine;
use anonset_engine::backends::serial::SerialEngine;
use anonset_engine::config::ExecutionMode;
use anonset_engine::domain::{count_by_dynamic_programming, SubsetEnumerator};
use anonset_engine::{
    create_backend, AmountSet, AnonymitySetService, ComputeEngine, EngineConfig, ScorePolicy,
};
use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use futures::executor::block_on;

use crate::fixtures::{distinct_transaction, random_transaction};

fn half(seed: u64, len: usize) -> AmountSet {
    let tx = distinct_transaction(seed, len);
    let amounts: Vec<u64> = tx.inputs.iter().map(|&v| v as u64).collect();
    AmountSet::inputs(&amounts).expect("positive amounts")
}

/// Enumeration of one half: serial vs CPU pool
pub fn enumerate_half(c: &mut Criterion) {
    let mut group = c.benchmark_group("anonset/enumerate_half");
    group.measurement_time(Duration::from_secs(10));

    let serial = SerialEngine::new(0);
    let pools: Vec<(usize, CpuEngine)> = [2usize, 4, 8]
        .into_iter()
        .map(|workers| (workers, CpuEngine::new(workers, 4, 0).expect("pool")))
        .collect();

    for len in [12usize, 14, 16] {
        let set = half(len as u64, len);
        group.throughput(Throughput::Elements(1 << len));

        group.bench_with_input(BenchmarkId::new("serial", len), &set, |b, set| {
            b.iter(|| block_on(serial.enumerate_sums(black_box(set))).expect("enumerates"))
        });

        for (workers, engine) in &pools {
            group.bench_with_input(
                BenchmarkId::new(format!("cpu_{}_workers", workers), len),
                &set,
                |b, set| {
                    b.iter(|| block_on(engine.enumerate_sums(black_box(set))).expect("enumerates"))
                },
            );
        }
    }

    group.finish();
}

/// Counting lane vs Gray-code enumeration on small denominations
pub fn counting_lane(c: &mut Criterion) {
    let mut group = c.benchmark_group("anonset/counting_lane");
    group.measurement_time(Duration::from_secs(5));

    let values: Vec<u64> = (0..16).map(|i| 1 + (i % 5)).collect();
    let set = AmountSet::inputs(&values).expect("small amounts");

    group.bench_function("dynamic_programming", |b| {
        b.iter(|| count_by_dynamic_programming(black_box(&set), 1 << 20).expect("counts"))
    });
    group.bench_function("gray_code", |b| {
        b.iter(|| {
            SubsetEnumerator::new(black_box(&set))
                .and_then(|e| e.enumerate())
                .expect("enumerates")
        })
    });

    group.finish();
}

/// End-to-end invocation by transaction size
pub fn full_invocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("anonset/full_invocation");
    group.measurement_time(Duration::from_secs(15));
    group.sample_size(10);

    let modes = [
        ("serial", ExecutionMode::SingleThreaded),
        ("cpu", ExecutionMode::MultiThreaded { workers: None }),
    ];

    for inputs in [16usize, 22, 28] {
        let tx = random_transaction(inputs as u64, inputs, 8);
        for (name, mode) in modes {
            let service = AnonymitySetService::new(
                EngineConfig::default()
                    .with_execution_mode(mode)
                    .with_score_policy(ScorePolicy::PerOutput),
            )
            .expect("backend");

            group.bench_with_input(BenchmarkId::new(name, inputs), &tx, |b, tx| {
                b.iter(|| block_on(service.compute(&tx.inputs, &tx.outputs)).expect("computes"))
            });
        }
    }

    group.finish();
}

/// Matching many outputs against one index pair
pub fn matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("anonset/matching");
    group.measurement_time(Duration::from_secs(5));

    let engine = create_backend(&EngineConfig::default()).expect("default backend");
    let low = block_on(engine.enumerate_sums(&half(1, 14))).expect("low");
    let high = block_on(engine.enumerate_sums(&half(2, 14))).expect("high");

    for count in [10usize, 100, 1000] {
        let outputs: Vec<u64> = (0..count as u64).map(|i| i * 7_919_993).collect();
        let outputs = AmountSet::outputs(&outputs).expect("outputs");
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("outputs", count), &outputs, |b, outputs| {
            b.iter(|| block_on(engine.count_matches(&low, &high, black_box(outputs))).expect("matches"))
        });
    }

    group.finish();
}

