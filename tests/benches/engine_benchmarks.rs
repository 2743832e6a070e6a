//! # Anonset Engine Benchmarks
//!
//! | Group | Measures |
//! |-------|----------|
//! | `anonset/enumerate_half` | One half, serial vs Rayon pools |
//! | `anonset/counting_lane` | Counting DP vs Gray-code enumeration |
//! | `anonset/full_invocation` | End-to-end by input count |
//! | `anonset/matching` | Output matching throughput |

use anonset_tests::benchmarks::engine;
use criterion::{criterion_group, criterion_main};

criterion_group!(
    benches,
    engine::enumerate_half,
    engine::counting_lane,
    engine::full_invocation,
    engine::matching,
);

criterion_main!(benches);
