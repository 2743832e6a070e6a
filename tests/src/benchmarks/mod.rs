//! # Anonset Benchmarks
//!
//! Performance benchmarks per engine stage.

pub mod engine;
