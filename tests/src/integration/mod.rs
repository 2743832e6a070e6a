//! # Integration Tests
//!
//! Host-level flows through the public engine API.

pub mod flows;
