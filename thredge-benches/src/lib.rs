//! Benchmark support crate for thredge.
//!
//! Provides parameter types and seeded model setup shared by the Criterion
//! benchmarks for covariance factorisation and graph sampling.

pub mod params;
pub mod setup;
