//! Shared test utilities used across thredge crates.

pub mod ci;
pub mod stats;
pub mod tracing;
