//! Seeded model construction for benchmarks.

use rand::{SeedableRng, rngs::SmallRng};
use thiserror::Error;
use thredge_core::{ThredgeError, ThredgeGraph};

use crate::params::SamplingBenchParams;

/// Seed shared by every benchmark so runs are comparable.
pub const BENCH_SEED: u64 = 0x5eed_7412;

/// Errors raised while preparing a benchmark fixture.
#[derive(Debug, Error)]
pub enum BenchSetupError {
    /// The model rejected the benchmark parameters.
    #[error("model for {params} could not be built: {source}")]
    Model {
        /// Rendered benchmark parameters.
        params: String,
        /// Error reported by the core library.
        #[source]
        source: ThredgeError,
    },
}

/// Builds the graph model described by `params`.
///
/// # Errors
/// Returns [`BenchSetupError::Model`] when the parameters are rejected.
pub fn build_graph(params: &SamplingBenchParams) -> Result<ThredgeGraph, BenchSetupError> {
    ThredgeGraph::builder(params.vertices)
        .with_correlation(params.correlation)
        .with_mean_degree(params.mean_degree)
        .with_backend(params.backend)
        .build()
        .map_err(|source| BenchSetupError::Model {
            params: params.to_string(),
            source,
        })
}

/// Returns a generator seeded with [`BENCH_SEED`].
#[must_use]
pub fn bench_rng() -> SmallRng {
    SmallRng::seed_from_u64(BENCH_SEED)
}
