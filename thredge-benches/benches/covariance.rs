//! Covariance construction and Cholesky factorisation benchmarks.
//!
//! Separates the `O(N^3)` triangle enumeration that fills the covariance from
//! the `O(m^3)` factorisation that dominates model construction.
#![expect(missing_docs, reason = "Criterion macros generate undocumented items")]
#![expect(
    clippy::expect_used,
    reason = "benchmark setup is infallible for valid constants"
)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use thredge_benches::params::CovarianceBenchParams;
use thredge_core::{CorrelationModel, EdgeIndexer, build_covariance};

/// Vertex counts to benchmark; `m` grows quadratically.
const VERTEX_COUNTS: &[usize] = &[10, 20, 40];

const CORRELATION: f64 = 0.2;

fn covariance_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("covariance_construction");
    for &vertices in VERTEX_COUNTS {
        let params = CovarianceBenchParams {
            vertices,
            correlation: CORRELATION,
        };
        let indexer = EdgeIndexer::new(vertices);
        group.bench_with_input(BenchmarkId::from_parameter(params), &indexer, |b, indexer| {
            b.iter(|| build_covariance(indexer, CORRELATION));
        });
    }
    group.finish();
}

fn covariance_factorisation(c: &mut Criterion) {
    let mut group = c.benchmark_group("covariance_factorisation");
    group.sample_size(10);
    for &vertices in VERTEX_COUNTS {
        let params = CovarianceBenchParams {
            vertices,
            correlation: CORRELATION,
        };
        group.bench_with_input(BenchmarkId::from_parameter(params), &params, |b, params| {
            b.iter(|| {
                CorrelationModel::new(params.vertices, params.correlation)
                    .expect("correlation is admissible")
            });
        });
    }
    group.finish();
}

criterion_group!(benches, covariance_construction, covariance_factorisation);
criterion_main!(benches);
