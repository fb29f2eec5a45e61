//! Latent edge-weight vectors and the backends that draw them.
//!
//! Every backend produces weights with standard-normal marginals, covariance
//! `b` between edges that share one endpoint, and zero covariance otherwise.

use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rand_distr::StandardNormal;
use tracing::debug;

use crate::{
    Result,
    covariance::CorrelationModel,
    error::{ThredgeError, ensure_finite},
    indexing::EdgeIndexer,
};

/// How latent weights are realised.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CovarianceBackend {
    /// Materialise the covariance `C` and its Cholesky factor `L`, then draw
    /// `X = L * w`. Supports every positive-definite correlation, including
    /// negative values.
    #[default]
    Dense,
    /// Draw one normal per vertex and one per edge and combine them as
    /// `X_ij = sqrt(b) * (Z_i + Z_j) + sqrt(1 - 2b) * e_ij`. Never builds `C`,
    /// costs `O(N + m)` per draw, and requires `0 <= b <= 1/2`.
    VertexFactor,
}

/// One realisation of the latent edge weights, indexed by edge index.
///
/// Weight vectors are plain values: thresholding one again at a different
/// level reuses the same draw without touching the graph model.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightVector {
    values: DVector<f64>,
}

impl WeightVector {
    /// Wraps precomputed weights, one per edge index.
    #[must_use]
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            values: DVector::from_vec(values),
        }
    }

    /// Returns the number of weights.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether the vector holds no weights.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the weight of edge index `e`.
    #[must_use]
    pub fn get(&self, e: usize) -> Option<f64> {
        self.values.get(e).copied()
    }

    /// Returns the weights as a slice in edge-index order.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        self.values.as_slice()
    }

    /// Returns the edge indices whose weight reaches `threshold`.
    pub fn indices_at_or_above(&self, threshold: f64) -> impl Iterator<Item = usize> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(move |&(_, &weight)| weight >= threshold)
            .map(|(e, _)| e)
    }
}

/// Shared-vertex construction used by [`CovarianceBackend::VertexFactor`].
#[derive(Clone, Copy, Debug)]
pub(crate) struct VertexFactor {
    indexer: EdgeIndexer,
    correlation: f64,
    shared_scale: f64,
    edge_scale: f64,
}

impl VertexFactor {
    fn new(indexer: EdgeIndexer, correlation: f64) -> Result<Self> {
        if !(0.0..=0.5).contains(&correlation) {
            return Err(ThredgeError::UnsupportedCorrelation {
                backend: CovarianceBackend::VertexFactor,
                correlation,
            });
        }
        Ok(Self {
            indexer,
            correlation,
            shared_scale: correlation.sqrt(),
            edge_scale: 2.0_f64.mul_add(-correlation, 1.0).sqrt(),
        })
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> DVector<f64> {
        let vertex_terms: Vec<f64> = (0..self.indexer.vertex_count())
            .map(|_| rng.sample::<f64, _>(StandardNormal))
            .collect();
        let edges = self.indexer.edges().map(|edge| {
            let own: f64 = rng.sample(StandardNormal);
            let shared = vertex_terms[edge.source()] + vertex_terms[edge.target()];
            self.shared_scale.mul_add(shared, self.edge_scale * own)
        });
        DVector::from_iterator(self.indexer.edge_count(), edges)
    }
}

/// The latent-weight state of a graph model.
#[derive(Clone, Debug)]
pub(crate) enum LatentModel {
    Dense(CorrelationModel),
    VertexFactor(VertexFactor),
}

impl LatentModel {
    pub(crate) fn build(
        backend: CovarianceBackend,
        vertices: usize,
        correlation: f64,
    ) -> Result<Self> {
        match backend {
            CovarianceBackend::Dense => CorrelationModel::new(vertices, correlation).map(Self::Dense),
            CovarianceBackend::VertexFactor => {
                if vertices < 2 {
                    return Err(ThredgeError::TooFewVertices { got: vertices });
                }
                ensure_finite("correlation", correlation)?;
                let factor = VertexFactor::new(EdgeIndexer::new(vertices), correlation)?;
                debug!(vertices, correlation, "vertex factor ready");
                Ok(Self::VertexFactor(factor))
            }
        }
    }

    pub(crate) const fn backend(&self) -> CovarianceBackend {
        match self {
            Self::Dense(_) => CovarianceBackend::Dense,
            Self::VertexFactor(_) => CovarianceBackend::VertexFactor,
        }
    }

    pub(crate) const fn indexer(&self) -> &EdgeIndexer {
        match self {
            Self::Dense(model) => model.indexer(),
            Self::VertexFactor(factor) => &factor.indexer,
        }
    }

    pub(crate) const fn correlation(&self) -> f64 {
        match self {
            Self::Dense(model) => model.correlation(),
            Self::VertexFactor(factor) => factor.correlation,
        }
    }

    pub(crate) const fn dense(&self) -> Option<&CorrelationModel> {
        match self {
            Self::Dense(model) => Some(model),
            Self::VertexFactor(_) => None,
        }
    }

    /// Draws one weight vector.
    pub(crate) fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> WeightVector {
        let values = match self {
            Self::Dense(model) => {
                let m = model.indexer().edge_count();
                let white = DVector::from_fn(m, |_, _| rng.sample::<f64, _>(StandardNormal));
                model.correlate(&white)
            }
            Self::VertexFactor(factor) => factor.draw(rng),
        };
        WeightVector { values }
    }

    /// Draws `count` weight vectors from the zero-mean multivariate normal
    /// with covariance `C`.
    ///
    /// The dense backend draws a `count x m` standard-normal matrix `W` and
    /// correlates every row at once with `W * L^T`.
    pub(crate) fn draw_batch<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Vec<WeightVector> {
        match self {
            Self::Dense(model) => {
                let m = model.indexer().edge_count();
                let white = DMatrix::from_fn(count, m, |_, _| rng.sample::<f64, _>(StandardNormal));
                let correlated = model.correlate_rows(&white);
                correlated
                    .row_iter()
                    .map(|row| WeightVector {
                        values: row.transpose(),
                    })
                    .collect()
            }
            Self::VertexFactor(factor) => (0..count)
                .map(|_| WeightVector {
                    values: factor.draw(rng),
                })
                .collect(),
        }
    }
}
