//! Graph sampling from thresholded latent edge weights.
//!
//! A [`ThredgeGraph`] owns the latent-weight model and the current threshold.
//! Every draw takes the caller's random number generator, so sampling is
//! reproducible under a seeded generator and the model itself is never
//! mutated by a draw.

use nalgebra::DMatrix;
use rand::Rng;
use tracing::{debug, instrument};

use crate::{
    Result,
    adjacency::{Adjacency, AdjacencyFormat, symmetric_adjacency},
    builder::{ThredgeGraphBuilder, ThresholdSpec},
    calibration::{ThresholdCalibrator, mean_degree_for_threshold},
    error::{IndexError, ensure_threshold},
    indexing::{Edge, EdgeIndexer},
    latent::{CovarianceBackend, LatentModel, WeightVector},
};

/// How [`ThredgeGraph::get_n_edge_lists`] draws its weight vectors.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DrawStrategy {
    /// Draw and threshold one weight vector at a time.
    #[default]
    PerCall,
    /// Draw every weight vector in one matrix product, then threshold each.
    /// Faster for many samples at the cost of holding all of them in memory.
    Batch,
}

/// Random graph model on `N` vertices whose edges appear when correlated
/// standard-normal weights reach a threshold.
///
/// Edges sharing one endpoint have weight covariance `b`; disjoint edges are
/// independent.
///
/// # Examples
/// ```
/// use rand::{SeedableRng, rngs::SmallRng};
/// use thredge_core::{ThredgeGraph, ThresholdSpec};
///
/// let graph = ThredgeGraph::new(12, 0.1, ThresholdSpec::Threshold(0.5))
///     .expect("configuration is valid");
/// let mut rng = SmallRng::seed_from_u64(42);
/// let edges = graph.get_new_edge_list(&mut rng);
/// assert!(edges.iter().all(|edge| edge.source() < edge.target()));
/// assert!(edges.windows(2).all(|pair| pair[0] < pair[1]));
/// ```
#[derive(Clone, Debug)]
pub struct ThredgeGraph {
    latent: LatentModel,
    threshold: f64,
    calibrator: ThresholdCalibrator,
}

impl ThredgeGraph {
    /// Builds a model with the dense backend.
    ///
    /// # Errors
    /// Returns the errors of [`ThredgeGraphBuilder::build`].
    pub fn new(vertices: usize, correlation: f64, spec: ThresholdSpec) -> Result<Self> {
        ThredgeGraphBuilder::new(vertices)
            .with_correlation(correlation)
            .with_threshold_spec(spec)
            .build()
    }

    /// Starts a [`ThredgeGraphBuilder`] for `vertices` vertices.
    #[must_use]
    pub fn builder(vertices: usize) -> ThredgeGraphBuilder {
        ThredgeGraphBuilder::new(vertices)
    }

    pub(crate) const fn from_parts(
        latent: LatentModel,
        threshold: f64,
        calibrator: ThresholdCalibrator,
    ) -> Self {
        Self {
            latent,
            threshold,
            calibrator,
        }
    }

    /// Returns the number of vertices `N`.
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.latent.indexer().vertex_count()
    }

    /// Returns the number of possible edges `N * (N - 1) / 2`.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.latent.indexer().edge_count()
    }

    /// Returns the covariance `b` between edges that share one endpoint.
    #[must_use]
    pub const fn correlation(&self) -> f64 {
        self.latent.correlation()
    }

    /// Returns the current edge threshold.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the backend that realises latent weights.
    #[must_use]
    pub const fn backend(&self) -> CovarianceBackend {
        self.latent.backend()
    }

    /// Returns the edge indexer for this vertex count.
    #[must_use]
    pub const fn indexer(&self) -> &EdgeIndexer {
        self.latent.indexer()
    }

    /// Returns the edge covariance matrix `C` when the dense backend is in use.
    #[must_use]
    pub fn covariance(&self) -> Option<&DMatrix<f64>> {
        self.latent.dense().map(|model| model.covariance())
    }

    /// Returns the lower Cholesky factor of `C` when the dense backend is in
    /// use.
    #[must_use]
    pub fn cholesky_factor(&self) -> Option<&DMatrix<f64>> {
        self.latent.dense().map(|model| model.cholesky_factor())
    }

    /// Returns the expected degree of a vertex at the current threshold.
    #[must_use]
    pub fn expected_mean_degree(&self) -> f64 {
        mean_degree_for_threshold(self.vertex_count(), self.threshold)
    }

    /// Replaces the threshold.
    ///
    /// # Errors
    /// Returns [`crate::ThredgeError::NonFiniteParameter`] for a NaN
    /// threshold, leaving the current one in place.
    pub fn set_threshold(&mut self, threshold: f64) -> Result<()> {
        self.threshold = ensure_threshold(threshold)?;
        Ok(())
    }

    /// Recalibrates the threshold so the expected degree is `mean_degree`.
    ///
    /// # Errors
    /// Returns the errors of
    /// [`ThresholdCalibrator::threshold_for_mean_degree`], leaving the current
    /// threshold in place.
    pub fn set_mean_degree(&mut self, mean_degree: f64) -> Result<()> {
        self.threshold = self
            .calibrator
            .threshold_for_mean_degree(self.vertex_count(), mean_degree)?;
        Ok(())
    }

    /// Rebuilds the latent model for a new correlation.
    ///
    /// The replacement is constructed in full before it is installed, so a
    /// rejected correlation leaves the model unchanged. The threshold is kept.
    ///
    /// # Errors
    /// Returns [`crate::ThredgeError::NotPositiveDefinite`] or
    /// [`crate::ThredgeError::UnsupportedCorrelation`] when the backend
    /// cannot represent `correlation`, and
    /// [`crate::ThredgeError::NonFiniteParameter`] when it is not finite.
    pub fn update_correlation(&mut self, correlation: f64) -> Result<()> {
        self.latent = LatentModel::build(self.backend(), self.vertex_count(), correlation)?;
        Ok(())
    }

    /// Draws one latent weight vector of length `m`.
    pub fn generate_weight_vector<R: Rng + ?Sized>(&self, rng: &mut R) -> WeightVector {
        self.latent.draw(rng)
    }

    /// Returns the edges whose weight in `weights` reaches `threshold`.
    ///
    /// Edges come back in increasing edge-index order, which is lexicographic
    /// `(source, target)` order. Weights beyond the model's edge count are
    /// ignored. `-inf` keeps every edge; `+inf` keeps none.
    ///
    /// # Errors
    /// Returns [`IndexError::WeightCountMismatch`] when `weights` holds fewer
    /// than `m` values.
    ///
    /// # Examples
    /// ```
    /// use thredge_core::{ThredgeGraph, ThresholdSpec, WeightVector};
    ///
    /// let graph = ThredgeGraph::new(3, 0.0, ThresholdSpec::Threshold(0.0))
    ///     .expect("configuration is valid");
    /// let weights = WeightVector::from_values(vec![1.0, -1.0, 0.2]);
    /// let edges: Vec<_> = graph
    ///     .threshold_and_get_edge_list(&weights, 0.1)
    ///     .expect("one weight per edge")
    ///     .into_iter()
    ///     .map(|edge| edge.as_tuple())
    ///     .collect();
    /// assert_eq!(edges, vec![(0, 1), (1, 2)]);
    /// ```
    pub fn threshold_and_get_edge_list(
        &self,
        weights: &WeightVector,
        threshold: f64,
    ) -> core::result::Result<Vec<Edge>, IndexError> {
        let expected = self.edge_count();
        if weights.len() < expected {
            return Err(IndexError::WeightCountMismatch {
                expected,
                actual: weights.len(),
            });
        }
        Ok(self.edges_at_or_above(weights, threshold))
    }

    /// Thresholds `weights` at the model's current threshold.
    ///
    /// # Errors
    /// Returns [`IndexError::WeightCountMismatch`] when `weights` holds fewer
    /// than `m` values.
    pub fn edge_list(
        &self,
        weights: &WeightVector,
    ) -> core::result::Result<Vec<Edge>, IndexError> {
        self.threshold_and_get_edge_list(weights, self.threshold)
    }

    /// Draws a fresh weight vector and returns its edge list.
    pub fn get_new_edge_list<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Edge> {
        let weights = self.generate_weight_vector(rng);
        self.edges_at_or_above(&weights, self.threshold)
    }

    /// Thresholds a vector holding at least `m` weights.
    fn edges_at_or_above(&self, weights: &WeightVector, threshold: f64) -> Vec<Edge> {
        let indexer = self.indexer();
        weights
            .indices_at_or_above(threshold)
            .take_while(|&e| e < indexer.edge_count())
            .map(|e| indexer.edge(e))
            .collect()
    }

    /// Draws a fresh graph and returns its symmetric adjacency matrix.
    pub fn get_new_adjacency_matrix<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        format: AdjacencyFormat,
    ) -> Adjacency {
        let edges = self.get_new_edge_list(rng);
        symmetric_adjacency(self.vertex_count(), &edges, format)
    }

    /// Draws `count` independent graphs and returns their edge lists.
    ///
    /// Both strategies sample the same distribution. [`DrawStrategy::Batch`]
    /// correlates every draw in one matrix product.
    #[instrument(
        name = "core.sample_batch",
        skip_all,
        fields(count = count, strategy = ?strategy, backend = ?self.backend()),
    )]
    pub fn get_n_edge_lists<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        count: usize,
        strategy: DrawStrategy,
    ) -> Vec<Vec<Edge>> {
        let lists: Vec<Vec<Edge>> = match strategy {
            DrawStrategy::PerCall => (0..count).map(|_| self.get_new_edge_list(rng)).collect(),
            DrawStrategy::Batch => self
                .latent
                .draw_batch(rng, count)
                .iter()
                .map(|weights| self.edges_at_or_above(weights, self.threshold))
                .collect(),
        };
        debug!(
            total_edges = lists.iter().map(Vec::len).sum::<usize>(),
            "sampled edge lists"
        );
        lists
    }
}
