//! Builder utilities for configuring [`ThredgeGraph`] models.
//!
//! Collects the vertex count, correlation, density target, and backend, and
//! validates them together before any covariance work is done.

use tracing::{info, instrument};

use crate::{
    Result,
    calibration::ThresholdCalibrator,
    error::{ThredgeError, ensure_threshold},
    latent::{CovarianceBackend, LatentModel},
    sampler::ThredgeGraph,
};

/// How the edge threshold of a model is chosen.
///
/// # Examples
/// ```
/// use thredge_core::{ThredgeGraph, ThresholdSpec};
///
/// let graph = ThredgeGraph::new(20, 0.2, ThresholdSpec::MeanDegree(4.0))
///     .expect("configuration is valid");
/// assert!((graph.expected_mean_degree() - 4.0).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ThresholdSpec {
    /// Use this threshold directly.
    Threshold(f64),
    /// Calibrate the threshold so the expected degree matches this target.
    MeanDegree(f64),
}

/// Configures and constructs [`ThredgeGraph`] instances.
///
/// Exactly one of [`Self::with_threshold`] and [`Self::with_mean_degree`]
/// must be called before [`Self::build`].
///
/// # Examples
/// ```
/// use thredge_core::{CovarianceBackend, ThredgeGraphBuilder};
///
/// let graph = ThredgeGraphBuilder::new(50)
///     .with_correlation(0.25)
///     .with_mean_degree(6.0)
///     .with_backend(CovarianceBackend::VertexFactor)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(graph.vertex_count(), 50);
/// assert_eq!(graph.backend(), CovarianceBackend::VertexFactor);
/// ```
#[derive(Clone, Debug)]
pub struct ThredgeGraphBuilder {
    vertices: usize,
    correlation: f64,
    threshold: Option<f64>,
    mean_degree: Option<f64>,
    backend: CovarianceBackend,
    calibrator: ThresholdCalibrator,
}

impl ThredgeGraphBuilder {
    /// Creates a builder for an `N`-vertex model with independent edges.
    #[must_use]
    pub fn new(vertices: usize) -> Self {
        Self {
            vertices,
            correlation: 0.0,
            threshold: None,
            mean_degree: None,
            backend: CovarianceBackend::default(),
            calibrator: ThresholdCalibrator::default(),
        }
    }

    /// Overrides the vertex count.
    #[must_use]
    pub const fn with_vertices(mut self, vertices: usize) -> Self {
        self.vertices = vertices;
        self
    }

    /// Sets the covariance `b` between edges sharing one endpoint.
    #[must_use]
    pub const fn with_correlation(mut self, correlation: f64) -> Self {
        self.correlation = correlation;
        self
    }

    /// Uses `threshold` directly as the edge threshold.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Calibrates the threshold so the expected degree is `mean_degree`.
    #[must_use]
    pub const fn with_mean_degree(mut self, mean_degree: f64) -> Self {
        self.mean_degree = Some(mean_degree);
        self
    }

    /// Applies a [`ThresholdSpec`].
    #[must_use]
    pub const fn with_threshold_spec(self, spec: ThresholdSpec) -> Self {
        match spec {
            ThresholdSpec::Threshold(threshold) => self.with_threshold(threshold),
            ThresholdSpec::MeanDegree(mean_degree) => self.with_mean_degree(mean_degree),
        }
    }

    /// Selects how latent weights are realised.
    #[must_use]
    pub const fn with_backend(mut self, backend: CovarianceBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Overrides the Newton solver used for mean-degree calibration.
    #[must_use]
    pub const fn with_calibrator(mut self, calibrator: ThresholdCalibrator) -> Self {
        self.calibrator = calibrator;
        self
    }

    /// Returns the configured vertex count.
    #[must_use]
    pub const fn vertices(&self) -> usize {
        self.vertices
    }

    /// Returns the configured correlation.
    #[must_use]
    pub const fn correlation(&self) -> f64 {
        self.correlation
    }

    /// Returns the configured backend.
    #[must_use]
    pub const fn backend(&self) -> CovarianceBackend {
        self.backend
    }

    /// Validates the configuration and constructs a [`ThredgeGraph`].
    ///
    /// The threshold is resolved before the covariance is factorised, so
    /// cheap configuration mistakes are reported without doing `O(m^3)` work.
    ///
    /// # Errors
    /// Returns [`ThredgeError::TooFewVertices`] when fewer than two vertices
    /// are configured, [`ThredgeError::ThresholdUnspecified`] or
    /// [`ThredgeError::ThresholdOverspecified`] unless exactly one density
    /// target is set, the calibration errors of
    /// [`ThresholdCalibrator::threshold_for_mean_degree`], and the
    /// covariance errors of [`crate::CorrelationModel::new`].
    #[instrument(
        name = "core.graph.build",
        err,
        skip(self),
        fields(
            vertices = self.vertices,
            correlation = self.correlation,
            backend = ?self.backend,
        ),
    )]
    pub fn build(self) -> Result<ThredgeGraph> {
        if self.vertices < 2 {
            return Err(ThredgeError::TooFewVertices { got: self.vertices });
        }
        let threshold = match (self.threshold, self.mean_degree) {
            (Some(threshold), None) => ensure_threshold(threshold)?,
            (None, Some(mean_degree)) => self
                .calibrator
                .threshold_for_mean_degree(self.vertices, mean_degree)?,
            (Some(threshold), Some(mean_degree)) => {
                return Err(ThredgeError::ThresholdOverspecified {
                    threshold,
                    mean_degree,
                });
            }
            (None, None) => return Err(ThredgeError::ThresholdUnspecified),
        };

        let latent = LatentModel::build(self.backend, self.vertices, self.correlation)?;
        info!(
            edges = latent.indexer().edge_count(),
            threshold, "graph model ready"
        );
        Ok(ThredgeGraph::from_parts(latent, threshold, self.calibrator))
    }
}
