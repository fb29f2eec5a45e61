//! Edge-pair covariance construction and Cholesky factorisation.
//!
//! Two edges are correlated exactly when they share one endpoint, and every
//! such pair lies on a triangle `(node, a), (node, c), (a, c)` of the complete
//! graph. Enumerating each triangle once fills the covariance matrix in
//! `O(N^3)` instead of comparing all `O(N^4)` edge pairs.

use nalgebra::{Cholesky, DMatrix, DVector};
use tracing::{debug, instrument, warn};

use crate::{
    Result,
    error::{ThredgeError, ensure_finite},
    indexing::EdgeIndexer,
};

/// Open interval of correlation values for which the covariance of an
/// `N`-vertex model is positive definite.
///
/// # Examples
/// ```
/// use thredge_core::CorrelationRange;
///
/// let range = CorrelationRange::for_vertices(10);
/// assert!(range.contains(0.4));
/// assert!(!range.contains(0.5));
/// assert!(!range.contains(-0.1));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CorrelationRange {
    lower: f64,
    upper: f64,
}

impl CorrelationRange {
    /// Computes the admissible range from the spectrum of the covariance.
    #[must_use]
    pub fn for_vertices(vertices: usize) -> Self {
        match vertices {
            0..=2 => Self {
                lower: f64::NEG_INFINITY,
                upper: f64::INFINITY,
            },
            3 => Self {
                lower: -0.5,
                upper: 1.0,
            },
            _ => Self {
                lower: -1.0 / (2.0 * vertices as f64 - 4.0),
                upper: 0.5,
            },
        }
    }

    /// Exclusive lower bound.
    #[must_use]
    pub const fn lower(&self) -> f64 {
        self.lower
    }

    /// Exclusive upper bound.
    #[must_use]
    pub const fn upper(&self) -> f64 {
        self.upper
    }

    /// Returns whether `correlation` lies strictly inside the range.
    #[must_use]
    pub fn contains(&self, correlation: f64) -> bool {
        self.lower < correlation && correlation < self.upper
    }
}

/// Open interval of correlations for which an `N`-vertex covariance is
/// positive definite.
///
/// Shorthand for [`CorrelationRange::for_vertices`].
#[must_use]
pub fn admissible_correlation_range(vertices: usize) -> CorrelationRange {
    CorrelationRange::for_vertices(vertices)
}

/// Returns the distinct eigenvalues of the covariance with their
/// multiplicities, as `(eigenvalue, multiplicity)` pairs.
///
/// The off-diagonal pattern is `b` times the adjacency matrix of the line
/// graph of the complete graph, whose spectrum is `2N - 4`, `N - 4` and `-2`.
/// Eigenvalues with zero multiplicity are omitted.
#[must_use]
pub fn analytic_spectrum(vertices: usize, correlation: f64) -> Vec<(f64, usize)> {
    let edges = EdgeIndexer::new(vertices).edge_count();
    if edges == 0 {
        return Vec::new();
    }
    let n = vertices as f64;
    let candidates = [
        (correlation.mul_add(2.0 * n - 4.0, 1.0), 1),
        (correlation.mul_add(n - 4.0, 1.0), vertices - 1),
        (correlation.mul_add(-2.0, 1.0), edges.saturating_sub(vertices)),
    ];
    candidates
        .into_iter()
        .take(edges.min(3))
        .filter(|&(_, multiplicity)| multiplicity > 0)
        .collect()
}

/// Fills the covariance matrix of an `N`-vertex model by triangle enumeration.
///
/// The diagonal is one, entries for edges sharing exactly one endpoint are
/// `correlation`, and all other entries are zero.
///
/// # Examples
/// ```
/// use thredge_core::{EdgeIndexer, build_covariance};
///
/// let indexer = EdgeIndexer::new(4);
/// let c = build_covariance(&indexer, 0.2);
/// let (e01, e23) = (indexer.edge_index(0, 1), indexer.edge_index(2, 3));
/// let e12 = indexer.edge_index(1, 2);
/// assert_eq!(c[(e01, e23)], 0.0);
/// assert_eq!(c[(e01, e12)], 0.2);
/// ```
#[must_use]
pub fn build_covariance(indexer: &EdgeIndexer, correlation: f64) -> DMatrix<f64> {
    let n = indexer.vertex_count();
    let mut covariance = DMatrix::identity(indexer.edge_count(), indexer.edge_count());
    for node in 0..n {
        for a in (node + 1)..n.saturating_sub(1) {
            let edge1 = indexer.edge_index(node, a);
            for c in (a + 1)..n {
                let edge2 = indexer.edge_index(node, c);
                let edge3 = indexer.edge_index(a, c);
                for (x, y) in [(edge1, edge2), (edge1, edge3), (edge2, edge3)] {
                    covariance[(x, y)] = correlation;
                    covariance[(y, x)] = correlation;
                }
            }
        }
    }
    covariance
}

/// Covariance matrix `C` of the latent edge weights together with its
/// lower-triangular Cholesky factor `L`.
///
/// Both matrices are rebuilt in full whenever the correlation changes.
///
/// # Examples
/// ```
/// use thredge_core::CorrelationModel;
///
/// let model = CorrelationModel::new(5, 0.3).expect("0.3 is admissible for 5 vertices");
/// let l = model.cholesky_factor();
/// let reconstructed = l * l.transpose();
/// assert!((reconstructed - model.covariance()).amax() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct CorrelationModel {
    indexer: EdgeIndexer,
    correlation: f64,
    covariance: DMatrix<f64>,
    factor: DMatrix<f64>,
}

impl CorrelationModel {
    /// Builds and factorises the covariance of an `N`-vertex model.
    ///
    /// # Errors
    /// Returns [`ThredgeError::TooFewVertices`] when `vertices < 2`,
    /// [`ThredgeError::NonFiniteParameter`] for a NaN or infinite correlation,
    /// and [`ThredgeError::NotPositiveDefinite`] when the covariance cannot be
    /// factorised.
    #[instrument(
        name = "core.correlation.rebuild",
        err,
        skip_all,
        fields(vertices = vertices, correlation = correlation),
    )]
    pub fn new(vertices: usize, correlation: f64) -> Result<Self> {
        if vertices < 2 {
            return Err(ThredgeError::TooFewVertices { got: vertices });
        }
        ensure_finite("correlation", correlation)?;

        let indexer = EdgeIndexer::new(vertices);
        let rejected = ThredgeError::NotPositiveDefinite {
            vertices,
            correlation,
        };
        let range = admissible_correlation_range(vertices);
        if !range.contains(correlation) {
            warn!(
                lower = range.lower(),
                upper = range.upper(),
                "correlation outside the positive-definite range"
            );
            return Err(rejected);
        }

        let covariance = build_covariance(&indexer, correlation);
        let Some(cholesky) = Cholesky::new(covariance.clone()) else {
            warn!("cholesky factorisation rejected the covariance");
            return Err(rejected);
        };
        let factor = cholesky.l();
        debug!(edges = indexer.edge_count(), "covariance factorised");

        Ok(Self {
            indexer,
            correlation,
            covariance,
            factor,
        })
    }

    /// Replaces the covariance and its factor for a new correlation.
    ///
    /// On error the current matrices are left untouched.
    ///
    /// # Errors
    /// Fails under the same conditions as [`Self::new`].
    pub fn update_correlation(&mut self, correlation: f64) -> Result<()> {
        *self = Self::new(self.indexer.vertex_count(), correlation)?;
        Ok(())
    }

    /// Returns the correlation parameter `b`.
    #[must_use]
    pub const fn correlation(&self) -> f64 {
        self.correlation
    }

    /// Returns the edge indexer shared with the covariance layout.
    #[must_use]
    pub const fn indexer(&self) -> &EdgeIndexer {
        &self.indexer
    }

    /// Returns the `m x m` covariance matrix `C`.
    #[must_use]
    pub const fn covariance(&self) -> &DMatrix<f64> {
        &self.covariance
    }

    /// Returns the lower-triangular factor `L` with `L * L^T = C`.
    #[must_use]
    pub const fn cholesky_factor(&self) -> &DMatrix<f64> {
        &self.factor
    }

    /// Maps independent standard normals `w` to correlated weights `L * w`.
    pub(crate) fn correlate(&self, white: &DVector<f64>) -> DVector<f64> {
        &self.factor * white
    }

    /// Maps each row `w` of `white` to `(L * w)^T`, i.e. computes `W * L^T`.
    pub(crate) fn correlate_rows(&self, white: &DMatrix<f64>) -> DMatrix<f64> {
        white * self.factor.transpose()
    }
}
