//! Error types for the thredge core library.
//!
//! Defines the error enums exposed by the public API, their stable
//! machine-readable codes, and a convenient result alias.

use std::fmt;

use thiserror::Error;

use crate::latent::CovarianceBackend;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Broad failure category of a [`ThredgeError`].
///
/// Every category is deterministic in its inputs: retrying the same call
/// without changing the parameters fails the same way.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// The model parameters cannot describe a valid graph model.
    Configuration,
    /// A calibration target lies outside the domain it is defined on.
    Domain,
    /// A numerical routine failed to produce a result.
    Numerical,
}

/// An error produced by the checked [`crate::EdgeIndexer`] accessors.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum IndexError {
    /// A vertex id was not below the vertex count.
    #[error("vertex {vertex} is out of range for {vertices} vertices")]
    VertexOutOfRange {
        /// The offending vertex id.
        vertex: usize,
        /// Number of vertices in the graph.
        vertices: usize,
    },
    /// The pair was not given as `(i, j)` with `i < j`.
    #[error("pair ({source_vertex}, {target_vertex}) is not an edge with source < target")]
    NotCanonical {
        /// First vertex of the pair.
        source_vertex: usize,
        /// Second vertex of the pair.
        target_vertex: usize,
    },
    /// An edge index was not below the edge count.
    #[error("edge index {index} is out of range for {edges} edges")]
    EdgeOutOfRange {
        /// The offending edge index.
        index: usize,
        /// Number of possible edges.
        edges: usize,
    },
    /// An edge list named the same edge more than once.
    #[error("edge ({source_vertex}, {target_vertex}) appears more than once")]
    DuplicateEdge {
        /// Smaller endpoint of the repeated edge.
        source_vertex: usize,
        /// Larger endpoint of the repeated edge.
        target_vertex: usize,
    },
    /// A weight vector held fewer weights than the graph has edges.
    #[error("weight vector holds {actual} weights but the graph has {expected} edges")]
    WeightCountMismatch {
        /// Number of possible edges.
        expected: usize,
        /// Number of weights supplied.
        actual: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`IndexError`] variants.
    enum IndexErrorCode for IndexError {
        /// A vertex id was not below the vertex count.
        VertexOutOfRange => VertexOutOfRange { .. } => "INDEX_VERTEX_OUT_OF_RANGE",
        /// The pair was not given with source < target.
        NotCanonical => NotCanonical { .. } => "INDEX_NOT_CANONICAL",
        /// An edge index was not below the edge count.
        EdgeOutOfRange => EdgeOutOfRange { .. } => "INDEX_EDGE_OUT_OF_RANGE",
        /// An edge list repeated an edge.
        DuplicateEdge => DuplicateEdge { .. } => "INDEX_DUPLICATE_EDGE",
        /// A weight vector was shorter than the edge count.
        WeightCountMismatch => WeightCountMismatch { .. } => "INDEX_WEIGHT_COUNT_MISMATCH",
    }
}

/// Error type produced when constructing or reconfiguring a
/// [`crate::ThredgeGraph`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ThredgeError {
    /// A graph needs at least two vertices to have an edge.
    #[error("vertex count must be at least 2 (got {got})")]
    TooFewVertices {
        /// The vertex count supplied by the caller.
        got: usize,
    },
    /// Neither a threshold nor a mean degree was configured.
    #[error("exactly one of threshold or mean_degree must be supplied (got neither)")]
    ThresholdUnspecified,
    /// Both a threshold and a mean degree were configured.
    #[error(
        "exactly one of threshold or mean_degree must be supplied (got threshold={threshold} and mean_degree={mean_degree})"
    )]
    ThresholdOverspecified {
        /// Threshold supplied by the caller.
        threshold: f64,
        /// Mean degree supplied by the caller.
        mean_degree: f64,
    },
    /// A real-valued parameter was NaN, or infinite where only finite values
    /// are meaningful.
    #[error("parameter `{name}` is not a usable number (got {value})")]
    NonFiniteParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// The edge covariance matrix could not be factorised.
    #[error(
        "covariance for {vertices} vertices with correlation {correlation} is not positive definite"
    )]
    NotPositiveDefinite {
        /// Vertex count of the rejected model.
        vertices: usize,
        /// Correlation parameter of the rejected model.
        correlation: f64,
    },
    /// The selected backend cannot realise the requested correlation.
    #[error("backend {backend:?} does not support correlation {correlation}")]
    UnsupportedCorrelation {
        /// Backend that rejected the correlation.
        backend: CovarianceBackend,
        /// Correlation parameter that was rejected.
        correlation: f64,
    },
    /// The mean degree target lies outside `(0, vertices - 1)`.
    #[error("mean degree {mean_degree} is outside the open interval (0, {max}) for {vertices} vertices", max = .vertices.saturating_sub(1))]
    MeanDegreeOutOfRange {
        /// The requested mean degree.
        mean_degree: f64,
        /// Vertex count the target was calibrated against.
        vertices: usize,
    },
    /// Newton iteration for the threshold did not converge.
    #[error("threshold calibration for edge probability {probability} did not converge after {iterations} iterations")]
    CalibrationDiverged {
        /// Edge probability the root finder was solving for.
        probability: f64,
        /// Iterations spent before giving up.
        iterations: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`ThredgeError`] variants.
    enum ThredgeErrorCode for ThredgeError {
        /// A graph needs at least two vertices.
        TooFewVertices => TooFewVertices { .. } => "THREDGE_TOO_FEW_VERTICES",
        /// Neither a threshold nor a mean degree was configured.
        ThresholdUnspecified => ThresholdUnspecified => "THREDGE_THRESHOLD_UNSPECIFIED",
        /// Both a threshold and a mean degree were configured.
        ThresholdOverspecified => ThresholdOverspecified { .. } => "THREDGE_THRESHOLD_OVERSPECIFIED",
        /// A real-valued parameter was not finite.
        NonFiniteParameter => NonFiniteParameter { .. } => "THREDGE_NON_FINITE_PARAMETER",
        /// The edge covariance matrix could not be factorised.
        NotPositiveDefinite => NotPositiveDefinite { .. } => "THREDGE_NOT_POSITIVE_DEFINITE",
        /// The selected backend cannot realise the requested correlation.
        UnsupportedCorrelation => UnsupportedCorrelation { .. } => "THREDGE_UNSUPPORTED_CORRELATION",
        /// The mean degree target lies outside its domain.
        MeanDegreeOutOfRange => MeanDegreeOutOfRange { .. } => "THREDGE_MEAN_DEGREE_OUT_OF_RANGE",
        /// Threshold calibration did not converge.
        CalibrationDiverged => CalibrationDiverged { .. } => "THREDGE_CALIBRATION_DIVERGED",
    }
}

impl ThredgeError {
    /// Classifies the error into configuration, domain, or numerical failures.
    ///
    /// # Examples
    /// ```
    /// use thredge_core::{ErrorKind, ThredgeError};
    ///
    /// let err = ThredgeError::TooFewVertices { got: 1 };
    /// assert_eq!(err.kind(), ErrorKind::Configuration);
    /// ```
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::TooFewVertices { .. }
            | Self::ThresholdUnspecified
            | Self::ThresholdOverspecified { .. }
            | Self::NonFiniteParameter { .. }
            | Self::NotPositiveDefinite { .. }
            | Self::UnsupportedCorrelation { .. } => ErrorKind::Configuration,
            Self::MeanDegreeOutOfRange { .. } => ErrorKind::Domain,
            Self::CalibrationDiverged { .. } => ErrorKind::Numerical,
        }
    }
}

/// Rejects NaN and infinite parameters with [`ThredgeError::NonFiniteParameter`].
pub(crate) fn ensure_finite(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ThredgeError::NonFiniteParameter { name, value })
    }
}

/// Rejects NaN thresholds. Infinite thresholds are meaningful: `-inf` keeps
/// every edge and `+inf` keeps none.
pub(crate) fn ensure_threshold(value: f64) -> Result<f64> {
    if value.is_nan() {
        Err(ThredgeError::NonFiniteParameter {
            name: "threshold",
            value,
        })
    } else {
        Ok(value)
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, ThredgeError>;
