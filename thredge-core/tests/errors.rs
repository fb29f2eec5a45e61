//! Stable codes and categories of the public error types.

use rstest::rstest;
use thredge_core::{
    CovarianceBackend, ErrorKind, IndexError, IndexErrorCode, ThredgeError, ThredgeErrorCode,
};

#[rstest]
#[case(ThredgeError::TooFewVertices { got: 1 }, ThredgeErrorCode::TooFewVertices, ErrorKind::Configuration)]
#[case(ThredgeError::ThresholdUnspecified, ThredgeErrorCode::ThresholdUnspecified, ErrorKind::Configuration)]
#[case(
    ThredgeError::ThresholdOverspecified { threshold: 0.1, mean_degree: 2.0 },
    ThredgeErrorCode::ThresholdOverspecified,
    ErrorKind::Configuration,
)]
#[case(
    ThredgeError::NonFiniteParameter { name: "correlation", value: f64::INFINITY },
    ThredgeErrorCode::NonFiniteParameter,
    ErrorKind::Configuration,
)]
#[case(
    ThredgeError::NotPositiveDefinite { vertices: 6, correlation: 0.5 },
    ThredgeErrorCode::NotPositiveDefinite,
    ErrorKind::Configuration,
)]
#[case(
    ThredgeError::UnsupportedCorrelation {
        backend: CovarianceBackend::VertexFactor,
        correlation: -0.1,
    },
    ThredgeErrorCode::UnsupportedCorrelation,
    ErrorKind::Configuration,
)]
#[case(
    ThredgeError::MeanDegreeOutOfRange { mean_degree: 12.0, vertices: 10 },
    ThredgeErrorCode::MeanDegreeOutOfRange,
    ErrorKind::Domain,
)]
#[case(
    ThredgeError::CalibrationDiverged { probability: 0.01, iterations: 1 },
    ThredgeErrorCode::CalibrationDiverged,
    ErrorKind::Numerical,
)]
fn thredge_errors_have_stable_codes(
    #[case] error: ThredgeError,
    #[case] expected: ThredgeErrorCode,
    #[case] kind: ErrorKind,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.code().to_string(), expected.as_str());
    assert!(expected.as_str().starts_with("THREDGE_"));
    assert_eq!(error.kind(), kind);
}

#[rstest]
#[case(IndexError::VertexOutOfRange { vertex: 5, vertices: 5 }, IndexErrorCode::VertexOutOfRange)]
#[case(
    IndexError::NotCanonical { source_vertex: 2, target_vertex: 2 },
    IndexErrorCode::NotCanonical,
)]
#[case(IndexError::EdgeOutOfRange { index: 10, edges: 10 }, IndexErrorCode::EdgeOutOfRange)]
#[case(
    IndexError::DuplicateEdge { source_vertex: 0, target_vertex: 1 },
    IndexErrorCode::DuplicateEdge,
)]
#[case(
    IndexError::WeightCountMismatch { expected: 6, actual: 5 },
    IndexErrorCode::WeightCountMismatch,
)]
fn index_errors_have_stable_codes(#[case] error: IndexError, #[case] expected: IndexErrorCode) {
    assert_eq!(error.code(), expected);
    assert!(expected.as_str().starts_with("INDEX_"));
}

#[rstest]
#[case(
    ThredgeError::MeanDegreeOutOfRange { mean_degree: 0.0, vertices: 10 },
    "mean degree 0 is outside the open interval (0, 9) for 10 vertices",
)]
#[case(
    ThredgeError::NonFiniteParameter { name: "threshold", value: f64::NAN },
    "parameter `threshold` is not a usable number (got NaN)",
)]
#[case(ThredgeError::TooFewVertices { got: 0 }, "vertex count must be at least 2 (got 0)")]
fn error_messages_name_the_offending_values(#[case] error: ThredgeError, #[case] expected: &str) {
    assert_eq!(error.to_string(), expected);
}

#[rstest]
#[case(
    IndexError::DuplicateEdge { source_vertex: 0, target_vertex: 1 },
    "edge (0, 1) appears more than once",
)]
#[case(
    IndexError::WeightCountMismatch { expected: 6, actual: 5 },
    "weight vector holds 5 weights but the graph has 6 edges",
)]
fn index_error_messages_name_the_offending_values(
    #[case] error: IndexError,
    #[case] expected: &str,
) {
    assert_eq!(error.to_string(), expected);
}
