//! Thredge core library.
//!
//! Samples random graphs on `N` vertices by thresholding a vector of
//! correlated standard-normal edge weights. Edges that share an endpoint have
//! weight covariance `b`, which produces degree heterogeneity and clustering
//! that independent-edge models lack.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod adjacency;
mod builder;
mod calibration;
mod covariance;
mod error;
mod indexing;
mod latent;
#[cfg(test)]
mod oracle;
mod sampler;
#[cfg(test)]
mod test_utils;

pub use crate::{
    adjacency::{Adjacency, AdjacencyFormat, adjacency_from_edges, degree_sequence},
    builder::{ThredgeGraphBuilder, ThresholdSpec},
    calibration::{ThresholdCalibrator, ccdf, mean_degree_for_threshold, standard_normal_pdf},
    covariance::{
        CorrelationModel, CorrelationRange, admissible_correlation_range, analytic_spectrum,
        build_covariance,
    },
    error::{ErrorKind, IndexError, IndexErrorCode, Result, ThredgeError, ThredgeErrorCode},
    indexing::{Edge, EdgeIndexer},
    latent::{CovarianceBackend, WeightVector},
    sampler::{DrawStrategy, ThredgeGraph},
};
