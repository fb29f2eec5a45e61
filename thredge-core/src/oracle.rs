//! Slow reference implementations used to validate the production paths.
//!
//! Both routines follow the definitions directly and are quadratic (or worse)
//! in the quantity the production code handles in closed form.

use nalgebra::DMatrix;

use crate::indexing::{Edge, EdgeIndexer};

/// Decodes edge index `e` by walking rows until the remaining offset fits.
pub(crate) fn node_indices_linear_scan(vertices: usize, e: usize) -> (usize, usize) {
    let mut remaining = e;
    let mut row = 0;
    while row < vertices {
        let row_len = vertices - 1 - row;
        if remaining < row_len {
            break;
        }
        remaining -= row_len;
        row += 1;
    }
    (row, row + 1 + remaining)
}

/// Builds the covariance matrix by comparing every pair of edges.
pub(crate) fn naive_covariance(vertices: usize, correlation: f64) -> DMatrix<f64> {
    let indexer = EdgeIndexer::new(vertices);
    let edges: Vec<Edge> = (0..indexer.edge_count())
        .map(|e| {
            let (i, j) = node_indices_linear_scan(vertices, e);
            Edge::new(i, j).expect("linear scan yields distinct endpoints")
        })
        .collect();
    let m = edges.len();
    DMatrix::from_fn(m, m, |row, col| {
        if row == col {
            1.0
        } else if edges[row].shares_one_endpoint(&edges[col]) {
            correlation
        } else {
            0.0
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_scan_decodes_small_graph() {
        let decoded: Vec<_> = (0..6).map(|e| node_indices_linear_scan(4, e)).collect();
        assert_eq!(
            decoded,
            vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]
        );
    }

    #[test]
    fn naive_covariance_of_triangle_is_fully_correlated() {
        let c = naive_covariance(3, 0.25);
        assert_eq!(c, DMatrix::from_row_slice(3, 3, &[
            1.0, 0.25, 0.25, //
            0.25, 1.0, 0.25, //
            0.25, 0.25, 1.0,
        ]));
    }
}
