//! Adjacency matrices and degree sequences derived from edge lists.
//!
//! Edge lists only describe the upper triangle, so both representations fill
//! `A[i][j]` for every edge `(i, j)` and then symmetrise with `A + A^T`.

use nalgebra::DMatrix;
use sprs::{CsMat, TriMat};

use crate::{error::IndexError, indexing::Edge};

/// Storage layout requested for an adjacency matrix.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AdjacencyFormat {
    /// Dense `N x N` matrix.
    #[default]
    Dense,
    /// Compressed sparse row matrix, for large graphs with few edges.
    Sparse,
}

/// Symmetric 0/1 adjacency matrix with an all-zero diagonal.
#[derive(Clone, Debug, PartialEq)]
pub enum Adjacency {
    /// Dense representation.
    Dense(DMatrix<u8>),
    /// Compressed sparse row representation.
    Sparse(CsMat<u8>),
}

impl Adjacency {
    /// Returns the number of rows (and columns).
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        match self {
            Self::Dense(matrix) => matrix.nrows(),
            Self::Sparse(matrix) => matrix.rows(),
        }
    }

    /// Returns the layout of this matrix.
    #[must_use]
    pub const fn format(&self) -> AdjacencyFormat {
        match self {
            Self::Dense(_) => AdjacencyFormat::Dense,
            Self::Sparse(_) => AdjacencyFormat::Sparse,
        }
    }

    /// Returns entry `(row, col)`, or `None` when either index is out of range.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        let n = self.vertex_count();
        if row >= n || col >= n {
            return None;
        }
        match self {
            Self::Dense(matrix) => matrix.get((row, col)).copied(),
            Self::Sparse(matrix) => Some(matrix.get(row, col).copied().unwrap_or(0)),
        }
    }

    /// Returns the row sums, i.e. the degree of every vertex.
    #[must_use]
    pub fn degrees(&self) -> Vec<usize> {
        match self {
            Self::Dense(matrix) => matrix
                .row_iter()
                .map(|row| row.iter().map(|&value| usize::from(value)).sum())
                .collect(),
            Self::Sparse(matrix) => matrix
                .outer_iterator()
                .map(|row| row.data().iter().map(|&value| usize::from(value)).sum())
                .collect(),
        }
    }

    /// Returns the number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.degrees().iter().sum::<usize>() / 2
    }

    /// Copies the matrix into dense storage.
    #[must_use]
    pub fn to_dense(&self) -> DMatrix<u8> {
        match self {
            Self::Dense(matrix) => matrix.clone(),
            Self::Sparse(matrix) => {
                let mut dense = DMatrix::zeros(matrix.rows(), matrix.cols());
                for (&value, (row, col)) in matrix {
                    dense[(row, col)] = value;
                }
                dense
            }
        }
    }
}

/// Builds the symmetric adjacency matrix of an `N`-vertex graph.
///
/// An empty edge list yields the all-zero `N x N` matrix in either format.
///
/// # Errors
/// Returns [`IndexError::VertexOutOfRange`] when an edge endpoint is not
/// below `vertices` and [`IndexError::DuplicateEdge`] when `edges` names the
/// same edge twice.
///
/// # Examples
/// ```
/// use thredge_core::{AdjacencyFormat, Edge, adjacency_from_edges};
///
/// let edges = [Edge::new(0, 2).expect("distinct")];
/// let adjacency = adjacency_from_edges(3, &edges, AdjacencyFormat::Sparse)
///     .expect("endpoints are in range");
/// assert_eq!(adjacency.get(2, 0), Some(1));
/// assert_eq!(adjacency.get(1, 1), Some(0));
/// ```
pub fn adjacency_from_edges(
    vertices: usize,
    edges: &[Edge],
    format: AdjacencyFormat,
) -> Result<Adjacency, IndexError> {
    if let Some(edge) = edges.iter().find(|edge| edge.target() >= vertices) {
        return Err(IndexError::VertexOutOfRange {
            vertex: edge.target(),
            vertices,
        });
    }
    ensure_distinct(edges)?;
    Ok(symmetric_adjacency(vertices, edges, format))
}

fn ensure_distinct(edges: &[Edge]) -> Result<(), IndexError> {
    let mut sorted = edges.to_vec();
    sorted.sort_unstable();
    match sorted.windows(2).find(|pair| pair[0] == pair[1]) {
        Some(pair) => Err(IndexError::DuplicateEdge {
            source_vertex: pair[0].source(),
            target_vertex: pair[0].target(),
        }),
        None => Ok(()),
    }
}

/// Returns the degree of every vertex of an `N`-vertex graph.
///
/// # Errors
/// Returns the same errors as [`adjacency_from_edges`].
///
/// # Examples
/// ```
/// use thredge_core::{Edge, degree_sequence};
///
/// let edges: Vec<Edge> = [(0, 1), (0, 2), (2, 3)]
///     .into_iter()
///     .filter_map(|(i, j)| Edge::new(i, j))
///     .collect();
/// assert_eq!(degree_sequence(4, &edges).expect("in range"), vec![2, 1, 2, 1]);
/// ```
pub fn degree_sequence(vertices: usize, edges: &[Edge]) -> Result<Vec<usize>, IndexError> {
    Ok(adjacency_from_edges(vertices, edges, AdjacencyFormat::Sparse)?.degrees())
}

/// Builds the adjacency for distinct edges already known to lie inside the
/// graph.
pub(crate) fn symmetric_adjacency(
    vertices: usize,
    edges: &[Edge],
    format: AdjacencyFormat,
) -> Adjacency {
    match format {
        AdjacencyFormat::Dense => {
            let mut upper = DMatrix::<u8>::zeros(vertices, vertices);
            for edge in edges {
                upper[(edge.source(), edge.target())] = 1;
            }
            Adjacency::Dense(&upper + upper.transpose())
        }
        AdjacencyFormat::Sparse => {
            let mut triplets = TriMat::with_capacity((vertices, vertices), edges.len());
            for edge in edges {
                triplets.add_triplet(edge.source(), edge.target(), 1_u8);
            }
            let upper: CsMat<u8> = triplets.to_csr();
            let lower: CsMat<u8> = upper.transpose_view().to_csr();
            Adjacency::Sparse(&upper + &lower)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn edges(pairs: &[(usize, usize)]) -> Vec<Edge> {
        pairs
            .iter()
            .map(|&(i, j)| Edge::new(i, j).expect("distinct endpoints"))
            .collect()
    }

    #[rstest]
    #[case::dense(AdjacencyFormat::Dense)]
    #[case::sparse(AdjacencyFormat::Sparse)]
    fn degree_sequence_of_small_graph(#[case] format: AdjacencyFormat) {
        let adjacency = adjacency_from_edges(4, &edges(&[(0, 1), (0, 2), (2, 3)]), format)
            .expect("edges are in range");
        assert_eq!(adjacency.degrees(), vec![2, 1, 2, 1]);
        assert_eq!(adjacency.edge_count(), 3);
        assert_eq!(adjacency.format(), format);
    }

    #[rstest]
    #[case::dense(AdjacencyFormat::Dense)]
    #[case::sparse(AdjacencyFormat::Sparse)]
    fn empty_edge_list_gives_zero_matrix(#[case] format: AdjacencyFormat) {
        let adjacency = adjacency_from_edges(5, &[], format).expect("no edges to check");
        assert_eq!(adjacency.vertex_count(), 5);
        assert_eq!(adjacency.to_dense(), DMatrix::<u8>::zeros(5, 5));
        assert_eq!(adjacency.degrees(), vec![0; 5]);
    }

    #[test]
    fn dense_and_sparse_agree() {
        let list = edges(&[(0, 4), (1, 2), (1, 4), (3, 4)]);
        let dense = adjacency_from_edges(5, &list, AdjacencyFormat::Dense).expect("in range");
        let sparse = adjacency_from_edges(5, &list, AdjacencyFormat::Sparse).expect("in range");
        let matrix = dense.to_dense();
        assert_eq!(matrix, sparse.to_dense());
        assert_eq!(matrix, matrix.transpose());
        assert!((0..5).all(|v| matrix[(v, v)] == 0));
        assert_eq!(dense.get(4, 1), Some(1));
        assert_eq!(sparse.get(4, 1), Some(1));
        assert_eq!(sparse.get(5, 0), None);
    }

    #[rstest]
    #[case::dense(AdjacencyFormat::Dense)]
    #[case::sparse(AdjacencyFormat::Sparse)]
    fn repeated_edges_are_rejected(#[case] format: AdjacencyFormat) {
        let expected = IndexError::DuplicateEdge {
            source_vertex: 0,
            target_vertex: 1,
        };
        let twice = edges(&[(0, 1), (1, 2), (0, 1)]);
        assert_eq!(
            adjacency_from_edges(3, &twice, format).expect_err("edge (0, 1) repeats"),
            expected
        );

        let many = vec![Edge::new(0, 1).expect("distinct endpoints"); 256];
        assert_eq!(
            adjacency_from_edges(3, &many, format).expect_err("edge (0, 1) repeats"),
            expected
        );
    }

    #[test]
    fn degree_sequence_rejects_repeated_edges() {
        let err = degree_sequence(3, &edges(&[(0, 1), (0, 1)])).expect_err("edge (0, 1) repeats");
        assert_eq!(err.code().as_str(), "INDEX_DUPLICATE_EDGE");
    }

    #[test]
    fn rejects_endpoints_outside_graph() {
        let err = degree_sequence(3, &edges(&[(0, 3)])).expect_err("vertex 3 is out of range");
        assert_eq!(
            err,
            IndexError::VertexOutOfRange {
                vertex: 3,
                vertices: 3
            }
        );
    }
}
