//! Bijection between unordered vertex pairs and linear edge indices.
//!
//! Edges `(i, j)` with `i < j` are packed row-major into the upper triangle of
//! the adjacency matrix, so row `i` occupies the `N - 1 - i` consecutive
//! indices starting at `i * N - i * (i + 1) / 2`.

use std::fmt;

use crate::error::IndexError;

/// An unordered vertex pair stored canonically with `source < target`.
///
/// Edges order lexicographically by `(source, target)`, which is the same
/// order as their [`EdgeIndexer::edge_index`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawEdge"))]
pub struct Edge {
    source: usize,
    target: usize,
}

/// Unvalidated wire form of an [`Edge`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawEdge {
    source: usize,
    target: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<RawEdge> for Edge {
    type Error = IndexError;

    fn try_from(raw: RawEdge) -> Result<Self, Self::Error> {
        if raw.source < raw.target {
            Ok(Self {
                source: raw.source,
                target: raw.target,
            })
        } else {
            Err(IndexError::NotCanonical {
                source_vertex: raw.source,
                target_vertex: raw.target,
            })
        }
    }
}

impl Edge {
    /// Builds the canonical edge between two distinct vertices.
    ///
    /// Returns `None` when both endpoints are the same vertex.
    ///
    /// # Examples
    /// ```
    /// use thredge_core::Edge;
    ///
    /// let edge = Edge::new(3, 1).expect("distinct endpoints");
    /// assert_eq!(edge.as_tuple(), (1, 3));
    /// assert!(Edge::new(2, 2).is_none());
    /// ```
    #[must_use]
    pub const fn new(left: usize, right: usize) -> Option<Self> {
        if left < right {
            Some(Self {
                source: left,
                target: right,
            })
        } else if right < left {
            Some(Self {
                source: right,
                target: left,
            })
        } else {
            None
        }
    }

    /// Returns the smaller endpoint.
    #[must_use]
    pub const fn source(&self) -> usize {
        self.source
    }

    /// Returns the larger endpoint.
    #[must_use]
    pub const fn target(&self) -> usize {
        self.target
    }

    /// Returns `(source, target)`.
    #[must_use]
    pub const fn as_tuple(&self) -> (usize, usize) {
        (self.source, self.target)
    }

    /// Returns whether the two edges have exactly one endpoint in common.
    #[must_use]
    pub const fn shares_one_endpoint(&self, other: &Self) -> bool {
        let shared = (self.source == other.source) as u8
            + (self.source == other.target) as u8
            + (self.target == other.source) as u8
            + (self.target == other.target) as u8;
        shared == 1
    }
}

impl From<Edge> for (usize, usize) {
    fn from(edge: Edge) -> Self {
        edge.as_tuple()
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.source, self.target)
    }
}

/// Maps vertex pairs of an `N`-vertex graph to indices in `0..N(N-1)/2`.
///
/// # Examples
/// ```
/// use thredge_core::EdgeIndexer;
///
/// let indexer = EdgeIndexer::new(4);
/// assert_eq!(indexer.edge_count(), 6);
/// assert_eq!(indexer.edge_index(0, 1), 0);
/// assert_eq!(indexer.edge_index(1, 2), 3);
/// assert_eq!(indexer.node_indices(5), (2, 3));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EdgeIndexer {
    vertices: usize,
    edges: usize,
}

impl EdgeIndexer {
    /// Creates an indexer for a graph with `vertices` vertices.
    #[must_use]
    pub const fn new(vertices: usize) -> Self {
        Self {
            vertices,
            edges: vertices * vertices.saturating_sub(1) / 2,
        }
    }

    /// Returns the vertex count `N`.
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.vertices
    }

    /// Returns the number of possible edges `m = N(N-1)/2`.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edges
    }

    /// Returns the linear index of the edge `(i, j)`.
    ///
    /// Callers must pass `i < j < N`; this is checked in debug builds only.
    /// Use [`Self::try_edge_index`] for untrusted input.
    #[inline]
    #[must_use]
    pub const fn edge_index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < j && j < self.vertices);
        // Row `i` starts after rows 0..i, which hold (N-1) + ... + (N-i) edges.
        i * self.vertices + j - (i + 1) * (i + 2) / 2
    }

    /// Returns the vertex pair `(i, j)` with `i < j` for edge index `e`.
    ///
    /// Solves the triangular-number packing with the quadratic formula and
    /// then corrects the row by one when floating-point rounding lands on the
    /// wrong side of a row boundary. Callers must pass `e < m`; this is checked
    /// in debug builds only. Use [`Self::try_node_indices`] for untrusted input.
    #[must_use]
    pub fn node_indices(&self, e: usize) -> (usize, usize) {
        debug_assert!(e < self.edges);
        let n = self.vertices as f64;
        let shifted = n - 1.5;
        let discriminant = shifted.mul_add(shifted, 2.0 * n - 2.0 * e as f64 - 4.0);
        let estimate = (shifted - discriminant.max(0.0).sqrt()).ceil().max(0.0);
        let mut row = (estimate as usize).min(self.vertices.saturating_sub(2));

        while row > 0 && self.row_start(row) > e {
            row -= 1;
        }
        while row + 1 < self.vertices && self.row_start(row + 1) <= e {
            row += 1;
        }

        let column = e + (row + 1) * (row + 2) / 2 - row * self.vertices;
        debug_assert_eq!(self.edge_index(row, column), e);
        (row, column)
    }

    /// Checked variant of [`Self::edge_index`] that accepts the pair in either
    /// order.
    ///
    /// # Errors
    /// Returns [`IndexError::VertexOutOfRange`] when either vertex is not
    /// below `N` and [`IndexError::NotCanonical`] when both are equal.
    pub fn try_edge_index(&self, i: usize, j: usize) -> Result<usize, IndexError> {
        for vertex in [i, j] {
            if vertex >= self.vertices {
                return Err(IndexError::VertexOutOfRange {
                    vertex,
                    vertices: self.vertices,
                });
            }
        }
        let edge = Edge::new(i, j).ok_or(IndexError::NotCanonical {
            source_vertex: i,
            target_vertex: j,
        })?;
        Ok(self.edge_index(edge.source(), edge.target()))
    }

    /// Checked variant of [`Self::node_indices`].
    ///
    /// # Errors
    /// Returns [`IndexError::EdgeOutOfRange`] when `e >= m`.
    pub fn try_node_indices(&self, e: usize) -> Result<(usize, usize), IndexError> {
        if e >= self.edges {
            return Err(IndexError::EdgeOutOfRange {
                index: e,
                edges: self.edges,
            });
        }
        Ok(self.node_indices(e))
    }

    /// Decodes edge index `e` into an [`Edge`].
    #[must_use]
    pub fn edge(&self, e: usize) -> Edge {
        let (source, target) = self.node_indices(e);
        Edge { source, target }
    }

    /// Iterates over every possible edge in index order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        (0..self.vertices).flat_map(move |source| {
            ((source + 1)..self.vertices).map(move |target| Edge { source, target })
        })
    }

    const fn row_start(&self, row: usize) -> usize {
        row * self.vertices - row * (row + 1) / 2
    }
}
