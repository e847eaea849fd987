//! Pairwise Euclidean distances.
//!
//! [`DistanceProvider`] is the seam between geometry and the graph
//! stages. Two implementations share the same arithmetic
//! ([`Point::distance`]) so they agree bit-for-bit:
//!
//! - [`PointDistances`] computes each distance on demand (no storage).
//! - [`DistanceMatrix`] materialises the full symmetric `N x N` matrix
//!   once, trading `O(N^2)` memory for cheaper repeated lookups.

use serde::{Deserialize, Serialize};

use crate::types::Point;

/// Selects how pairwise distances are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceKind {
    /// Compute each distance from the coordinates when asked.
    #[default]
    OnDemand,

    /// Precompute the full symmetric matrix.
    Matrix,
}

/// Source of pairwise distances between indexed points.
pub trait DistanceProvider {
    /// Number of points covered.
    fn len(&self) -> usize;

    /// Returns `true` if no points are covered.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Euclidean distance between points `i` and `j`.
    ///
    /// Indices must be in `0..len()`.
    fn distance(&self, i: usize, j: usize) -> f64;
}

/// On-demand distances over a borrowed point slice.
#[derive(Debug, Clone, Copy)]
pub struct PointDistances<'a> {
    points: &'a [Point],
}

impl<'a> PointDistances<'a> {
    /// Wrap a point slice.
    #[must_use]
    pub const fn new(points: &'a [Point]) -> Self {
        Self { points }
    }
}

impl DistanceProvider for PointDistances<'_> {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn distance(&self, i: usize, j: usize) -> f64 {
        self.points[i].distance(self.points[j])
    }
}

/// Precomputed symmetric distance matrix in row-major order.
///
/// For fewer than two points the storage is empty; there are no pairs
/// to look up and downstream stages short-circuit.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    /// Compute the full matrix for `points`.
    #[must_use]
    pub fn from_points(points: &[Point]) -> Self {
        let n = points.len();
        if n < 2 {
            return Self {
                n,
                values: Vec::new(),
            };
        }

        let mut values = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = points[i].distance(points[j]);
                values[i * n + j] = d;
                values[j * n + i] = d;
            }
        }
        Self { n, values }
    }
}

impl DistanceProvider for DistanceMatrix {
    fn len(&self) -> usize {
        self.n
    }

    fn distance(&self, i: usize, j: usize) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values[i * self.n + j]
    }
}
