//! Candidate edge generation for the greedy builder.
//!
//! The reference configuration offers every unordered pair, which is
//! `N(N-1)/2` edges. For large samples the set can be pruned to each
//! point's `k` nearest neighbours using an R\*-tree. Pruning is a
//! performance trade-off: it can change the resulting tour and, when
//! `k` is too small to keep the graph connected, makes the builder fail
//! with [`TourError::DisconnectedInput`](crate::TourError::DisconnectedInput).

use rstar::RTree;
use rstar::primitives::GeomWithData;
use serde::{Deserialize, Serialize};

use crate::distance::DistanceProvider;
use crate::types::{Edge, Point};

/// Selects which point pairs are offered to the greedy builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CandidateSet {
    /// Every distinct unordered pair.
    #[default]
    Complete,

    /// Each point paired with its `k` nearest other points.
    ///
    /// `k >= N - 1` is equivalent to [`Complete`](Self::Complete).
    Nearest {
        /// Neighbours considered per point.
        k: usize,
    },
}

impl CandidateSet {
    /// Suggested neighbour count for [`Nearest`](Self::Nearest).
    pub const DEFAULT_NEAREST_K: usize = 10;
}

/// A point tagged with its index, suitable for R\*-tree insertion.
type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Enumerate candidate edges, sorted by `(distance, a, b)`.
///
/// Distances are taken from `distances` rather than the spatial index so
/// that edge weights are identical whichever candidate set is used.
/// Fewer than two points produce no edges.
#[must_use = "returns the sorted candidate edges"]
pub fn candidate_edges<D>(points: &[Point], distances: &D, set: CandidateSet) -> Vec<Edge>
where
    D: DistanceProvider + ?Sized,
{
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }

    let mut edges = match set {
        CandidateSet::Nearest { k } if k < n - 1 => nearest_edges(points, distances, k),
        CandidateSet::Complete | CandidateSet::Nearest { .. } => complete_edges(n, distances),
    };
    edges.sort_unstable();

    log::debug!(
        "candidates: built set={set:?} points={n} edges={}",
        edges.len()
    );
    edges
}

/// All `N(N-1)/2` pairs, unsorted.
fn complete_edges<D>(n: usize, distances: &D) -> Vec<Edge>
where
    D: DistanceProvider + ?Sized,
{
    let mut edges = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            edges.push(Edge::new(i, j, distances.distance(i, j)));
        }
    }
    edges
}

/// Each point's `k` nearest neighbours, deduplicated, unsorted.
fn nearest_edges<D>(points: &[Point], distances: &D, k: usize) -> Vec<Edge>
where
    D: DistanceProvider + ?Sized,
{
    if k == 0 {
        return Vec::new();
    }

    let entries: Vec<IndexedPoint> = points
        .iter()
        .enumerate()
        .map(|(i, p)| GeomWithData::new([p.x, p.y], i))
        .collect();
    let tree = RTree::bulk_load(entries);

    let mut edges = Vec::with_capacity(points.len() * k);
    for (i, p) in points.iter().enumerate() {
        for neighbour in tree
            .nearest_neighbor_iter(&[p.x, p.y])
            .filter(|candidate| candidate.data != i)
            .take(k)
        {
            let j = neighbour.data;
            edges.push(Edge::new(i, j, distances.distance(i, j)));
        }
    }

    // Mutual neighbours appear twice; identical pairs carry identical
    // distances, so sorting brings them together.
    edges.sort_unstable();
    edges.dedup();
    edges
}
