//! Greedy edge heuristic for Euclidean TSP.
//!
//! # Algorithm
//!
//! 1. Sort candidate edges by `(distance, a, b)`.
//! 2. Scan them in order. Accept edge `{i, j}` iff both endpoints have
//!    degree < 2 and `i`, `j` lie in different components of a
//!    union-find structure (so no cycle is closed early).
//! 3. Stop once `N - 1` edges are accepted: the accepted set is then a
//!    single Hamiltonian path.
//! 4. For [`TourShape::Closed`] add the edge between the two remaining
//!    degree-1 endpoints, which closes a cycle through all `N` points.
//!    That pair must itself be a candidate; it is appended after the scan,
//!    so it may be shorter than the last path edge.
//!
//! Runs in `O(E log E)` for the sort plus near-constant amortised work
//! per edge. The scan is inherently sequential: every decision depends on
//! the degrees and components left by the previous ones.

use petgraph::unionfind::UnionFind;

use crate::distance::DistanceProvider;
use crate::types::{Edge, TourError, TourShape};

/// Edges chosen by the greedy builder, in acceptance order.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedEdges {
    edges: Vec<Edge>,
    closed: bool,
}

impl AcceptedEdges {
    /// The accepted edges in the order they were accepted.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of accepted edges.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if no edge was accepted.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Whether the final edge closed the path into a cycle.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Sum of the accepted edge lengths.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.edges.iter().map(|e| e.distance).sum()
    }
}

/// Run the greedy edge heuristic over `candidates`.
///
/// `candidates` need not be sorted; they are sorted here by the
/// deterministic `(distance, a, b)` order. `distances` is only consulted
/// for the closing edge of a [`TourShape::Closed`] tour.
///
/// # Errors
///
/// Returns [`TourError::DisconnectedInput`] if the candidates run out
/// before `N - 1` edges are accepted, or if a closed tour's closing pair
/// is not among the candidates. Neither can happen with the complete
/// candidate set.
pub fn select_edges<D>(
    point_count: usize,
    mut candidates: Vec<Edge>,
    shape: TourShape,
    distances: &D,
) -> Result<AcceptedEdges, TourError>
where
    D: DistanceProvider + ?Sized,
{
    if point_count <= 1 {
        return Ok(AcceptedEdges {
            edges: Vec::new(),
            closed: false,
        });
    }

    candidates.sort_unstable();

    let required = point_count - 1;
    let mut degree = vec![0_u8; point_count];
    let mut components = UnionFind::<usize>::new(point_count);
    let mut edges = Vec::with_capacity(point_count);
    let mut scanned = 0_usize;

    for &edge in &candidates {
        scanned += 1;
        // Short-circuit: only merge components when both endpoints still
        // have spare degree. `union` returns false when they were already
        // connected, i.e. accepting would close a cycle.
        if degree[edge.a] < 2 && degree[edge.b] < 2 && components.union(edge.a, edge.b) {
            degree[edge.a] += 1;
            degree[edge.b] += 1;
            edges.push(edge);
            if edges.len() == required {
                break;
            }
        }
    }

    if edges.len() < required {
        log::warn!(
            "greedy: candidates exhausted points={point_count} accepted={} required={required}",
            edges.len()
        );
        return Err(TourError::DisconnectedInput {
            points: point_count,
            accepted: edges.len(),
            required,
        });
    }

    let mut closed = false;
    if shape == TourShape::Closed && point_count >= 3 {
        let closing = closing_edge(&degree, distances)?;
        if !candidates.iter().any(|e| (e.a, e.b) == (closing.a, closing.b)) {
            log::warn!(
                "greedy: closing edge not a candidate a={} b={} points={point_count}",
                closing.a,
                closing.b
            );
            return Err(TourError::DisconnectedInput {
                points: point_count,
                accepted: edges.len(),
                required: point_count,
            });
        }
        edges.push(closing);
        closed = true;
    }

    log::debug!(
        "greedy: complete points={point_count} scanned={scanned} accepted={} closed={closed}",
        edges.len()
    );

    Ok(AcceptedEdges { edges, closed })
}

/// The edge joining the two degree-1 endpoints of a spanning path.
fn closing_edge<D>(degree: &[u8], distances: &D) -> Result<Edge, TourError>
where
    D: DistanceProvider + ?Sized,
{
    let mut endpoints = degree
        .iter()
        .enumerate()
        .filter(|&(_, &d)| d == 1)
        .map(|(i, _)| i);
    match (endpoints.next(), endpoints.next(), endpoints.next()) {
        (Some(a), Some(b), None) => Ok(Edge::new(a, b, distances.distance(a, b))),
        _ => Err(TourError::MalformedTour(format!(
            "spanning path has {} endpoints, expected 2",
            degree.iter().filter(|&&d| d == 1).count()
        ))),
    }
}
