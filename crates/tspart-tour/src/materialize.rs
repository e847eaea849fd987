//! Turn an accepted edge set into a visiting order.
//!
//! Builds an adjacency list from the accepted edges and walks it from
//! one end of the path (or from index 0 for a cycle), never revisiting a
//! point. Any structural problem surfaces as
//! [`TourError::MalformedTour`]: it indicates a builder defect, not a
//! normal runtime condition.

use crate::greedy::AcceptedEdges;
use crate::types::{Tour, TourError};

/// Walk `accepted` into an ordered tour over `point_count` points.
///
/// For an open path the walk starts at the lowest-index endpoint, which
/// keeps the output deterministic.
///
/// # Errors
///
/// Returns [`TourError::MalformedTour`] if an edge references an index
/// out of range, a point has more than two neighbours, no start point
/// exists, or the walk does not visit exactly `point_count` points.
pub fn materialize(point_count: usize, accepted: &AcceptedEdges) -> Result<Tour, TourError> {
    let closed = accepted.is_closed();
    if point_count == 0 {
        return Ok(Tour::new(Vec::new(), false));
    }

    let mut neighbours: Vec<Vec<usize>> = vec![Vec::with_capacity(2); point_count];
    for edge in accepted.edges() {
        if edge.a >= point_count || edge.b >= point_count {
            return Err(TourError::MalformedTour(format!(
                "edge ({}, {}) references a point outside 0..{point_count}",
                edge.a, edge.b
            )));
        }
        neighbours[edge.a].push(edge.b);
        neighbours[edge.b].push(edge.a);
    }

    if let Some((index, adjacent)) = neighbours.iter().enumerate().find(|(_, n)| n.len() > 2) {
        return Err(TourError::MalformedTour(format!(
            "point {index} has {} neighbours",
            adjacent.len()
        )));
    }

    let start = if closed {
        0
    } else {
        neighbours
            .iter()
            .position(|n| n.len() <= 1)
            .ok_or_else(|| TourError::MalformedTour("open path has no endpoint".to_string()))?
    };

    let mut visited = vec![false; point_count];
    let mut order = Vec::with_capacity(point_count);
    let mut current = Some(start);
    while let Some(index) = current {
        visited[index] = true;
        order.push(index);
        current = neighbours[index].iter().copied().find(|&n| !visited[n]);
    }

    if order.len() != point_count {
        return Err(TourError::MalformedTour(format!(
            "walk visited {} of {point_count} points",
            order.len()
        )));
    }

    Ok(Tour::new(order, closed))
}
