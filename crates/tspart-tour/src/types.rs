//! Shared types for tour construction.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::candidates::CandidateSet;
use crate::distance::DistanceKind;

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixel column).
    pub x: f64,
    /// Vertical position (pixel row).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// A sequence of connected points forming a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Total length of all segments.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.0.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

/// An unordered pair of distinct point indices with its Euclidean length.
///
/// Stored normalised so that `a < b`. Edges are totally ordered by
/// `(distance, a, b)`, which makes sorting bit-reproducible even when
/// many pairs share the same length.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Edge {
    /// Lower point index.
    pub a: usize,
    /// Higher point index.
    pub b: usize,
    /// Euclidean distance between the two points.
    pub distance: f64,
}

impl Edge {
    /// Create an edge between `i` and `j`, normalising the index order.
    #[must_use]
    pub const fn new(i: usize, j: usize, distance: f64) -> Self {
        if i <= j {
            Self { a: i, b: j, distance }
        } else {
            Self { a: j, b: i, distance }
        }
    }
}

impl Ord for Edge {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.a.cmp(&other.a))
            .then(self.b.cmp(&other.b))
    }
}

impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Edge {}

/// Whether the finished tour is an open path or a closed loop.
///
/// Closing is never inferred: a closed loop is only produced when
/// [`Closed`](Self::Closed) is configured explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TourShape {
    /// A Hamiltonian path with `N - 1` edges. Rendered as an open line.
    #[default]
    Open,

    /// A Hamiltonian cycle with `N` edges. The closing edge joins the two
    /// endpoints of the spanning path. Inputs with fewer than three
    /// points stay open.
    Closed,
}

/// Visiting order over a point set.
///
/// `order` is a permutation of `0..N`. A closed tour implicitly returns
/// from the last index to the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tour {
    order: Vec<usize>,
    closed: bool,
}

impl Tour {
    /// Create a tour from an index order.
    #[must_use]
    pub const fn new(order: Vec<usize>, closed: bool) -> Self {
        Self { order, closed }
    }

    /// The visiting order.
    #[must_use]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Whether the tour returns to its start.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of points visited.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` for the empty tour.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Consumes the tour and returns the visiting order.
    #[must_use]
    pub fn into_order(self) -> Vec<usize> {
        self.order
    }

    /// Total travelled distance, including the closing segment of a
    /// closed tour.
    #[must_use]
    pub fn length(&self, points: &[Point]) -> f64 {
        self.to_polyline(points).length()
    }

    /// Resolve the order into coordinates.
    ///
    /// A closed tour repeats its first point at the end so the polyline
    /// draws the closing segment. Indices outside `points` are skipped.
    #[must_use]
    pub fn to_polyline(&self, points: &[Point]) -> Polyline {
        let mut coords: Vec<Point> = self
            .order
            .iter()
            .filter_map(|&i| points.get(i).copied())
            .collect();
        if self.closed
            && coords.len() > 2
            && let Some(&first) = coords.first()
        {
            coords.push(first);
        }
        Polyline::new(coords)
    }
}

/// Configuration for tour construction.
///
/// The default is the reference configuration: complete candidate set,
/// on-demand distances, open path, no refinement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TourConfig {
    /// Which point pairs are offered to the greedy builder.
    pub candidates: CandidateSet,

    /// How pairwise distances are obtained.
    pub distances: DistanceKind,

    /// Open path or closed loop.
    pub shape: TourShape,

    /// Maximum number of 2-opt improvement passes after greedy
    /// construction. Zero disables refinement.
    pub refine_passes: usize,
}

impl TourConfig {
    /// Default number of 2-opt passes (refinement disabled).
    pub const DEFAULT_REFINE_PASSES: usize = 0;
}

/// Errors that can occur while building a tour.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TourError {
    /// The candidate edges cannot connect every point into one path.
    ///
    /// Only reachable when the candidate set has been pruned.
    #[error(
        "candidate edges cannot connect all {points} points \
         ({accepted} of {required} edges accepted)"
    )]
    DisconnectedInput {
        /// Number of input points.
        points: usize,
        /// Edges accepted before candidates ran out.
        accepted: usize,
        /// Edges needed for a spanning path.
        required: usize,
    },

    /// The accepted edges do not describe a single simple path or cycle.
    #[error("malformed tour: {0}")]
    MalformedTour(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- Point tests ---

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
        assert!((a.distance_squared(b) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn point_distance_is_symmetric() {
        let a = Point::new(1.5, -2.0);
        let b = Point::new(-7.25, 3.0);
        assert_eq!(a.distance(b).to_bits(), b.distance(a).to_bits());
    }

    #[test]
    fn point_distance_to_self_is_zero() {
        let p = Point::new(7.0, 11.0);
        assert!((p.distance(p)).abs() < f64::EPSILON);
    }

    // --- Polyline tests ---

    #[test]
    fn polyline_empty() {
        let pl = Polyline::new(vec![]);
        assert!(pl.is_empty());
        assert!(pl.first().is_none());
        assert!(pl.last().is_none());
        assert!(pl.length().abs() < f64::EPSILON);
    }

    #[test]
    fn polyline_length_sums_segments() {
        let pl = Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 4.0),
            Point::new(3.0, 10.0),
        ]);
        assert!((pl.length() - 11.0).abs() < 1e-12);
    }

    // --- Edge tests ---

    #[test]
    fn edge_new_normalises_indices() {
        let e = Edge::new(5, 2, 1.0);
        assert_eq!((e.a, e.b), (2, 5));
    }

    #[test]
    fn edge_order_by_distance_then_indices() {
        let mut edges = vec![
            Edge::new(2, 3, 1.0),
            Edge::new(0, 4, 1.0),
            Edge::new(0, 1, 2.0),
            Edge::new(0, 3, 1.0),
            Edge::new(1, 2, 0.5),
        ];
        edges.sort_unstable();
        let pairs: Vec<(usize, usize)> = edges.iter().map(|e| (e.a, e.b)).collect();
        assert_eq!(pairs, vec![(1, 2), (0, 3), (0, 4), (2, 3), (0, 1)]);
    }

    // --- Tour tests ---

    #[test]
    fn open_tour_polyline_and_length() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ];
        let tour = Tour::new(vec![0, 1, 2], false);
        assert_eq!(tour.to_polyline(&points).len(), 3);
        assert!((tour.length(&points) - 20.0).abs() < 1e-12);
    }

    #[test]
    fn closed_tour_adds_return_segment() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 4.0),
        ];
        let tour = Tour::new(vec![0, 1, 2], true);
        let polyline = tour.to_polyline(&points);
        assert_eq!(polyline.len(), 4);
        assert_eq!(polyline.first(), polyline.last());
        assert!((tour.length(&points) - 12.0).abs() < 1e-12);
    }

    // --- Config tests ---

    #[test]
    fn tour_config_default_is_reference() {
        let config = TourConfig::default();
        assert_eq!(config.candidates, CandidateSet::Complete);
        assert_eq!(config.distances, DistanceKind::OnDemand);
        assert_eq!(config.shape, TourShape::Open);
        assert_eq!(config.refine_passes, TourConfig::DEFAULT_REFINE_PASSES);
    }

    #[test]
    fn tour_config_serde_round_trip() {
        let config = TourConfig {
            candidates: CandidateSet::Nearest { k: 8 },
            distances: DistanceKind::Matrix,
            shape: TourShape::Closed,
            refine_passes: 3,
        };
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: TourConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn tour_config_missing_fields_use_defaults() {
        let config: TourConfig = serde_json::from_str(r#"{"shape":"Closed"}"#).unwrap();
        assert_eq!(config.shape, TourShape::Closed);
        assert_eq!(config.candidates, CandidateSet::Complete);
    }

    // --- TourError tests ---

    #[test]
    fn error_disconnected_display() {
        let err = TourError::DisconnectedInput {
            points: 6,
            accepted: 4,
            required: 5,
        };
        assert_eq!(
            err.to_string(),
            "candidate edges cannot connect all 6 points (4 of 5 edges accepted)",
        );
    }

    #[test]
    fn error_malformed_display() {
        let err = TourError::MalformedTour("walk visited 3 of 4 points".to_string());
        assert_eq!(err.to_string(), "malformed tour: walk visited 3 of 4 points");
    }
}
