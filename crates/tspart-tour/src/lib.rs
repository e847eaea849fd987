//! tspart-tour: Approximate Euclidean TSP tours (sans-IO).
//!
//! Builds a single path through a set of 2D points with the greedy edge
//! heuristic:
//! distances -> candidate edges -> greedy selection -> path walk ->
//! optional 2-opt refinement.
//!
//! This crate has **no I/O dependencies**. Sampling points from an image
//! and rendering the result live in `tspart-pipeline` and
//! `tspart-export`.

pub mod candidates;
pub mod distance;
pub mod greedy;
pub mod materialize;
pub mod refine;
pub mod types;

pub use candidates::{CandidateSet, candidate_edges};
pub use distance::{DistanceKind, DistanceMatrix, DistanceProvider, PointDistances};
pub use greedy::{AcceptedEdges, select_edges};
pub use materialize::materialize;
pub use refine::{RefineStats, two_opt};
pub use types::{Edge, Point, Polyline, Tour, TourConfig, TourError, TourShape};

/// Build an open tour through `points` with the reference configuration.
///
/// Uses the complete candidate set, an open path and no refinement.
/// Returns a permutation of `0..points.len()` in visiting order.
///
/// # Examples
///
/// ```
/// use tspart_tour::{Point, build_tour};
///
/// let square = [
///     Point::new(0.0, 0.0),
///     Point::new(10.0, 0.0),
///     Point::new(10.0, 10.0),
///     Point::new(0.0, 10.0),
/// ];
/// let order = build_tour(&square)?;
/// assert_eq!(order.len(), 4);
/// # Ok::<(), tspart_tour::TourError>(())
/// ```
///
/// # Errors
///
/// Returns [`TourError::MalformedTour`] only if an internal invariant is
/// violated. The reference configuration never yields
/// [`TourError::DisconnectedInput`].
pub fn build_tour(points: &[Point]) -> Result<Vec<usize>, TourError> {
    build_tour_with(points, &TourConfig::default()).map(Tour::into_order)
}

/// Build a tour through `points` using `config`.
///
/// # Errors
///
/// Returns [`TourError::DisconnectedInput`] if a pruned candidate set
/// cannot connect every point. Returns [`TourError::MalformedTour`] if
/// the accepted edges do not form a single path or cycle.
pub fn build_tour_with(points: &[Point], config: &TourConfig) -> Result<Tour, TourError> {
    match config.distances {
        DistanceKind::OnDemand => {
            build_with_provider(points, &PointDistances::new(points), config)
        }
        DistanceKind::Matrix => {
            build_with_provider(points, &DistanceMatrix::from_points(points), config)
        }
    }
}

fn build_with_provider<D>(
    points: &[Point],
    distances: &D,
    config: &TourConfig,
) -> Result<Tour, TourError>
where
    D: DistanceProvider,
{
    let n = points.len();
    let candidates = candidate_edges(points, distances, config.candidates);
    let accepted = select_edges(n, candidates, config.shape, distances)?;
    let tour = materialize(n, &accepted)?;

    if config.refine_passes == 0 {
        return Ok(tour);
    }

    let closed = tour.is_closed();
    let mut order = tour.into_order();
    two_opt(points, &mut order, closed, config.refine_passes);
    Ok(Tour::new(order, closed))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]
    }

    #[test]
    fn empty_input_gives_empty_tour() {
        assert!(build_tour(&[]).unwrap().is_empty());
    }

    #[test]
    fn single_point_gives_zero() {
        assert_eq!(build_tour(&[Point::new(5.0, 5.0)]).unwrap(), vec![0]);
    }

    #[test]
    fn two_identical_points_are_both_visited() {
        let order = build_tour(&[Point::new(1.0, 1.0), Point::new(1.0, 1.0)]).unwrap();
        assert_eq!(order, vec![0, 1]);
    }

    #[test]
    fn square_follows_perimeter() {
        let points = square();
        let tour = build_tour_with(&points, &TourConfig::default()).unwrap();
        assert!((tour.length(&points) - 30.0).abs() < 1e-12);
        // Consecutive points always share a side (never a diagonal).
        for w in tour.order().windows(2) {
            assert!((points[w[0]].distance(points[w[1]]) - 10.0).abs() < 1e-12);
        }
    }

    #[test]
    fn colinear_points_visited_monotonically() {
        let points: Vec<Point> = (0..5).map(|i| Point::new(f64::from(i), 0.0)).collect();
        let order = build_tour(&points).unwrap();
        assert!(order == vec![0, 1, 2, 3, 4] || order == vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn matrix_and_on_demand_agree() {
        let points: Vec<Point> = (0..40)
            .map(|i| {
                let t = f64::from(i) * 0.7;
                Point::new(t.cos() * f64::from(i), t.sin() * f64::from(i))
            })
            .collect();
        let on_demand = build_tour_with(&points, &TourConfig::default()).unwrap();
        let matrix = build_tour_with(
            &points,
            &TourConfig {
                distances: DistanceKind::Matrix,
                ..TourConfig::default()
            },
        )
        .unwrap();
        assert_eq!(on_demand, matrix);
    }

    #[test]
    fn closed_config_produces_cycle() {
        let points = square();
        let tour = build_tour_with(
            &points,
            &TourConfig {
                shape: TourShape::Closed,
                ..TourConfig::default()
            },
        )
        .unwrap();
        assert!(tour.is_closed());
        assert!((tour.length(&points) - 40.0).abs() < 1e-12);
    }

    #[test]
    fn refinement_never_lengthens_the_tour() {
        let points: Vec<Point> = (0..60)
            .map(|i| {
                let f = f64::from(i);
                Point::new((f * 37.0) % 101.0, (f * 59.0) % 89.0)
            })
            .collect();
        let greedy = build_tour_with(&points, &TourConfig::default()).unwrap();
        let refined = build_tour_with(
            &points,
            &TourConfig {
                refine_passes: 5,
                ..TourConfig::default()
            },
        )
        .unwrap();
        assert!(refined.length(&points) <= greedy.length(&points) + 1e-9);
        let mut sorted = refined.into_order();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..60).collect::<Vec<_>>());
    }

    #[test]
    fn pruned_disconnected_input_is_reported() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(500.0, 500.0),
            Point::new(501.0, 500.0),
        ];
        let err = build_tour_with(
            &points,
            &TourConfig {
                candidates: CandidateSet::Nearest { k: 1 },
                ..TourConfig::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, TourError::DisconnectedInput { .. }));
    }
}
