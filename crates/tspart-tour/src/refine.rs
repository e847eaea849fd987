//! Optional 2-opt improvement of a finished tour.
//!
//! A 2-opt move removes two non-adjacent edges `(a, b)` and `(c, d)` and
//! reconnects the tour as `(a, c)` and `(b, d)` by reversing the segment
//! between them. Crossing edges are always removed this way, which is
//! the most visible flaw of a greedy tour when it is drawn.
//!
//! Each pass scans every edge pair once, applying improving moves as they
//! are found. Refinement stops after a pass with no improvement or after
//! the configured number of passes.

use serde::{Deserialize, Serialize};

use crate::types::Point;

/// Improvement below which a move is not applied.
const MIN_IMPROVEMENT: f64 = 1e-9;

/// Summary of a refinement run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RefineStats {
    /// Passes executed (including the final pass that found nothing).
    pub passes: usize,
    /// Number of 2-opt moves applied.
    pub improvements: usize,
    /// Tour length before refinement.
    pub length_before: f64,
    /// Tour length after refinement.
    pub length_after: f64,
}

/// Length of the tour described by `order`.
fn order_length(points: &[Point], order: &[usize], closed: bool) -> f64 {
    let open: f64 = order
        .windows(2)
        .map(|w| points[w[0]].distance(points[w[1]]))
        .sum();
    match (closed, order.first(), order.last()) {
        (true, Some(&first), Some(&last)) if order.len() > 2 => {
            open + points[last].distance(points[first])
        }
        _ => open,
    }
}

/// Apply up to `max_passes` passes of 2-opt to `order` in place.
///
/// For an open path only interior edges are exchanged; the endpoints
/// stay endpoints. For a closed tour the wrap-around edge takes part.
/// The result is still a permutation of the input order and its length
/// never increases.
pub fn two_opt(
    points: &[Point],
    order: &mut [usize],
    closed: bool,
    max_passes: usize,
) -> RefineStats {
    let length_before = order_length(points, order, closed);
    let mut stats = RefineStats {
        passes: 0,
        improvements: 0,
        length_before,
        length_after: length_before,
    };

    let n = order.len();
    if n < 4 || max_passes == 0 {
        return stats;
    }

    // Number of edges: the closing edge exists only for cycles.
    let edge_count = if closed { n } else { n - 1 };

    for pass in 0..max_passes {
        let mut swaps = 0_usize;
        for i in 0..edge_count {
            for j in (i + 2)..edge_count {
                if closed && i == 0 && j == n - 1 {
                    // Edges (o[0], o[1]) and (o[n-1], o[0]) share a point.
                    continue;
                }
                let a = points[order[i]];
                let b = points[order[i + 1]];
                let c = points[order[j]];
                let d = points[order[(j + 1) % n]];
                let delta = a.distance(c) + b.distance(d) - a.distance(b) - c.distance(d);
                if delta < -MIN_IMPROVEMENT {
                    order[i + 1..=j].reverse();
                    swaps += 1;
                }
            }
        }
        stats.passes = pass + 1;
        stats.improvements += swaps;
        log::debug!("refine.2opt: pass={} swaps={swaps}", pass + 1);
        if swaps == 0 {
            break;
        }
    }

    stats.length_after = order_length(points, order, closed);
    log::info!(
        "refine.2opt: complete passes={} improvements={} length={:.3}->{:.3}",
        stats.passes,
        stats.improvements,
        stats.length_before,
        stats.length_after
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_permutation(order: &[usize], n: usize) -> bool {
        let mut sorted = order.to_vec();
        sorted.sort_unstable();
        sorted == (0..n).collect::<Vec<_>>()
    }

    #[test]
    fn short_tours_are_untouched() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 0.0),
        ];
        let mut order = vec![0, 1, 2];
        let stats = two_opt(&points, &mut order, false, 5);
        assert_eq!(order, vec![0, 1, 2]);
        assert_eq!(stats.passes, 0);
    }

    #[test]
    fn zero_passes_is_a_no_op() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ];
        let mut order = vec![0, 1, 2, 3];
        let stats = two_opt(&points, &mut order, false, 0);
        assert_eq!(order, vec![0, 1, 2, 3]);
        assert!((stats.length_before - stats.length_after).abs() < f64::EPSILON);
    }

    #[test]
    fn uncrosses_open_path() {
        // 0 -> 1 -> 2 -> 3 crosses itself between (0,1) and (2,3).
        let points = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ];
        let mut order = vec![0, 1, 2, 3];
        let stats = two_opt(&points, &mut order, false, 10);
        assert_eq!(stats.improvements, 1);
        assert_eq!(stats.passes, 2);
        assert!((stats.length_after - 30.0).abs() < 1e-9);
        assert!(is_permutation(&order, 4));
        // Endpoints stay put; the middle is reversed.
        assert_eq!(order, vec![0, 2, 1, 3]);
    }

    #[test]
    fn uncrosses_closed_tour() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ];
        let mut order = vec![0, 1, 2, 3];
        let stats = two_opt(&points, &mut order, true, 10);
        assert!((stats.length_after - 40.0).abs() < 1e-9);
        assert!(is_permutation(&order, 4));
    }

    #[test]
    fn optimal_path_is_unchanged() {
        let points: Vec<Point> = (0..6).map(|i| Point::new(f64::from(i), 0.0)).collect();
        let mut order: Vec<usize> = (0..6).collect();
        let stats = two_opt(&points, &mut order, false, 3);
        assert_eq!(order, (0..6).collect::<Vec<_>>());
        assert_eq!(stats.improvements, 0);
        assert_eq!(stats.passes, 1);
    }
}
