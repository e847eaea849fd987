//! Seeded sampling of foreground points.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tspart_tour::Point;

/// Draw up to `k` distinct points from `points` without replacement.
///
/// The draw is driven by a [`StdRng`] seeded with `seed`, so the same
/// input and seed always produce the same sample. Selected points keep
/// their relative order from `points`. When `k >= points.len()` every
/// point is returned unchanged.
#[must_use]
pub fn sample(points: &[Point], k: usize, seed: u64) -> Vec<Point> {
    if k >= points.len() {
        log::debug!("sample: kept_all={}", points.len());
        return points.to_vec();
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices = rand::seq::index::sample(&mut rng, points.len(), k).into_vec();
    indices.sort_unstable();

    log::debug!("sample: drawn={k} from={} seed={seed}", points.len());
    indices.into_iter().map(|i| points[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(n: u32) -> Vec<Point> {
        (0..n)
            .flat_map(|y| (0..n).map(move |x| Point::new(f64::from(x), f64::from(y))))
            .collect()
    }

    #[test]
    fn small_input_is_kept_whole() {
        let points = grid(3);
        assert_eq!(sample(&points, 9, 1), points);
        assert_eq!(sample(&points, 100, 1), points);
    }

    #[test]
    fn draws_requested_count() {
        let points = grid(20);
        assert_eq!(sample(&points, 37, 5).len(), 37);
    }

    #[test]
    fn zero_draws_nothing() {
        assert!(sample(&grid(4), 0, 0).is_empty());
    }

    #[test]
    fn same_seed_same_sample() {
        let points = grid(30);
        assert_eq!(sample(&points, 50, 42), sample(&points, 50, 42));
    }

    #[test]
    fn sample_is_ordered_subset_without_repeats() {
        let points = grid(25);
        let drawn = sample(&points, 100, 9);
        // Row-major grid: strictly increasing (y, x) means no repeats and
        // original order preserved.
        for w in drawn.windows(2) {
            let a = (w[0].y, w[0].x);
            let b = (w[1].y, w[1].x);
            assert!(a < b, "{a:?} !< {b:?}");
        }
        assert!(drawn.iter().all(|p| points.contains(p)));
    }
}
