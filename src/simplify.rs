//! Douglas-Peucker route simplification on the sphere.
//!
//! Used to shrink long driver routes before the quadratic insertion search.
//! The output is always a subsequence of the input: points are dropped,
//! never moved, reordered or invented.

use tracing::debug;

use crate::coordinate::Coordinate;
use crate::haversine::distance_to_segment_m;

/// How many times the tolerance is halved before falling back to resampling.
const MAX_TOLERANCE_HALVINGS: usize = 32;

/// Reduces `route` while keeping every dropped point within `tolerance_meters`
/// of the simplified line.
///
/// First and last points are always kept. When the reduction leaves fewer
/// than `minimum_points` (never less than 2), the tolerance is halved until
/// enough points survive, and as a last resort points are picked at evenly
/// spaced indices. Routes that already have `minimum_points` or fewer come
/// back unchanged.
pub fn simplify(
    route: &[Coordinate],
    tolerance_meters: f64,
    minimum_points: usize,
) -> Vec<Coordinate> {
    let minimum_points = minimum_points.max(2);
    if route.len() <= minimum_points {
        return route.to_vec();
    }

    let mut tolerance = if tolerance_meters.is_finite() {
        tolerance_meters.max(0.0)
    } else {
        0.0
    };

    for _ in 0..=MAX_TOLERANCE_HALVINGS {
        let keep = douglas_peucker(route, tolerance);
        let kept = keep.iter().filter(|&&k| k).count();
        if kept >= minimum_points {
            return select(route, &keep);
        }
        if tolerance == 0.0 {
            break;
        }
        tolerance /= 2.0;
    }

    debug!(
        points = route.len(),
        minimum_points, "simplification too aggressive, resampling uniformly"
    );
    resample_uniform(route, minimum_points)
}

/// Marks the points Douglas-Peucker keeps at the given tolerance.
fn douglas_peucker(route: &[Coordinate], tolerance_meters: f64) -> Vec<bool> {
    let mut keep = vec![false; route.len()];
    let last = route.len() - 1;
    keep[0] = true;
    keep[last] = true;

    let mut ranges = vec![(0usize, last)];
    while let Some((start, end)) = ranges.pop() {
        if end <= start + 1 {
            continue;
        }

        let (anchor_a, anchor_b) = (&route[start], &route[end]);
        let mut farthest = start;
        let mut farthest_distance = 0.0;
        for (offset, point) in route[start + 1..end].iter().enumerate() {
            let distance = distance_to_segment_m(point, anchor_a, anchor_b);
            if distance > farthest_distance {
                farthest_distance = distance;
                farthest = start + 1 + offset;
            }
        }

        if farthest_distance > tolerance_meters {
            keep[farthest] = true;
            ranges.push((start, farthest));
            ranges.push((farthest, end));
        }
    }

    keep
}

fn select(route: &[Coordinate], keep: &[bool]) -> Vec<Coordinate> {
    route
        .iter()
        .zip(keep)
        .filter_map(|(point, &kept)| kept.then_some(*point))
        .collect()
}

/// Picks `count` points at evenly spaced indices, endpoints included.
fn resample_uniform(route: &[Coordinate], count: usize) -> Vec<Coordinate> {
    let last = route.len() - 1;
    let steps = count - 1;
    (0..count).map(|k| route[k * last / steps]).collect()
}
