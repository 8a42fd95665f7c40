//! Route distance/duration estimation under a constant-speed model.

use serde::Serialize;

use crate::coordinate::Coordinate;
use crate::haversine::distance_km;

/// Average speed assumed when none (or a non-positive one) is given.
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 30.0;

/// Aggregate distance and duration of a route.
///
/// Only produced by [`estimate`]; callers read it but never build one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMetrics {
    total_distance_km: f64,
    total_duration_minutes: f64,
}

impl RouteMetrics {
    pub fn total_distance_km(&self) -> f64 {
        self.total_distance_km
    }

    pub fn total_duration_minutes(&self) -> f64 {
        self.total_duration_minutes
    }
}

/// Falls back to [`DEFAULT_AVERAGE_SPEED_KMH`] for non-positive or non-finite speeds.
pub fn effective_speed_kmh(average_speed_kmh: f64) -> f64 {
    if average_speed_kmh.is_finite() && average_speed_kmh > 0.0 {
        average_speed_kmh
    } else {
        DEFAULT_AVERAGE_SPEED_KMH
    }
}

/// Sums consecutive haversine legs and converts to minutes at the given speed.
pub fn estimate(waypoints: &[Coordinate], average_speed_kmh: f64) -> RouteMetrics {
    estimate_iter(waypoints.iter(), average_speed_kmh)
}

/// Same as [`estimate`] over any ordered sequence of points, such as
/// chained slices that are never collected into one route.
pub fn estimate_iter<'a, I>(waypoints: I, average_speed_kmh: f64) -> RouteMetrics
where
    I: IntoIterator<Item = &'a Coordinate>,
{
    let mut points = waypoints.into_iter();
    let mut total_distance_km = 0.0;

    if let Some(mut prev) = points.next() {
        for point in points {
            total_distance_km += distance_km(prev, point);
            prev = point;
        }
    }

    from_distance(total_distance_km, average_speed_kmh)
}

fn from_distance(total_distance_km: f64, average_speed_kmh: f64) -> RouteMetrics {
    let speed = effective_speed_kmh(average_speed_kmh);
    RouteMetrics {
        total_distance_km,
        total_duration_minutes: total_distance_km / speed * 60.0,
    }
}
