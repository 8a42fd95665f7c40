//! Great-circle distance, bearing and point-to-segment math.
//!
//! Everything here works on a spherical Earth, which is accurate enough for
//! comparing insertion costs and pre-filtering along city-scale routes.

use crate::coordinate::Coordinate;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Segments shorter than this are treated as a single point.
const DEGENERATE_SEGMENT_KM: f64 = 1e-9;

/// Haversine distance between two points in kilometers.
pub fn distance_km(from: &Coordinate, to: &Coordinate) -> f64 {
    let lat1_rad = from.latitude().to_radians();
    let lat2_rad = to.latitude().to_radians();
    let delta_lat = (to.latitude() - from.latitude()).to_radians();
    let delta_lng = (to.longitude() - from.longitude()).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1 for antipodal points.
    let c = 2.0 * a.min(1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Haversine distance in meters.
pub fn distance_m(from: &Coordinate, to: &Coordinate) -> f64 {
    distance_km(from, to) * 1000.0
}

/// Initial great-circle bearing from `from` towards `to`, in degrees [0, 360).
pub fn initial_bearing_deg(from: &Coordinate, to: &Coordinate) -> f64 {
    initial_bearing_rad(from, to).to_degrees().rem_euclid(360.0)
}

fn initial_bearing_rad(from: &Coordinate, to: &Coordinate) -> f64 {
    let lat1 = from.latitude().to_radians();
    let lat2 = to.latitude().to_radians();
    let delta_lng = (to.longitude() - from.longitude()).to_radians();

    let y = delta_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lng.cos();
    y.atan2(x)
}

/// Shortest distance in meters from `point` to the great-circle segment `[start, end]`.
///
/// Uses the cross-track distance when the point projects inside the segment
/// and the distance to the nearer endpoint otherwise.
pub fn distance_to_segment_m(point: &Coordinate, start: &Coordinate, end: &Coordinate) -> f64 {
    let segment_km = distance_km(start, end);
    if segment_km < DEGENERATE_SEGMENT_KM {
        return distance_m(point, start);
    }

    let to_point_km = distance_km(start, point);
    let angular_to_point = to_point_km / EARTH_RADIUS_KM;
    let bearing_diff = initial_bearing_rad(start, point) - initial_bearing_rad(start, end);

    // Point lies behind the start of the segment.
    if bearing_diff.cos() < 0.0 {
        return to_point_km * 1000.0;
    }

    let cross_track = (angular_to_point.sin() * bearing_diff.sin())
        .clamp(-1.0, 1.0)
        .asin();
    let cos_cross = cross_track.cos();
    if cos_cross.abs() < f64::EPSILON {
        return distance_m(point, start).min(distance_m(point, end));
    }

    let along_track_km =
        (angular_to_point.cos() / cos_cross).clamp(-1.0, 1.0).acos() * EARTH_RADIUS_KM;
    if along_track_km > segment_km {
        return distance_m(point, end);
    }

    cross_track.abs() * EARTH_RADIUS_KM * 1000.0
}
