//! Axis-aligned bounding boxes for cheap route pre-filtering.
//!
//! Boxes are derived from a route and thrown away when it changes. Routes
//! crossing the antimeridian are not handled: the longitude span is taken
//! at face value.

use serde::Serialize;

use crate::coordinate::Coordinate;

/// Kilometers per degree of latitude (and of longitude at the equator).
pub const KM_PER_DEGREE: f64 = 111.32;

/// Floor for `cos(latitude)` when converting meters to longitude degrees.
const MIN_LONGITUDE_SCALE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteBoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl RouteBoundingBox {
    /// Grows the box outward by `meters` on every side.
    ///
    /// The longitude delta is scaled by `cos(mean latitude)`; near the poles
    /// the result clamps to the full longitude range rather than blowing up.
    pub fn expand(&self, meters: f64) -> Self {
        let meters = if meters.is_finite() { meters.max(0.0) } else { 0.0 };
        let lat_delta = meters / 1000.0 / KM_PER_DEGREE;

        let mean_lat = (self.min_latitude + self.max_latitude) / 2.0;
        let scale = mean_lat.to_radians().cos().abs().max(MIN_LONGITUDE_SCALE);
        let lng_delta = (lat_delta / scale).min(360.0);

        Self {
            min_latitude: (self.min_latitude - lat_delta).max(-90.0),
            max_latitude: (self.max_latitude + lat_delta).min(90.0),
            min_longitude: (self.min_longitude - lng_delta).max(-180.0),
            max_longitude: (self.max_longitude + lng_delta).min(180.0),
        }
    }

    /// Inclusive containment on both axes.
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&coordinate.latitude())
            && (self.min_longitude..=self.max_longitude).contains(&coordinate.longitude())
    }

    pub fn intersects(&self, other: &RouteBoundingBox) -> bool {
        !(self.max_latitude < other.min_latitude
            || other.max_latitude < self.min_latitude
            || self.max_longitude < other.min_longitude
            || other.max_longitude < self.min_longitude)
    }
}

/// Minimal box around every point, or `None` for an empty route.
pub fn bounding_box(route: &[Coordinate]) -> Option<RouteBoundingBox> {
    let (first, rest) = route.split_first()?;
    let seed = RouteBoundingBox {
        min_latitude: first.latitude(),
        max_latitude: first.latitude(),
        min_longitude: first.longitude(),
        max_longitude: first.longitude(),
    };

    Some(rest.iter().fold(seed, |bounds, point| RouteBoundingBox {
        min_latitude: bounds.min_latitude.min(point.latitude()),
        max_latitude: bounds.max_latitude.max(point.latitude()),
        min_longitude: bounds.min_longitude.min(point.longitude()),
        max_longitude: bounds.max_longitude.max(point.longitude()),
    }))
}

/// Free-function form of [`RouteBoundingBox::expand`].
pub fn expand_bounding_box(bounds: &RouteBoundingBox, meters: f64) -> RouteBoundingBox {
    bounds.expand(meters)
}

/// Free-function form of [`RouteBoundingBox::contains`]; edges count as inside.
pub fn contains_coordinate(coordinate: &Coordinate, bounds: &RouteBoundingBox) -> bool {
    bounds.contains(coordinate)
}
