//! Validated latitude/longitude values and passenger stop pairs.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RouteError};
use crate::haversine::distance_m;

/// A WGS84 position in degrees.
///
/// Construction always goes through [`Coordinate::new`] (deserialization
/// included), so every value in circulation is finite and in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = RouteError;

    fn try_from(raw: RawCoordinate) -> Result<Self> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    /// Creates a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        if valid {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(RouteError::InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }

    /// Degrees north, in `[-90, 90]`.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Degrees east, in `[-180, 180]`.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// `(latitude, longitude)` tuple, handy at API boundaries.
    pub fn as_tuple(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    /// True when the two points are within `meters` of each other.
    pub fn approx_eq(&self, other: &Coordinate, meters: f64) -> bool {
        distance_m(self, other) <= meters
    }
}

impl TryFrom<(f64, f64)> for Coordinate {
    type Error = RouteError;

    fn try_from((latitude, longitude): (f64, f64)) -> Result<Self> {
        Self::new(latitude, longitude)
    }
}

/// Builds a route from `(lat, lng)` tuples, failing on the first invalid one.
pub fn route_from_tuples(points: &[(f64, f64)]) -> Result<Vec<Coordinate>> {
    points.iter().map(|&point| Coordinate::try_from(point)).collect()
}

/// Pickup and dropoff for one candidate passenger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PassengerStops {
    pub pickup: Coordinate,
    pub dropoff: Coordinate,
}

impl PassengerStops {
    /// Pairs a pickup with its dropoff.
    pub fn new(pickup: Coordinate, dropoff: Coordinate) -> Self {
        Self { pickup, dropoff }
    }
}
