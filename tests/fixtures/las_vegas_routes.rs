//! Real Las Vegas / Henderson places and driver routes through them.
//!
//! Coordinates sourced from OpenStreetMap. Routes are coarse waypoint
//! sequences along real roads, good enough for straight-line costing.

#![allow(dead_code)]

use carpool_planner::coordinate::{Coordinate, PassengerStops};
use carpool_planner::traits::{DriverRoute, PassengerRequest, RouteGeometry};

/// A named place with coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Place {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Place {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng).expect("fixture coordinates are valid")
    }
}

// ============================================================================
// Places
// ============================================================================

pub const HARD_ROCK_CAFE: Place = Place::new("Hard Rock Cafe", 36.1041592, -115.1722166);
pub const YARD_HOUSE: Place = Place::new("Yard House", 36.1177147, -115.1691992);
pub const PBR_GRILL: Place = Place::new("PBR Grill", 36.1090017, -115.1724402);
pub const OYSTER_BAR: Place = Place::new("Oyster Bar", 36.1194951, -115.1715059);
pub const MARAKESH: Place = Place::new("Marakesh", 36.1177772, -115.1546882);
pub const NAGA: Place = Place::new("Naga", 36.0137634, -114.9928676);
pub const ISLANDERS_GRILL: Place = Place::new("Islander's Grill", 36.0335058, -114.9856162);

// ============================================================================
// Driver routes
// ============================================================================

/// Mandalay Bay area north along Las Vegas Blvd to Wynn.
pub const STRIP_NORTHBOUND: &[(f64, f64)] = &[
    (36.0909, -115.1760),
    (36.1023, -115.1720),
    (36.1126, -115.1720),
    (36.1200, -115.1705),
    (36.1263, -115.1690),
];

/// Green Valley Ranch west towards MGM Grand.
pub const HENDERSON_TO_STRIP: &[(f64, f64)] = &[
    (36.0308, -115.0825),
    (36.0600, -115.1100),
    (36.0900, -115.1500),
    (36.1023, -115.1688),
];

/// East-west across North Las Vegas.
pub const NORTH_VEGAS_CROSSTOWN: &[(f64, f64)] = &[
    (36.1450, -115.0483),
    (36.1440, -115.0634),
    (36.1429, -115.1574),
];

pub fn route(points: &[(f64, f64)]) -> Vec<Coordinate> {
    points
        .iter()
        .map(|&(lat, lng)| Coordinate::new(lat, lng).expect("fixture coordinates are valid"))
        .collect()
}

pub fn ride(pickup: Place, dropoff: Place) -> PassengerStops {
    PassengerStops::new(pickup.coordinate(), dropoff.coordinate())
}

// ============================================================================
// Records
// ============================================================================

/// Driver with an already decoded route.
#[derive(Debug, Clone)]
pub struct TestDriver {
    pub id: String,
    pub points: Vec<Coordinate>,
}

impl TestDriver {
    pub fn new(id: &str, points: &[(f64, f64)]) -> Self {
        Self {
            id: id.to_string(),
            points: route(points),
        }
    }
}

impl DriverRoute for TestDriver {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn route(&self) -> RouteGeometry<'_> {
        RouteGeometry::Decoded(&self.points)
    }
}

/// Driver whose route is stored as an encoded polyline.
#[derive(Debug, Clone)]
pub struct StoredDriver {
    pub id: String,
    pub encoded: String,
}

impl DriverRoute for StoredDriver {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn route(&self) -> RouteGeometry<'_> {
        RouteGeometry::Encoded(&self.encoded)
    }
}

#[derive(Debug, Clone)]
pub struct TestPassenger {
    pub id: String,
    pub stops: PassengerStops,
}

impl TestPassenger {
    pub fn new(id: &str, pickup: Place, dropoff: Place) -> Self {
        Self {
            id: id.to_string(),
            stops: ride(pickup, dropoff),
        }
    }
}

impl PassengerRequest for TestPassenger {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn stops(&self) -> PassengerStops {
        self.stops
    }
}
