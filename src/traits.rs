//! Record traits for plugging application data into the matcher.
//!
//! Kept minimal on purpose: apps implement them for whatever driver and
//! passenger records their persistence layer hands back.

use std::hash::Hash;

use crate::coordinate::{Coordinate, PassengerStops};

/// Unique identifier for matcher entities.
pub trait Id: Clone + Eq + Hash + Send + Sync {}

impl<T> Id for T where T: Clone + Eq + Hash + Send + Sync {}

/// Route geometry as stored: either already decoded or still encoded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouteGeometry<'a> {
    Decoded(&'a [Coordinate]),
    /// Encoded polyline text, decoded on demand.
    Encoded(&'a str),
}

/// A driver's published route.
pub trait DriverRoute: Sync {
    type Id: Id;

    fn id(&self) -> &Self::Id;

    /// Path from origin to destination, in traversal order.
    fn route(&self) -> RouteGeometry<'_>;
}

/// A passenger asking to be picked up and dropped off.
pub trait PassengerRequest: Sync {
    type Id: Id;

    fn id(&self) -> &Self::Id;

    fn stops(&self) -> PassengerStops;
}
