//! Test fixtures for carpool-planner.
//!
//! Provides realistic test data including:
//! - Real Las Vegas / Henderson locations (from OpenStreetMap)
//! - Driver routes through those locations and simple record types

pub mod las_vegas_routes;

pub use las_vegas_routes::*;
