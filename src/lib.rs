//! carpool-planner core
//!
//! Decides whether a passenger's pickup/dropoff pair can be spliced into a
//! driver's route within time and deviation budgets, and picks the cheapest
//! way to do it. Everything here is pure: no I/O, no shared state.

pub mod bbox;
pub mod coordinate;
pub mod error;
pub mod haversine;
pub mod insertion;
pub mod matcher;
pub mod metrics;
pub mod polyline;
pub mod simplify;
pub mod summary;
pub mod traits;

pub use bbox::{RouteBoundingBox, bounding_box};
pub use coordinate::{Coordinate, PassengerStops};
pub use error::{Result, RouteError};
pub use insertion::{AssignmentCandidate, RouteEvaluationOptions, evaluate_insertion};
pub use metrics::{RouteMetrics, estimate};
pub use summary::{CandidateSummary, PercentIncrease, summarize};
