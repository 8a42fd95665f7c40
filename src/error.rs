//! Error types for the route-insertion engine.

use thiserror::Error;

/// Errors raised while validating engine inputs.
///
/// Finding no feasible insertion is not an error; the evaluator returns
/// `Ok(None)` for that case.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    /// The encoded polyline could not be decoded.
    #[error("malformed polyline at byte {position}: {reason}")]
    MalformedPolyline {
        /// Byte offset where decoding stopped.
        position: usize,
        /// What was wrong with the input at that offset.
        reason: &'static str,
    },
    /// A latitude/longitude outside the valid ranges, or not finite.
    #[error("invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate {
        /// Rejected latitude in degrees.
        latitude: f64,
        /// Rejected longitude in degrees.
        longitude: f64,
    },
    /// An evaluation option holds a value the engine cannot interpret.
    #[error("invalid option {field}: {value}")]
    InvalidOptions {
        /// Wire name of the offending option.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
}

pub type Result<T, E = RouteError> = std::result::Result<T, E>;
