//! Batch matching of passengers against driver routes.
//!
//! Each driver/passenger pair runs through the same pipeline:
//!
//! 1. Resolve the route geometry (decoding stored polylines).
//! 2. When a corridor is configured, reject stops outside the route's
//!    bounding box grown by it.
//! 3. Simplify long routes to bound the quadratic search.
//! 4. Run [`evaluate_insertion`].
//!
//! Pairs are independent, so they are fanned out with rayon.

use std::borrow::Cow;
use std::cmp::Ordering;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bbox::{RouteBoundingBox, bounding_box};
use crate::coordinate::{Coordinate, PassengerStops};
use crate::error::Result;
use crate::insertion::{AssignmentCandidate, RouteEvaluationOptions, evaluate_insertion};
use crate::polyline;
use crate::simplify::simplify;
use crate::summary::{CandidateSummary, summarize};
use crate::traits::{DriverRoute, PassengerRequest, RouteGeometry};

/// How a batch is matched: the evaluation budgets plus pre-filter and
/// simplification settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOptions {
    pub evaluation: RouteEvaluationOptions,
    /// Bounding-box growth for the pre-filter. Falls back to the deviation
    /// budget; with neither set, no pair is pre-filtered.
    #[serde(default)]
    pub corridor_meters: Option<f64>,
    /// Routes with more points than this are simplified before evaluation.
    #[serde(default = "default_simplify_above_points")]
    pub simplify_above_points: usize,
    #[serde(default = "default_simplify_tolerance_meters")]
    pub simplify_tolerance_meters: f64,
    #[serde(default = "default_simplify_minimum_points")]
    pub simplify_minimum_points: usize,
}

fn default_simplify_above_points() -> usize {
    250
}

fn default_simplify_tolerance_meters() -> f64 {
    15.0
}

fn default_simplify_minimum_points() -> usize {
    2
}

impl MatchOptions {
    /// Options with default simplification and no explicit corridor.
    pub fn new(evaluation: RouteEvaluationOptions) -> Self {
        Self {
            evaluation,
            corridor_meters: None,
            simplify_above_points: default_simplify_above_points(),
            simplify_tolerance_meters: default_simplify_tolerance_meters(),
            simplify_minimum_points: default_simplify_minimum_points(),
        }
    }

    /// Corridor for the bounding-box pre-filter, if any.
    pub fn corridor_meters(&self) -> Option<f64> {
        self.corridor_meters.or(self.evaluation.max_deviation_meters)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "camelCase")]
pub enum RejectionReason {
    /// The stored polyline could not be decoded.
    InvalidRoute(String),
    /// Pickup or dropoff lies outside the route's corridor box.
    OutsideCorridor,
    /// Every insertion broke the time or deviation budget.
    NoFeasibleInsertion,
}

/// A feasible insertion for one record of the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Match<I> {
    pub id: I,
    pub candidate: AssignmentCandidate,
    pub summary: CandidateSummary,
    /// True when the candidate's indices and route refer to a simplified route.
    pub simplified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rejected<I> {
    pub id: I,
    pub reason: RejectionReason,
}

/// Matches ordered cheapest first, plus everything that did not fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult<I> {
    pub matches: Vec<Match<I>>,
    pub rejected: Vec<Rejected<I>>,
}

/// A driver route resolved and ready for repeated evaluation.
#[derive(Debug, Clone)]
struct PreparedRoute<'a> {
    points: Cow<'a, [Coordinate]>,
    corridor: Option<RouteBoundingBox>,
    simplified: bool,
}

enum Outcome {
    Matched(AssignmentCandidate, bool),
    Rejected(RejectionReason),
}

/// Evaluates one passenger against every driver route.
pub fn match_passenger<D, P>(
    drivers: &[D],
    passenger: &P,
    options: &MatchOptions,
) -> Result<MatchResult<D::Id>>
where
    D: DriverRoute,
    P: PassengerRequest,
{
    options.evaluation.validate()?;
    let stops = passenger.stops();

    let outcomes = drivers
        .par_iter()
        .map(|driver| -> Result<(D::Id, Outcome)> {
            let outcome = match prepare_route(driver.route(), options) {
                Ok(prepared) => assess(&prepared, &stops, options)?,
                Err(reason) => Outcome::Rejected(reason),
            };
            Ok((driver.id().clone(), outcome))
        })
        .collect::<Result<Vec<_>>>()?;

    let result = collect_result(outcomes);
    debug!(
        drivers = drivers.len(),
        matches = result.matches.len(),
        rejected = result.rejected.len(),
        "matched passenger against drivers"
    );
    Ok(result)
}

/// Evaluates every passenger against one driver route, cheapest first.
///
/// The route is decoded and simplified once and shared across passengers.
pub fn rank_passengers<D, P>(
    driver: &D,
    passengers: &[P],
    options: &MatchOptions,
) -> Result<MatchResult<P::Id>>
where
    D: DriverRoute,
    P: PassengerRequest,
{
    options.evaluation.validate()?;

    let outcomes = match prepare_route(driver.route(), options) {
        Ok(prepared) => passengers
            .par_iter()
            .map(|passenger| -> Result<(P::Id, Outcome)> {
                let outcome = assess(&prepared, &passenger.stops(), options)?;
                Ok((passenger.id().clone(), outcome))
            })
            .collect::<Result<Vec<_>>>()?,
        Err(reason) => passengers
            .iter()
            .map(|passenger| (passenger.id().clone(), Outcome::Rejected(reason.clone())))
            .collect(),
    };

    let result = collect_result(outcomes);
    debug!(
        passengers = passengers.len(),
        matches = result.matches.len(),
        rejected = result.rejected.len(),
        "ranked passengers for driver"
    );
    Ok(result)
}

fn prepare_route<'a>(
    geometry: RouteGeometry<'a>,
    options: &MatchOptions,
) -> std::result::Result<PreparedRoute<'a>, RejectionReason> {
    let points: Cow<'a, [Coordinate]> = match geometry {
        RouteGeometry::Decoded(points) => Cow::Borrowed(points),
        RouteGeometry::Encoded(encoded) => Cow::Owned(
            polyline::decode(encoded)
                .map_err(|err| RejectionReason::InvalidRoute(err.to_string()))?,
        ),
    };

    let corridor = options
        .corridor_meters()
        .and_then(|meters| bounding_box(&points).map(|bounds| bounds.expand(meters)));

    if points.len() <= options.simplify_above_points {
        return Ok(PreparedRoute {
            points,
            corridor,
            simplified: false,
        });
    }

    let reduced = simplify(
        &points,
        options.simplify_tolerance_meters,
        options.simplify_minimum_points,
    );
    debug!(from = points.len(), to = reduced.len(), "simplified driver route");

    Ok(PreparedRoute {
        points: Cow::Owned(reduced),
        corridor,
        simplified: true,
    })
}

fn assess(
    prepared: &PreparedRoute<'_>,
    stops: &PassengerStops,
    options: &MatchOptions,
) -> Result<Outcome> {
    if let Some(corridor) = &prepared.corridor {
        if !corridor.contains(&stops.pickup) || !corridor.contains(&stops.dropoff) {
            return Ok(Outcome::Rejected(RejectionReason::OutsideCorridor));
        }
    }

    Ok(
        match evaluate_insertion(&prepared.points, stops, &options.evaluation)? {
            Some(candidate) => Outcome::Matched(candidate, prepared.simplified),
            None => Outcome::Rejected(RejectionReason::NoFeasibleInsertion),
        },
    )
}

fn collect_result<I>(outcomes: Vec<(I, Outcome)>) -> MatchResult<I> {
    let mut matches = Vec::new();
    let mut rejected = Vec::new();

    for (id, outcome) in outcomes {
        match outcome {
            Outcome::Matched(candidate, simplified) => {
                let summary = summarize(&candidate);
                matches.push(Match {
                    id,
                    candidate,
                    summary,
                    simplified,
                });
            }
            Outcome::Rejected(reason) => rejected.push(Rejected { id, reason }),
        }
    }

    // Stable sort: equal costs keep input order.
    matches.sort_by(|a, b| compare_cost(&a.candidate, &b.candidate));

    MatchResult { matches, rejected }
}

fn compare_cost(a: &AssignmentCandidate, b: &AssignmentCandidate) -> Ordering {
    a.additional_distance_km()
        .total_cmp(&b.additional_distance_km())
        .then_with(|| a.additional_minutes().total_cmp(&b.additional_minutes()))
}
