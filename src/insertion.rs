//! Pickup/dropoff insertion search.
//!
//! Given a driver route and one passenger, tries every pair of insertion
//! slots `(i, j)` with `0 <= i <= j <= n`, both indexing the original route.
//! The candidate route is
//!
//! ```text
//! route[..i] ++ [pickup] ++ route[i..j] ++ [dropoff] ++ route[j..]
//! ```
//!
//! so `i == j` places pickup and dropoff back to back in the gap before
//! `route[i]`. Pairs over the time budget (or the optional deviation budget)
//! are discarded; the cheapest survivor wins.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coordinate::{Coordinate, PassengerStops};
use crate::error::{Result, RouteError};
use crate::haversine::{distance_km, distance_m, distance_to_segment_m};
use crate::metrics::{RouteMetrics, effective_speed_kmh, estimate};

/// Costs closer than this are treated as equal, leaving the earlier pair in place.
const COST_EPSILON_KM: f64 = 1e-9;
const COST_EPSILON_MINUTES: f64 = 1e-9;

/// Feasibility budgets for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEvaluationOptions {
    /// Speed used to turn distance into duration. Absent or non-positive
    /// means [`crate::metrics::DEFAULT_AVERAGE_SPEED_KMH`].
    #[serde(default)]
    pub average_speed_kmh: Option<f64>,
    /// Hard ceiling on the extra driving time the passenger may cause.
    pub max_additional_minutes: f64,
    /// Optional ceiling on how far each stop may lie from the original route.
    #[serde(default)]
    pub max_deviation_meters: Option<f64>,
}

impl RouteEvaluationOptions {
    pub fn new(max_additional_minutes: f64) -> Self {
        Self {
            average_speed_kmh: None,
            max_additional_minutes,
            max_deviation_meters: None,
        }
    }

    pub fn with_average_speed_kmh(mut self, speed_kmh: f64) -> Self {
        self.average_speed_kmh = Some(speed_kmh);
        self
    }

    pub fn with_max_deviation_meters(mut self, meters: f64) -> Self {
        self.max_deviation_meters = Some(meters);
        self
    }

    pub fn effective_speed_kmh(&self) -> f64 {
        effective_speed_kmh(self.average_speed_kmh.unwrap_or(0.0))
    }

    /// Rejects values the search cannot compare against.
    pub fn validate(&self) -> Result<()> {
        if self.max_additional_minutes.is_nan() {
            return Err(RouteError::InvalidOptions {
                field: "maxAdditionalMinutes",
                value: self.max_additional_minutes,
            });
        }
        if let Some(meters) = self.max_deviation_meters {
            if meters.is_nan() || meters < 0.0 {
                return Err(RouteError::InvalidOptions {
                    field: "maxDeviationMeters",
                    value: meters,
                });
            }
        }
        Ok(())
    }
}

/// The cheapest feasible way to fit a passenger into a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentCandidate {
    pickup_insert_index: usize,
    dropoff_insert_index: usize,
    additional_distance_km: f64,
    additional_minutes: f64,
    route: Vec<Coordinate>,
    base_metrics: RouteMetrics,
    updated_metrics: RouteMetrics,
    pickup_deviation_meters: Option<f64>,
    dropoff_deviation_meters: Option<f64>,
}

impl AssignmentCandidate {
    /// Slot in the original route where the pickup goes.
    pub fn pickup_insert_index(&self) -> usize {
        self.pickup_insert_index
    }

    /// Slot in the original route where the dropoff goes (`>= pickup_insert_index`).
    pub fn dropoff_insert_index(&self) -> usize {
        self.dropoff_insert_index
    }

    pub fn additional_distance_km(&self) -> f64 {
        self.additional_distance_km
    }

    pub fn additional_minutes(&self) -> f64 {
        self.additional_minutes
    }

    /// The route with both stops spliced in.
    pub fn route(&self) -> &[Coordinate] {
        &self.route
    }

    /// Consumes the candidate, keeping only the spliced route.
    pub fn into_route(self) -> Vec<Coordinate> {
        self.route
    }

    pub fn base_metrics(&self) -> &RouteMetrics {
        &self.base_metrics
    }

    pub fn updated_metrics(&self) -> &RouteMetrics {
        &self.updated_metrics
    }

    /// Pickup distance from the original route; `None` unless a deviation
    /// budget was set and the route had a segment to measure against.
    pub fn pickup_deviation_meters(&self) -> Option<f64> {
        self.pickup_deviation_meters
    }

    pub fn dropoff_deviation_meters(&self) -> Option<f64> {
        self.dropoff_deviation_meters
    }
}

/// Best pair seen so far during the search.
#[derive(Debug, Clone, Copy)]
struct ScoredPair {
    pickup_index: usize,
    dropoff_index: usize,
    additional_distance_km: f64,
    additional_minutes: f64,
    pickup_deviation_meters: Option<f64>,
    dropoff_deviation_meters: Option<f64>,
}

impl ScoredPair {
    /// Pairs are visited in lexicographic `(i, j)` order, so only an
    /// improvement beyond rounding noise replaces the incumbent.
    fn beats(&self, other: &ScoredPair) -> bool {
        let distance_delta = other.additional_distance_km - self.additional_distance_km;
        if distance_delta.abs() > COST_EPSILON_KM {
            return distance_delta > 0.0;
        }
        other.additional_minutes - self.additional_minutes > COST_EPSILON_MINUTES
    }
}

/// Finds the cheapest feasible insertion of `stops` into `route`.
///
/// Returns `Ok(None)` when no pair fits the budgets. The inputs are never
/// modified; the returned candidate owns a freshly built route.
pub fn evaluate_insertion(
    route: &[Coordinate],
    stops: &PassengerStops,
    options: &RouteEvaluationOptions,
) -> Result<Option<AssignmentCandidate>> {
    options.validate()?;

    let speed = options.effective_speed_kmh();
    let max_minutes = options.max_additional_minutes.max(0.0);
    let base_metrics = estimate(route, speed);
    let n = route.len();

    let pickup_costs = slot_costs(route, &stops.pickup);
    let dropoff_costs = slot_costs(route, &stops.dropoff);
    let pickup_deviations = slot_deviations(route, &stops.pickup);
    let dropoff_deviations = slot_deviations(route, &stops.dropoff);

    let mut best: Option<ScoredPair> = None;
    let mut over_budget = 0usize;
    let mut over_deviation = 0usize;

    for pickup_index in 0..=n {
        let pickup_deviation = pickup_deviations[pickup_index];
        if exceeds(pickup_deviation, options.max_deviation_meters) {
            over_deviation += n + 1 - pickup_index;
            continue;
        }

        for dropoff_index in pickup_index..=n {
            let dropoff_deviation = dropoff_deviations[dropoff_index];
            if exceeds(dropoff_deviation, options.max_deviation_meters) {
                over_deviation += 1;
                continue;
            }

            let added_km = if pickup_index == dropoff_index {
                shared_slot_cost(route, pickup_index, stops)
            } else {
                pickup_costs[pickup_index] + dropoff_costs[dropoff_index]
            };
            let additional_distance_km = added_km.max(0.0);
            let additional_minutes = additional_distance_km / speed * 60.0;

            if additional_minutes > max_minutes {
                over_budget += 1;
                continue;
            }

            let scored = ScoredPair {
                pickup_index,
                dropoff_index,
                additional_distance_km,
                additional_minutes,
                pickup_deviation_meters: options.max_deviation_meters.and(pickup_deviation),
                dropoff_deviation_meters: options.max_deviation_meters.and(dropoff_deviation),
            };
            if best.as_ref().is_none_or(|incumbent| scored.beats(incumbent)) {
                best = Some(scored);
            }
        }
    }

    debug!(
        route_points = n,
        over_budget,
        over_deviation,
        feasible = best.is_some(),
        "evaluated passenger insertion"
    );

    Ok(best.map(|pair| {
        let candidate_route = splice(route, pair.pickup_index, pair.dropoff_index, stops);
        let updated_metrics = estimate(&candidate_route, speed);
        AssignmentCandidate {
            pickup_insert_index: pair.pickup_index,
            dropoff_insert_index: pair.dropoff_index,
            additional_distance_km: pair.additional_distance_km,
            additional_minutes: pair.additional_minutes,
            route: candidate_route,
            base_metrics,
            updated_metrics,
            pickup_deviation_meters: pair.pickup_deviation_meters,
            dropoff_deviation_meters: pair.dropoff_deviation_meters,
        }
    }))
}

/// Builds the candidate route for slots `(pickup_index, dropoff_index)`.
///
/// Both indices refer to the original route and `pickup_index <= dropoff_index <= route.len()`.
pub fn splice(
    route: &[Coordinate],
    pickup_index: usize,
    dropoff_index: usize,
    stops: &PassengerStops,
) -> Vec<Coordinate> {
    let mut spliced = Vec::with_capacity(route.len() + 2);
    spliced.extend_from_slice(&route[..pickup_index]);
    spliced.push(stops.pickup);
    spliced.extend_from_slice(&route[pickup_index..dropoff_index]);
    spliced.push(stops.dropoff);
    spliced.extend_from_slice(&route[dropoff_index..]);
    spliced
}

/// Neighbours of the gap before `route[slot]`.
fn gap(route: &[Coordinate], slot: usize) -> (Option<&Coordinate>, Option<&Coordinate>) {
    let prev = slot.checked_sub(1).and_then(|k| route.get(k));
    (prev, route.get(slot))
}

/// Extra kilometers from inserting one point into each gap on its own.
fn slot_costs(route: &[Coordinate], point: &Coordinate) -> Vec<f64> {
    (0..=route.len())
        .map(|slot| match gap(route, slot) {
            (Some(prev), Some(next)) => {
                distance_km(prev, point) + distance_km(point, next) - distance_km(prev, next)
            }
            (Some(prev), None) => distance_km(prev, point),
            (None, Some(next)) => distance_km(point, next),
            (None, None) => 0.0,
        })
        .collect()
}

/// Extra kilometers from inserting pickup then dropoff into the same gap.
fn shared_slot_cost(route: &[Coordinate], slot: usize, stops: &PassengerStops) -> f64 {
    let ride = distance_km(&stops.pickup, &stops.dropoff);
    match gap(route, slot) {
        (Some(prev), Some(next)) => {
            distance_km(prev, &stops.pickup) + ride + distance_km(&stops.dropoff, next)
                - distance_km(prev, next)
        }
        (Some(prev), None) => distance_km(prev, &stops.pickup) + ride,
        (None, Some(next)) => ride + distance_km(&stops.dropoff, next),
        (None, None) => ride,
    }
}

/// Distance from `point` to the original route around `slot`.
///
/// Interior slots measure against the segment `[slot - 1, slot]`; the two
/// end slots only have one neighbour. An empty route has nothing to measure.
fn slot_deviation_m(route: &[Coordinate], slot: usize, point: &Coordinate) -> Option<f64> {
    match gap(route, slot) {
        (Some(prev), Some(next)) => Some(distance_to_segment_m(point, prev, next)),
        (Some(end), None) | (None, Some(end)) => Some(distance_m(point, end)),
        (None, None) => None,
    }
}

fn slot_deviations(route: &[Coordinate], point: &Coordinate) -> Vec<Option<f64>> {
    (0..=route.len())
        .map(|slot| slot_deviation_m(route, slot, point))
        .collect()
}

fn exceeds(deviation: Option<f64>, limit: Option<f64>) -> bool {
    matches!((deviation, limit), (Some(deviation), Some(limit)) if deviation > limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    fn stops(pickup: (f64, f64), dropoff: (f64, f64)) -> PassengerStops {
        PassengerStops::new(coord(pickup.0, pickup.1), coord(dropoff.0, dropoff.1))
    }

    #[test]
    fn test_splice_same_slot_places_stops_back_to_back() {
        let route = vec![coord(0.0, 0.0), coord(0.0, 1.0)];
        let passenger = stops((0.0, 0.4), (0.0, 0.6));
        let spliced = splice(&route, 1, 1, &passenger);
        assert_eq!(spliced, vec![route[0], passenger.pickup, passenger.dropoff, route[1]]);
    }

    #[test]
    fn test_splice_indices_refer_to_original_route() {
        let route = vec![coord(0.0, 0.0), coord(0.0, 1.0), coord(0.0, 2.0)];
        let passenger = stops((0.0, 0.5), (0.0, 1.5));
        let spliced = splice(&route, 1, 2, &passenger);
        assert_eq!(
            spliced,
            vec![route[0], passenger.pickup, route[1], passenger.dropoff, route[2]]
        );
    }

    #[test]
    fn test_splice_at_both_ends() {
        let route = vec![coord(0.0, 0.0)];
        let passenger = stops((1.0, 1.0), (2.0, 2.0));
        assert_eq!(
            splice(&route, 0, 1, &passenger),
            vec![passenger.pickup, route[0], passenger.dropoff]
        );
        assert_eq!(splice(&[], 0, 0, &passenger), vec![passenger.pickup, passenger.dropoff]);
    }

    #[test]
    fn test_incremental_cost_matches_full_estimate() {
        let route = vec![
            coord(36.10, -115.17),
            coord(36.12, -115.15),
            coord(36.16, -115.14),
        ];
        let passenger = stops((36.11, -115.16), (36.15, -115.13));
        let base = estimate(&route, 30.0).total_distance_km();
        let pickup_costs = slot_costs(&route, &passenger.pickup);
        let dropoff_costs = slot_costs(&route, &passenger.dropoff);

        for i in 0..=route.len() {
            for j in i..=route.len() {
                let spliced = splice(&route, i, j, &passenger);
                let full = estimate(&spliced, 30.0).total_distance_km() - base;
                let incremental = if i == j {
                    shared_slot_cost(&route, i, &passenger)
                } else {
                    pickup_costs[i] + dropoff_costs[j]
                };
                assert!(
                    (full - incremental).abs() < 1e-9,
                    "pair ({}, {}): {} vs {}",
                    i,
                    j,
                    full,
                    incremental
                );
            }
        }
    }

    #[test]
    fn test_slot_deviation_ends_and_interior() {
        let route = vec![coord(0.0, 0.0), coord(0.0, 1.0)];
        let point = coord(0.01, 0.5);
        let interior = slot_deviation_m(&route, 1, &point).unwrap();
        assert!((interior - 1111.95).abs() < 1.0);
        assert_eq!(slot_deviation_m(&route, 0, &point), Some(distance_m(&point, &route[0])));
        assert_eq!(slot_deviation_m(&route, 2, &point), Some(distance_m(&point, &route[1])));
        assert_eq!(slot_deviation_m(&[], 0, &point), None);
    }

    #[test]
    fn test_validate_rejects_nan_budget() {
        let options = RouteEvaluationOptions::new(f64::NAN);
        assert!(matches!(
            options.validate(),
            Err(RouteError::InvalidOptions { field: "maxAdditionalMinutes", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_negative_deviation() {
        let options = RouteEvaluationOptions::new(10.0).with_max_deviation_meters(-1.0);
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_options_wire_names() {
        let json = r#"{"averageSpeedKmh":45.0,"maxAdditionalMinutes":12.5}"#;
        let options: RouteEvaluationOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.average_speed_kmh, Some(45.0));
        assert_eq!(options.max_additional_minutes, 12.5);
        assert_eq!(options.max_deviation_meters, None);

        let options = RouteEvaluationOptions::new(5.0).with_max_deviation_meters(300.0);
        let json = serde_json::to_string(&options).unwrap();
        assert!(json.contains("\"maxDeviationMeters\":300.0"));
    }

    #[test]
    fn test_effective_speed_defaults() {
        assert_eq!(RouteEvaluationOptions::new(1.0).effective_speed_kmh(), 30.0);
        let negative = RouteEvaluationOptions::new(1.0).with_average_speed_kmh(-3.0);
        assert_eq!(negative.effective_speed_kmh(), 30.0);
        let explicit = RouteEvaluationOptions::new(1.0).with_average_speed_kmh(50.0);
        assert_eq!(explicit.effective_speed_kmh(), 50.0);
    }

    fn scored(pickup_index: usize, dropoff_index: usize, km: f64) -> ScoredPair {
        ScoredPair {
            pickup_index,
            dropoff_index,
            additional_distance_km: km,
            additional_minutes: km * 2.0,
            pickup_deviation_meters: None,
            dropoff_deviation_meters: None,
        }
    }

    #[test]
    fn test_rounding_noise_does_not_displace_earlier_pair() {
        let earlier = scored(1, 2, 1.209425569060567);
        let later = scored(2, 2, 1.209425569060567 - 4e-15);
        assert!(!later.beats(&earlier));

        let cheaper = scored(2, 2, 1.209425569060567 - 1e-6);
        assert!(cheaper.beats(&earlier));
        assert!(!earlier.beats(&cheaper));
    }

    #[test]
    fn test_minutes_break_distance_ties_beyond_noise() {
        let mut incumbent = scored(0, 0, 1.0);
        let mut challenger = scored(0, 1, 1.0);
        challenger.additional_minutes = incumbent.additional_minutes - 1e-12;
        assert!(!challenger.beats(&incumbent));

        incumbent.additional_minutes = 3.0;
        assert!(challenger.beats(&incumbent));
    }

    #[test]
    fn test_slot_deviations_cover_every_slot() {
        let route = vec![coord(0.0, 0.0), coord(0.0, 1.0), coord(0.0, 2.0)];
        let point = coord(0.01, 0.5);
        let deviations = slot_deviations(&route, &point);
        assert_eq!(deviations.len(), route.len() + 1);
        for (slot, deviation) in deviations.iter().enumerate() {
            assert_eq!(*deviation, slot_deviation_m(&route, slot, &point));
        }
    }
}
