//! Human-facing projection of an insertion result.

use serde::Serialize;

use crate::insertion::AssignmentCandidate;

/// Relative growth of a route quantity.
///
/// A zero base with a positive addition has no finite percentage and is
/// reported as `Unbounded`; a zero base with a zero addition is 0%.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum PercentIncrease {
    Finite(f64),
    Unbounded,
}

impl PercentIncrease {
    pub fn from_parts(additional: f64, base: f64) -> Self {
        if base > 0.0 {
            Self::Finite(additional / base * 100.0)
        } else if additional > 0.0 {
            Self::Unbounded
        } else {
            Self::Finite(0.0)
        }
    }

    /// The finite percentage, if there is one.
    pub fn as_finite(&self) -> Option<f64> {
        match self {
            Self::Finite(percent) => Some(*percent),
            Self::Unbounded => None,
        }
    }
}

/// Flat view of a candidate for responses: totals before and after, plus
/// the increase in absolute and relative terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSummary {
    pub pickup_insert_index: usize,
    pub dropoff_insert_index: usize,
    pub base_total_minutes: f64,
    pub base_total_distance_km: f64,
    pub new_total_minutes: f64,
    pub new_total_distance_km: f64,
    pub additional_minutes: f64,
    pub additional_distance_km: f64,
    pub time_increase_percent: PercentIncrease,
    pub distance_increase_percent: PercentIncrease,
}

/// Builds the response summary for a candidate.
pub fn summarize(candidate: &AssignmentCandidate) -> CandidateSummary {
    let base = candidate.base_metrics();
    let updated = candidate.updated_metrics();

    CandidateSummary {
        pickup_insert_index: candidate.pickup_insert_index(),
        dropoff_insert_index: candidate.dropoff_insert_index(),
        base_total_minutes: base.total_duration_minutes(),
        base_total_distance_km: base.total_distance_km(),
        new_total_minutes: updated.total_duration_minutes(),
        new_total_distance_km: updated.total_distance_km(),
        additional_minutes: candidate.additional_minutes(),
        additional_distance_km: candidate.additional_distance_km(),
        time_increase_percent: PercentIncrease::from_parts(
            candidate.additional_minutes(),
            base.total_duration_minutes(),
        ),
        distance_increase_percent: PercentIncrease::from_parts(
            candidate.additional_distance_km(),
            base.total_distance_km(),
        ),
    }
}
