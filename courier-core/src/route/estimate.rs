use chrono::{NaiveTime, TimeDelta};
use rust_decimal::Decimal;

use super::travel_minutes;
use crate::{Coordinate, DistanceOracle, EngineConfig, Haversine, WithFallback};

/// Fractional digits reported on estimated distances.
const ESTIMATE_DISTANCE_SCALE: u32 = 2;

/// A start and end time proposed for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SuggestedSlot {
    /// Proposed start.
    pub start: NaiveTime,
    /// Proposed end; wraps past midnight for very long routes.
    pub end: NaiveTime,
}

/// Planning estimate for a path through several points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteEstimate {
    /// Total distance over consecutive legs, rounded to two places.
    pub distance_km: Decimal,
    /// Travel time at the estimate speed plus the per-point allowance.
    pub duration_minutes: i64,
    /// Slot beginning at the requested start, when there is anything to do.
    pub suggested: Option<SuggestedSlot>,
}

/// Estimate distance and duration over consecutive `points`.
///
/// Unlike feasibility checks, every leg is measured. Fewer than two points
/// yield a zero estimate with no suggestion. Oracle failures fall back to
/// the Haversine distance.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use courier_core::{EngineConfig, Haversine, estimate_route};
/// use rust_decimal::Decimal;
///
/// let start = NaiveTime::from_hms_opt(9, 0, 0).expect("valid");
/// let estimate = estimate_route(&[], Haversine::default(), &EngineConfig::default(), start);
/// assert_eq!(estimate.distance_km, Decimal::ZERO);
/// assert!(estimate.suggested.is_none());
/// ```
#[must_use]
pub fn estimate_route<O: DistanceOracle>(
    points: &[Coordinate],
    oracle: O,
    config: &EngineConfig,
    start: NaiveTime,
) -> RouteEstimate {
    if points.len() < 2 {
        return RouteEstimate {
            distance_km: Decimal::ZERO,
            duration_minutes: 0,
            suggested: None,
        };
    }

    let distance = WithFallback::new(oracle, Haversine::new(config.earth_radius_km));
    let total: Decimal = points
        .windows(2)
        .filter_map(|leg| match leg {
            [from, to] => Some(distance.distance_km(from, to)),
            _ => None,
        })
        .sum();
    let point_count = i64::try_from(points.len()).unwrap_or(i64::MAX);
    let duration_minutes = travel_minutes(total, config.estimate_speed_km_per_hour).saturating_add(
        i64::from(config.estimate_stop_minutes).saturating_mul(point_count),
    );
    let length = TimeDelta::try_minutes(duration_minutes).unwrap_or(TimeDelta::MAX);
    let suggested = (duration_minutes > 0).then(|| SuggestedSlot {
        start,
        end: start.overflowing_add_signed(length).0,
    });

    RouteEstimate {
        distance_km: total.round_dp(ESTIMATE_DISTANCE_SCALE),
        duration_minutes,
        suggested,
    }
}
