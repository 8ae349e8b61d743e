//! Time needed to drive a delivery route.
//!
//! [`RouteFeasibilityChecker`] judges whether a delivery window is long
//! enough for its stops. [`estimate_route`] produces a planning estimate over
//! the full path.

mod estimate;
mod feasibility;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

pub use estimate::{RouteEstimate, SuggestedSlot, estimate_route};
pub use feasibility::{RouteCheck, RouteFeasibilityChecker, RouteTiming};

const MINUTES_PER_HOUR: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

/// Whole minutes needed to cover `distance_km` at `speed_km_per_hour`,
/// rounded up. Saturates at `i64::MAX` for a zero speed or overflow.
pub(crate) fn travel_minutes(distance_km: Decimal, speed_km_per_hour: Decimal) -> i64 {
    distance_km
        .checked_mul(MINUTES_PER_HOUR)
        .and_then(|scaled| scaled.checked_div(speed_km_per_hour))
        .and_then(|minutes| minutes.ceil().to_i64())
        .unwrap_or(i64::MAX)
}
