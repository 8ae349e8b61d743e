use rust_decimal::Decimal;

use super::travel_minutes;
use crate::{Coordinate, DistanceOracle, EngineConfig, Haversine, TimeWindow, WithFallback};

/// Minutes and distance behind a feasibility decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteTiming {
    /// Travel time plus per-stop service buffer.
    pub required_minutes: i64,
    /// Length of the delivery window.
    pub available_minutes: i64,
    /// Distance used for the travel estimate.
    pub distance_km: Decimal,
}

/// Outcome of [`RouteFeasibilityChecker::check_feasible`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteCheck {
    /// The route fits the window.
    Feasible(RouteTiming),
    /// The window is too short.
    Insufficient(RouteTiming),
}

/// Checks that a window can accommodate travel and service time.
///
/// Only the distance between the first and the last stop is measured;
/// intermediate stops contribute their service buffer but not their detour.
/// Fewer than two stops are always feasible.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use courier_core::{Coordinate, EngineConfig, Haversine, RouteCheck, RouteFeasibilityChecker, TimeWindow};
/// use rust_decimal::Decimal;
///
/// let checker = RouteFeasibilityChecker::new(Haversine::default(), &EngineConfig::default());
/// let window = TimeWindow::new(
///     NaiveTime::from_hms_opt(9, 0, 0).expect("valid"),
///     NaiveTime::from_hms_opt(10, 0, 0).expect("valid"),
/// )?;
/// let here = Coordinate::new(Decimal::ZERO, Decimal::ZERO)?;
/// assert!(matches!(checker.check_feasible(&[here], &window), RouteCheck::Feasible(_)));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct RouteFeasibilityChecker<O> {
    distance: WithFallback<O>,
    speed_km_per_hour: Decimal,
    service_buffer_minutes: i64,
}

impl<O: DistanceOracle> RouteFeasibilityChecker<O> {
    /// Build a checker over `oracle` using the speed, buffer and fallback
    /// radius from `config`.
    #[must_use]
    pub fn new(oracle: O, config: &EngineConfig) -> Self {
        Self {
            distance: WithFallback::new(oracle, Haversine::new(config.earth_radius_km)),
            speed_km_per_hour: config.speed_km_per_hour,
            service_buffer_minutes: i64::from(config.service_buffer_minutes),
        }
    }

    /// Compare the time `stops` need with the length of `window`.
    #[must_use]
    pub fn check_feasible(&self, stops: &[Coordinate], window: &TimeWindow) -> RouteCheck {
        let available_minutes = window.duration_minutes();
        let [first, .., last] = stops else {
            return RouteCheck::Feasible(RouteTiming {
                required_minutes: 0,
                available_minutes,
                distance_km: Decimal::ZERO,
            });
        };

        let distance_km = self.distance.distance_km(first, last);
        let stop_count = i64::try_from(stops.len()).unwrap_or(i64::MAX);
        let required_minutes = travel_minutes(distance_km, self.speed_km_per_hour)
            .saturating_add(self.service_buffer_minutes.saturating_mul(stop_count));
        let timing = RouteTiming {
            required_minutes,
            available_minutes,
            distance_km,
        };
        if required_minutes <= available_minutes {
            RouteCheck::Feasible(timing)
        } else {
            RouteCheck::Insufficient(timing)
        }
    }
}
