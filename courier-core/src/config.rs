//! Tunable engine parameters.
//!
//! Every constant the engine relies on lives in [`EngineConfig`] so callers
//! and tests can vary it. [`EngineConfig::default`] carries the production
//! values.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use thiserror::Error;

/// Assumed average speed when judging whether a route fits its window.
pub const DEFAULT_SPEED_KM_PER_HOUR: Decimal = Decimal::from_parts(60, 0, 0, false, 0);
/// Loading and unloading allowance per stop, in minutes.
pub const DEFAULT_SERVICE_BUFFER_MINUTES: u32 = 30;
/// Minimum whole days between today and a delivery for it to be editable.
pub const DEFAULT_EDIT_HORIZON_DAYS: i64 = 3;
/// Mean Earth radius in kilometres.
pub const DEFAULT_EARTH_RADIUS_KM: f64 = 6371.0;
/// Upper bound on generated routes per day.
pub const DEFAULT_MAX_ROUTES_PER_DAY: usize = 9;
/// Urban speed used for route estimates.
pub const DEFAULT_ESTIMATE_SPEED_KM_PER_HOUR: Decimal = Decimal::from_parts(40, 0, 0, false, 0);
/// Per-stop allowance used for route estimates, in minutes.
pub const DEFAULT_ESTIMATE_STOP_MINUTES: u32 = 5;

/// Engine configuration.
///
/// # Examples
///
/// ```
/// use courier_core::EngineConfig;
/// use rust_decimal::Decimal;
///
/// let config = EngineConfig::default()
///     .with_speed_km_per_hour(Decimal::from(50))
///     .with_service_buffer_minutes(20);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.service_buffer_minutes, 20);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Average travel speed for route feasibility, km/h.
    pub speed_km_per_hour: Decimal,
    /// Service allowance added per stop, minutes.
    pub service_buffer_minutes: u32,
    /// Deliveries closer than this many days cannot be edited.
    pub edit_horizon_days: i64,
    /// Radius used by the Haversine fallback, km.
    pub earth_radius_km: f64,
    /// Maximum number of routes the generator schedules per day.
    pub max_routes_per_day: usize,
    /// Start time of the first generated route of a day.
    pub generation_first_start: NaiveTime,
    /// End time shared by all generated routes.
    pub generation_day_end: NaiveTime,
    /// Offset between consecutive generated start times, minutes.
    pub generation_start_step_minutes: u32,
    /// Average travel speed for route estimates, km/h.
    pub estimate_speed_km_per_hour: Decimal,
    /// Per-stop allowance for route estimates, minutes.
    pub estimate_stop_minutes: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            speed_km_per_hour: DEFAULT_SPEED_KM_PER_HOUR,
            service_buffer_minutes: DEFAULT_SERVICE_BUFFER_MINUTES,
            edit_horizon_days: DEFAULT_EDIT_HORIZON_DAYS,
            earth_radius_km: DEFAULT_EARTH_RADIUS_KM,
            max_routes_per_day: DEFAULT_MAX_ROUTES_PER_DAY,
            generation_first_start: NaiveTime::MIN + chrono::TimeDelta::hours(9),
            generation_day_end: NaiveTime::MIN + chrono::TimeDelta::hours(18),
            generation_start_step_minutes: 60,
            estimate_speed_km_per_hour: DEFAULT_ESTIMATE_SPEED_KM_PER_HOUR,
            estimate_stop_minutes: DEFAULT_ESTIMATE_STOP_MINUTES,
        }
    }
}

/// Errors returned by [`EngineConfig::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A speed was zero or negative.
    #[error("{field} must be positive, got {value}")]
    NonPositiveSpeed {
        /// Offending field name.
        field: &'static str,
        /// Supplied value.
        value: Decimal,
    },
    /// The Earth radius was not a positive finite number.
    #[error("earth_radius_km must be positive and finite, got {0}")]
    InvalidEarthRadius(f64),
    /// Generated routes would have an empty window.
    #[error("generation_first_start {start} must be earlier than generation_day_end {end}")]
    EmptyGenerationDay {
        /// First generated start.
        start: NaiveTime,
        /// Shared generated end.
        end: NaiveTime,
    },
}

impl EngineConfig {
    /// Set the route feasibility speed.
    #[must_use]
    pub const fn with_speed_km_per_hour(mut self, speed: Decimal) -> Self {
        self.speed_km_per_hour = speed;
        self
    }

    /// Set the per-stop service allowance.
    #[must_use]
    pub const fn with_service_buffer_minutes(mut self, minutes: u32) -> Self {
        self.service_buffer_minutes = minutes;
        self
    }

    /// Set the edit horizon in days.
    #[must_use]
    pub const fn with_edit_horizon_days(mut self, days: i64) -> Self {
        self.edit_horizon_days = days;
        self
    }

    /// Set the Haversine Earth radius.
    #[must_use]
    pub const fn with_earth_radius_km(mut self, radius: f64) -> Self {
        self.earth_radius_km = radius;
        self
    }

    /// Set the generated-routes-per-day cap.
    #[must_use]
    pub const fn with_max_routes_per_day(mut self, routes: usize) -> Self {
        self.max_routes_per_day = routes;
        self
    }

    /// Check that the configuration can drive the engine.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for non-positive speeds, a non-positive
    /// radius, or an empty generation day.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("speed_km_per_hour", self.speed_km_per_hour),
            ("estimate_speed_km_per_hour", self.estimate_speed_km_per_hour),
        ] {
            if value <= Decimal::ZERO {
                return Err(ConfigError::NonPositiveSpeed { field, value });
            }
        }
        if !(self.earth_radius_km.is_finite() && self.earth_radius_km > 0.0) {
            return Err(ConfigError::InvalidEarthRadius(self.earth_radius_km));
        }
        if self.generation_first_start >= self.generation_day_end {
            return Err(ConfigError::EmptyGenerationDay {
                start: self.generation_first_start,
                end: self.generation_day_end,
            });
        }
        Ok(())
    }
}
