//! Great-circle distance.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::{DistanceError, DistanceOracle};
use crate::Coordinate;
use crate::config::DEFAULT_EARTH_RADIUS_KM;

/// Fractional digits kept on computed distances.
pub const DISTANCE_SCALE: u32 = 6;

/// Haversine distance on a sphere of configurable radius.
///
/// Pure and infallible; identical points are zero kilometres apart.
///
/// # Examples
///
/// ```
/// use courier_core::{Coordinate, Haversine};
/// use rust_decimal::Decimal;
///
/// let a = Coordinate::new(Decimal::ZERO, Decimal::ZERO).expect("valid");
/// assert_eq!(Haversine::default().distance(&a, &a), Decimal::ZERO);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Haversine {
    earth_radius_km: f64,
}

impl Default for Haversine {
    fn default() -> Self {
        Self::new(DEFAULT_EARTH_RADIUS_KM)
    }
}

impl Haversine {
    /// Use a specific sphere radius in kilometres.
    #[must_use]
    pub const fn new(earth_radius_km: f64) -> Self {
        Self { earth_radius_km }
    }

    /// Radius used by this instance.
    #[must_use]
    pub const fn earth_radius_km(&self) -> f64 {
        self.earth_radius_km
    }

    /// Distance between `a` and `b` in kilometres, rounded to
    /// [`DISTANCE_SCALE`] digits.
    #[must_use]
    pub fn distance(&self, a: &Coordinate, b: &Coordinate) -> Decimal {
        let km = self.distance_f64(
            degrees(a.latitude()),
            degrees(b.latitude()),
            degrees(b.latitude() - a.latitude()),
            degrees(b.longitude() - a.longitude()),
        );
        Decimal::from_f64_retain(km)
            .map_or(Decimal::ZERO, |value| value.round_dp(DISTANCE_SCALE))
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "the haversine formula is evaluated in floating point"
    )]
    fn distance_f64(&self, lat_a: f64, lat_b: f64, delta_lat: f64, delta_lon: f64) -> f64 {
        let half_lat = (delta_lat.to_radians() / 2.0).sin();
        let half_lon = (delta_lon.to_radians() / 2.0).sin();
        let h = (half_lat * half_lat
            + lat_a.to_radians().cos() * lat_b.to_radians().cos() * half_lon * half_lon)
            .clamp(0.0, 1.0);
        2.0 * self.earth_radius_km * h.sqrt().atan2((1.0 - h).sqrt())
    }
}

/// Coordinates are bounded to ±180 so the conversion cannot fail.
fn degrees(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

impl DistanceOracle for Haversine {
    fn distance_km(&self, a: &Coordinate, b: &Coordinate) -> Result<Decimal, DistanceError> {
        Ok(self.distance(a, b))
    }
}
