//! Distances between coordinates.
//!
//! [`DistanceOracle`] abstracts the road-distance provider. Providers may
//! fail; [`WithFallback`] absorbs those failures by substituting the
//! [`Haversine`] great-circle distance, so the rest of the engine never sees
//! a distance error.

mod error;
mod haversine;

use rust_decimal::Decimal;

use crate::Coordinate;

pub use error::DistanceError;
pub use haversine::{DISTANCE_SCALE, Haversine};

/// Road or geometric distance between two coordinates.
///
/// # Examples
///
/// ```
/// use courier_core::{Coordinate, DistanceError, DistanceOracle};
/// use rust_decimal::Decimal;
///
/// struct Fixed;
///
/// impl DistanceOracle for Fixed {
///     fn distance_km(&self, _: &Coordinate, _: &Coordinate) -> Result<Decimal, DistanceError> {
///         Ok(Decimal::TEN)
///     }
/// }
///
/// let origin = Coordinate::new(Decimal::ZERO, Decimal::ZERO)?;
/// assert_eq!(Fixed.distance_km(&origin, &origin)?, Decimal::TEN);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait DistanceOracle {
    /// Distance from `a` to `b` in kilometres.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError`] when the provider cannot answer.
    fn distance_km(&self, a: &Coordinate, b: &Coordinate) -> Result<Decimal, DistanceError>;
}

impl<O: DistanceOracle + ?Sized> DistanceOracle for &O {
    fn distance_km(&self, a: &Coordinate, b: &Coordinate) -> Result<Decimal, DistanceError> {
        (**self).distance_km(a, b)
    }
}

impl<O: DistanceOracle + ?Sized> DistanceOracle for Box<O> {
    fn distance_km(&self, a: &Coordinate, b: &Coordinate) -> Result<Decimal, DistanceError> {
        (**self).distance_km(a, b)
    }
}

/// Wraps an oracle so that failures fall back to [`Haversine`].
///
/// The fallback is logged at `warn` level and never surfaces as an error.
#[derive(Debug, Clone)]
pub struct WithFallback<O> {
    oracle: O,
    fallback: Haversine,
}

impl<O: DistanceOracle> WithFallback<O> {
    /// Wrap `oracle`, falling back to `fallback` on failure.
    #[must_use]
    pub const fn new(oracle: O, fallback: Haversine) -> Self {
        Self { oracle, fallback }
    }

    /// Distance from `a` to `b`, never failing.
    #[must_use]
    pub fn distance_km(&self, a: &Coordinate, b: &Coordinate) -> Decimal {
        match self.oracle.distance_km(a, b) {
            Ok(km) => km,
            Err(err) => {
                log::warn!("distance oracle failed, using haversine: {err}");
                self.fallback.distance(a, b)
            }
        }
    }

    /// The wrapped oracle.
    #[must_use]
    pub const fn inner(&self) -> &O {
        &self.oracle
    }
}
