//! Test utilities for distance oracles.
//!
//! This module provides [`StubDistanceOracle`], a deterministic test double
//! for [`DistanceOracle`] that returns pre-configured responses without
//! making HTTP requests.

use courier_core::{Coordinate, DistanceError, DistanceOracle};
use rust_decimal::Decimal;

/// Stub `DistanceOracle` for testing.
///
/// # Example
///
/// ```
/// use courier_core::{Coordinate, DistanceOracle};
/// use courier_data::routing::test_support::StubDistanceOracle;
/// use rust_decimal::Decimal;
///
/// let oracle = StubDistanceOracle::with_distance(Decimal::new(125, 1));
/// let point = Coordinate::new(Decimal::ZERO, Decimal::ZERO).expect("valid");
///
/// assert_eq!(oracle.distance_km(&point, &point), Ok(Decimal::new(125, 1)));
/// ```
#[derive(Debug, Clone)]
pub struct StubDistanceOracle {
    response: StubResponse,
}

#[derive(Debug, Clone)]
enum StubResponse {
    Distance(Decimal),
    Error(DistanceError),
}

impl StubDistanceOracle {
    /// Create an oracle that returns `km` for every pair.
    #[must_use]
    pub const fn with_distance(km: Decimal) -> Self {
        Self {
            response: StubResponse::Distance(km),
        }
    }

    /// Create an oracle that fails with `error` for every pair.
    #[must_use]
    pub const fn with_error(error: DistanceError) -> Self {
        Self {
            response: StubResponse::Error(error),
        }
    }
}

impl DistanceOracle for StubDistanceOracle {
    fn distance_km(&self, _: &Coordinate, _: &Coordinate) -> Result<Decimal, DistanceError> {
        match &self.response {
            StubResponse::Distance(km) => Ok(*km),
            StubResponse::Error(error) => Err(error.clone()),
        }
    }
}
