//! Wiring shared by the commands: distance oracle, clock and store.

use chrono::NaiveDate;
use courier_core::{
    Clock, DeliveryValidator, DistanceOracle, EngineConfig, FixedClock, Haversine,
    MemoryDeliveryStore, StoreSnapshot, SystemClock,
};
use courier_data::routing::HttpDistanceOracle;

use crate::CliError;

/// Oracle used by every command.
pub(crate) type CliOracle = Box<dyn DistanceOracle>;

/// Validator over an in-memory snapshot.
pub(crate) type CliValidator = DeliveryValidator<MemoryDeliveryStore, CliOracle, FixedClock>;

/// Engine settings resolved from flags, files and the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct EngineOptions {
    /// OSRM base URL; great-circle distance is used when absent.
    pub(crate) osrm_base_url: Option<String>,
    /// Date treated as today; the UTC system date when absent.
    pub(crate) today: Option<NaiveDate>,
}

impl EngineOptions {
    /// Build the distance oracle for `config`.
    pub(crate) fn oracle(&self, config: &EngineConfig) -> Result<CliOracle, CliError> {
        let Some(base_url) = self.osrm_base_url.as_deref() else {
            return Ok(Box::new(Haversine::new(config.earth_radius_km)));
        };
        let oracle = HttpDistanceOracle::new(base_url).map_err(|source| {
            CliError::BuildDistanceOracle {
                base_url: base_url.to_owned(),
                source,
            }
        })?;
        Ok(Box::new(oracle))
    }

    /// Freeze today's date for the whole run.
    pub(crate) fn clock(&self) -> FixedClock {
        FixedClock(self.today.unwrap_or_else(|| SystemClock.today()))
    }

    /// Build a validator over `snapshot`.
    pub(crate) fn validator(
        &self,
        snapshot: StoreSnapshot,
        config: EngineConfig,
    ) -> Result<CliValidator, CliError> {
        let oracle = self.oracle(&config)?;
        let store = MemoryDeliveryStore::from_snapshot(snapshot);
        Ok(DeliveryValidator::new(store, oracle, self.clock(), config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::test_support::{coordinate, date};
    use rstest::rstest;
    use rust_decimal::Decimal;

    #[rstest]
    fn explicit_today_is_used() {
        let options = EngineOptions {
            today: Some(date(2031, 1, 2)),
            ..EngineOptions::default()
        };

        assert_eq!(options.clock().today(), date(2031, 1, 2));
    }

    #[rstest]
    fn haversine_is_used_without_a_base_url() {
        let config = EngineConfig::default();
        let oracle = EngineOptions::default()
            .oracle(&config)
            .expect("haversine always builds");
        let a = coordinate(Decimal::ZERO, Decimal::ZERO);
        let b = coordinate(Decimal::ONE, Decimal::ZERO);

        let km = oracle.distance_km(&a, &b).expect("haversine never fails");

        assert_eq!(km, Haversine::new(config.earth_radius_km).distance(&a, &b));
    }

    #[rstest]
    fn invalid_engine_config_is_reported() {
        let config = EngineConfig::default().with_speed_km_per_hour(Decimal::ZERO);

        let result = EngineOptions::default().validator(StoreSnapshot::default(), config);

        assert!(matches!(result, Err(CliError::InvalidEngineConfig(_))));
    }
}
