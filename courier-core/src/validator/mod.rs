//! Accept or reject candidate deliveries.
//!
//! [`DeliveryValidator`] runs the checks in a fixed order and stops at the
//! first failure, so the same candidate always produces the same rejection:
//!
//! 1. edit horizon of the stored delivery (updates only)
//! 2. courier assigned, known and holding the courier role
//! 3. vehicle assigned and known
//! 4. window increasing and date not in the past
//! 5. courier free during the window
//! 6. route fits the window
//! 7. vehicle capacity, aggregated with overlapping deliveries
//! 8. at least one product line
//!
//! Nothing is persisted; see [`crate::DeliveryScheduler`] for the write path.

mod rejection;

use chrono::NaiveDate;

use crate::{
    Assignee, CandidateDelivery, CapacityCheck, CapacityLedger, Clock, ConfigError, Coordinate,
    CourierId, DeliveryId, DeliveryStore, DistanceOracle, EngineConfig, Load, RouteCheck,
    RouteFeasibilityChecker, Stop, StoreError, TimeConflictChecker, TimeWindow, Vehicle, VehicleId,
};

pub use rejection::{Rejection, RejectionCode, ValidationResult, ValidationStage};

/// What an accepted candidate resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Approval {
    pub(crate) courier_id: CourierId,
    pub(crate) vehicle_id: VehicleId,
    pub(crate) window: TimeWindow,
    pub(crate) load: Load,
}

/// Why a validation run stopped early.
enum Halt {
    Rejected(Rejection),
    Store(StoreError),
}

impl From<Rejection> for Halt {
    fn from(rejection: Rejection) -> Self {
        Self::Rejected(rejection)
    }
}

impl From<StoreError> for Halt {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

fn reached(stage: ValidationStage) {
    log::debug!("validation reached {stage:?}");
}

/// Validates candidate deliveries against the store.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use courier_core::{
///     CandidateDelivery, DeliveryValidator, EngineConfig, FixedClock, Haversine,
///     MemoryDeliveryStore, Rejection, UserId, ValidationResult,
/// };
///
/// let today = NaiveDate::from_ymd_opt(2030, 1, 1).expect("valid date");
/// let validator = DeliveryValidator::new(
///     MemoryDeliveryStore::default(),
///     Haversine::default(),
///     FixedClock(today),
///     EngineConfig::default(),
/// )?;
/// let candidate = CandidateDelivery::new(
///     UserId(1),
///     today,
///     NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
///     NaiveTime::from_hms_opt(12, 0, 0).expect("valid time"),
///     Vec::new(),
/// )?;
/// assert_eq!(
///     validator.validate_create(&candidate)?,
///     ValidationResult::Rejected(Rejection::CourierMissing)
/// );
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct DeliveryValidator<S, O, C> {
    store: S,
    route: RouteFeasibilityChecker<O>,
    clock: C,
    config: EngineConfig,
}

impl<S, O, C> DeliveryValidator<S, O, C>
where
    S: DeliveryStore,
    O: DistanceOracle,
    C: Clock,
{
    /// Build a validator.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails [`EngineConfig::validate`].
    pub fn new(store: S, oracle: O, clock: C, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store,
            route: RouteFeasibilityChecker::new(oracle, &config),
            clock,
            config,
        })
    }

    /// The store consulted by this validator.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The clock supplying today's date.
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate a new delivery.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] for infrastructure failures, including unknown
    /// products. Validation failures are reported as
    /// [`ValidationResult::Rejected`].
    pub fn validate_create(
        &self,
        candidate: &CandidateDelivery,
    ) -> Result<ValidationResult, StoreError> {
        self.assess(candidate, None).map(into_result)
    }

    /// Validate replacing delivery `id` with `candidate`.
    ///
    /// The stored delivery is excluded from conflict and capacity queries.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if `id` does not exist, and other
    /// [`StoreError`]s for infrastructure failures.
    pub fn validate_update(
        &self,
        id: DeliveryId,
        candidate: &CandidateDelivery,
    ) -> Result<ValidationResult, StoreError> {
        self.assess(candidate, Some(id)).map(into_result)
    }

    pub(crate) fn assess(
        &self,
        candidate: &CandidateDelivery,
        update_of: Option<DeliveryId>,
    ) -> Result<Result<Approval, Rejection>, StoreError> {
        match self.run(candidate, update_of) {
            Ok(approval) => Ok(Ok(approval)),
            Err(Halt::Rejected(rejection)) => {
                log::info!("delivery rejected with {}: {rejection}", rejection.code());
                Ok(Err(rejection))
            }
            Err(Halt::Store(err)) => Err(err),
        }
    }

    fn run(
        &self,
        candidate: &CandidateDelivery,
        update_of: Option<DeliveryId>,
    ) -> Result<Approval, Halt> {
        reached(ValidationStage::Start);
        let today = self.clock.today();
        if let Some(id) = update_of {
            self.check_edit_horizon(id, today)?;
            reached(ValidationStage::EditWindowOpen);
        }

        let courier_id = self.check_courier(candidate)?;
        reached(ValidationStage::CourierChecked);

        let vehicle = self.check_vehicle(candidate)?;
        reached(ValidationStage::VehicleChecked);

        let window = check_window(candidate, today)?;
        reached(ValidationStage::WindowSane);

        let conflicts = TimeConflictChecker::new(&self.store);
        if let Some(conflict) = conflicts.find_conflict(
            Assignee::Courier(courier_id),
            candidate.date(),
            &window,
            update_of,
        )? {
            return Err(Rejection::TimeConflict {
                conflicting: conflict.id,
                window: conflict.window,
            }
            .into());
        }
        reached(ValidationStage::TimeConflictPassed);

        let locations: Vec<Coordinate> = candidate.stops().iter().map(Stop::location).collect();
        if let RouteCheck::Insufficient(timing) = self.route.check_feasible(&locations, &window) {
            return Err(Rejection::RouteInfeasible(timing).into());
        }
        reached(ValidationStage::RouteFeasible);

        let ledger = CapacityLedger::new(&self.store);
        let load = match ledger.check_capacity(&vehicle, candidate, &window, update_of)? {
            CapacityCheck::Within { required, .. } => required,
            CapacityCheck::Exceeded(shortfall) => {
                return Err(Rejection::CapacityExceeded(shortfall).into());
            }
        };
        reached(ValidationStage::CapacityOk);

        if candidate.stops().iter().all(|stop| stop.lines().is_empty()) {
            return Err(Rejection::NoProducts.into());
        }
        reached(ValidationStage::Accepted);

        Ok(Approval {
            courier_id,
            vehicle_id: vehicle.id(),
            window,
            load,
        })
    }

    fn check_edit_horizon(&self, id: DeliveryId, today: NaiveDate) -> Result<(), Halt> {
        let stored = self
            .store
            .load_with_details(id)?
            .ok_or_else(|| StoreError::not_found("delivery", id))?;
        let days_until = (stored.date - today).num_days();
        if days_until < self.config.edit_horizon_days {
            return Err(Rejection::EditWindowClosed {
                date: stored.date,
                days_until,
                horizon_days: self.config.edit_horizon_days,
            }
            .into());
        }
        Ok(())
    }

    fn check_courier(&self, candidate: &CandidateDelivery) -> Result<CourierId, Halt> {
        let courier_id = candidate.courier_id().ok_or(Rejection::CourierMissing)?;
        let user = self
            .store
            .load_courier(courier_id)?
            .ok_or(Rejection::CourierNotFound { courier_id })?;
        if !user.is_courier() {
            return Err(Rejection::NotACourier { user_id: user.id }.into());
        }
        Ok(courier_id)
    }

    fn check_vehicle(&self, candidate: &CandidateDelivery) -> Result<Vehicle, Halt> {
        let vehicle_id = candidate.vehicle_id().ok_or(Rejection::VehicleMissing)?;
        Ok(self
            .store
            .load_vehicle(vehicle_id)?
            .ok_or(Rejection::VehicleNotFound { vehicle_id })?)
    }
}

fn check_window(candidate: &CandidateDelivery, today: NaiveDate) -> Result<TimeWindow, Halt> {
    let window = candidate
        .window()
        .map_err(|_| Rejection::WindowInverted {
            start: candidate.start(),
            end: candidate.end(),
        })?;
    if candidate.date() < today {
        return Err(Rejection::DateInPast {
            date: candidate.date(),
            today,
        }
        .into());
    }
    Ok(window)
}

fn into_result(outcome: Result<Approval, Rejection>) -> ValidationResult {
    match outcome {
        Ok(approval) => ValidationResult::Accepted {
            total_weight: approval.load.weight,
            total_volume: approval.load.volume,
        },
        Err(rejection) => ValidationResult::Rejected(rejection),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        FixedOracle, candidate, courier, date, delivery_with_stops, manager, product, stop,
        vehicle, window,
    };
    use crate::{FixedClock, Haversine, MemoryDeliveryStore, StoreSnapshot, UserId};
    use rstest::{fixture, rstest};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    type Validator = DeliveryValidator<MemoryDeliveryStore, Haversine, FixedClock>;

    fn today() -> NaiveDate {
        date(2030, 3, 1)
    }

    #[fixture]
    fn validator() -> Validator {
        let store = MemoryDeliveryStore::from_snapshot(StoreSnapshot {
            users: vec![courier(2), manager(3)],
            vehicles: vec![vehicle(1, dec!(1000), dec!(15))],
            products: vec![product(1, dec!(1.5), dec!(10), dec!(20), dec!(30))],
            deliveries: vec![delivery_with_stops(
                10,
                UserId(2),
                VehicleId(1),
                date(2030, 3, 10),
                window(10, 14),
                vec![stop(1, &[(1, 2)])],
            )],
        });
        DeliveryValidator::new(
            store,
            Haversine::default(),
            FixedClock(today()),
            EngineConfig::default(),
        )
        .expect("default config is valid")
    }

    fn assigned(on: NaiveDate, start: u32, end: u32) -> CandidateDelivery {
        candidate(on, start, end, vec![stop(1, &[(1, 2)])])
            .with_courier(UserId(2))
            .with_vehicle(VehicleId(1))
    }

    fn rejection(result: ValidationResult) -> Rejection {
        *result.rejection().expect("candidate should be rejected")
    }

    #[rstest]
    fn accepts_valid_candidate(validator: Validator) {
        let result = validator
            .validate_create(&assigned(date(2030, 3, 5), 9, 12))
            .expect("store succeeds");
        assert_eq!(
            result,
            ValidationResult::Accepted {
                total_weight: dec!(3.0),
                total_volume: dec!(0.012),
            }
        );
    }

    #[rstest]
    fn missing_courier_is_rejected_first(validator: Validator) {
        let probe = candidate(date(2030, 3, 5), 12, 9, Vec::new());
        let result = validator.validate_create(&probe).expect("store succeeds");
        assert_eq!(rejection(result), Rejection::CourierMissing);
    }

    #[rstest]
    #[case(UserId(99), Rejection::CourierNotFound { courier_id: UserId(99) })]
    #[case(UserId(3), Rejection::NotACourier { user_id: UserId(3) })]
    fn courier_must_be_a_known_courier(
        validator: Validator,
        #[case] courier_id: UserId,
        #[case] expected: Rejection,
    ) {
        let probe = assigned(date(2030, 3, 5), 9, 12).with_courier(courier_id);
        let result = validator.validate_create(&probe).expect("store succeeds");
        assert_eq!(rejection(result), expected);
    }

    #[rstest]
    fn unknown_vehicle_is_rejected(validator: Validator) {
        let probe = assigned(date(2030, 3, 5), 9, 12).with_vehicle(VehicleId(8));
        let result = validator.validate_create(&probe).expect("store succeeds");
        assert_eq!(
            rejection(result),
            Rejection::VehicleNotFound {
                vehicle_id: VehicleId(8)
            }
        );
    }

    #[rstest]
    #[case(date(2030, 3, 5), 12, 12, RejectionCode::WindowInvalid)]
    #[case(date(2030, 2, 28), 9, 12, RejectionCode::WindowInvalid)]
    fn window_must_be_sane(
        validator: Validator,
        #[case] on: NaiveDate,
        #[case] start: u32,
        #[case] end: u32,
        #[case] expected: RejectionCode,
    ) {
        let probe = candidate(on, start, end, vec![stop(1, &[(1, 1)])])
            .with_courier(UserId(2))
            .with_vehicle(VehicleId(1));
        let result = validator.validate_create(&probe).expect("store succeeds");
        assert_eq!(rejection(result).code(), expected);
    }

    #[rstest]
    fn today_is_not_in_the_past(validator: Validator) {
        let result = validator
            .validate_create(&assigned(today(), 9, 12))
            .expect("store succeeds");
        assert!(result.is_accepted());
    }

    #[rstest]
    fn overlapping_courier_delivery_conflicts(validator: Validator) {
        let result = validator
            .validate_create(&assigned(date(2030, 3, 10), 12, 16))
            .expect("store succeeds");
        assert_eq!(
            rejection(result),
            Rejection::TimeConflict {
                conflicting: DeliveryId(10),
                window: window(10, 14),
            }
        );
    }

    #[rstest]
    fn update_excludes_itself(validator: Validator) {
        let result = validator
            .validate_update(DeliveryId(10), &assigned(date(2030, 3, 10), 10, 14))
            .expect("store succeeds");
        assert!(result.is_accepted());
    }

    #[rstest]
    fn update_inside_edit_horizon_is_rejected_before_other_checks(validator: Validator) {
        let store = validator.store();
        let near = delivery_with_stops(
            11,
            UserId(2),
            VehicleId(1),
            date(2030, 3, 3),
            window(9, 10),
            Vec::new(),
        );
        let copy = MemoryDeliveryStore::from_snapshot(StoreSnapshot {
            deliveries: vec![near],
            ..store.snapshot().expect("snapshot succeeds")
        });
        let near_validator = DeliveryValidator::new(
            copy,
            Haversine::default(),
            FixedClock(today()),
            EngineConfig::default(),
        )
        .expect("default config is valid");
        let probe = candidate(date(2030, 3, 3), 12, 9, Vec::new());
        let result = near_validator
            .validate_update(DeliveryId(11), &probe)
            .expect("store succeeds");
        assert_eq!(
            rejection(result),
            Rejection::EditWindowClosed {
                date: date(2030, 3, 3),
                days_until: 2,
                horizon_days: 3,
            }
        );
    }

    #[rstest]
    fn updating_unknown_delivery_is_a_store_error(validator: Validator) {
        let err = validator
            .validate_update(DeliveryId(404), &assigned(date(2030, 3, 20), 9, 12))
            .expect_err("delivery is unknown");
        assert_eq!(err, StoreError::not_found("delivery", DeliveryId(404)));
    }

    #[rstest]
    fn far_stops_make_route_infeasible() {
        let store = MemoryDeliveryStore::from_snapshot(StoreSnapshot {
            users: vec![courier(2)],
            vehicles: vec![vehicle(1, dec!(1000), dec!(15))],
            products: vec![product(1, dec!(1), dec!(1), dec!(1), dec!(1))],
            ..StoreSnapshot::default()
        });
        let far = DeliveryValidator::new(
            store,
            FixedOracle(dec!(635)),
            FixedClock(today()),
            EngineConfig::default(),
        )
        .expect("default config is valid");
        let probe = candidate(
            date(2030, 3, 5),
            9,
            10,
            vec![stop(1, &[(1, 1)]), stop(2, &[(1, 1)])],
        )
        .with_courier(UserId(2))
        .with_vehicle(VehicleId(1));
        let result = far.validate_create(&probe).expect("store succeeds");
        assert_eq!(rejection(result).code(), RejectionCode::RouteInfeasible);
    }

    #[rstest]
    fn candidate_without_products_is_rejected(validator: Validator) {
        let probe = candidate(date(2030, 3, 5), 9, 12, vec![stop(1, &[])])
            .with_courier(UserId(2))
            .with_vehicle(VehicleId(1));
        let result = validator.validate_create(&probe).expect("store succeeds");
        assert_eq!(rejection(result), Rejection::NoProducts);
    }

    #[rstest]
    fn unknown_product_is_a_store_error(validator: Validator) {
        let probe = candidate(date(2030, 3, 5), 9, 12, vec![stop(1, &[(5, 1)])])
            .with_courier(UserId(2))
            .with_vehicle(VehicleId(1));
        let err = validator.validate_create(&probe).expect_err("product is unknown");
        assert_eq!(err, StoreError::not_found("product", crate::ProductId(5)));
    }

    #[rstest]
    fn overflowing_catalogue_load_is_a_store_error() {
        let store = MemoryDeliveryStore::from_snapshot(StoreSnapshot {
            users: vec![courier(2)],
            vehicles: vec![vehicle(1, dec!(10), dec!(15))],
            products: vec![product(
                1,
                Decimal::from_i128_with_scale(100_000_000_000_000_000_000, 0),
                dec!(1),
                dec!(1),
                dec!(1),
            )],
            ..StoreSnapshot::default()
        });
        let validator = DeliveryValidator::new(
            store,
            Haversine::default(),
            FixedClock(today()),
            EngineConfig::default(),
        )
        .expect("default config is valid");
        let probe = candidate(date(2030, 3, 5), 9, 12, vec![stop(1, &[(1, u32::MAX)])])
            .with_courier(UserId(2))
            .with_vehicle(VehicleId(1));
        let err = validator
            .validate_create(&probe)
            .expect_err("load cannot be represented");
        assert!(matches!(err, StoreError::LoadOverflow { .. }));
    }

    #[rstest]
    fn empty_candidate_on_overloaded_vehicle_reports_capacity_first() {
        let store = MemoryDeliveryStore::from_snapshot(StoreSnapshot {
            users: vec![courier(2), courier(4)],
            vehicles: vec![vehicle(1, dec!(10), dec!(15))],
            products: vec![product(1, dec!(1.5), dec!(10), dec!(20), dec!(30))],
            deliveries: vec![delivery_with_stops(
                10,
                UserId(4),
                VehicleId(1),
                date(2030, 3, 5),
                window(9, 12),
                vec![stop(1, &[(1, 8)])],
            )],
        });
        let validator = DeliveryValidator::new(
            store,
            Haversine::default(),
            FixedClock(today()),
            EngineConfig::default(),
        )
        .expect("default config is valid");
        let probe = candidate(date(2030, 3, 5), 9, 12, vec![stop(1, &[])])
            .with_courier(UserId(2))
            .with_vehicle(VehicleId(1));
        let result = validator.validate_create(&probe).expect("store succeeds");
        assert_eq!(rejection(result).code(), RejectionCode::CapacityExceeded);
    }

    #[rstest]
    fn invalid_config_is_refused() {
        let err = DeliveryValidator::new(
            MemoryDeliveryStore::default(),
            Haversine::default(),
            FixedClock(today()),
            EngineConfig::default().with_speed_km_per_hour(dec!(0)),
        )
        .expect_err("zero speed");
        assert!(matches!(err, ConfigError::NonPositiveSpeed { .. }));
    }
}
