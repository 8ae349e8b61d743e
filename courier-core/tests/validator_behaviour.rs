#![expect(
    clippy::expect_used,
    reason = "tests should fail fast when setup breaks"
)]

//! Behavioural coverage for delivery validation.

use std::cell::RefCell;

use chrono::{NaiveDate, TimeDelta};
use courier_core::test_support::{
    candidate, coordinate, courier, date, delivery_with_stops, product, stop, vehicle, window,
};
use courier_core::{
    CandidateDelivery, Delivery, DeliveryId, DeliveryValidator, EngineConfig, FixedClock,
    Haversine, MemoryDeliveryStore, Rejection, StopRequest, StoreSnapshot, UserId,
    ValidationResult, VehicleId,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const PRODUCT: u64 = 1;
const VEHICLE: VehicleId = VehicleId(1);

/// Aggregate fixtures shared across the BDD scenarios.
pub struct TestContext {
    today: NaiveDate,
    snapshot: RefCell<StoreSnapshot>,
    outcome: RefCell<Option<ValidationResult>>,
}

#[fixture]
/// Build a fresh `TestContext` for each scenario run.
pub fn context() -> TestContext {
    TestContext {
        today: date(2030, 3, 1),
        snapshot: RefCell::new(StoreSnapshot {
            users: vec![courier(2), courier(3)],
            ..StoreSnapshot::default()
        }),
        outcome: RefCell::new(None),
    }
}

impl TestContext {
    fn delivery_day(&self) -> NaiveDate {
        self.today + TimeDelta::days(10)
    }

    fn plan(&self, existing: Delivery) {
        self.snapshot.borrow_mut().deliveries.push(existing);
    }

    fn validate(&self, probe: &CandidateDelivery, update_of: Option<DeliveryId>) {
        let store = MemoryDeliveryStore::from_snapshot(self.snapshot.borrow().clone());
        let validator = DeliveryValidator::new(
            store,
            Haversine::default(),
            FixedClock(self.today),
            EngineConfig::default(),
        )
        .expect("default config is valid");
        let result = match update_of {
            Some(id) => validator.validate_update(id, probe),
            None => validator.validate_create(probe),
        }
        .expect("memory store does not fail");
        *self.outcome.borrow_mut() = Some(result);
    }

    fn rejection(&self) -> Rejection {
        let outcome = self.outcome.borrow();
        *outcome
            .as_ref()
            .expect("validation should have run")
            .rejection()
            .expect("candidate should be rejected")
    }
}

fn units(quantity: u32) -> Vec<StopRequest> {
    vec![stop(1, &[(PRODUCT, quantity)])]
}

fn assigned(probe: CandidateDelivery, courier_id: u64) -> CandidateDelivery {
    probe.with_courier(UserId(courier_id)).with_vehicle(VEHICLE)
}

fn kilograms(raw: &str) -> Decimal {
    raw.parse().expect("numeric weight in feature file")
}

#[given("a fleet with a {limit} kg vehicle and a {weight} kg product")]
fn fleet(context: &TestContext, limit: String, weight: String) {
    let mut snapshot = context.snapshot.borrow_mut();
    snapshot
        .vehicles
        .push(vehicle(VEHICLE.0, kilograms(&limit), dec!(15)));
    snapshot.products.push(product(
        PRODUCT,
        kilograms(&weight),
        dec!(10),
        dec!(20),
        dec!(30),
    ));
}

#[given("a delivery carrying 60 kg is already planned on that vehicle")]
fn sixty_kg_planned(context: &TestContext) {
    context.plan(delivery_with_stops(
        10,
        UserId(3),
        VEHICLE,
        context.delivery_day(),
        window(10, 14),
        units(6),
    ));
}

#[given("courier 2 is booked from 10:00 to 14:00")]
fn courier_booked(context: &TestContext) {
    context.plan(delivery_with_stops(
        11,
        UserId(2),
        VEHICLE,
        context.delivery_day(),
        window(10, 14),
        units(1),
    ));
}

#[given("a delivery is planned two days from today")]
fn planned_soon(context: &TestContext) {
    context.plan(delivery_with_stops(
        20,
        UserId(2),
        VEHICLE,
        context.today + TimeDelta::days(2),
        window(10, 14),
        units(1),
    ));
}

#[when("a delivery carrying 50 kg is validated for the same vehicle")]
fn validate_fifty_kg(context: &TestContext) {
    let probe = candidate(context.delivery_day(), 12, 16, units(5));
    context.validate(&assigned(probe, 2), None);
}

#[when("courier 2 is proposed from 12:00 to 16:00")]
fn propose_overlap(context: &TestContext) {
    let probe = candidate(context.delivery_day(), 12, 16, units(1));
    context.validate(&assigned(probe, 2), None);
}

#[when("a route from Moscow to Saint Petersburg is proposed from 09:00 to 10:00")]
fn propose_long_route(context: &TestContext) {
    let saint_petersburg = coordinate(dec!(59.9343), dec!(30.3351));
    let stops = vec![
        stop(1, &[(PRODUCT, 1)]),
        StopRequest {
            sequence: Some(2),
            location: saint_petersburg,
            products: Vec::new(),
        },
    ];
    let probe = candidate(context.delivery_day(), 9, 10, stops);
    context.validate(&assigned(probe, 2), None);
}

#[when("two units of the product are proposed for one stop")]
fn propose_two_units(context: &TestContext) {
    let probe = candidate(context.delivery_day(), 9, 12, units(2));
    context.validate(&assigned(probe, 2), None);
}

#[when("that delivery is updated")]
fn update_soon(context: &TestContext) {
    let probe = candidate(context.delivery_day(), 9, 12, units(1));
    context.validate(&assigned(probe, 2), Some(DeliveryId(20)));
}

#[then("the delivery is rejected with {code}")]
fn rejected_with(context: &TestContext, code: String) {
    assert_eq!(context.rejection().code().as_str(), code.trim());
}

#[then("the shortfall reports 110 kg required against a 100 kg limit")]
fn shortfall_reported(context: &TestContext) {
    let Rejection::CapacityExceeded(shortfall) = context.rejection() else {
        panic!("expected a capacity rejection");
    };
    assert_eq!(shortfall.required, dec!(110));
    assert_eq!(shortfall.limit, dec!(100));
    assert_eq!(shortfall.committed, dec!(60));
    assert_eq!(shortfall.candidate, dec!(50));
}

#[then("the delivery is accepted with a total weight of 3.0 kg")]
fn accepted_with_weight(context: &TestContext) {
    let outcome = context.outcome.borrow();
    let Some(ValidationResult::Accepted { total_weight, .. }) = outcome.as_ref() else {
        panic!("expected the delivery to be accepted, got {outcome:?}");
    };
    assert_eq!(*total_weight, dec!(3.0));
}

#[scenario(path = "tests/features/delivery_validation.feature", index = 0)]
fn capacity_exceeded(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/delivery_validation.feature", index = 1)]
fn courier_time_conflict(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/delivery_validation.feature", index = 2)]
fn route_infeasible(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/delivery_validation.feature", index = 3)]
fn feasible_delivery_accepted(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/delivery_validation.feature", index = 4)]
fn edit_window_closed(context: TestContext) {
    let _ = context;
}
