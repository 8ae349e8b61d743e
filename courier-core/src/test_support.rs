//! Fixtures shared by unit, behaviour and property tests.
//!
//! Builders panic on invalid literals so that test setup fails fast.
#![expect(
    clippy::expect_used,
    reason = "fixtures should fail fast on invalid literals"
)]

use std::sync::Mutex;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;

use crate::{
    CandidateDelivery, Coordinate, CourierId, Delivery, DeliveryId, DeliveryStatus, DistanceError,
    DistanceOracle, Haversine, Product, ProductId, ProductLine, StopRequest, TimeWindow, User,
    UserId, UserRole, Vehicle, VehicleId, normalise_stops,
};

/// A calendar date.
#[must_use]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// A clock time.
#[must_use]
pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

/// A window between two whole hours.
#[must_use]
pub fn window(start_hour: u32, end_hour: u32) -> TimeWindow {
    TimeWindow::new(time(start_hour, 0), time(end_hour, 0)).expect("increasing window")
}

/// A coordinate from decimal degrees.
#[must_use]
pub fn coordinate(latitude: Decimal, longitude: Decimal) -> Coordinate {
    Coordinate::new(latitude, longitude).expect("coordinate in range")
}

/// Central Moscow, used as the default stop location.
#[must_use]
pub fn depot() -> Coordinate {
    coordinate(Decimal::new(557_558, 4), Decimal::new(376_173, 4))
}

/// A product line with a positive quantity.
#[must_use]
pub fn line(product_id: u64, quantity: u32) -> ProductLine {
    ProductLine::new(ProductId(product_id), quantity).expect("positive quantity")
}

/// A stop request at [`depot`] with an optional sequence.
#[must_use]
pub fn stop_request(sequence: Option<u32>, lines: &[(u64, u32)]) -> StopRequest {
    StopRequest {
        sequence,
        location: depot(),
        products: lines
            .iter()
            .map(|&(product_id, quantity)| line(product_id, quantity))
            .collect(),
    }
}

/// A stop request at [`depot`] with an explicit sequence.
#[must_use]
pub fn stop(sequence: u32, lines: &[(u64, u32)]) -> StopRequest {
    stop_request(Some(sequence), lines)
}

/// A candidate created by user 1, without courier or vehicle.
#[must_use]
pub fn candidate(
    on: NaiveDate,
    start_hour: u32,
    end_hour: u32,
    stops: Vec<StopRequest>,
) -> CandidateDelivery {
    CandidateDelivery::new(UserId(1), on, time(start_hour, 0), time(end_hour, 0), stops)
        .expect("stops normalise")
}

/// A planned delivery without stops.
#[must_use]
pub fn delivery(
    id: u64,
    courier_id: CourierId,
    vehicle_id: VehicleId,
    on: NaiveDate,
    slot: TimeWindow,
) -> Delivery {
    delivery_with_stops(id, courier_id, vehicle_id, on, slot, Vec::new())
}

/// A planned delivery with stops.
#[must_use]
pub fn delivery_with_stops(
    id: u64,
    courier_id: CourierId,
    vehicle_id: VehicleId,
    on: NaiveDate,
    slot: TimeWindow,
    stops: Vec<StopRequest>,
) -> Delivery {
    Delivery {
        id: DeliveryId(id),
        courier_id: Some(courier_id),
        vehicle_id: Some(vehicle_id),
        created_by: UserId(1),
        date: on,
        window: slot,
        status: DeliveryStatus::Planned,
        stops: normalise_stops(stops).expect("stops normalise"),
    }
}

/// A product with weight in kilograms and dimensions in centimetres.
#[must_use]
pub fn product(
    id: u64,
    weight: Decimal,
    length: Decimal,
    width: Decimal,
    height: Decimal,
) -> Product {
    Product::new(
        ProductId(id),
        format!("product-{id}"),
        weight,
        length,
        width,
        height,
    )
    .expect("positive product measures")
}

/// A vehicle with the given ceilings.
#[must_use]
pub fn vehicle(id: u64, max_weight: Decimal, max_volume: Decimal) -> Vehicle {
    Vehicle::new(VehicleId(id), max_weight, max_volume)
        .expect("positive vehicle ceilings")
        .with_brand("Test van")
        .with_license_plate(format!("T{id:03}TT"))
}

/// A user with the courier role.
#[must_use]
pub fn courier(id: u64) -> User {
    user(id, UserRole::Courier)
}

/// A user with the manager role.
#[must_use]
pub fn manager(id: u64) -> User {
    user(id, UserRole::Manager)
}

fn user(id: u64, role: UserRole) -> User {
    User {
        id: UserId(id),
        name: format!("user-{id}"),
        role,
    }
}

/// Oracle returning the same distance for every pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedOracle(pub Decimal);

impl DistanceOracle for FixedOracle {
    fn distance_km(&self, _: &Coordinate, _: &Coordinate) -> Result<Decimal, DistanceError> {
        Ok(self.0)
    }
}

/// Oracle that always fails with the configured error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailingOracle {
    error: DistanceError,
}

impl FailingOracle {
    /// Fail with `error`.
    #[must_use]
    pub const fn new(error: DistanceError) -> Self {
        Self { error }
    }

    /// Fail as if the routing service were unreachable.
    #[must_use]
    pub fn network() -> Self {
        Self::new(DistanceError::NetworkError {
            url: "http://routing.invalid".to_owned(),
            message: "connection refused".to_owned(),
        })
    }
}

impl DistanceOracle for FailingOracle {
    fn distance_km(&self, _: &Coordinate, _: &Coordinate) -> Result<Decimal, DistanceError> {
        Err(self.error.clone())
    }
}

/// Haversine oracle that records every pair it is asked about.
#[derive(Debug, Default)]
pub struct RecordingOracle {
    calls: Mutex<Vec<(Coordinate, Coordinate)>>,
}

impl RecordingOracle {
    /// Pairs requested so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<(Coordinate, Coordinate)> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

impl DistanceOracle for RecordingOracle {
    fn distance_km(&self, a: &Coordinate, b: &Coordinate) -> Result<Decimal, DistanceError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((*a, *b));
        }
        Ok(Haversine::default().distance(a, b))
    }
}
