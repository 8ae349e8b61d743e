//! Bulk delivery generation.
//!
//! Routes for each date are turned into candidates and pushed through a
//! [`DeliveryScheduler`] one by one. A rejected route becomes a warning; the
//! rest of the batch carries on.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime, TimeDelta};

use crate::{
    CandidateDelivery, Clock, Delivery, DeliveryScheduler, DeliveryWriter, DistanceOracle,
    EngineConfig, ProductLine, Rejection, ScheduleError, StopRequest, StoreError, User, UserId,
    Vehicle,
};

/// One route to generate: its stops plus products for stops that carry none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutePlan {
    /// Stops in travel order. A stop without a sequence takes its 1-based
    /// position in this list.
    pub route: Vec<StopRequest>,
    /// Products delivered at every stop that lists none of its own.
    #[cfg_attr(feature = "serde", serde(default))]
    pub products: Vec<ProductLine>,
}

/// Routes to generate, keyed by delivery date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationRequest {
    /// Routes per date.
    pub delivery_data: BTreeMap<NaiveDate, Vec<RoutePlan>>,
}

/// Something the generator could not do.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum GenerationWarning {
    /// No user has the courier role.
    #[error("no couriers available")]
    NoCouriers,
    /// No vehicle exists.
    #[error("no vehicles available")]
    NoVehicles,
    /// Routes were requested but cannot be staffed.
    #[error("not enough resources to create deliveries")]
    InsufficientResources,
    /// The per-day route cap was reached; later routes were dropped.
    #[error("too many routes for one day (limit {limit})")]
    TooManyRoutes {
        /// Configured cap.
        limit: usize,
    },
    /// The route has no stops or no products.
    #[error("route {route_index} skipped: nothing to deliver")]
    RouteSkipped {
        /// 0-based position of the route for its date.
        route_index: usize,
    },
    /// The route's stops could not be normalised.
    #[error("route {route_index} is malformed: {message}")]
    InvalidRoute {
        /// 0-based position of the route for its date.
        route_index: usize,
        /// Normalisation failure.
        message: String,
    },
    /// The candidate failed validation.
    #[error("route {route_index} rejected: {rejection}")]
    Rejected {
        /// 0-based position of the route for its date.
        route_index: usize,
        /// Validation outcome.
        rejection: Rejection,
    },
    /// The store failed while creating the delivery.
    #[error("route {route_index} could not be created: {message}")]
    StoreFailure {
        /// 0-based position of the route for its date.
        route_index: usize,
        /// Store failure.
        message: String,
    },
}

/// Outcome for a single date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DateReport {
    /// Deliveries created for the date.
    pub generated: usize,
    /// The created deliveries.
    pub deliveries: Vec<Delivery>,
    /// Problems encountered, in route order.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    pub warnings: Vec<GenerationWarning>,
}

/// Outcome of a generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GenerationReport {
    /// Deliveries created across all dates.
    pub total_generated: usize,
    /// Per-date results.
    pub by_date: BTreeMap<NaiveDate, DateReport>,
}

/// Generate deliveries for every date in `request`.
///
/// Couriers and vehicles are assigned round-robin by route index. Route `i`
/// starts at the configured first start plus `i` steps and ends at the
/// configured day end. At most `max_routes_per_day` routes are attempted per
/// date. A skipped route still consumes its index.
///
/// # Errors
///
/// Returns [`StoreError`] if couriers or vehicles cannot be listed. Failures
/// of individual routes are reported as warnings instead.
pub fn generate_deliveries<S, O, C>(
    scheduler: &DeliveryScheduler<S, O, C>,
    created_by: UserId,
    request: &GenerationRequest,
) -> Result<GenerationReport, StoreError>
where
    S: DeliveryWriter,
    O: DistanceOracle,
    C: Clock,
{
    let store = scheduler.validator().store();
    let mut report = GenerationReport::default();
    for (&date, routes) in &request.delivery_data {
        let pool = Pool {
            couriers: store.list_couriers()?,
            vehicles: store.list_vehicles()?,
        };
        let day = generate_day(scheduler, created_by, date, routes, &pool);
        log::info!(
            "generated {} of {} routes for {date}",
            day.generated,
            routes.len()
        );
        report.total_generated = report.total_generated.saturating_add(day.generated);
        report.by_date.insert(date, day);
    }
    Ok(report)
}

struct Pool {
    couriers: Vec<User>,
    vehicles: Vec<Vehicle>,
}

impl Pool {
    fn assign(&self, index: usize) -> Option<(&User, &Vehicle)> {
        let courier = self.couriers.get(index.checked_rem(self.couriers.len())?)?;
        let vehicle = self.vehicles.get(index.checked_rem(self.vehicles.len())?)?;
        Some((courier, vehicle))
    }
}

fn generate_day<S, O, C>(
    scheduler: &DeliveryScheduler<S, O, C>,
    created_by: UserId,
    date: NaiveDate,
    routes: &[RoutePlan],
    pool: &Pool,
) -> DateReport
where
    S: DeliveryWriter,
    O: DistanceOracle,
    C: Clock,
{
    let config = scheduler.validator().config();
    let mut day = DateReport::default();
    if pool.couriers.is_empty() {
        day.warnings.push(GenerationWarning::NoCouriers);
    }
    if pool.vehicles.is_empty() {
        day.warnings.push(GenerationWarning::NoVehicles);
    }

    for (route_index, plan) in routes.iter().enumerate() {
        let Some((courier, vehicle)) = pool.assign(route_index) else {
            day.warnings.push(GenerationWarning::InsufficientResources);
            break;
        };
        if route_index >= config.max_routes_per_day {
            day.warnings.push(GenerationWarning::TooManyRoutes {
                limit: config.max_routes_per_day,
            });
            break;
        }

        let stops = expand_stops(plan);
        if stops.is_empty() || stops.iter().all(|stop| stop.products.is_empty()) {
            log::info!("skipping route {route_index} for {date}: nothing to deliver");
            day.warnings
                .push(GenerationWarning::RouteSkipped { route_index });
            continue;
        }

        let Some(start) = route_start(config, route_index) else {
            day.warnings.push(GenerationWarning::InvalidRoute {
                route_index,
                message: format!("start of route {route_index} falls past midnight"),
            });
            continue;
        };
        let candidate = match CandidateDelivery::new(
            created_by,
            date,
            start,
            config.generation_day_end,
            stops,
        ) {
            Ok(candidate) => candidate.with_courier(courier.id).with_vehicle(vehicle.id()),
            Err(err) => {
                day.warnings.push(GenerationWarning::InvalidRoute {
                    route_index,
                    message: err.to_string(),
                });
                continue;
            }
        };

        match scheduler.create(&candidate) {
            Ok(delivery) => {
                day.generated = day.generated.saturating_add(1);
                day.deliveries.push(delivery);
            }
            Err(ScheduleError::Rejected(rejection)) => {
                log::info!("route {route_index} for {date} rejected: {rejection}");
                day.warnings.push(GenerationWarning::Rejected {
                    route_index,
                    rejection,
                });
            }
            Err(err) => {
                log::warn!("route {route_index} for {date} failed: {err}");
                day.warnings.push(GenerationWarning::StoreFailure {
                    route_index,
                    message: err.to_string(),
                });
            }
        }
    }
    day
}

/// Default sequences to list position and fill in route-level products.
fn expand_stops(plan: &RoutePlan) -> Vec<StopRequest> {
    plan.route
        .iter()
        .zip(1_u32..)
        .map(|(stop, position)| StopRequest {
            sequence: stop.sequence.or(Some(position)),
            location: stop.location,
            products: if stop.products.is_empty() {
                plan.products.clone()
            } else {
                stop.products.clone()
            },
        })
        .collect()
}

/// First start plus one step per earlier route; `None` past midnight.
fn route_start(config: &EngineConfig, route_index: usize) -> Option<NaiveTime> {
    let steps = i64::try_from(route_index).ok()?;
    let offset = i64::from(config.generation_start_step_minutes).checked_mul(steps)?;
    let (start, wrapped) = config
        .generation_first_start
        .overflowing_add_signed(TimeDelta::try_minutes(offset)?);
    (wrapped == 0).then_some(start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{courier, date, line, product, stop_request, time, vehicle};
    use crate::{
        DeliveryValidator, FixedClock, Haversine, MemoryDeliveryStore, RejectionCode,
        StoreSnapshot, VehicleId,
    };
    use rstest::{fixture, rstest};
    use rust_decimal_macros::dec;

    type Scheduler = DeliveryScheduler<MemoryDeliveryStore, Haversine, FixedClock>;

    fn scheduler_with(snapshot: StoreSnapshot) -> Scheduler {
        let validator = DeliveryValidator::new(
            MemoryDeliveryStore::from_snapshot(snapshot),
            Haversine::default(),
            FixedClock(date(2030, 5, 1)),
            EngineConfig::default(),
        )
        .expect("default config is valid");
        DeliveryScheduler::new(validator)
    }

    #[fixture]
    fn scheduler() -> Scheduler {
        scheduler_with(StoreSnapshot {
            users: (2..=12).map(courier).collect(),
            vehicles: vec![vehicle(1, dec!(1000), dec!(15)), vehicle(2, dec!(1000), dec!(15))],
            products: vec![product(1, dec!(2), dec!(10), dec!(10), dec!(10))],
            ..StoreSnapshot::default()
        })
    }

    fn plan(stops: Vec<StopRequest>, products: Vec<ProductLine>) -> RoutePlan {
        RoutePlan {
            route: stops,
            products,
        }
    }

    fn simple_route() -> RoutePlan {
        plan(vec![stop_request(None, &[])], vec![line(1, 1)])
    }

    fn request(routes: Vec<RoutePlan>) -> GenerationRequest {
        GenerationRequest {
            delivery_data: BTreeMap::from([(date(2030, 5, 10), routes)]),
        }
    }

    #[rstest]
    fn assigns_round_robin_with_stepped_starts(scheduler: Scheduler) {
        let report = generate_deliveries(
            &scheduler,
            UserId(1),
            &request(vec![simple_route(), simple_route(), simple_route()]),
        )
        .expect("store succeeds");
        let day = &report.by_date[&date(2030, 5, 10)];
        assert_eq!(report.total_generated, 3);
        assert!(day.warnings.is_empty());
        let assignments: Vec<_> = day
            .deliveries
            .iter()
            .map(|delivery| (delivery.courier_id, delivery.vehicle_id, delivery.window.start()))
            .collect();
        assert_eq!(
            assignments,
            vec![
                (Some(UserId(2)), Some(VehicleId(1)), time(9, 0)),
                (Some(UserId(3)), Some(VehicleId(2)), time(10, 0)),
                (Some(UserId(4)), Some(VehicleId(1)), time(11, 0)),
            ]
        );
        assert!(day.deliveries.iter().all(|delivery| delivery.window.end() == time(18, 0)));
    }

    #[rstest]
    fn stop_products_override_route_products(scheduler: Scheduler) {
        let route = plan(
            vec![stop_request(None, &[(1, 4)]), stop_request(None, &[])],
            vec![line(1, 1)],
        );
        let report =
            generate_deliveries(&scheduler, UserId(1), &request(vec![route])).expect("store succeeds");
        let delivery = &report.by_date[&date(2030, 5, 10)].deliveries[0];
        let quantities: Vec<u32> = delivery
            .stops
            .iter()
            .flat_map(|stop| stop.lines().iter().map(|line| line.quantity.get()))
            .collect();
        assert_eq!(quantities, vec![4, 1]);
        assert_eq!(delivery.stops[1].sequence(), 2);
    }

    #[rstest]
    fn routes_without_products_are_skipped_but_consume_an_index(scheduler: Scheduler) {
        let empty = plan(vec![stop_request(None, &[])], Vec::new());
        let report = generate_deliveries(
            &scheduler,
            UserId(1),
            &request(vec![empty, simple_route()]),
        )
        .expect("store succeeds");
        let day = &report.by_date[&date(2030, 5, 10)];
        assert_eq!(day.warnings, vec![GenerationWarning::RouteSkipped { route_index: 0 }]);
        assert_eq!(day.deliveries[0].window.start(), time(10, 0));
        assert_eq!(day.deliveries[0].courier_id, Some(UserId(3)));
    }

    #[rstest]
    fn caps_routes_per_day(scheduler: Scheduler) {
        let routes = vec![simple_route(); 11];
        let report =
            generate_deliveries(&scheduler, UserId(1), &request(routes)).expect("store succeeds");
        let day = &report.by_date[&date(2030, 5, 10)];
        assert_eq!(day.generated, 9);
        assert_eq!(day.warnings, vec![GenerationWarning::TooManyRoutes { limit: 9 }]);
    }

    #[rstest]
    fn empty_pools_produce_warnings() {
        let scheduler = scheduler_with(StoreSnapshot::default());
        let report = generate_deliveries(&scheduler, UserId(1), &request(vec![simple_route()]))
            .expect("store succeeds");
        let day = &report.by_date[&date(2030, 5, 10)];
        assert_eq!(
            day.warnings,
            vec![
                GenerationWarning::NoCouriers,
                GenerationWarning::NoVehicles,
                GenerationWarning::InsufficientResources,
            ]
        );
        assert_eq!(report.total_generated, 0);
    }

    #[rstest]
    #[case(0, Some(time(9, 0)))]
    #[case(1, Some(time(19, 0)))]
    #[case(2, None)]
    fn route_start_does_not_wrap_past_midnight(
        #[case] route_index: usize,
        #[case] expected: Option<NaiveTime>,
    ) {
        let config = EngineConfig {
            generation_start_step_minutes: 600,
            ..EngineConfig::default()
        };
        assert_eq!(route_start(&config, route_index), expected);
    }

    #[rstest]
    fn routes_starting_past_midnight_are_reported() {
        let validator = DeliveryValidator::new(
            MemoryDeliveryStore::from_snapshot(StoreSnapshot {
                users: (2..=4).map(courier).collect(),
                vehicles: vec![vehicle(1, dec!(1000), dec!(15))],
                products: vec![product(1, dec!(2), dec!(10), dec!(10), dec!(10))],
                ..StoreSnapshot::default()
            }),
            Haversine::default(),
            FixedClock(date(2030, 5, 1)),
            EngineConfig {
                generation_start_step_minutes: 600,
                ..EngineConfig::default()
            },
        )
        .expect("config is valid");
        let scheduler = DeliveryScheduler::new(validator);
        let report = generate_deliveries(
            &scheduler,
            UserId(1),
            &request(vec![simple_route(), simple_route(), simple_route()]),
        )
        .expect("store succeeds");
        let day = &report.by_date[&date(2030, 5, 10)];
        assert_eq!(day.generated, 1);
        assert!(day.deliveries.iter().all(|delivery| delivery.window.start() >= time(9, 0)));
        assert!(day.warnings.iter().any(|warning| matches!(
            warning,
            GenerationWarning::InvalidRoute { route_index: 2, .. }
        )));
    }

    #[rstest]
    fn rejections_do_not_abort_the_batch() {
        let scheduler = scheduler_with(StoreSnapshot {
            users: vec![courier(2)],
            vehicles: vec![vehicle(1, dec!(1000), dec!(15))],
            products: vec![product(1, dec!(2), dec!(10), dec!(10), dec!(10))],
            ..StoreSnapshot::default()
        });
        // Every generated window ends at 18:00, so one courier takes one route.
        let report = generate_deliveries(
            &scheduler,
            UserId(1),
            &request(vec![simple_route(), simple_route()]),
        )
        .expect("store succeeds");
        let day = &report.by_date[&date(2030, 5, 10)];
        assert_eq!(day.generated, 1);
        assert!(matches!(
            day.warnings.as_slice(),
            [GenerationWarning::Rejected { route_index: 1, rejection }]
                if rejection.code() == RejectionCode::TimeConflict
        ));
    }
}
