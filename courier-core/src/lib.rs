//! Delivery feasibility and resource allocation.
//!
//! The engine decides whether a proposed delivery (a courier, a vehicle, a
//! time window and an ordered list of stops carrying products) can be
//! scheduled without double-booking the courier, overloading the vehicle or
//! asking for an impossible drive. It consumes a [`DeliveryStore`] and a
//! [`DistanceOracle`] and answers with a [`ValidationResult`].
//!
//! Constructors return `Result` to surface invalid input early. Validation
//! failures are values, not errors; only infrastructure problems surface as
//! [`StoreError`].
#![forbid(unsafe_code)]

mod capacity;
mod clock;
mod config;
mod conflict;
mod distance;
mod generation;
mod ids;
mod model;
mod route;
mod scheduler;
mod store;
mod validator;

#[doc(hidden)]
pub mod test_support;

pub use capacity::{CapacityCheck, CapacityDimension, CapacityLedger, CapacityShortfall, Load};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, EngineConfig};
pub use conflict::{Assignee, TimeConflictChecker};
pub use distance::{DISTANCE_SCALE, DistanceError, DistanceOracle, Haversine, WithFallback};
pub use generation::{
    DateReport, GenerationReport, GenerationRequest, GenerationWarning, RoutePlan,
    generate_deliveries,
};
pub use ids::{CourierId, DeliveryId, ProductId, UserId, VehicleId};
pub use model::{
    COORDINATE_SCALE, CandidateDelivery, CatalogueError, Coordinate, CoordinateError, Delivery, DeliveryDraft,
    DeliveryStatus, DeliverySummary, Product, ProductLine, Stop, StopError, StopRequest,
    TimeWindow, TimeWindowError, User, UserRole, Vehicle, normalise_stops,
};
pub use route::{
    RouteCheck, RouteEstimate, RouteFeasibilityChecker, RouteTiming, SuggestedSlot,
    estimate_route,
};
pub use scheduler::{DeliveryScheduler, ScheduleError};
pub use store::{DeliveryStore, DeliveryWriter, MemoryDeliveryStore, StoreError, StoreSnapshot};
pub use validator::{
    DeliveryValidator, Rejection, RejectionCode, ValidationResult, ValidationStage,
};
