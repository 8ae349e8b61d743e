//! Facade crate for the courier delivery feasibility engine.
//!
//! This crate re-exports the core domain types and exposes the HTTP distance
//! oracle behind a feature flag.

#![forbid(unsafe_code)]

pub use courier_core::{
    Assignee, CandidateDelivery, CapacityCheck, CatalogueError, CapacityDimension, CapacityLedger,
    CapacityShortfall, Clock, ConfigError, Coordinate, CoordinateError, CourierId, Delivery,
    DeliveryDraft, DeliveryId, DeliveryScheduler, DeliveryStatus, DeliveryStore, DeliverySummary,
    DeliveryValidator, DeliveryWriter, DistanceError, DistanceOracle, EngineConfig, FixedClock,
    GenerationReport, GenerationRequest, GenerationWarning, Haversine, Load, MemoryDeliveryStore,
    Product, ProductId, ProductLine, Rejection, RejectionCode, RouteCheck, RouteEstimate,
    RouteFeasibilityChecker, RoutePlan, ScheduleError, Stop, StopError, StopRequest, StoreError,
    StoreSnapshot, SystemClock, TimeConflictChecker, TimeWindow, TimeWindowError, User, UserId,
    UserRole, ValidationResult, Vehicle, VehicleId, WithFallback, estimate_route,
    generate_deliveries,
};

#[cfg(feature = "http-oracle")]
pub use courier_data::routing::{HttpDistanceOracle, HttpDistanceOracleConfig, OracleBuildError};
