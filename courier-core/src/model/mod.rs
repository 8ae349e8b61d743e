//! Domain model consumed and produced by the engine.

mod catalogue;
mod coordinate;
mod delivery;
mod window;

pub use catalogue::{CatalogueError, Product, User, UserRole, Vehicle};
pub use coordinate::{COORDINATE_SCALE, Coordinate, CoordinateError};
pub use delivery::{
    CandidateDelivery, Delivery, DeliveryDraft, DeliveryStatus, DeliverySummary, ProductLine,
    Stop, StopError, StopRequest, normalise_stops,
};
pub use window::{TimeWindow, TimeWindowError};
