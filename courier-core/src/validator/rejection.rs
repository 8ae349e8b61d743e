//! Validation outcomes.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{CapacityShortfall, DeliveryId, RouteTiming, TimeWindow, UserId, VehicleId};

/// Stable code attached to every rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum RejectionCode {
    /// Courier missing, unknown or not a courier.
    CourierInvalid,
    /// Vehicle missing or unknown.
    VehicleInvalid,
    /// Window inverted or date in the past.
    WindowInvalid,
    /// The stored delivery is too close to be edited.
    EditWindowClosed,
    /// The courier is already busy.
    TimeConflict,
    /// The window is too short for the route.
    RouteInfeasible,
    /// The vehicle cannot carry the load.
    CapacityExceeded,
    /// Nothing to deliver.
    NoProducts,
}

impl RejectionCode {
    /// Upper-case wire name, e.g. `"TIME_CONFLICT"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CourierInvalid => "COURIER_INVALID",
            Self::VehicleInvalid => "VEHICLE_INVALID",
            Self::WindowInvalid => "WINDOW_INVALID",
            Self::EditWindowClosed => "EDIT_WINDOW_CLOSED",
            Self::TimeConflict => "TIME_CONFLICT",
            Self::RouteInfeasible => "ROUTE_INFEASIBLE",
            Self::CapacityExceeded => "CAPACITY_EXCEEDED",
            Self::NoProducts => "NO_PRODUCTS",
        }
    }
}

impl std::fmt::Display for RejectionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a candidate delivery was refused.
///
/// Rejections are expected outcomes, not failures; the `Display` text is the
/// user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "reason", rename_all = "snake_case"))]
pub enum Rejection {
    /// No courier was assigned.
    #[error("a courier is required")]
    CourierMissing,
    /// The courier id does not resolve.
    #[error("courier {courier_id} not found")]
    CourierNotFound {
        /// Requested courier.
        courier_id: UserId,
    },
    /// The user exists but does not have the courier role.
    #[error("user {user_id} is not a courier")]
    NotACourier {
        /// Requested user.
        user_id: UserId,
    },
    /// No vehicle was assigned.
    #[error("a vehicle is required")]
    VehicleMissing,
    /// The vehicle id does not resolve.
    #[error("vehicle {vehicle_id} not found")]
    VehicleNotFound {
        /// Requested vehicle.
        vehicle_id: VehicleId,
    },
    /// Start is not before end.
    #[error("start {start} must be earlier than end {end}")]
    WindowInverted {
        /// Requested start.
        start: NaiveTime,
        /// Requested end.
        end: NaiveTime,
    },
    /// The delivery date has already passed.
    #[error("delivery date {date} is before today ({today})")]
    DateInPast {
        /// Requested date.
        date: NaiveDate,
        /// Current date.
        today: NaiveDate,
    },
    /// The stored delivery is inside the edit horizon.
    #[error("cannot edit a delivery less than {horizon_days} days ahead ({days_until} left)")]
    EditWindowClosed {
        /// Stored delivery date.
        date: NaiveDate,
        /// Days from today until that date.
        days_until: i64,
        /// Required minimum.
        horizon_days: i64,
    },
    /// The courier already has an overlapping active delivery.
    #[error("courier is busy with delivery {conflicting} during that window")]
    TimeConflict {
        /// The overlapping delivery.
        conflicting: DeliveryId,
        /// Its window.
        window: TimeWindow,
    },
    /// Travel and service time exceed the window.
    #[error(
        "insufficient time for route: {} min required, {} min available, {} km",
        .0.required_minutes,
        .0.available_minutes,
        .0.distance_km
    )]
    RouteInfeasible(RouteTiming),
    /// The vehicle would be overloaded.
    #[error(
        "vehicle {} capacity exceeded: limit {}, required {} ({} committed, {} new)",
        .0.dimension,
        .0.limit,
        .0.required,
        .0.committed,
        .0.candidate
    )]
    CapacityExceeded(CapacityShortfall),
    /// No stop carries any product.
    #[error("no products to deliver")]
    NoProducts,
}

impl Rejection {
    /// Code for this rejection.
    #[must_use]
    pub const fn code(&self) -> RejectionCode {
        match self {
            Self::CourierMissing | Self::CourierNotFound { .. } | Self::NotACourier { .. } => {
                RejectionCode::CourierInvalid
            }
            Self::VehicleMissing | Self::VehicleNotFound { .. } => RejectionCode::VehicleInvalid,
            Self::WindowInverted { .. } | Self::DateInPast { .. } => RejectionCode::WindowInvalid,
            Self::EditWindowClosed { .. } => RejectionCode::EditWindowClosed,
            Self::TimeConflict { .. } => RejectionCode::TimeConflict,
            Self::RouteInfeasible(_) => RejectionCode::RouteInfeasible,
            Self::CapacityExceeded(_) => RejectionCode::CapacityExceeded,
            Self::NoProducts => RejectionCode::NoProducts,
        }
    }
}

/// Result of validating a candidate delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationResult {
    /// Every check passed.
    Accepted {
        /// Candidate weight in kilograms.
        total_weight: Decimal,
        /// Candidate volume in cubic metres.
        total_volume: Decimal,
    },
    /// A check failed.
    Rejected(Rejection),
}

impl ValidationResult {
    /// Whether the candidate was accepted.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// The rejection, if any.
    #[must_use]
    pub const fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Accepted { .. } => None,
            Self::Rejected(rejection) => Some(rejection),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ValidationResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        #[serde(tag = "outcome", rename_all = "snake_case")]
        enum Report<'a> {
            Accepted {
                total_weight: Decimal,
                total_volume: Decimal,
            },
            Rejected {
                code: RejectionCode,
                message: String,
                details: &'a Rejection,
            },
        }

        let report = match self {
            Self::Accepted {
                total_weight,
                total_volume,
            } => Report::Accepted {
                total_weight: *total_weight,
                total_volume: *total_volume,
            },
            Self::Rejected(rejection) => Report::Rejected {
                code: rejection.code(),
                message: rejection.to_string(),
                details: rejection,
            },
        };
        report.serialize(serializer)
    }
}

/// Checkpoints reached by a validation run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValidationStage {
    /// Nothing checked yet.
    Start,
    /// The stored delivery may still be edited. Updates only.
    EditWindowOpen,
    /// The courier exists and has the courier role.
    CourierChecked,
    /// The vehicle exists.
    VehicleChecked,
    /// The window is increasing and not in the past.
    WindowSane,
    /// The courier is free.
    TimeConflictPassed,
    /// The route fits the window.
    RouteFeasible,
    /// The vehicle can carry the load.
    CapacityOk,
    /// Accepted.
    Accepted,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CapacityDimension;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(Rejection::CourierMissing, "COURIER_INVALID")]
    #[case(Rejection::NotACourier { user_id: UserId(2) }, "COURIER_INVALID")]
    #[case(Rejection::VehicleNotFound { vehicle_id: VehicleId(3) }, "VEHICLE_INVALID")]
    #[case(Rejection::NoProducts, "NO_PRODUCTS")]
    fn codes_use_wire_names(#[case] rejection: Rejection, #[case] expected: &str) {
        assert_eq!(rejection.code().as_str(), expected);
    }

    #[rstest]
    fn capacity_message_reports_numbers() {
        let rejection = Rejection::CapacityExceeded(CapacityShortfall {
            dimension: CapacityDimension::Weight,
            limit: dec!(100),
            required: dec!(110),
            committed: dec!(60),
            candidate: dec!(50),
        });
        assert_eq!(
            rejection.to_string(),
            "vehicle weight capacity exceeded: limit 100, required 110 (60 committed, 50 new)"
        );
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn rejected_result_serialises_code_message_and_details() {
        let result = ValidationResult::Rejected(Rejection::VehicleNotFound {
            vehicle_id: VehicleId(4),
        });
        let json = serde_json::to_value(result).expect("serialises");
        assert_eq!(json["outcome"], "rejected");
        assert_eq!(json["code"], "VEHICLE_INVALID");
        assert_eq!(json["message"], "vehicle 4 not found");
        assert_eq!(json["details"]["reason"], "vehicle_not_found");
        assert_eq!(json["details"]["vehicle_id"], 4);
    }
}
