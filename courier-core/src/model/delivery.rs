//! Deliveries, their stops and the candidate submitted for validation.
//!
//! Ownership is a strict tree: a delivery owns its stops and each stop owns
//! its product lines. Products, vehicles and couriers are referenced by id.

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::{Coordinate, CourierId, DeliveryId, ProductId, TimeWindow, UserId, VehicleId};

/// Lifecycle state of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DeliveryStatus {
    /// Scheduled but not started. New deliveries start here.
    #[default]
    Planned,
    /// Currently being carried out.
    InProgress,
    /// Finished.
    Completed,
    /// Called off.
    Cancelled,
}

impl DeliveryStatus {
    /// Active deliveries count towards courier conflicts and vehicle load.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Planned | Self::InProgress)
    }
}

/// Quantity of one product dropped at a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProductLine {
    /// Referenced product.
    pub product_id: ProductId,
    /// Units to deliver; never zero.
    pub quantity: NonZeroU32,
}

/// Errors raised while normalising stops and candidates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StopError {
    /// A product line requested zero units.
    #[error("quantity of product {product_id} must be positive")]
    ZeroQuantity {
        /// Offending product.
        product_id: ProductId,
    },
    /// Summing duplicate lines overflowed the quantity type.
    #[error("combined quantity of product {product_id} is too large")]
    QuantityOverflow {
        /// Offending product.
        product_id: ProductId,
    },
    /// Sequence numbers are 1-based.
    #[error("stop sequence must be at least 1")]
    ZeroSequence,
    /// Two stops share a sequence number.
    #[error("stop sequence {0} is used more than once")]
    DuplicateSequence(u32),
}

impl ProductLine {
    /// Construct a line, rejecting a zero quantity.
    ///
    /// # Errors
    ///
    /// Returns [`StopError::ZeroQuantity`] when `quantity == 0`.
    pub fn new(product_id: ProductId, quantity: u32) -> Result<Self, StopError> {
        NonZeroU32::new(quantity)
            .map(|units| Self {
                product_id,
                quantity: units,
            })
            .ok_or(StopError::ZeroQuantity { product_id })
    }
}

/// A normalised stop: 1-based sequence, location and one line per product.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Stop {
    sequence: u32,
    #[cfg_attr(feature = "serde", serde(flatten))]
    location: Coordinate,
    #[cfg_attr(feature = "serde", serde(rename = "products"))]
    lines: Vec<ProductLine>,
}

impl Stop {
    /// Build a stop, summing repeated lines for the same product.
    ///
    /// Lines are kept in product-id order.
    ///
    /// # Errors
    ///
    /// Returns [`StopError::ZeroSequence`] for `sequence == 0` and
    /// [`StopError::QuantityOverflow`] if merged quantities overflow.
    pub fn new<I>(sequence: u32, location: Coordinate, lines: I) -> Result<Self, StopError>
    where
        I: IntoIterator<Item = ProductLine>,
    {
        if sequence == 0 {
            return Err(StopError::ZeroSequence);
        }
        let mut merged: BTreeMap<ProductId, NonZeroU32> = BTreeMap::new();
        for line in lines {
            let total = match merged.get(&line.product_id) {
                Some(existing) => existing.checked_add(line.quantity.get()).ok_or(
                    StopError::QuantityOverflow {
                        product_id: line.product_id,
                    },
                )?,
                None => line.quantity,
            };
            merged.insert(line.product_id, total);
        }
        Ok(Self {
            sequence,
            location,
            lines: merged
                .into_iter()
                .map(|(product_id, quantity)| ProductLine {
                    product_id,
                    quantity,
                })
                .collect(),
        })
    }

    /// 1-based position within the delivery.
    #[must_use]
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Where the stop is.
    #[must_use]
    pub const fn location(&self) -> Coordinate {
        self.location
    }

    /// Product lines, one per product.
    #[must_use]
    pub fn lines(&self) -> &[ProductLine] {
        &self.lines
    }
}

/// A stop as submitted by a caller, before sequence numbers are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StopRequest {
    /// Explicit 1-based position, if supplied.
    #[cfg_attr(feature = "serde", serde(default))]
    pub sequence: Option<u32>,
    /// Where the stop is.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub location: Coordinate,
    /// Products to drop at this stop.
    #[cfg_attr(feature = "serde", serde(default))]
    pub products: Vec<ProductLine>,
}

/// Assign sequence numbers and order stops by them.
///
/// A stop without a sequence takes the previous stop's sequence plus one;
/// the first defaults to 1.
///
/// # Errors
///
/// Returns [`StopError`] for zero or duplicate sequences and overflowing
/// quantities.
pub fn normalise_stops(requests: Vec<StopRequest>) -> Result<Vec<Stop>, StopError> {
    let mut next = 1_u32;
    let mut seen = BTreeMap::new();
    for request in requests {
        let sequence = request.sequence.unwrap_or(next);
        next = sequence.saturating_add(1);
        if seen.contains_key(&sequence) {
            return Err(StopError::DuplicateSequence(sequence));
        }
        let stop = Stop::new(sequence, request.location, request.products)?;
        seen.insert(sequence, stop);
    }
    Ok(seen.into_values().collect())
}

/// Identity and schedule of a delivery without its stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliverySummary {
    /// Delivery identifier.
    pub id: DeliveryId,
    /// Assigned courier, if any.
    pub courier_id: Option<CourierId>,
    /// Assigned vehicle, if any.
    pub vehicle_id: Option<VehicleId>,
    /// Delivery date.
    pub date: NaiveDate,
    /// Delivery window on that date.
    pub window: TimeWindow,
    /// Lifecycle state.
    pub status: DeliveryStatus,
}

/// A persisted delivery with full stop detail.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Delivery {
    /// Delivery identifier.
    pub id: DeliveryId,
    /// Assigned courier, if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub courier_id: Option<CourierId>,
    /// Assigned vehicle, if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub vehicle_id: Option<VehicleId>,
    /// User that created the delivery.
    pub created_by: UserId,
    /// Delivery date.
    pub date: NaiveDate,
    /// Delivery window on that date.
    pub window: TimeWindow,
    /// Lifecycle state.
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: DeliveryStatus,
    /// Ordered stops.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "deserialize_stops"))]
    pub stops: Vec<Stop>,
}

impl Delivery {
    /// Summary view used by overlap queries.
    #[must_use]
    pub const fn summary(&self) -> DeliverySummary {
        DeliverySummary {
            id: self.id,
            courier_id: self.courier_id,
            vehicle_id: self.vehicle_id,
            date: self.date,
            window: self.window,
            status: self.status,
        }
    }
}

#[cfg(feature = "serde")]
fn deserialize_stops<'de, D>(deserializer: D) -> Result<Vec<Stop>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    let requests = Vec::<StopRequest>::deserialize(deserializer)?;
    normalise_stops(requests).map_err(serde::de::Error::custom)
}

/// A delivery proposed for creation or update, not yet persisted.
///
/// Courier and vehicle are optional so that missing assignments surface as
/// validation rejections. The raw start and end times are kept unvalidated
/// for the same reason; see [`CandidateDelivery::window`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawCandidate"))]
pub struct CandidateDelivery {
    courier_id: Option<CourierId>,
    vehicle_id: Option<VehicleId>,
    created_by: UserId,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    stops: Vec<Stop>,
}

impl CandidateDelivery {
    /// Build a candidate from caller-supplied stops.
    ///
    /// # Errors
    ///
    /// Returns [`StopError`] when the stops cannot be normalised.
    pub fn new(
        created_by: UserId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        stops: Vec<StopRequest>,
    ) -> Result<Self, StopError> {
        Ok(Self {
            courier_id: None,
            vehicle_id: None,
            created_by,
            date,
            start,
            end,
            stops: normalise_stops(stops)?,
        })
    }

    /// Assign a courier.
    #[must_use]
    pub const fn with_courier(mut self, courier_id: CourierId) -> Self {
        self.courier_id = Some(courier_id);
        self
    }

    /// Assign a vehicle.
    #[must_use]
    pub const fn with_vehicle(mut self, vehicle_id: VehicleId) -> Self {
        self.vehicle_id = Some(vehicle_id);
        self
    }

    /// Requested courier.
    #[must_use]
    pub const fn courier_id(&self) -> Option<CourierId> {
        self.courier_id
    }

    /// Requested vehicle.
    #[must_use]
    pub const fn vehicle_id(&self) -> Option<VehicleId> {
        self.vehicle_id
    }

    /// User submitting the candidate.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Requested delivery date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Requested start time, unvalidated.
    #[must_use]
    pub const fn start(&self) -> NaiveTime {
        self.start
    }

    /// Requested end time, unvalidated.
    #[must_use]
    pub const fn end(&self) -> NaiveTime {
        self.end
    }

    /// The requested window, if `start < end`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TimeWindowError`] for inverted or empty windows.
    pub fn window(&self) -> Result<TimeWindow, crate::TimeWindowError> {
        TimeWindow::new(self.start, self.end)
    }

    /// Stops ordered by sequence.
    #[must_use]
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawCandidate {
    #[serde(default)]
    courier_id: Option<CourierId>,
    #[serde(default)]
    vehicle_id: Option<VehicleId>,
    created_by: UserId,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    #[serde(default)]
    stops: Vec<StopRequest>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawCandidate> for CandidateDelivery {
    type Error = StopError;

    fn try_from(raw: RawCandidate) -> Result<Self, Self::Error> {
        let candidate = Self::new(raw.created_by, raw.date, raw.start, raw.end, raw.stops)?;
        Ok(Self {
            courier_id: raw.courier_id,
            vehicle_id: raw.vehicle_id,
            ..candidate
        })
    }
}

/// The fields written when a validated candidate is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryDraft {
    /// Assigned courier.
    pub courier_id: CourierId,
    /// Assigned vehicle.
    pub vehicle_id: VehicleId,
    /// User that created the delivery.
    pub created_by: UserId,
    /// Delivery date.
    pub date: NaiveDate,
    /// Delivery window.
    pub window: TimeWindow,
    /// Ordered stops.
    pub stops: Vec<Stop>,
}
