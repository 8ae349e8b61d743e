//! Vehicle payload accounting.
//!
//! The ledger sums weight and volume over a candidate's product lines and
//! over every active delivery on the same vehicle whose window overlaps the
//! candidate's. Overlap is pairwise: two deliveries that share a single
//! minute are charged in full against each other.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    CandidateDelivery, DeliveryId, DeliveryStore, Product, ProductId, Stop, StoreError,
    TimeWindow, Vehicle, VehicleId,
};

/// Weight in kilograms and volume in cubic metres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Load {
    /// Kilograms.
    pub weight: Decimal,
    /// Cubic metres.
    pub volume: Decimal,
}

impl Load {
    /// An empty load.
    pub const ZERO: Self = Self {
        weight: Decimal::ZERO,
        volume: Decimal::ZERO,
    };

    /// Construct a load.
    #[must_use]
    pub const fn new(weight: Decimal, volume: Decimal) -> Self {
        Self { weight, volume }
    }

    /// Component-wise sum, or `None` if either component overflows.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        Some(Self {
            weight: self.weight.checked_add(rhs.weight)?,
            volume: self.volume.checked_add(rhs.volume)?,
        })
    }

    fn of(product: &Product, quantity: u64) -> Option<Self> {
        let units = Decimal::from(quantity);
        Some(Self {
            weight: product.weight().checked_mul(units)?,
            volume: product.volume().checked_mul(units)?,
        })
    }
}

/// Which vehicle ceiling was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CapacityDimension {
    /// Payload weight.
    Weight,
    /// Payload volume.
    Volume,
}

impl std::fmt::Display for CapacityDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Weight => "weight",
            Self::Volume => "volume",
        })
    }
}

/// Details of a capacity failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CapacityShortfall {
    /// Exceeded dimension. Weight is reported when both are exceeded.
    pub dimension: CapacityDimension,
    /// Vehicle ceiling for that dimension.
    pub limit: Decimal,
    /// Committed plus candidate.
    pub required: Decimal,
    /// Already committed by overlapping deliveries.
    pub committed: Decimal,
    /// Needed by the candidate alone.
    pub candidate: Decimal,
}

/// Outcome of [`CapacityLedger::check_capacity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityCheck {
    /// The vehicle can carry the candidate alongside overlapping work.
    Within {
        /// The candidate's own load.
        required: Load,
        /// Load of overlapping active deliveries.
        committed: Load,
    },
    /// A ceiling would be exceeded.
    Exceeded(CapacityShortfall),
}

/// Product lookups memoised for the duration of one ledger call.
#[derive(Debug, Default)]
struct ProductCache {
    products: BTreeMap<ProductId, Product>,
}

impl ProductCache {
    fn load<S: DeliveryStore>(
        &mut self,
        store: &S,
        id: ProductId,
    ) -> Result<&Product, StoreError> {
        match self.products.entry(id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let product = store
                    .load_product(id)?
                    .ok_or_else(|| StoreError::not_found("product", id))?;
                Ok(entry.insert(product))
            }
        }
    }
}

/// Total units per product across `stops`.
fn accumulate<'a, I>(quantities: &mut BTreeMap<ProductId, u64>, stops: I)
where
    I: IntoIterator<Item = &'a Stop>,
{
    for line in stops.into_iter().flat_map(Stop::lines) {
        let units = quantities.entry(line.product_id).or_default();
        *units = units.saturating_add(u64::from(line.quantity.get()));
    }
}

/// Computes required and committed vehicle load.
///
/// # Examples
///
/// ```
/// use courier_core::{CapacityLedger, Load, MemoryDeliveryStore};
///
/// let store = MemoryDeliveryStore::default();
/// let ledger = CapacityLedger::new(&store);
/// assert_eq!(ledger.load_of_stops(&[])?, Load::ZERO);
/// # Ok::<(), courier_core::StoreError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CapacityLedger<S> {
    store: S,
}

impl<S: DeliveryStore> CapacityLedger<S> {
    /// Account against `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Load required by the candidate's stops.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown product and
    /// [`StoreError::LoadOverflow`] when the total cannot be represented.
    pub fn required_capacity(&self, candidate: &CandidateDelivery) -> Result<Load, StoreError> {
        self.load_of_stops(candidate.stops())
    }

    /// Load of an arbitrary set of stops.
    ///
    /// Quantities of the same product are combined before the product is
    /// looked up, so each product is fetched once.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown product and
    /// [`StoreError::LoadOverflow`] when the total cannot be represented.
    pub fn load_of_stops(&self, stops: &[Stop]) -> Result<Load, StoreError> {
        let mut quantities = BTreeMap::new();
        accumulate(&mut quantities, stops);
        self.price(&quantities, &mut ProductCache::default())
    }

    /// Load already committed on `vehicle_id` by active deliveries
    /// overlapping `window` on `date`.
    ///
    /// A delivery returned by the overlap query but missing on detail load is
    /// skipped.
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`], including unknown products.
    pub fn committed_capacity(
        &self,
        vehicle_id: VehicleId,
        date: NaiveDate,
        window: &TimeWindow,
        exclude: Option<DeliveryId>,
    ) -> Result<Load, StoreError> {
        self.committed_with(vehicle_id, date, window, exclude, &mut ProductCache::default())
    }

    /// Compare committed plus required load with the vehicle's ceilings.
    ///
    /// The check fails when `committed + required` is strictly greater than
    /// either ceiling.
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`], including unknown products.
    pub fn check_capacity(
        &self,
        vehicle: &Vehicle,
        candidate: &CandidateDelivery,
        window: &TimeWindow,
        exclude: Option<DeliveryId>,
    ) -> Result<CapacityCheck, StoreError> {
        let mut cache = ProductCache::default();
        let mut quantities = BTreeMap::new();
        accumulate(&mut quantities, candidate.stops());
        let required = self.price(&quantities, &mut cache)?;
        let committed =
            self.committed_with(vehicle.id(), candidate.date(), window, exclude, &mut cache)?;
        compare(vehicle, required, committed)
    }

    fn committed_with(
        &self,
        vehicle_id: VehicleId,
        date: NaiveDate,
        window: &TimeWindow,
        exclude: Option<DeliveryId>,
        cache: &mut ProductCache,
    ) -> Result<Load, StoreError> {
        let overlapping = self
            .store
            .find_active_by_vehicle_overlapping(vehicle_id, date, window, exclude)?;
        let mut quantities = BTreeMap::new();
        for summary in overlapping
            .iter()
            .filter(|summary| Some(summary.id) != exclude)
        {
            match self.store.load_with_details(summary.id)? {
                Some(delivery) => accumulate(&mut quantities, &delivery.stops),
                None => log::warn!(
                    "overlapping delivery {} vanished before its details were loaded",
                    summary.id.delivery_number()
                ),
            }
        }
        self.price(&quantities, cache)
    }

    fn price(
        &self,
        quantities: &BTreeMap<ProductId, u64>,
        cache: &mut ProductCache,
    ) -> Result<Load, StoreError> {
        let mut total = Load::ZERO;
        for (&id, &quantity) in quantities {
            total = Load::of(cache.load(&self.store, id)?, quantity)
                .and_then(|line| total.checked_add(line))
                .ok_or(StoreError::LoadOverflow {
                    context: "product lines",
                })?;
        }
        Ok(total)
    }
}

fn compare(
    vehicle: &Vehicle,
    required: Load,
    committed: Load,
) -> Result<CapacityCheck, StoreError> {
    let total = required
        .checked_add(committed)
        .ok_or(StoreError::LoadOverflow {
            context: "committed and candidate load",
        })?;
    let dimensions = [
        (
            CapacityDimension::Weight,
            vehicle.max_weight(),
            total.weight,
            committed.weight,
            required.weight,
        ),
        (
            CapacityDimension::Volume,
            vehicle.max_volume(),
            total.volume,
            committed.volume,
            required.volume,
        ),
    ];
    Ok(dimensions
        .into_iter()
        .find(|&(_, limit, sum, _, _)| sum > limit)
        .map_or(
            CapacityCheck::Within {
                required,
                committed,
            },
            |(dimension, limit, sum, already, own)| {
                CapacityCheck::Exceeded(CapacityShortfall {
                    dimension,
                    limit,
                    required: sum,
                    committed: already,
                    candidate: own,
                })
            },
        ))
}
