//! Race-free write path for deliveries.
//!
//! Validation is a pure read, so two callers could both pass the conflict
//! and capacity checks before either writes. [`DeliveryScheduler`] closes
//! that gap: it holds a lock per `(date, courier)` and `(date, vehicle)`
//! touched by the candidate, re-runs the validator under those locks and
//! writes only on acceptance.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use thiserror::Error;

use crate::{
    CandidateDelivery, Clock, CourierId, Delivery, DeliveryDraft, DeliveryId, DeliveryValidator,
    DeliveryWriter, DistanceOracle, Rejection, StoreError, VehicleId,
};

/// Errors from [`DeliveryScheduler`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// The candidate failed validation.
    #[error("delivery rejected ({}): {0}", .0.code())]
    Rejected(Rejection),
    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Deliveries dated before today cannot be deleted.
    #[error("delivery {} dated {date} is in the past", .id.delivery_number())]
    PastDelivery {
        /// Delivery that was to be removed.
        id: DeliveryId,
        /// Its date.
        date: NaiveDate,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum LockKey {
    Courier(NaiveDate, CourierId),
    Vehicle(NaiveDate, VehicleId),
}

/// Serialises writes that could invalidate each other.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use courier_core::{
///     DeliveryScheduler, DeliveryValidator, EngineConfig, FixedClock, Haversine,
///     MemoryDeliveryStore,
/// };
///
/// let today = NaiveDate::from_ymd_opt(2030, 1, 1).expect("valid date");
/// let validator = DeliveryValidator::new(
///     MemoryDeliveryStore::default(),
///     Haversine::default(),
///     FixedClock(today),
///     EngineConfig::default(),
/// )?;
/// let scheduler = DeliveryScheduler::new(validator);
/// assert!(scheduler.delete(courier_core::DeliveryId(1)).is_err());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct DeliveryScheduler<S, O, C> {
    validator: DeliveryValidator<S, O, C>,
    locks: Mutex<HashMap<LockKey, Arc<Mutex<()>>>>,
}

impl<S, O, C> DeliveryScheduler<S, O, C>
where
    S: DeliveryWriter,
    O: DistanceOracle,
    C: Clock,
{
    /// Wrap a validator whose store accepts writes.
    #[must_use]
    pub fn new(validator: DeliveryValidator<S, O, C>) -> Self {
        Self {
            validator,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The validator run before every write.
    #[must_use]
    pub const fn validator(&self) -> &DeliveryValidator<S, O, C> {
        &self.validator
    }

    /// Validate and persist a new delivery.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Rejected`] when validation fails and
    /// [`ScheduleError::Store`] for store failures.
    pub fn create(&self, candidate: &CandidateDelivery) -> Result<Delivery, ScheduleError> {
        let handles = self.handles(candidate);
        let _guards = lock_all(&handles);
        let approval = self
            .validator
            .assess(candidate, None)?
            .map_err(ScheduleError::Rejected)?;
        let delivery = self.validator.store().insert_delivery(DeliveryDraft {
            courier_id: approval.courier_id,
            vehicle_id: approval.vehicle_id,
            created_by: candidate.created_by(),
            date: candidate.date(),
            window: approval.window,
            stops: candidate.stops().to_vec(),
        })?;
        log::info!("created delivery {}", delivery.id.delivery_number());
        Ok(delivery)
    }

    /// Validate and apply an edit to delivery `id`.
    ///
    /// # Errors
    ///
    /// As for [`DeliveryScheduler::create`]; an unknown `id` is
    /// [`StoreError::NotFound`].
    pub fn update(
        &self,
        id: DeliveryId,
        candidate: &CandidateDelivery,
    ) -> Result<Delivery, ScheduleError> {
        let handles = self.handles(candidate);
        let _guards = lock_all(&handles);
        let approval = self
            .validator
            .assess(candidate, Some(id))?
            .map_err(ScheduleError::Rejected)?;
        let delivery = self.validator.store().replace_delivery(
            id,
            DeliveryDraft {
                courier_id: approval.courier_id,
                vehicle_id: approval.vehicle_id,
                created_by: candidate.created_by(),
                date: candidate.date(),
                window: approval.window,
                stops: candidate.stops().to_vec(),
            },
        )?;
        log::info!("updated delivery {}", delivery.id.delivery_number());
        Ok(delivery)
    }

    /// Remove delivery `id` unless it is dated before today.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::PastDelivery`] for past deliveries and
    /// [`StoreError::NotFound`] for unknown ids.
    pub fn delete(&self, id: DeliveryId) -> Result<(), ScheduleError> {
        let store = self.validator.store();
        let delivery = store
            .load_with_details(id)?
            .ok_or_else(|| StoreError::not_found("delivery", id))?;
        if delivery.date < self.validator.clock().today() {
            return Err(ScheduleError::PastDelivery {
                id,
                date: delivery.date,
            });
        }
        store.remove_delivery(id)?;
        log::info!("deleted delivery {}", id.delivery_number());
        Ok(())
    }

    /// Lock handles for the candidate's courier and vehicle, in key order.
    fn handles(&self, candidate: &CandidateDelivery) -> Vec<Arc<Mutex<()>>> {
        let date = candidate.date();
        let keys: BTreeSet<LockKey> = candidate
            .courier_id()
            .map(|id| LockKey::Courier(date, id))
            .into_iter()
            .chain(candidate.vehicle_id().map(|id| LockKey::Vehicle(date, id)))
            .collect();
        let mut table = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        table.retain(|_, lock| Arc::strong_count(lock) > 1);
        keys.into_iter()
            .map(|key| Arc::clone(table.entry(key).or_default()))
            .collect()
    }
}

/// A panic while holding a slot lock leaves no shared state behind, so
/// poisoning is ignored.
fn lock_all(handles: &[Arc<Mutex<()>>]) -> Vec<MutexGuard<'_, ()>> {
    handles
        .iter()
        .map(|handle| handle.lock().unwrap_or_else(PoisonError::into_inner))
        .collect()
}
