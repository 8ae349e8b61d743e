//! In-process delivery store.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;

use super::{DeliveryStore, DeliveryWriter, StoreError};
use crate::{
    CourierId, Delivery, DeliveryDraft, DeliveryId, DeliveryStatus, DeliverySummary, Product,
    ProductId, TimeWindow, User, UserId, Vehicle, VehicleId,
};

/// Serialisable contents of a [`MemoryDeliveryStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StoreSnapshot {
    /// User accounts.
    pub users: Vec<User>,
    /// Vehicles.
    pub vehicles: Vec<Vehicle>,
    /// Catalogue products.
    pub products: Vec<Product>,
    /// Persisted deliveries.
    pub deliveries: Vec<Delivery>,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    vehicles: BTreeMap<VehicleId, Vehicle>,
    products: BTreeMap<ProductId, Product>,
    deliveries: BTreeMap<DeliveryId, Delivery>,
}

impl Tables {
    fn next_delivery_id(&self) -> DeliveryId {
        self.deliveries
            .last_key_value()
            .map_or(DeliveryId(1), |(id, _)| DeliveryId(id.0.saturating_add(1)))
    }

    fn overlapping<F>(
        &self,
        date: NaiveDate,
        window: &TimeWindow,
        exclude: Option<DeliveryId>,
        assigned: F,
    ) -> Vec<DeliverySummary>
    where
        F: Fn(&Delivery) -> bool,
    {
        self.deliveries
            .values()
            .filter(|delivery| Some(delivery.id) != exclude)
            .filter(|delivery| delivery.status.is_active() && delivery.date == date)
            .filter(|delivery| delivery.window.overlaps(window))
            .filter(|delivery| assigned(delivery))
            .map(Delivery::summary)
            .collect()
    }
}

/// A [`DeliveryStore`] and [`DeliveryWriter`] backed by ordered maps behind
/// a read-write lock.
///
/// New delivery ids continue from the highest stored id.
///
/// # Examples
///
/// ```
/// use courier_core::{DeliveryStore, MemoryDeliveryStore, StoreSnapshot, Vehicle, VehicleId};
/// use rust_decimal::Decimal;
///
/// let store = MemoryDeliveryStore::from_snapshot(StoreSnapshot {
///     vehicles: vec![
///         Vehicle::new(VehicleId(1), Decimal::from(1000), Decimal::from(15))?
///             .with_brand("Van")
///             .with_license_plate("A001AA"),
///     ],
///     ..StoreSnapshot::default()
/// });
/// assert!(store.load_vehicle(VehicleId(1))?.is_some());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default)]
pub struct MemoryDeliveryStore {
    tables: RwLock<Tables>,
}

impl MemoryDeliveryStore {
    /// Seed a store from a snapshot. Later entries win on duplicate ids.
    #[must_use]
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let tables = Tables {
            users: snapshot.users.into_iter().map(|u| (u.id, u)).collect(),
            vehicles: snapshot.vehicles.into_iter().map(|v| (v.id(), v)).collect(),
            products: snapshot.products.into_iter().map(|p| (p.id(), p)).collect(),
            deliveries: snapshot.deliveries.into_iter().map(|d| (d.id, d)).collect(),
        };
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Copy the current contents out, each table in id order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the lock is poisoned.
    pub fn snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        let tables = self.read()?;
        Ok(StoreSnapshot {
            users: tables.users.values().cloned().collect(),
            vehicles: tables.vehicles.values().cloned().collect(),
            products: tables.products.values().cloned().collect(),
            deliveries: tables.deliveries.values().cloned().collect(),
        })
    }

    /// Change the lifecycle status of a stored delivery.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id.
    pub fn set_status(&self, id: DeliveryId, status: DeliveryStatus) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let delivery = tables
            .deliveries
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("delivery", id))?;
        delivery.status = status;
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables.write().map_err(|_| poisoned())
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend {
        message: "memory store lock poisoned".to_owned(),
    }
}

impl DeliveryStore for MemoryDeliveryStore {
    fn find_active_by_courier_overlapping(
        &self,
        courier_id: CourierId,
        date: NaiveDate,
        window: &TimeWindow,
        exclude: Option<DeliveryId>,
    ) -> Result<Vec<DeliverySummary>, StoreError> {
        Ok(self.read()?.overlapping(date, window, exclude, |delivery| {
            delivery.courier_id == Some(courier_id)
        }))
    }

    fn find_active_by_vehicle_overlapping(
        &self,
        vehicle_id: VehicleId,
        date: NaiveDate,
        window: &TimeWindow,
        exclude: Option<DeliveryId>,
    ) -> Result<Vec<DeliverySummary>, StoreError> {
        Ok(self.read()?.overlapping(date, window, exclude, |delivery| {
            delivery.vehicle_id == Some(vehicle_id)
        }))
    }

    fn load_with_details(&self, id: DeliveryId) -> Result<Option<Delivery>, StoreError> {
        Ok(self.read()?.deliveries.get(&id).cloned())
    }

    fn load_vehicle(&self, id: VehicleId) -> Result<Option<Vehicle>, StoreError> {
        Ok(self.read()?.vehicles.get(&id).cloned())
    }

    fn load_courier(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    fn load_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    fn list_couriers(&self) -> Result<Vec<User>, StoreError> {
        Ok(self
            .read()?
            .users
            .values()
            .filter(|user| user.is_courier())
            .cloned()
            .collect())
    }

    fn list_vehicles(&self) -> Result<Vec<Vehicle>, StoreError> {
        Ok(self.read()?.vehicles.values().cloned().collect())
    }
}

impl DeliveryWriter for MemoryDeliveryStore {
    fn insert_delivery(&self, draft: DeliveryDraft) -> Result<Delivery, StoreError> {
        let mut tables = self.write()?;
        let id = tables.next_delivery_id();
        let delivery = Delivery {
            id,
            courier_id: Some(draft.courier_id),
            vehicle_id: Some(draft.vehicle_id),
            created_by: draft.created_by,
            date: draft.date,
            window: draft.window,
            status: DeliveryStatus::Planned,
            stops: draft.stops,
        };
        tables.deliveries.insert(id, delivery.clone());
        Ok(delivery)
    }

    fn replace_delivery(
        &self,
        id: DeliveryId,
        draft: DeliveryDraft,
    ) -> Result<Delivery, StoreError> {
        let mut tables = self.write()?;
        let delivery = tables
            .deliveries
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("delivery", id))?;
        delivery.courier_id = Some(draft.courier_id);
        delivery.vehicle_id = Some(draft.vehicle_id);
        delivery.date = draft.date;
        delivery.window = draft.window;
        delivery.stops = draft.stops;
        Ok(delivery.clone())
    }

    fn remove_delivery(&self, id: DeliveryId) -> Result<(), StoreError> {
        self.write()?
            .deliveries
            .remove(&id)
            .map(drop)
            .ok_or_else(|| StoreError::not_found("delivery", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, delivery, time, window};
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> MemoryDeliveryStore {
        MemoryDeliveryStore::from_snapshot(StoreSnapshot {
            deliveries: vec![
                delivery(1, UserId(10), VehicleId(20), date(2030, 5, 1), window(10, 14)),
                delivery(2, UserId(11), VehicleId(20), date(2030, 5, 1), window(14, 16)),
                delivery(3, UserId(10), VehicleId(21), date(2030, 5, 2), window(10, 14)),
            ],
            ..StoreSnapshot::default()
        })
    }

    fn ids(summaries: &[DeliverySummary]) -> Vec<u64> {
        summaries.iter().map(|summary| summary.id.get()).collect()
    }

    #[rstest]
    fn courier_overlap_filters_by_date_and_window(store: MemoryDeliveryStore) {
        let found = store
            .find_active_by_courier_overlapping(UserId(10), date(2030, 5, 1), &window(12, 16), None)
            .expect("query succeeds");
        assert_eq!(ids(&found), vec![1]);
    }

    #[rstest]
    fn touching_windows_are_not_returned(store: MemoryDeliveryStore) {
        let found = store
            .find_active_by_vehicle_overlapping(VehicleId(20), date(2030, 5, 1), &window(16, 18), None)
            .expect("query succeeds");
        assert!(found.is_empty());
    }

    #[rstest]
    fn vehicle_overlap_honours_exclusion(store: MemoryDeliveryStore) {
        let found = store
            .find_active_by_vehicle_overlapping(
                VehicleId(20),
                date(2030, 5, 1),
                &window(9, 18),
                Some(DeliveryId(1)),
            )
            .expect("query succeeds");
        assert_eq!(ids(&found), vec![2]);
    }

    #[rstest]
    #[case(DeliveryStatus::Completed)]
    #[case(DeliveryStatus::Cancelled)]
    fn inactive_deliveries_are_ignored(store: MemoryDeliveryStore, #[case] status: DeliveryStatus) {
        store.set_status(DeliveryId(1), status).expect("delivery exists");
        let found = store
            .find_active_by_courier_overlapping(UserId(10), date(2030, 5, 1), &window(9, 18), None)
            .expect("query succeeds");
        assert!(found.is_empty());
    }

    #[rstest]
    fn insert_assigns_next_id_and_planned_status(store: MemoryDeliveryStore) {
        let draft = DeliveryDraft {
            courier_id: UserId(12),
            vehicle_id: VehicleId(22),
            created_by: UserId(1),
            date: date(2030, 5, 3),
            window: window(9, 10),
            stops: Vec::new(),
        };
        let inserted = store.insert_delivery(draft).expect("insert succeeds");
        assert_eq!(inserted.id, DeliveryId(4));
        assert_eq!(inserted.status, DeliveryStatus::Planned);
        assert_eq!(
            store.load_with_details(DeliveryId(4)).expect("load succeeds"),
            Some(inserted)
        );
    }

    #[rstest]
    fn replace_keeps_status(store: MemoryDeliveryStore) {
        store
            .set_status(DeliveryId(1), DeliveryStatus::InProgress)
            .expect("delivery exists");
        let draft = DeliveryDraft {
            courier_id: UserId(10),
            vehicle_id: VehicleId(20),
            created_by: UserId(1),
            date: date(2030, 5, 1),
            window: window(8, 9),
            stops: Vec::new(),
        };
        let replaced = store
            .replace_delivery(DeliveryId(1), draft)
            .expect("replace succeeds");
        assert_eq!(replaced.status, DeliveryStatus::InProgress);
        assert_eq!(replaced.window.start(), time(8, 0));
    }

    #[rstest]
    fn remove_unknown_delivery_is_not_found(store: MemoryDeliveryStore) {
        assert_eq!(
            store.remove_delivery(DeliveryId(99)),
            Err(StoreError::NotFound {
                entity: "delivery",
                id: 99
            })
        );
    }

    #[rstest]
    fn snapshot_round_trips_contents(store: MemoryDeliveryStore) {
        let snapshot = store.snapshot().expect("snapshot succeeds");
        assert_eq!(snapshot.deliveries.len(), 3);
        let copy = MemoryDeliveryStore::from_snapshot(snapshot.clone());
        assert_eq!(copy.snapshot().expect("snapshot succeeds"), snapshot);
    }
}
