//! Access to persisted deliveries and the catalogue they reference.
//!
//! [`DeliveryStore`] is the read side consumed by the checks and the
//! validator. [`DeliveryWriter`] adds the writes performed by
//! [`crate::DeliveryScheduler`]. [`MemoryDeliveryStore`] implements both over
//! an in-process snapshot.

mod error;
mod memory;

use chrono::NaiveDate;

use crate::{
    CourierId, Delivery, DeliveryDraft, DeliveryId, DeliverySummary, Product, ProductId,
    TimeWindow, User, UserId, Vehicle, VehicleId,
};

pub use error::StoreError;
pub use memory::{MemoryDeliveryStore, StoreSnapshot};

/// Read access to deliveries, couriers, vehicles and products.
///
/// Overlap queries return only active deliveries on `date` whose window
/// overlaps `window` under the half-open rule, never the delivery named by
/// `exclude`.
pub trait DeliveryStore {
    /// Active deliveries of `courier_id` overlapping `window` on `date`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend fails.
    fn find_active_by_courier_overlapping(
        &self,
        courier_id: CourierId,
        date: NaiveDate,
        window: &TimeWindow,
        exclude: Option<DeliveryId>,
    ) -> Result<Vec<DeliverySummary>, StoreError>;

    /// Active deliveries on `vehicle_id` overlapping `window` on `date`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend fails.
    fn find_active_by_vehicle_overlapping(
        &self,
        vehicle_id: VehicleId,
        date: NaiveDate,
        window: &TimeWindow,
        exclude: Option<DeliveryId>,
    ) -> Result<Vec<DeliverySummary>, StoreError>;

    /// A delivery with its stops and product lines, if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend fails.
    fn load_with_details(&self, id: DeliveryId) -> Result<Option<Delivery>, StoreError>;

    /// A vehicle, if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend fails.
    fn load_vehicle(&self, id: VehicleId) -> Result<Option<Vehicle>, StoreError>;

    /// A user of any role, if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend fails.
    fn load_courier(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// A product, if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend fails.
    fn load_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// All users with the courier role, in id order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend fails.
    fn list_couriers(&self) -> Result<Vec<User>, StoreError>;

    /// All vehicles, in id order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend fails.
    fn list_vehicles(&self) -> Result<Vec<Vehicle>, StoreError>;
}

/// Writes applied once a candidate has been accepted.
pub trait DeliveryWriter: DeliveryStore {
    /// Persist a new `planned` delivery and return it with its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend fails.
    fn insert_delivery(&self, draft: DeliveryDraft) -> Result<Delivery, StoreError>;

    /// Overwrite the schedule and stops of `id`, keeping its status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if `id` does not exist.
    fn replace_delivery(&self, id: DeliveryId, draft: DeliveryDraft)
    -> Result<Delivery, StoreError>;

    /// Remove `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if `id` does not exist.
    fn remove_delivery(&self, id: DeliveryId) -> Result<(), StoreError>;
}

impl<S: DeliveryStore + ?Sized> DeliveryStore for &S {
    fn find_active_by_courier_overlapping(
        &self,
        courier_id: CourierId,
        date: NaiveDate,
        window: &TimeWindow,
        exclude: Option<DeliveryId>,
    ) -> Result<Vec<DeliverySummary>, StoreError> {
        (**self).find_active_by_courier_overlapping(courier_id, date, window, exclude)
    }

    fn find_active_by_vehicle_overlapping(
        &self,
        vehicle_id: VehicleId,
        date: NaiveDate,
        window: &TimeWindow,
        exclude: Option<DeliveryId>,
    ) -> Result<Vec<DeliverySummary>, StoreError> {
        (**self).find_active_by_vehicle_overlapping(vehicle_id, date, window, exclude)
    }

    fn load_with_details(&self, id: DeliveryId) -> Result<Option<Delivery>, StoreError> {
        (**self).load_with_details(id)
    }

    fn load_vehicle(&self, id: VehicleId) -> Result<Option<Vehicle>, StoreError> {
        (**self).load_vehicle(id)
    }

    fn load_courier(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).load_courier(id)
    }

    fn load_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).load_product(id)
    }

    fn list_couriers(&self) -> Result<Vec<User>, StoreError> {
        (**self).list_couriers()
    }

    fn list_vehicles(&self) -> Result<Vec<Vehicle>, StoreError> {
        (**self).list_vehicles()
    }
}

impl<S: DeliveryWriter + ?Sized> DeliveryWriter for &S {
    fn insert_delivery(&self, draft: DeliveryDraft) -> Result<Delivery, StoreError> {
        (**self).insert_delivery(draft)
    }

    fn replace_delivery(
        &self,
        id: DeliveryId,
        draft: DeliveryDraft,
    ) -> Result<Delivery, StoreError> {
        (**self).replace_delivery(id, draft)
    }

    fn remove_delivery(&self, id: DeliveryId) -> Result<(), StoreError> {
        (**self).remove_delivery(id)
    }
}
