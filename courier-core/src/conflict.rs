//! Detect overlapping active assignments.

use chrono::NaiveDate;

use crate::{
    CourierId, DeliveryId, DeliveryStore, DeliverySummary, StoreError, TimeWindow, VehicleId,
};

/// The resource whose schedule is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Assignee {
    /// A courier's time commitments.
    Courier(CourierId),
    /// A vehicle's time commitments.
    Vehicle(VehicleId),
}

/// Answers whether a courier or vehicle is already busy during a window.
///
/// Two windows on the same date conflict when `s1 < e2 && s2 < e1`. Only
/// active deliveries count, and `exclude` lets an update ignore itself.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use courier_core::{Assignee, MemoryDeliveryStore, TimeConflictChecker, TimeWindow, UserId};
///
/// let store = MemoryDeliveryStore::default();
/// let checker = TimeConflictChecker::new(&store);
/// let date = NaiveDate::from_ymd_opt(2030, 1, 1).expect("valid date");
/// let window = TimeWindow::new(
///     NaiveTime::from_hms_opt(10, 0, 0).expect("valid time"),
///     NaiveTime::from_hms_opt(12, 0, 0).expect("valid time"),
/// )?;
/// assert!(!checker.has_conflict(Assignee::Courier(UserId(1)), date, &window, None)?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TimeConflictChecker<S> {
    store: S,
}

impl<S: DeliveryStore> TimeConflictChecker<S> {
    /// Check against `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Whether `assignee` has an active delivery overlapping `window`.
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`] from the store.
    pub fn has_conflict(
        &self,
        assignee: Assignee,
        date: NaiveDate,
        window: &TimeWindow,
        exclude: Option<DeliveryId>,
    ) -> Result<bool, StoreError> {
        Ok(self.find_conflict(assignee, date, window, exclude)?.is_some())
    }

    /// The earliest-starting overlapping delivery, if any.
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`] from the store.
    pub fn find_conflict(
        &self,
        assignee: Assignee,
        date: NaiveDate,
        window: &TimeWindow,
        exclude: Option<DeliveryId>,
    ) -> Result<Option<DeliverySummary>, StoreError> {
        let candidates = match assignee {
            Assignee::Courier(id) => {
                self.store
                    .find_active_by_courier_overlapping(id, date, window, exclude)?
            }
            Assignee::Vehicle(id) => {
                self.store
                    .find_active_by_vehicle_overlapping(id, date, window, exclude)?
            }
        };
        // The store may over-match.
        Ok(candidates
            .into_iter()
            .filter(|summary| Some(summary.id) != exclude)
            .filter(|summary| summary.status.is_active() && summary.date == date)
            .filter(|summary| summary.window.overlaps(window))
            .min_by_key(|summary| (summary.window.start(), summary.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, delivery, window};
    use crate::{MemoryDeliveryStore, StoreSnapshot, UserId};
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> MemoryDeliveryStore {
        MemoryDeliveryStore::from_snapshot(StoreSnapshot {
            deliveries: vec![
                delivery(1, UserId(7), VehicleId(3), date(2030, 6, 1), window(10, 14)),
                delivery(2, UserId(7), VehicleId(4), date(2030, 6, 1), window(8, 11)),
            ],
            ..StoreSnapshot::default()
        })
    }

    #[rstest]
    #[case(window(12, 16), true)]
    #[case(window(14, 16), false)]
    #[case(window(6, 8), false)]
    #[case(window(7, 9), true)]
    fn courier_conflicts_follow_half_open_rule(
        store: MemoryDeliveryStore,
        #[case] candidate: TimeWindow,
        #[case] expected: bool,
    ) {
        let checker = TimeConflictChecker::new(&store);
        let found = checker
            .has_conflict(Assignee::Courier(UserId(7)), date(2030, 6, 1), &candidate, None)
            .expect("query succeeds");
        assert_eq!(found, expected);
    }

    #[rstest]
    fn reports_earliest_conflict(store: MemoryDeliveryStore) {
        let checker = TimeConflictChecker::new(&store);
        let conflict = checker
            .find_conflict(Assignee::Courier(UserId(7)), date(2030, 6, 1), &window(9, 12), None)
            .expect("query succeeds")
            .expect("conflict exists");
        assert_eq!(conflict.id, DeliveryId(2));
    }

    #[rstest]
    fn excluding_self_clears_conflict(store: MemoryDeliveryStore) {
        let checker = TimeConflictChecker::new(&store);
        let found = checker
            .has_conflict(
                Assignee::Vehicle(VehicleId(3)),
                date(2030, 6, 1),
                &window(10, 14),
                Some(DeliveryId(1)),
            )
            .expect("query succeeds");
        assert!(!found);
    }

    #[rstest]
    fn other_dates_never_conflict(store: MemoryDeliveryStore) {
        let checker = TimeConflictChecker::new(&store);
        let found = checker
            .has_conflict(Assignee::Courier(UserId(7)), date(2030, 6, 2), &window(10, 14), None)
            .expect("query succeeds");
        assert!(!found);
    }
}
