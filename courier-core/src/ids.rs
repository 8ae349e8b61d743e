//! Strongly typed identifiers for engine entities.
//!
//! Entities reference each other by id only. Couriers are users whose role
//! is [`UserRole::Courier`](crate::UserRole::Courier), so [`CourierId`] is an
//! alias of [`UserId`].

use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub u64);

        impl $name {
            /// Return the raw numeric identifier.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a user account (administrators, managers and couriers).
    UserId
);
entity_id!(
    /// Identifier of a vehicle.
    VehicleId
);
entity_id!(
    /// Identifier of a catalogue product.
    ProductId
);
entity_id!(
    /// Identifier of a persisted delivery.
    DeliveryId
);

/// Couriers are users; the alias documents intent at call sites.
pub type CourierId = UserId;

impl DeliveryId {
    /// Human-facing delivery number, e.g. `D-000042`.
    ///
    /// # Examples
    ///
    /// ```
    /// use courier_core::DeliveryId;
    ///
    /// assert_eq!(DeliveryId(42).delivery_number(), "D-000042");
    /// assert_eq!(DeliveryId(1_234_567).delivery_number(), "D-1234567");
    /// ```
    #[must_use]
    pub fn delivery_number(self) -> String {
        format!("D-{:06}", self.0)
    }
}
