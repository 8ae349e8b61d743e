//! Reference entities looked up by id: products, vehicles and users.
//!
//! Products and vehicles carry the physical measures the capacity ledger
//! sums, so both are validated on construction and on deserialisation.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{ProductId, UserId, VehicleId};

/// Cubic centimetres per cubic metre.
const CM3_PER_M3: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Errors returned by [`Product::new`] and [`Vehicle::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogueError {
    /// A weight, dimension or ceiling was zero or negative.
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Offending field name.
        field: &'static str,
        /// Supplied value.
        value: Decimal,
    },
    /// The dimensions are too large to derive a volume from.
    #[error("volume of {length} x {width} x {height} cm is out of range")]
    VolumeOutOfRange {
        /// Length in centimetres.
        length: Decimal,
        /// Width in centimetres.
        width: Decimal,
        /// Height in centimetres.
        height: Decimal,
    },
}

fn positive(field: &'static str, value: Decimal) -> Result<Decimal, CatalogueError> {
    if value > Decimal::ZERO {
        Ok(value)
    } else {
        Err(CatalogueError::NonPositive { field, value })
    }
}

/// A catalogue product with physical dimensions.
///
/// # Examples
///
/// ```
/// use courier_core::{Product, ProductId};
/// use rust_decimal::Decimal;
///
/// let crate_box = Product::new(
///     ProductId(1),
///     "Crate",
///     Decimal::new(150, 2),
///     Decimal::from(100),
///     Decimal::from(50),
///     Decimal::from(20),
/// )?;
/// assert_eq!(crate_box.volume(), Decimal::new(1, 1));
/// # Ok::<(), courier_core::CatalogueError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "RawProduct", into = "RawProduct")
)]
pub struct Product {
    id: ProductId,
    name: String,
    weight: Decimal,
    length: Decimal,
    width: Decimal,
    height: Decimal,
    volume: Decimal,
}

impl Product {
    /// Validate and construct a product.
    ///
    /// `weight` is in kilograms and the dimensions in centimetres.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::NonPositive`] for a zero or negative
    /// measure and [`CatalogueError::VolumeOutOfRange`] when the volume
    /// cannot be represented.
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        weight: Decimal,
        length: Decimal,
        width: Decimal,
        height: Decimal,
    ) -> Result<Self, CatalogueError> {
        let weight = positive("weight", weight)?;
        let length = positive("length", length)?;
        let width = positive("width", width)?;
        let height = positive("height", height)?;
        let volume = length
            .checked_mul(width)
            .and_then(|area| area.checked_mul(height))
            .and_then(|cm3| cm3.checked_div(CM3_PER_M3))
            .ok_or(CatalogueError::VolumeOutOfRange {
                length,
                width,
                height,
            })?;
        Ok(Self {
            id,
            name: name.into(),
            weight,
            length,
            width,
            height,
            volume,
        })
    }

    /// Unique identifier.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit weight in kilograms.
    #[must_use]
    pub const fn weight(&self) -> Decimal {
        self.weight
    }

    /// Length, width and height in centimetres.
    #[must_use]
    pub const fn dimensions(&self) -> (Decimal, Decimal, Decimal) {
        (self.length, self.width, self.height)
    }

    /// Unit volume in cubic metres, derived from the dimensions in centimetres.
    #[must_use]
    pub const fn volume(&self) -> Decimal {
        self.volume
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct RawProduct {
    id: ProductId,
    name: String,
    weight: Decimal,
    length: Decimal,
    width: Decimal,
    height: Decimal,
}

#[cfg(feature = "serde")]
impl TryFrom<RawProduct> for Product {
    type Error = CatalogueError;

    fn try_from(raw: RawProduct) -> Result<Self, Self::Error> {
        Self::new(
            raw.id, raw.name, raw.weight, raw.length, raw.width, raw.height,
        )
    }
}

#[cfg(feature = "serde")]
impl From<Product> for RawProduct {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            weight: product.weight,
            length: product.length,
            width: product.width,
            height: product.height,
        }
    }
}

/// A vehicle and its hard capacity ceilings.
///
/// # Examples
///
/// ```
/// use courier_core::{Vehicle, VehicleId};
/// use rust_decimal::Decimal;
///
/// let van = Vehicle::new(VehicleId(1), Decimal::from(1000), Decimal::from(15))?
///     .with_brand("Van")
///     .with_license_plate("A001AA");
/// assert_eq!(van.max_weight(), Decimal::from(1000));
/// # Ok::<(), courier_core::CatalogueError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "RawVehicle", into = "RawVehicle")
)]
pub struct Vehicle {
    id: VehicleId,
    brand: String,
    license_plate: String,
    max_weight: Decimal,
    max_volume: Decimal,
}

impl Vehicle {
    /// Validate and construct a vehicle with empty labels.
    ///
    /// `max_weight` is in kilograms and `max_volume` in cubic metres.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::NonPositive`] for a zero or negative ceiling.
    pub fn new(
        id: VehicleId,
        max_weight: Decimal,
        max_volume: Decimal,
    ) -> Result<Self, CatalogueError> {
        Ok(Self {
            id,
            brand: String::new(),
            license_plate: String::new(),
            max_weight: positive("max_weight", max_weight)?,
            max_volume: positive("max_volume", max_volume)?,
        })
    }

    /// Set the manufacturer or model label.
    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    /// Set the registration plate.
    #[must_use]
    pub fn with_license_plate(mut self, plate: impl Into<String>) -> Self {
        self.license_plate = plate.into();
        self
    }

    /// Unique identifier.
    #[must_use]
    pub const fn id(&self) -> VehicleId {
        self.id
    }

    /// Manufacturer or model label.
    #[must_use]
    pub fn brand(&self) -> &str {
        &self.brand
    }

    /// Registration plate.
    #[must_use]
    pub fn license_plate(&self) -> &str {
        &self.license_plate
    }

    /// Maximum payload in kilograms.
    #[must_use]
    pub const fn max_weight(&self) -> Decimal {
        self.max_weight
    }

    /// Maximum payload volume in cubic metres.
    #[must_use]
    pub const fn max_volume(&self) -> Decimal {
        self.max_volume
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct RawVehicle {
    id: VehicleId,
    #[serde(default)]
    brand: String,
    #[serde(default)]
    license_plate: String,
    max_weight: Decimal,
    max_volume: Decimal,
}

#[cfg(feature = "serde")]
impl TryFrom<RawVehicle> for Vehicle {
    type Error = CatalogueError;

    fn try_from(raw: RawVehicle) -> Result<Self, Self::Error> {
        Ok(Self::new(raw.id, raw.max_weight, raw.max_volume)?
            .with_brand(raw.brand)
            .with_license_plate(raw.license_plate))
    }
}

#[cfg(feature = "serde")]
impl From<Vehicle> for RawVehicle {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            id: vehicle.id,
            brand: vehicle.brand,
            license_plate: vehicle.license_plate,
            max_weight: vehicle.max_weight,
            max_volume: vehicle.max_volume,
        }
    }
}

/// Role attached to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum UserRole {
    /// Full administrative access.
    Admin,
    /// Plans and edits deliveries.
    Manager,
    /// Performs deliveries.
    Courier,
}

/// A user account. Only users with [`UserRole::Courier`] may be assigned
/// deliveries.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Display name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// Account role.
    pub role: UserRole,
}

impl User {
    /// Whether the account may be assigned deliveries.
    #[must_use]
    pub fn is_courier(&self) -> bool {
        self.role == UserRole::Courier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn parcel(
        weight: Decimal,
        length: Decimal,
        width: Decimal,
        height: Decimal,
    ) -> Result<Product, CatalogueError> {
        Product::new(ProductId(1), "Parcel", weight, length, width, height)
    }

    #[rstest]
    #[case(dec!(10), dec!(10), dec!(10), dec!(0.001))]
    #[case(dec!(40.5), dec!(30), dec!(20), dec!(0.0243))]
    #[case(dec!(0.01), dec!(0.01), dec!(0.01), dec!(0.000000000001))]
    fn volume_converts_cubic_centimetres(
        #[case] length: Decimal,
        #[case] width: Decimal,
        #[case] height: Decimal,
        #[case] expected: Decimal,
    ) {
        let product = parcel(dec!(1), length, width, height).expect("valid product");
        assert_eq!(product.volume(), expected);
    }

    #[rstest]
    #[case(dec!(0), dec!(10), dec!(10), dec!(10), "weight")]
    #[case(dec!(-100), dec!(10), dec!(10), dec!(10), "weight")]
    #[case(dec!(1), dec!(0), dec!(10), dec!(10), "length")]
    #[case(dec!(1), dec!(10), dec!(-1), dec!(10), "width")]
    #[case(dec!(1), dec!(10), dec!(10), dec!(0), "height")]
    fn product_rejects_non_positive_measures(
        #[case] weight: Decimal,
        #[case] length: Decimal,
        #[case] width: Decimal,
        #[case] height: Decimal,
        #[case] expected_field: &str,
    ) {
        match parcel(weight, length, width, height) {
            Err(CatalogueError::NonPositive { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected NonPositive, found {other:?}"),
        }
    }

    #[rstest]
    fn product_rejects_unrepresentable_volume() {
        let huge = Decimal::from(1_000_000_000_000_u64);
        assert!(matches!(
            parcel(dec!(1), huge, huge, huge),
            Err(CatalogueError::VolumeOutOfRange { .. })
        ));
    }

    #[rstest]
    #[case(dec!(0), dec!(15), "max_weight")]
    #[case(dec!(-10), dec!(15), "max_weight")]
    #[case(dec!(1000), dec!(0), "max_volume")]
    fn vehicle_rejects_non_positive_ceilings(
        #[case] max_weight: Decimal,
        #[case] max_volume: Decimal,
        #[case] expected_field: &str,
    ) {
        match Vehicle::new(VehicleId(1), max_weight, max_volume) {
            Err(CatalogueError::NonPositive { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected NonPositive, found {other:?}"),
        }
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn deserialising_a_negative_weight_fails() {
        let raw = r#"{"id":1,"name":"Ballast","weight":"-100","length":"1","width":"1","height":"1"}"#;
        let err = serde_json::from_str::<Product>(raw).expect_err("negative weight");
        assert!(err.to_string().contains("weight must be positive"));
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn vehicle_round_trips_through_json() {
        let van = Vehicle::new(VehicleId(3), dec!(500), dec!(8))
            .expect("valid vehicle")
            .with_brand("Van");
        let json = serde_json::to_string(&van).expect("serialise");
        let back: Vehicle = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(back, van);
    }

    #[rstest]
    #[case(UserRole::Courier, true)]
    #[case(UserRole::Manager, false)]
    #[case(UserRole::Admin, false)]
    fn only_courier_role_is_courier(#[case] role: UserRole, #[case] expected: bool) {
        let user = User {
            id: UserId(1),
            name: "Sam".into(),
            role,
        };
        assert_eq!(user.is_courier(), expected);
    }
}
