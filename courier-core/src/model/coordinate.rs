//! WGS84 coordinates stored as fixed-point decimals.

use rust_decimal::Decimal;
use thiserror::Error;

/// Number of fractional digits kept for latitude and longitude.
pub const COORDINATE_SCALE: u32 = 8;

const MAX_LATITUDE: Decimal = Decimal::from_parts(90, 0, 0, false, 0);
const MAX_LONGITUDE: Decimal = Decimal::from_parts(180, 0, 0, false, 0);

/// A geographic position in decimal degrees.
///
/// Values are rounded to [`COORDINATE_SCALE`] fractional digits on
/// construction so that equality is stable across serialisation.
///
/// # Examples
///
/// ```
/// use courier_core::Coordinate;
/// use rust_decimal::Decimal;
///
/// # fn main() -> Result<(), courier_core::CoordinateError> {
/// let moscow = Coordinate::new(Decimal::new(557_558, 4), Decimal::new(376_173, 4))?;
/// assert_eq!(moscow.latitude(), Decimal::new(557_558, 4));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawCoordinate"))]
pub struct Coordinate {
    latitude: Decimal,
    longitude: Decimal,
}

/// Errors returned by [`Coordinate::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    /// Latitude fell outside `[-90, 90]`.
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(Decimal),
    /// Longitude fell outside `[-180, 180]`.
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(Decimal),
}

impl Coordinate {
    /// Validate and construct a coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] when either component is out of range.
    pub fn new(latitude: Decimal, longitude: Decimal) -> Result<Self, CoordinateError> {
        if latitude.abs() > MAX_LATITUDE {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if longitude.abs() > MAX_LONGITUDE {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude: latitude.round_dp(COORDINATE_SCALE),
            longitude: longitude.round_dp(COORDINATE_SCALE),
        })
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn latitude(&self) -> Decimal {
        self.latitude
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn longitude(&self) -> Decimal {
        self.longitude
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawCoordinate {
    latitude: Decimal,
    longitude: Decimal,
}

#[cfg(feature = "serde")]
impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordinateError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}
