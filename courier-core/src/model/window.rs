//! Same-day delivery time windows.

use chrono::NaiveTime;
use thiserror::Error;

/// A half-open `[start, end)` interval of clock time within a single day.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use courier_core::TimeWindow;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let morning = TimeWindow::new(
///     NaiveTime::from_hms_opt(9, 0, 0).ok_or("bad time")?,
///     NaiveTime::from_hms_opt(12, 0, 0).ok_or("bad time")?,
/// )?;
/// assert_eq!(morning.duration_minutes(), 180);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawWindow"))]
pub struct TimeWindow {
    start: NaiveTime,
    end: NaiveTime,
}

/// Errors returned by [`TimeWindow::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimeWindowError {
    /// The window does not end strictly after it starts.
    #[error("window start {start} must be earlier than end {end}")]
    NotIncreasing {
        /// Requested start.
        start: NaiveTime,
        /// Requested end.
        end: NaiveTime,
    },
}

impl TimeWindow {
    /// Validate and construct a window.
    ///
    /// # Errors
    ///
    /// Returns [`TimeWindowError::NotIncreasing`] unless `start < end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, TimeWindowError> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(TimeWindowError::NotIncreasing { start, end })
        }
    }

    /// Window start.
    #[must_use]
    pub const fn start(&self) -> NaiveTime {
        self.start
    }

    /// Window end (exclusive).
    #[must_use]
    pub const fn end(&self) -> NaiveTime {
        self.end
    }

    /// Whole minutes between start and end.
    #[must_use]
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Half-open overlap test: `s1 < e2 && s2 < e1`.
    ///
    /// Windows that merely touch (`a.end == b.start`) do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawWindow {
    start: NaiveTime,
    end: NaiveTime,
}

#[cfg(feature = "serde")]
impl TryFrom<RawWindow> for TimeWindow {
    type Error = TimeWindowError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}
