//! Absolute time handling for itineraries.
//!
//! Legs, sequences and search windows all work on the same date-aware
//! instant type so that journeys crossing midnight compare and subtract
//! correctly.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// An absolute, date-aware instant on the service timeline.
///
/// Serialized as an ISO date-time; displayed as "HH:MM".
///
/// # Examples
///
/// ```
/// use trip_planner::domain::TripTime;
/// use chrono::{Duration, NaiveDate, NaiveTime};
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// let time = TripTime::new(date, NaiveTime::from_hms_opt(23, 30, 0).unwrap());
///
/// let later = time + Duration::hours(1);
/// assert_eq!(later.to_string(), "00:30");
/// assert_eq!(later.date(), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripTime(NaiveDateTime);

impl TripTime {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self(date.and_time(time))
    }

    /// Service date of this instant.
    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    /// Add a duration, returning `None` past the representable range.
    pub fn checked_add(&self, duration: Duration) -> Option<Self> {
        self.0.checked_add_signed(duration).map(Self)
    }

    /// Subtract a duration, returning `None` past the representable range.
    pub fn checked_sub(&self, duration: Duration) -> Option<Self> {
        self.0.checked_sub_signed(duration).map(Self)
    }

    /// Returns the duration between two times.
    ///
    /// Negative if `other` is after `self`.
    pub fn signed_duration_since(&self, other: Self) -> Duration {
        self.0.signed_duration_since(other.0)
    }
}

impl Add<Duration> for TripTime {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl Sub<Duration> for TripTime {
    type Output = Self;

    fn sub(self, rhs: Duration) -> Self::Output {
        Self(self.0 - rhs)
    }
}

impl fmt::Debug for TripTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TripTime({})", self.0)
    }
}

impl fmt::Display for TripTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}
