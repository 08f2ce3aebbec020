//! Waypoints with wait-time bounds.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, Location};

/// A requested intermediate place, as given by the caller.
///
/// Wait times are in minutes. A waypoint without wait times picks up the
/// configured defaults when resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_wait_mins: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_wait_mins: Option<i64>,
}

impl Waypoint {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            min_wait_mins: None,
            max_wait_mins: None,
        }
    }

    pub fn with_wait_mins(mut self, min: i64, max: i64) -> Self {
        self.min_wait_mins = Some(min);
        self.max_wait_mins = Some(max);
        self
    }

    /// Resolve the waypoint against the configured slack and upper bound.
    pub fn resolve(
        &self,
        transfer_slack: Duration,
        max_wait: Duration,
    ) -> Result<WaypointLocation, DomainError> {
        let min = match self.min_wait_mins {
            Some(mins) => wait_minutes(mins)?,
            None => transfer_slack,
        };
        let max = match self.max_wait_mins {
            Some(mins) => wait_minutes(mins)?,
            None => max_wait,
        };
        WaypointLocation::with_wait_times(self.location.clone(), min, max, max_wait)
    }
}

fn wait_minutes(mins: i64) -> Result<Duration, DomainError> {
    Duration::try_minutes(mins).ok_or(DomainError::WaitTimeOutOfRange { mins })
}

/// A location on the route with the wait allowed there.
///
/// The origin and destination never wait, so their bounds are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointLocation {
    location: Location,
    min_wait_time: Duration,
    max_wait_time: Duration,
}

impl WaypointLocation {
    /// A location with no wait.
    pub fn new(location: Location) -> Self {
        Self {
            location,
            min_wait_time: Duration::zero(),
            max_wait_time: Duration::zero(),
        }
    }

    /// A location with explicit wait bounds.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a bound is negative, if `max > limit`, or if
    /// `min > max`.
    pub fn with_wait_times(
        location: Location,
        min: Duration,
        max: Duration,
        limit: Duration,
    ) -> Result<Self, DomainError> {
        for wait in [min, max] {
            if wait < Duration::zero() {
                return Err(DomainError::NegativeWaitTime { wait });
            }
            if wait > limit {
                return Err(DomainError::WaitTimeTooLong { wait, max: limit });
            }
        }
        if min > max {
            return Err(DomainError::WaitTimesInverted { min, max });
        }

        Ok(Self {
            location,
            min_wait_time: min,
            max_wait_time: max,
        })
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn min_wait_time(&self) -> Duration {
        self.min_wait_time
    }

    pub fn max_wait_time(&self) -> Duration {
        self.max_wait_time
    }
}
