//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They are
//! distinct from search and configuration errors.

use chrono::Duration;

use super::TripTime;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Itinerary has no legs
    #[error("itinerary must have at least one leg")]
    EmptyItinerary,

    /// A leg ends before it starts
    #[error("invalid leg: ends at {end} before it starts at {start}")]
    LegEndsBeforeStart { start: TripTime, end: TripTime },

    /// Consecutive legs overlap in time
    #[error("legs overlap: leg {index} starts at {start} before the previous leg ends at {previous_end}")]
    OverlappingLegs {
        index: usize,
        start: TripTime,
        previous_end: TripTime,
    },

    /// Coordinate outside the WGS84 range
    #[error("invalid coordinate: lat {lat}, lon {lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// Stop identifiers must be non-empty
    #[error("stop id cannot be empty")]
    EmptyStopId,

    /// A waypoint wait time exceeds the configured maximum
    #[error("wait time of {} minutes exceeds the maximum of {} minutes", .wait.num_minutes(), .max.num_minutes())]
    WaitTimeTooLong { wait: Duration, max: Duration },

    /// Wait times cannot be negative
    #[error("wait time of {} minutes is negative", .wait.num_minutes())]
    NegativeWaitTime { wait: Duration },

    /// A wait time too large to represent
    #[error("wait time of {mins} minutes is out of range")]
    WaitTimeOutOfRange { mins: i64 },

    /// Minimum wait is larger than maximum wait
    #[error("minimum wait time of {} minutes exceeds maximum wait time of {} minutes", .min.num_minutes(), .max.num_minutes())]
    WaitTimesInverted { min: Duration, max: Duration },
}
