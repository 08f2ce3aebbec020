//! Leg type.
//!
//! A `Leg` is one atomic travel segment: a walk, a bike ride, a drive or a
//! single transit ride. Legs are never mutated once built; re-timing a leg
//! produces a shifted copy.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::{DomainError, Place, TraverseMode, TripTime};

/// A leg of an itinerary.
///
/// # Invariants
///
/// - `start_time <= end_time`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLeg")]
pub struct Leg {
    mode: TraverseMode,
    from: Place,
    to: Place,
    start_time: TripTime,
    end_time: TripTime,
    distance_meters: f64,
    generalized_cost: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    trip_id: Option<String>,
    flexible_trip: bool,
    walking_bike: bool,
}

#[derive(Deserialize)]
struct RawLeg {
    mode: TraverseMode,
    from: Place,
    to: Place,
    start_time: TripTime,
    end_time: TripTime,
    #[serde(default)]
    distance_meters: f64,
    #[serde(default)]
    generalized_cost: i64,
    #[serde(default)]
    trip_id: Option<String>,
    #[serde(default)]
    flexible_trip: bool,
    #[serde(default)]
    walking_bike: bool,
}

impl TryFrom<RawLeg> for Leg {
    type Error = DomainError;

    fn try_from(raw: RawLeg) -> Result<Self, Self::Error> {
        let mut leg = Leg::new(raw.mode, raw.from, raw.to, raw.start_time, raw.end_time)?
            .with_distance(raw.distance_meters)
            .with_generalized_cost(raw.generalized_cost)
            .with_flexible_trip(raw.flexible_trip)
            .with_walking_bike(raw.walking_bike);
        leg.trip_id = raw.trip_id;
        Ok(leg)
    }
}

impl Leg {
    /// Construct a leg, validating that it does not end before it starts.
    ///
    /// # Examples
    ///
    /// ```
    /// use trip_planner::domain::{Coordinate, Leg, Place, TraverseMode, TripTime};
    /// use chrono::{NaiveDate, NaiveTime};
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    /// let a = Place::at("A", Coordinate::new(59.90, 10.70).unwrap());
    /// let b = Place::at("B", Coordinate::new(59.91, 10.71).unwrap());
    ///
    /// let leg = Leg::new(
    ///     TraverseMode::Walk,
    ///     a,
    ///     b,
    ///     TripTime::new(date, NaiveTime::from_hms_opt(10, 0, 0).unwrap()),
    ///     TripTime::new(date, NaiveTime::from_hms_opt(10, 12, 0).unwrap()),
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(leg.duration(), chrono::Duration::minutes(12));
    /// ```
    pub fn new(
        mode: TraverseMode,
        from: Place,
        to: Place,
        start_time: TripTime,
        end_time: TripTime,
    ) -> Result<Self, DomainError> {
        if end_time < start_time {
            return Err(DomainError::LegEndsBeforeStart {
                start: start_time,
                end: end_time,
            });
        }

        Ok(Leg {
            mode,
            from,
            to,
            start_time,
            end_time,
            distance_meters: 0.0,
            generalized_cost: 0,
            trip_id: None,
            flexible_trip: false,
            walking_bike: false,
        })
    }

    /// Construct a transit leg on a given trip.
    pub fn transit(
        mode: TraverseMode,
        trip_id: impl Into<String>,
        from: Place,
        to: Place,
        start_time: TripTime,
        end_time: TripTime,
    ) -> Result<Self, DomainError> {
        let mut leg = Self::new(mode, from, to, start_time, end_time)?;
        leg.trip_id = Some(trip_id.into());
        Ok(leg)
    }

    pub fn with_distance(mut self, meters: f64) -> Self {
        self.distance_meters = meters;
        self
    }

    pub fn with_generalized_cost(mut self, cost: i64) -> Self {
        self.generalized_cost = cost;
        self
    }

    pub fn with_flexible_trip(mut self, flexible: bool) -> Self {
        self.flexible_trip = flexible;
        self
    }

    pub fn with_walking_bike(mut self, walking_bike: bool) -> Self {
        self.walking_bike = walking_bike;
        self
    }

    /// Returns a copy of this leg moved in time by `offset`.
    ///
    /// All other fields are unchanged.
    pub fn time_shift(&self, offset: Duration) -> Leg {
        Leg {
            start_time: self.start_time + offset,
            end_time: self.end_time + offset,
            ..self.clone()
        }
    }

    pub fn mode(&self) -> TraverseMode {
        self.mode
    }

    pub fn from(&self) -> &Place {
        &self.from
    }

    pub fn to(&self) -> &Place {
        &self.to
    }

    pub fn start_time(&self) -> TripTime {
        self.start_time
    }

    pub fn end_time(&self) -> TripTime {
        self.end_time
    }

    pub fn duration(&self) -> Duration {
        self.end_time.signed_duration_since(self.start_time)
    }

    pub fn distance_meters(&self) -> f64 {
        self.distance_meters
    }

    pub fn generalized_cost(&self) -> i64 {
        self.generalized_cost
    }

    /// The scheduled trip this leg rides on, for transit legs.
    pub fn trip_id(&self) -> Option<&str> {
        self.trip_id.as_deref()
    }

    /// Returns true for a flexible (on-demand) trip.
    pub fn is_flexible_trip(&self) -> bool {
        self.flexible_trip
    }

    /// Returns true when the traveller walks beside a bicycle.
    pub fn is_walking_bike(&self) -> bool {
        self.walking_bike
    }

    pub fn is_transit_leg(&self) -> bool {
        self.mode.is_transit()
    }
}
