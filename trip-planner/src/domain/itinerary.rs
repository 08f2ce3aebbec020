//! Itinerary types.
//!
//! An `Itinerary` is a complete trip from origin to destination made of one
//! or more legs. Itineraries arrive from the search engine already timed;
//! composition builds new itineraries rather than editing existing ones.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::{DomainError, Leg, Place, TraverseMode, TripTime};

static NEXT_ITINERARY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an itinerary.
///
/// Clones share the identity of the value they were cloned from, so an
/// itinerary can be recognised after it has passed through a filter chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItineraryId(u64);

impl ItineraryId {
    fn next() -> Self {
        ItineraryId(NEXT_ITINERARY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ItineraryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A note attached to an itinerary, used to flag debug-mode removals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemNotice {
    pub tag: String,
    pub text: String,
}

impl SystemNotice {
    pub fn new(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: text.into(),
        }
    }
}

/// A complete itinerary.
///
/// # Invariants
///
/// - At least one leg
/// - Legs are ordered: each leg starts no earlier than the previous one ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawItinerary")]
pub struct Itinerary {
    #[serde(skip_serializing)]
    id: ItineraryId,
    legs: Vec<Leg>,
    generalized_cost: i64,
    elevation_gained: f64,
    elevation_lost: f64,
    non_transit_limit_exceeded: bool,
    too_sloped: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    system_notices: Vec<SystemNotice>,
}

#[derive(Deserialize)]
struct RawItinerary {
    legs: Vec<Leg>,
    #[serde(default)]
    generalized_cost: Option<i64>,
    #[serde(default)]
    elevation_gained: f64,
    #[serde(default)]
    elevation_lost: f64,
    #[serde(default)]
    non_transit_limit_exceeded: bool,
    #[serde(default)]
    too_sloped: bool,
}

impl TryFrom<RawItinerary> for Itinerary {
    type Error = DomainError;

    fn try_from(raw: RawItinerary) -> Result<Self, Self::Error> {
        let mut itinerary = Itinerary::new(raw.legs)?
            .with_elevation(raw.elevation_gained, raw.elevation_lost)
            .with_non_transit_limit_exceeded(raw.non_transit_limit_exceeded)
            .with_too_sloped(raw.too_sloped);
        if let Some(cost) = raw.generalized_cost {
            itinerary.generalized_cost = cost;
        }
        Ok(itinerary)
    }
}

impl Itinerary {
    /// Constructs an itinerary from ordered legs.
    ///
    /// The generalized cost starts as the sum of the leg costs.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - `legs` is empty
    /// - a leg starts before the previous leg ends
    ///
    /// # Examples
    ///
    /// ```
    /// use trip_planner::domain::{Coordinate, Itinerary, Leg, Place, TraverseMode, TripTime};
    /// use chrono::{NaiveDate, NaiveTime};
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    /// let time = |h, m| TripTime::new(date, NaiveTime::from_hms_opt(h, m, 0).unwrap());
    /// let a = Place::at("A", Coordinate::new(59.90, 10.70).unwrap());
    /// let b = Place::at("B", Coordinate::new(59.91, 10.71).unwrap());
    ///
    /// let walk = Leg::new(TraverseMode::Walk, a, b, time(10, 0), time(10, 12)).unwrap();
    /// let itinerary = Itinerary::new(vec![walk]).unwrap();
    ///
    /// assert!(itinerary.is_street_only());
    /// assert_eq!(itinerary.duration(), chrono::Duration::minutes(12));
    ///
    /// assert!(Itinerary::new(vec![]).is_err());
    /// ```
    pub fn new(legs: Vec<Leg>) -> Result<Self, DomainError> {
        if legs.is_empty() {
            return Err(DomainError::EmptyItinerary);
        }

        for (index, pair) in legs.windows(2).enumerate() {
            let previous_end = pair[0].end_time();
            let start = pair[1].start_time();
            if start < previous_end {
                return Err(DomainError::OverlappingLegs {
                    index: index + 1,
                    start,
                    previous_end,
                });
            }
        }

        let generalized_cost = legs.iter().map(Leg::generalized_cost).sum();

        Ok(Itinerary {
            id: ItineraryId::next(),
            legs,
            generalized_cost,
            elevation_gained: 0.0,
            elevation_lost: 0.0,
            non_transit_limit_exceeded: false,
            too_sloped: false,
            system_notices: Vec::new(),
        })
    }

    pub fn with_generalized_cost(mut self, cost: i64) -> Self {
        self.generalized_cost = cost;
        self
    }

    pub fn with_elevation(mut self, gained: f64, lost: f64) -> Self {
        self.elevation_gained = gained;
        self.elevation_lost = lost;
        self
    }

    pub fn with_non_transit_limit_exceeded(mut self, exceeded: bool) -> Self {
        self.non_transit_limit_exceeded = exceeded;
        self
    }

    pub fn with_too_sloped(mut self, too_sloped: bool) -> Self {
        self.too_sloped = too_sloped;
        self
    }

    pub fn id(&self) -> ItineraryId {
        self.id
    }

    /// Returns all legs in order.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn first_leg(&self) -> &Leg {
        // Non-empty by construction
        &self.legs[0]
    }

    pub fn last_leg(&self) -> &Leg {
        &self.legs[self.legs.len() - 1]
    }

    /// Returns the place the itinerary starts from.
    pub fn from_place(&self) -> &Place {
        self.first_leg().from()
    }

    /// Returns the place the itinerary ends at.
    pub fn to_place(&self) -> &Place {
        self.last_leg().to()
    }

    pub fn start_time(&self) -> TripTime {
        self.first_leg().start_time()
    }

    pub fn end_time(&self) -> TripTime {
        self.last_leg().end_time()
    }

    pub fn duration(&self) -> Duration {
        self.end_time().signed_duration_since(self.start_time())
    }

    pub fn generalized_cost(&self) -> i64 {
        self.generalized_cost
    }

    /// Returns true if no leg rides transit.
    pub fn is_street_only(&self) -> bool {
        !self.legs.iter().any(Leg::is_transit_leg)
    }

    /// Returns the transit legs in order.
    pub fn transit_legs(&self) -> impl Iterator<Item = &Leg> {
        self.legs.iter().filter(|leg| leg.is_transit_leg())
    }

    /// Number of transfers (transit legs - 1, or 0).
    pub fn transfers(&self) -> usize {
        self.transit_legs().count().saturating_sub(1)
    }

    pub fn total_distance_meters(&self) -> f64 {
        self.legs.iter().map(Leg::distance_meters).sum()
    }

    pub fn walk_distance_meters(&self) -> f64 {
        self.legs
            .iter()
            .filter(|leg| leg.mode() == TraverseMode::Walk)
            .map(Leg::distance_meters)
            .sum()
    }

    pub fn elevation_gained(&self) -> f64 {
        self.elevation_gained
    }

    pub fn elevation_lost(&self) -> f64 {
        self.elevation_lost
    }

    pub fn is_non_transit_limit_exceeded(&self) -> bool {
        self.non_transit_limit_exceeded
    }

    pub fn is_too_sloped(&self) -> bool {
        self.too_sloped
    }

    pub fn system_notices(&self) -> &[SystemNotice] {
        &self.system_notices
    }

    /// Tags the itinerary as removed without dropping it.
    pub fn mark_as_deleted(&mut self, notice: SystemNotice) {
        self.system_notices.push(notice);
    }

    pub fn is_marked_as_deleted(&self) -> bool {
        !self.system_notices.is_empty()
    }
}
