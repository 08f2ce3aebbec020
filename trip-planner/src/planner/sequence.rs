//! Chains of itineraries joined at waypoints.
//!
//! A sequence grows one itinerary at a time away from the end of the
//! journey it is anchored to. Depart-after searches anchor at the origin
//! and grow toward the destination; arrive-by searches anchor at the
//! destination and grow toward the origin. Both directions share one
//! junction rule, expressed with a sign:
//!
//! - the *frontier* is the growing end of the sequence (its end time for
//!   depart-after, its start time for arrive-by),
//! - the *origin* is the fixed end,
//! - a new itinerary's *near* end touches the frontier and its *far* end
//!   becomes the new frontier.
//!
//! Street-only itineraries have no schedule and may slide in time; whichever
//! side of a junction is street-only is the one that moves.

use std::sync::Arc;

use chrono::Duration;

use crate::domain::{DomainError, Itinerary, Leg, Place, TripTime};

/// Search direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Depart after a time; sequences grow at the tail.
    DepartAt,
    /// Arrive by a time; sequences grow at the head.
    ArriveBy,
}

impl Direction {
    pub fn from_arrive_by(arrive_by: bool) -> Self {
        if arrive_by {
            Direction::ArriveBy
        } else {
            Direction::DepartAt
        }
    }

    pub fn is_arrive_by(self) -> bool {
        self == Direction::ArriveBy
    }

    /// +1 when time runs with growth, -1 when it runs against it.
    pub(crate) fn sign(self) -> i32 {
        match self {
            Direction::DepartAt => 1,
            Direction::ArriveBy => -1,
        }
    }

    fn near_time(self, itinerary: &Itinerary) -> TripTime {
        match self {
            Direction::DepartAt => itinerary.start_time(),
            Direction::ArriveBy => itinerary.end_time(),
        }
    }

    fn far_time(self, itinerary: &Itinerary) -> TripTime {
        match self {
            Direction::DepartAt => itinerary.end_time(),
            Direction::ArriveBy => itinerary.start_time(),
        }
    }

    fn near_place(self, itinerary: &Itinerary) -> &Place {
        match self {
            Direction::DepartAt => itinerary.from_place(),
            Direction::ArriveBy => itinerary.to_place(),
        }
    }

    fn far_place(self, itinerary: &Itinerary) -> &Place {
        match self {
            Direction::DepartAt => itinerary.to_place(),
            Direction::ArriveBy => itinerary.from_place(),
        }
    }
}

/// One growing chain of itineraries.
///
/// # Invariants
///
/// - At least one member
/// - `start_time() <= end_time()`
/// - `wait_times.len() == members.len() - 1`
#[derive(Debug, Clone)]
pub struct ItinerarySequence {
    direction: Direction,
    /// Members in growth order.
    members: Vec<Arc<Itinerary>>,
    /// `wait_times[k]` separates `members[k]` and `members[k + 1]`.
    wait_times: Vec<Duration>,
    origin_time: TripTime,
    frontier_time: TripTime,
    street_only: bool,
}

impl ItinerarySequence {
    /// Start a sequence from a single itinerary.
    pub fn new(direction: Direction, itinerary: Arc<Itinerary>) -> Self {
        let origin_time = direction.near_time(&itinerary);
        let frontier_time = direction.far_time(&itinerary);
        Self {
            direction,
            street_only: itinerary.is_street_only(),
            members: vec![itinerary],
            wait_times: Vec::new(),
            origin_time,
            frontier_time,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn start_time(&self) -> TripTime {
        match self.direction {
            Direction::DepartAt => self.origin_time,
            Direction::ArriveBy => self.frontier_time,
        }
    }

    pub fn end_time(&self) -> TripTime {
        match self.direction {
            Direction::DepartAt => self.frontier_time,
            Direction::ArriveBy => self.origin_time,
        }
    }

    pub fn initial_place(&self) -> &Place {
        match self.direction {
            Direction::DepartAt => self.first_member().from_place(),
            Direction::ArriveBy => self.last_member().from_place(),
        }
    }

    pub fn final_place(&self) -> &Place {
        match self.direction {
            Direction::DepartAt => self.last_member().to_place(),
            Direction::ArriveBy => self.first_member().to_place(),
        }
    }

    /// Returns true if no member rides transit.
    pub fn is_street_only(&self) -> bool {
        self.street_only
    }

    /// Members in travel order.
    pub fn itineraries(&self) -> Vec<&Itinerary> {
        let members = self.members.iter().map(|m| m.as_ref());
        match self.direction {
            Direction::DepartAt => members.collect(),
            Direction::ArriveBy => members.rev().collect(),
        }
    }

    /// Waits between consecutive members, in travel order.
    pub fn wait_times(&self) -> Vec<Duration> {
        match self.direction {
            Direction::DepartAt => self.wait_times.clone(),
            Direction::ArriveBy => self.wait_times.iter().rev().copied().collect(),
        }
    }

    fn first_member(&self) -> &Itinerary {
        // Non-empty by construction
        &self.members[0]
    }

    fn last_member(&self) -> &Itinerary {
        &self.members[self.members.len() - 1]
    }

    /// The place the sequence grows from: its final place for depart-after,
    /// its initial place for arrive-by.
    pub fn frontier_place(&self) -> &Place {
        self.direction.far_place(self.last_member())
    }

    /// End time for depart-after, start time for arrive-by.
    pub fn frontier_time(&self) -> TripTime {
        self.frontier_time
    }

    /// Join `next` onto the growing end of this sequence.
    ///
    /// Returns `None` when `next` does not start (depart-after) or end
    /// (arrive-by) where this sequence currently ends, or when two
    /// scheduled itineraries would be separated by a wait outside
    /// `[min_wait, max_wait]`.
    pub fn extend_with(
        &self,
        next: &Arc<Itinerary>,
        min_wait: Duration,
        max_wait: Duration,
    ) -> Option<ItinerarySequence> {
        let direction = self.direction;
        if !direction
            .near_place(next)
            .same_location(self.frontier_place())
        {
            return None;
        }

        let sign = direction.sign();
        let near = direction.near_time(next);
        let far = direction.far_time(next);

        let (wait, origin_time, frontier_time) = if next.is_street_only() {
            // The new itinerary slides to follow the frontier
            let frontier = self.frontier_time + (min_wait + next.duration()) * sign;
            (min_wait, self.origin_time, frontier)
        } else if self.street_only {
            // The existing street-only chain slides to meet the schedule
            let existing = self.end_time().signed_duration_since(self.start_time());
            let origin = near - (min_wait + existing) * sign;
            (min_wait, origin, far)
        } else {
            let gap = near.signed_duration_since(self.frontier_time) * sign;
            if gap < min_wait || gap > max_wait {
                return None;
            }
            (gap, self.origin_time, far)
        };

        let mut members = self.members.clone();
        members.push(Arc::clone(next));
        let mut wait_times = self.wait_times.clone();
        wait_times.push(wait);

        Some(ItinerarySequence {
            direction,
            members,
            wait_times,
            origin_time,
            frontier_time,
            street_only: self.street_only && next.is_street_only(),
        })
    }

    /// Flatten the chain into one itinerary.
    ///
    /// Legs are copied with [`Leg::time_shift`]; members are never modified.
    /// Cost and elevation are summed over members, and limit flags are
    /// combined with OR.
    pub fn as_itinerary(&self) -> Result<Itinerary, DomainError> {
        if self.members.len() == 1 {
            return Ok(self.first_member().clone());
        }

        let direction = self.direction;
        let sign = direction.sign();

        // Legs placed so far, in travel order
        let mut placed: Vec<Leg> = self.first_member().legs().to_vec();
        let mut placed_street_only = self.first_member().is_street_only();

        for (member, wait) in self.members[1..].iter().zip(&self.wait_times) {
            let frontier = match direction {
                Direction::DepartAt => placed[placed.len() - 1].end_time(),
                Direction::ArriveBy => placed[0].start_time(),
            };
            let shift = (frontier + *wait * sign).signed_duration_since(direction.near_time(member));

            if placed_street_only && !member.is_street_only() {
                placed = placed.iter().map(|leg| leg.time_shift(-shift)).collect();
            }

            let offset = if member.is_street_only() {
                shift
            } else {
                Duration::zero()
            };
            let legs = member.legs().iter().map(|leg| leg.time_shift(offset));

            placed = match direction {
                Direction::DepartAt => placed.into_iter().chain(legs).collect(),
                Direction::ArriveBy => legs.chain(placed).collect(),
            };
            placed_street_only = placed_street_only && member.is_street_only();
        }

        let members = &self.members;
        Ok(Itinerary::new(placed)?
            .with_generalized_cost(members.iter().map(|m| m.generalized_cost()).sum())
            .with_elevation(
                members.iter().map(|m| m.elevation_gained()).sum(),
                members.iter().map(|m| m.elevation_lost()).sum(),
            )
            .with_non_transit_limit_exceeded(
                members.iter().any(|m| m.is_non_transit_limit_exceeded()),
            )
            .with_too_sloped(members.iter().any(|m| m.is_too_sloped())))
    }
}
