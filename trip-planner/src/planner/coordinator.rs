//! Step-by-step routing through waypoints.
//!
//! The coordinator walks the waypoint list one junction at a time, forward
//! for depart-after searches and backward for arrive-by searches. Each step
//! bridges two consecutive waypoints with one sub-search per distinct place
//! the current sequences have reached, then joins the results onto those
//! sequences.

use std::sync::Arc;

use chrono::Duration;
use tracing::debug;

use crate::domain::{DomainError, Itinerary, Location, Place, RequestModes, TripTime};

use super::search::{SearchError, SubSearchRequest};
use super::sequence::{Direction, ItinerarySequence};
use super::waypoint::WaypointLocation;
use super::window::SearchWindowAccumulator;

/// Drives composition of itineraries through an ordered list of waypoints.
pub struct WaypointSearchCoordinator {
    direction: Direction,
    locations: Vec<WaypointLocation>,
    index: usize,
    sequences: Vec<ItinerarySequence>,
    date_time: TripTime,
    search_window: Option<Duration>,
    modes: RequestModes,
}

impl WaypointSearchCoordinator {
    /// Create a coordinator over `[origin, ..intermediates, destination]`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if fewer than two locations are given.
    pub fn new(
        direction: Direction,
        locations: Vec<WaypointLocation>,
        date_time: TripTime,
        search_window: Option<Duration>,
        modes: RequestModes,
    ) -> Result<Self, SearchError> {
        if locations.len() < 2 {
            return Err(SearchError::InvalidRequest(format!(
                "at least an origin and a destination are required, got {} locations",
                locations.len()
            )));
        }

        let index = match direction {
            Direction::DepartAt => 0,
            Direction::ArriveBy => locations.len(),
        };

        Ok(Self {
            direction,
            locations,
            index,
            sequences: Vec::new(),
            date_time,
            search_window,
            modes,
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns true while waypoints remain to be bridged.
    pub fn has_next_location(&self) -> bool {
        match self.direction {
            Direction::DepartAt => self.index + 1 < self.locations.len(),
            Direction::ArriveBy => self.index > 1,
        }
    }

    /// Advance the cursor by one waypoint.
    ///
    /// Does nothing once every junction has been bridged.
    pub fn next_location(&mut self) {
        if !self.has_next_location() {
            return;
        }
        match self.direction {
            Direction::DepartAt => self.index += 1,
            Direction::ArriveBy => self.index -= 1,
        }
    }

    /// The junction being bridged, `None` before the first `next_location`.
    fn junction(&self) -> Option<(&WaypointLocation, &WaypointLocation)> {
        let from = self.locations.get(self.index.checked_sub(1)?)?;
        let to = self.locations.get(self.index)?;
        Some((from, to))
    }

    /// The waypoint the current sub-search starts from.
    pub fn current_from(&self) -> Option<&WaypointLocation> {
        self.junction().map(|(from, _)| from)
    }

    /// The waypoint the current sub-search ends at.
    pub fn current_to(&self) -> Option<&WaypointLocation> {
        self.junction().map(|(_, to)| to)
    }

    /// The waypoint where new results join the existing sequences.
    pub fn current_merge_end(&self) -> Option<&WaypointLocation> {
        match self.direction {
            Direction::DepartAt => self.current_from(),
            Direction::ArriveBy => self.current_to(),
        }
    }

    /// Returns true on the first bridged junction, before any sequence exists.
    pub fn is_first_step(&self) -> bool {
        match self.direction {
            Direction::DepartAt => self.index == 1,
            Direction::ArriveBy => self.index + 1 == self.locations.len(),
        }
    }

    pub fn sequences(&self) -> &[ItinerarySequence] {
        &self.sequences
    }

    pub fn has_sequences(&self) -> bool {
        !self.sequences.is_empty()
    }

    /// One window per distinct place the sequences have reached.
    ///
    /// On the first step there are no sequences yet, so a single unbounded
    /// window at the merge-end waypoint is returned. Afterwards each window
    /// spans the frontier times of every sequence at that place, moved by
    /// the waypoint's minimum wait. Windows are ordered by place reference.
    pub fn collect_search_windows(&self) -> Vec<SearchWindowAccumulator> {
        let Some(merge_end) = self.current_merge_end() else {
            return Vec::new();
        };

        if self.is_first_step() {
            return vec![SearchWindowAccumulator::new(merge_end.location().clone())];
        }

        let offset = merge_end.min_wait_time() * self.direction.sign();
        let mut by_place: Vec<(Place, SearchWindowAccumulator)> = Vec::new();

        for sequence in &self.sequences {
            let place = sequence.frontier_place();
            let position = by_place
                .iter()
                .position(|(known, _)| known.same_location(place));
            let index = match position {
                Some(index) => index,
                None => {
                    let location = Location::from(place);
                    by_place.push((place.clone(), SearchWindowAccumulator::new(location)));
                    by_place.len() - 1
                }
            };
            by_place[index]
                .1
                .extend_to_include(sequence.frontier_time() + offset);
        }

        by_place.sort_by(|(a, _), (b, _)| a.cmp_by_reference(b));
        by_place.into_iter().map(|(_, window)| window).collect()
    }

    /// Build the sub-search for one window, `None` before the first step.
    ///
    /// An unbounded window requests the caller's own time and window;
    /// otherwise the request spans exactly the accumulated interval.
    pub fn build_sub_request(&self, window: &SearchWindowAccumulator) -> Option<SubSearchRequest> {
        let (current_from, current_to) = self.junction()?;
        let (from, to) = match self.direction {
            Direction::DepartAt => (window.location().clone(), current_to.location().clone()),
            Direction::ArriveBy => (current_from.location().clone(), window.location().clone()),
        };

        Some(SubSearchRequest {
            from,
            to,
            arrive_by: self.direction.is_arrive_by(),
            window: window.to_search_window(self.date_time, self.search_window),
            modes: self.modes.clone(),
        })
    }

    /// Join new sub-search results onto the current sequences.
    ///
    /// The first step seeds one sequence per itinerary. Later steps try
    /// every sequence against every itinerary and keep the feasible
    /// combinations; the previous sequences are discarded.
    pub fn merge_results(&mut self, itineraries: Vec<Itinerary>) {
        let Some(merge_end) = self.current_merge_end() else {
            return;
        };
        let min_wait = merge_end.min_wait_time();
        let max_wait = merge_end.max_wait_time();
        let itineraries: Vec<Arc<Itinerary>> = itineraries.into_iter().map(Arc::new).collect();

        if self.is_first_step() {
            self.sequences = itineraries
                .into_iter()
                .map(|itinerary| ItinerarySequence::new(self.direction, itinerary))
                .collect();
        } else {
            let mut extended = Vec::new();
            for sequence in &self.sequences {
                for itinerary in &itineraries {
                    if let Some(next) = sequence.extend_with(itinerary, min_wait, max_wait) {
                        extended.push(next);
                    }
                }
            }

            debug!(
                before = self.sequences.len(),
                candidates = itineraries.len(),
                after = extended.len(),
                "Merged sub-search results"
            );
            self.sequences = extended;
        }
    }

    /// Flatten every surviving sequence into an itinerary.
    pub fn itineraries(&self) -> Result<Vec<Itinerary>, DomainError> {
        self.sequences
            .iter()
            .map(ItinerarySequence::as_itinerary)
            .collect()
    }
}
