//! Filters that judge each itinerary on its own.

use std::collections::HashSet;

use crate::domain::{Itinerary, ItineraryId, TripTime};

use super::ItineraryFilter;

/// Drops itineraries departing after a cutoff.
///
/// A windowed search can time-shift access legs past the end of its window;
/// those results belong to the next window and are removed here.
#[derive(Debug, Clone)]
pub struct LatestDepartureTimeFilter {
    limit: TripTime,
}

impl LatestDepartureTimeFilter {
    pub fn new(limit: TripTime) -> Self {
        Self { limit }
    }
}

impl ItineraryFilter for LatestDepartureTimeFilter {
    fn name(&self) -> &str {
        "latest-departure-time-limit"
    }

    fn filter(&self, itineraries: Vec<Itinerary>) -> Vec<Itinerary> {
        itineraries
            .into_iter()
            .filter(|it| it.start_time() <= self.limit)
            .collect()
    }
}

/// Drops itineraries the search used only to bound itself.
#[derive(Debug, Clone)]
pub struct RemovePruningItineraryFilter {
    pruning: HashSet<ItineraryId>,
}

impl RemovePruningItineraryFilter {
    pub fn new(pruning: HashSet<ItineraryId>) -> Self {
        Self { pruning }
    }
}

impl ItineraryFilter for RemovePruningItineraryFilter {
    fn name(&self) -> &str {
        "remove-pruning-itinerary-filter"
    }

    fn filter(&self, itineraries: Vec<Itinerary>) -> Vec<Itinerary> {
        itineraries
            .into_iter()
            .filter(|it| !self.pruning.contains(&it.id()))
            .collect()
    }
}
