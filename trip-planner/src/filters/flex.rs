//! Flexible-service destination filter.

use chrono::Duration;

use crate::domain::{Itinerary, TraverseMode};

use super::ItineraryFilter;

/// Keeps itineraries that reach the destination on a flexible trip.
///
/// The last ride must be flexible, and any final walk must be short.
#[derive(Debug, Clone)]
pub struct FlexOnlyToDestinationFilter {
    max_walk: Duration,
}

impl FlexOnlyToDestinationFilter {
    pub fn new(max_walk: Duration) -> Self {
        Self { max_walk }
    }

    fn reaches_destination_by_flex(&self, itinerary: &Itinerary) -> bool {
        let last = itinerary.last_leg();
        let long_final_walk = last.mode() == TraverseMode::Walk && last.duration() > self.max_walk;

        let last_ride_is_flex = itinerary
            .legs()
            .iter()
            .rev()
            .find(|leg| leg.is_transit_leg() || leg.is_flexible_trip())
            .is_some_and(|leg| leg.is_flexible_trip());

        !long_final_walk && last_ride_is_flex
    }
}

impl Default for FlexOnlyToDestinationFilter {
    fn default() -> Self {
        Self::new(Duration::minutes(2))
    }
}

impl ItineraryFilter for FlexOnlyToDestinationFilter {
    fn name(&self) -> &str {
        "flex-only-to-destination"
    }

    fn filter(&self, itineraries: Vec<Itinerary>) -> Vec<Itinerary> {
        itineraries
            .into_iter()
            .filter(|it| self.reaches_destination_by_flex(it))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;

    #[test]
    fn keeps_flex_to_door() {
        let filter = FlexOnlyToDestinationFilter::default();
        let flex = itinerary("A")
            .bus("T1", "09:00", "09:30", "S")
            .flex("F1", "09:35", "09:50", "B")
            .build();
        let short_walk = itinerary("A")
            .flex("F1", "09:00", "09:30", "S")
            .walk("09:30", "09:32", "B")
            .build();
        let expected = vec![flex.id(), short_walk.id()];

        let result = filter.filter(vec![flex, short_walk]);

        assert_eq!(ids(&result), expected);
    }

    #[test]
    fn drops_long_walk_and_scheduled_last_ride() {
        let filter = FlexOnlyToDestinationFilter::default();
        let long_walk = itinerary("A")
            .flex("F1", "09:00", "09:30", "S")
            .walk("09:30", "09:33", "B")
            .build();
        let scheduled = itinerary("A")
            .flex("F1", "09:00", "09:30", "S")
            .bus("T1", "09:35", "09:50", "B")
            .build();
        let walk_only = itinerary("A").walk("09:00", "09:01", "B").build();

        assert!(filter.filter(vec![long_walk, scheduled, walk_only]).is_empty());
    }
}
