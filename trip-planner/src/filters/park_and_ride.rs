//! Sanity filters for bike-and-ride and park-and-ride searches.

use crate::domain::{Itinerary, TraverseMode};

use super::ItineraryFilter;

/// Drops itineraries that cycle too little before the first transit leg.
///
/// Only bicycle legs count towards the distance; walking in between does
/// not reset it.
#[derive(Debug, Clone)]
pub struct RemoveBikeParkWithShortBikingFilter {
    min_bike_parking_distance: f64,
}

impl RemoveBikeParkWithShortBikingFilter {
    pub fn new(min_bike_parking_distance: f64) -> Self {
        Self {
            min_bike_parking_distance,
        }
    }

    fn cycles_far_enough(&self, itinerary: &Itinerary) -> bool {
        let biked: f64 = itinerary
            .legs()
            .iter()
            .take_while(|leg| !leg.is_transit_leg())
            .filter(|leg| leg.mode() == TraverseMode::Bicycle)
            .map(|leg| leg.distance_meters())
            .sum();

        biked > self.min_bike_parking_distance
    }
}

impl ItineraryFilter for RemoveBikeParkWithShortBikingFilter {
    fn name(&self) -> &str {
        "remove-bike-park-with-short-biking-filter"
    }

    fn filter(&self, itineraries: Vec<Itinerary>) -> Vec<Itinerary> {
        itineraries
            .into_iter()
            .filter(|it| self.cycles_far_enough(it))
            .collect()
    }
}

/// Drops park-and-ride results that never leave the bicycle.
#[derive(Debug, Clone, Default)]
pub struct ParkAndRideDirectBikeItineraryFilter;

impl ItineraryFilter for ParkAndRideDirectBikeItineraryFilter {
    fn name(&self) -> &str {
        "park-and-ride-direct-bike-itinerary-filter"
    }

    fn filter(&self, itineraries: Vec<Itinerary>) -> Vec<Itinerary> {
        itineraries
            .into_iter()
            .filter(|it| {
                !it.legs()
                    .iter()
                    .all(|leg| leg.mode() == TraverseMode::Bicycle || leg.is_walking_bike())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;

    fn bike_and_ride(first: f64, second: Option<f64>) -> Itinerary {
        let builder = itinerary("A").bicycle("09:00", "09:05", "P").distance(first);
        let builder = match second {
            Some(second) => builder
                .walk("09:05", "09:07", "Q")
                .bicycle("09:07", "09:10", "R")
                .distance(second),
            None => builder,
        };
        builder.bus("T1", "09:15", "09:45", "B").build()
    }

    #[test]
    fn short_biking_is_removed() {
        let filter = RemoveBikeParkWithShortBikingFilter::new(500.0);
        let short = bike_and_ride(100.0, None);
        let long = bike_and_ride(600.0, None);
        let split = bike_and_ride(300.0, Some(300.0));
        let expected = vec![long.id(), split.id()];

        let result = filter.filter(vec![short, long, split]);

        assert_eq!(ids(&result), expected);
    }

    #[test]
    fn biking_after_transit_does_not_count() {
        let filter = RemoveBikeParkWithShortBikingFilter::new(500.0);
        let it = itinerary("A")
            .bicycle("09:00", "09:05", "P")
            .distance(100.0)
            .bus("T1", "09:10", "09:40", "Q")
            .bicycle("09:45", "10:00", "B")
            .distance(5000.0)
            .build();

        assert!(filter.filter(vec![it]).is_empty());
    }

    #[test]
    fn distance_equal_to_minimum_is_removed() {
        let filter = RemoveBikeParkWithShortBikingFilter::new(500.0);
        assert!(filter.filter(vec![bike_and_ride(500.0, None)]).is_empty());
    }

    #[test]
    fn direct_bike_is_removed() {
        let filter = ParkAndRideDirectBikeItineraryFilter;
        let direct = itinerary("A")
            .bicycle("09:00", "09:20", "P")
            .walk("09:20", "09:25", "B")
            .walking_bike()
            .build();
        let ride = itinerary("A")
            .bicycle("09:00", "09:10", "P")
            .bus("T1", "09:15", "09:45", "B")
            .build();
        let walk = itinerary("A").walk("09:00", "09:40", "B").build();
        let expected = vec![ride.id(), walk.id()];

        let result = filter.filter(vec![direct, ride, walk]);

        assert_eq!(ids(&result), expected);
    }
}
