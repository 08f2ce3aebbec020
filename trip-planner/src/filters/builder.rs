//! Assembles filter chains in their fixed stage order.

use std::collections::HashSet;

use crate::domain::{Itinerary, ItineraryId, TripTime};

use super::config::ConfigError;
use super::{
    CostLinearFunction, DebugFilterWrapper, FilterChain, FlexOnlyToDestinationFilter,
    GroupBySimilarLegsFilter, ItineraryFilter, LatestDepartureTimeFilter, MaxLimitFilter,
    MaxLimitSubscriber, MaxOnStreetOnlyLimitFilter, NonTransitGeneralizedCostFilter,
    ParkAndRideDirectBikeItineraryFilter, RemoveBikeParkWithShortBikingFilter,
    RemovePruningItineraryFilter, RemoveTransitIfStreetOnlyIsBetterFilter, SortOrderFilter,
    TransitGeneralizedCostFilter,
};

const NOT_SET: i32 = -1;

#[derive(Debug, Clone, Copy)]
struct GroupBySimilarity {
    group_by_p: f64,
    approximate_min_limit: i32,
}

/// Builder for a [`FilterChain`].
///
/// Stages are always applied in this order, whichever are enabled:
/// 1. similarity grouping, least strict first
/// 2. transit and non-transit cost limits
/// 3. sort, then cap street-only itineraries
/// 4. sort, then cap the total count
/// 5. absolute filters, without re-sorting
/// 6. final sort
///
/// With debug enabled every stage tags instead of removing.
pub struct ItineraryFilterChainBuilder {
    arrive_by: bool,
    group_by_similarity: Vec<GroupBySimilarity>,
    debug: bool,
    max_number_of_itineraries: i32,
    max_number_of_on_street_only_itineraries: i32,
    remove_transit_with_higher_cost_than_best_on_street_only: bool,
    transit_generalized_cost_limit: Option<CostLinearFunction>,
    non_transit_generalized_cost_limit: Option<CostLinearFunction>,
    latest_departure_time_limit: Option<TripTime>,
    pruning_itineraries: HashSet<ItineraryId>,
    min_bike_parking_distance: Option<f64>,
    park_and_ride: bool,
    flex_only_to_destination: bool,
    max_limit_reached_subscriber: Option<MaxLimitSubscriber>,
}

impl ItineraryFilterChainBuilder {
    /// `arrive_by` selects the sort order.
    pub fn new(arrive_by: bool) -> Self {
        Self {
            arrive_by,
            group_by_similarity: Vec::new(),
            debug: false,
            max_number_of_itineraries: NOT_SET,
            max_number_of_on_street_only_itineraries: 1,
            remove_transit_with_higher_cost_than_best_on_street_only: true,
            transit_generalized_cost_limit: None,
            non_transit_generalized_cost_limit: None,
            latest_departure_time_limit: None,
            pruning_itineraries: HashSet::new(),
            min_bike_parking_distance: None,
            park_and_ride: false,
            flex_only_to_destination: false,
            max_limit_reached_subscriber: None,
        }
    }

    /// Group itineraries whose main legs cover at least `group_by_p` of the
    /// distance, keeping roughly `approximate_min_limit` itineraries overall.
    pub fn add_group_by_similarity(mut self, group_by_p: f64, approximate_min_limit: i32) -> Self {
        self.group_by_similarity.push(GroupBySimilarity {
            group_by_p,
            approximate_min_limit,
        });
        self
    }

    /// `-1` to disable.
    pub fn with_max_number_of_itineraries(mut self, value: i32) -> Self {
        self.max_number_of_itineraries = value;
        self
    }

    /// `-1` to disable.
    pub fn with_max_number_of_on_street_only_itineraries(mut self, value: i32) -> Self {
        self.max_number_of_on_street_only_itineraries = value;
        self
    }

    pub fn with_remove_transit_with_higher_cost_than_best_on_street_only(
        mut self,
        value: bool,
    ) -> Self {
        self.remove_transit_with_higher_cost_than_best_on_street_only = value;
        self
    }

    pub fn with_transit_generalized_cost_limit(mut self, value: CostLinearFunction) -> Self {
        self.transit_generalized_cost_limit = Some(value);
        self
    }

    pub fn with_non_transit_generalized_cost_limit(mut self, value: CostLinearFunction) -> Self {
        self.non_transit_generalized_cost_limit = Some(value);
        self
    }

    pub fn with_latest_departure_time_limit(mut self, value: TripTime) -> Self {
        self.latest_departure_time_limit = Some(value);
        self
    }

    /// Itineraries that only bounded the search and must not be shown.
    pub fn with_pruning_itineraries(mut self, itineraries: &[Itinerary]) -> Self {
        self.pruning_itineraries
            .extend(itineraries.iter().map(Itinerary::id));
        self
    }

    pub fn with_min_bike_parking_distance(mut self, meters: f64) -> Self {
        self.min_bike_parking_distance = Some(meters);
        self
    }

    pub fn with_park_and_ride(mut self, value: bool) -> Self {
        self.park_and_ride = value;
        self
    }

    pub fn with_flex_only_to_destination(mut self, value: bool) -> Self {
        self.flex_only_to_destination = value;
        self
    }

    /// Tag removed itineraries instead of dropping them.
    pub fn with_debug_enabled(mut self, value: bool) -> Self {
        self.debug = value;
        self
    }

    /// Receives the first itinerary dropped by the count limit.
    pub fn with_max_limit_reached_subscriber(mut self, subscriber: MaxLimitSubscriber) -> Self {
        self.max_limit_reached_subscriber = Some(subscriber);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for group in &self.group_by_similarity {
            if !(0.0..=1.0).contains(&group.group_by_p) {
                return Err(ConfigError::InvalidSimilarity {
                    name: "groupByP",
                    value: group.group_by_p,
                });
            }
            if group.approximate_min_limit < 0 {
                return Err(ConfigError::InvalidLimit {
                    name: "approximateMinLimit",
                    value: group.approximate_min_limit,
                });
            }
        }

        check_limit("maxNumberOfItineraries", self.max_number_of_itineraries)?;
        check_limit(
            "maxNumberOfOnStreetOnlyItineraries",
            self.max_number_of_on_street_only_itineraries,
        )?;

        for function in [
            &self.transit_generalized_cost_limit,
            &self.non_transit_generalized_cost_limit,
        ]
        .into_iter()
        .flatten()
        {
            function.validate()?;
        }

        if let Some(value) = self.min_bike_parking_distance {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::InvalidDistance {
                    name: "minBikeParkingDistance",
                    value,
                });
            }
        }

        Ok(())
    }

    /// Validate the configuration and assemble the chain.
    pub fn build(self) -> Result<FilterChain, ConfigError> {
        self.validate()?;

        let mut filters: Vec<Box<dyn ItineraryFilter>> = Vec::new();

        // Least strict grouping first, so relaxed groups keep as many as possible
        let mut group_by = self.group_by_similarity.clone();
        group_by.sort_by(|a, b| a.group_by_p.total_cmp(&b.group_by_p));
        for group in group_by {
            filters.push(Box::new(GroupBySimilarLegsFilter::new(
                group.group_by_p,
                group.approximate_min_limit as usize,
            )));
        }

        if let Some(function) = self.transit_generalized_cost_limit {
            filters.push(Box::new(TransitGeneralizedCostFilter::new(function)));
        }

        if let Some(function) = self.non_transit_generalized_cost_limit {
            filters.push(Box::new(NonTransitGeneralizedCostFilter::new(function)));
        }

        if self.max_number_of_on_street_only_itineraries > 0 {
            filters.push(Box::new(SortOrderFilter::new(self.arrive_by)));
            filters.push(Box::new(MaxOnStreetOnlyLimitFilter::new(
                "number-of-on-street-only-itineraries-filter",
                self.max_number_of_on_street_only_itineraries as usize,
            )));
        }

        if self.max_number_of_itineraries > 0 {
            filters.push(Box::new(SortOrderFilter::new(self.arrive_by)));
            filters.push(Box::new(MaxLimitFilter::new(
                "number-of-itineraries-filter",
                self.max_number_of_itineraries as usize,
                self.max_limit_reached_subscriber,
            )));
        }

        // Absolute filters judge each itinerary on its own, after grouping
        if self.remove_transit_with_higher_cost_than_best_on_street_only {
            filters.push(Box::new(RemoveTransitIfStreetOnlyIsBetterFilter));
        }

        if let Some(limit) = self.latest_departure_time_limit {
            filters.push(Box::new(LatestDepartureTimeFilter::new(limit)));
        }

        if !self.pruning_itineraries.is_empty() {
            filters.push(Box::new(RemovePruningItineraryFilter::new(
                self.pruning_itineraries,
            )));
        }

        if let Some(distance) = self.min_bike_parking_distance {
            filters.push(Box::new(RemoveBikeParkWithShortBikingFilter::new(distance)));
        }

        if self.park_and_ride {
            filters.push(Box::new(ParkAndRideDirectBikeItineraryFilter));
        }

        if self.flex_only_to_destination {
            filters.push(Box::new(FlexOnlyToDestinationFilter::default()));
        }

        filters.push(Box::new(SortOrderFilter::new(self.arrive_by)));

        if self.debug {
            filters = filters
                .into_iter()
                .map(|filter| Box::new(DebugFilterWrapper::new(filter)) as Box<dyn ItineraryFilter>)
                .collect();
        }

        Ok(FilterChain::new(filters))
    }
}

fn check_limit(name: &'static str, value: i32) -> Result<(), ConfigError> {
    if value < NOT_SET {
        return Err(ConfigError::InvalidLimit { name, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn minimal_chain_only_sorts_and_removes_transit() {
        let chain = ItineraryFilterChainBuilder::new(false)
            .with_max_number_of_on_street_only_itineraries(-1)
            .build()
            .unwrap();

        assert_eq!(
            chain.filter_names(),
            vec![
                "remove-transit-with-higher-cost-than-best-on-street-only",
                "sort-on-arrival-time-and-cost",
            ]
        );
    }

    #[test]
    fn absolute_filters_follow_limits() {
        let pruned = itinerary("A").walk("09:00", "09:10", "B").build();
        let chain = ItineraryFilterChainBuilder::new(false)
            .with_max_number_of_itineraries(5)
            .with_latest_departure_time_limit(time("10:00"))
            .with_pruning_itineraries(&[pruned])
            .with_min_bike_parking_distance(500.0)
            .with_park_and_ride(true)
            .with_flex_only_to_destination(true)
            .build()
            .unwrap();

        assert_eq!(
            chain.filter_names(),
            vec![
                "sort-on-arrival-time-and-cost",
                "number-of-on-street-only-itineraries-filter",
                "sort-on-arrival-time-and-cost",
                "number-of-itineraries-filter",
                "remove-transit-with-higher-cost-than-best-on-street-only",
                "latest-departure-time-limit",
                "remove-pruning-itinerary-filter",
                "remove-bike-park-with-short-biking-filter",
                "park-and-ride-direct-bike-itinerary-filter",
                "flex-only-to-destination",
                "sort-on-arrival-time-and-cost",
            ]
        );
    }

    #[test]
    fn rejects_invalid_limits() {
        let result = ItineraryFilterChainBuilder::new(false)
            .with_max_number_of_itineraries(-3)
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidLimit {
                name: "maxNumberOfItineraries",
                value: -3
            })
        ));

        let result = ItineraryFilterChainBuilder::new(false)
            .add_group_by_similarity(1.2, 1)
            .build();
        assert!(matches!(result, Err(ConfigError::InvalidSimilarity { .. })));

        let result = ItineraryFilterChainBuilder::new(false)
            .with_transit_generalized_cost_limit(CostLinearFunction::new(0.0, 0.5).unwrap())
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::CostFunctionRange { .. })
        ));
    }

    #[test]
    fn max_limit_notifies_first_removed() {
        let first_removed: Arc<Mutex<Option<ItineraryId>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&first_removed);

        let chain = ItineraryFilterChainBuilder::new(false)
            .with_max_number_of_itineraries(1)
            .with_max_limit_reached_subscriber(Arc::new(move |it: &Itinerary| {
                *slot.lock().unwrap() = Some(it.id());
            }))
            .build()
            .unwrap();

        let early = itinerary("A").bus("T1", "09:00", "09:30", "B").build();
        let late = itinerary("A").bus("T2", "09:10", "09:40", "B").build();
        let (early_id, late_id) = (early.id(), late.id());

        let result = chain.filter(vec![late, early]);

        assert_eq!(ids(&result), vec![early_id]);
        assert_eq!(*first_removed.lock().unwrap(), Some(late_id));
    }

    #[test]
    fn debug_chain_keeps_everything() {
        let chain = ItineraryFilterChainBuilder::new(false)
            .with_max_number_of_itineraries(1)
            .with_debug_enabled(true)
            .build()
            .unwrap();

        let early = itinerary("A").bus("T1", "09:00", "09:30", "B").build();
        let late = itinerary("A").bus("T2", "09:10", "09:40", "B").build();

        let result = chain.filter(vec![late, early]);

        assert_eq!(result.len(), 2);
        assert!(!result[0].is_marked_as_deleted());
        assert!(result[1].is_marked_as_deleted());
        assert_eq!(
            result[1].system_notices()[0].tag,
            "number-of-itineraries-filter"
        );
    }

    #[test]
    fn street_only_beaten_by_cheaper_walk() {
        let chain = ItineraryFilterChainBuilder::new(false)
            .with_max_number_of_on_street_only_itineraries(-1)
            .build()
            .unwrap();

        let walk = itinerary("A").walk("09:00", "09:40", "B").cost(1000).build();
        let bus = itinerary("A").bus("T1", "09:00", "09:20", "B").cost(1500).build();
        let walk_id = walk.id();

        let result = chain.filter(vec![walk, bus]);
        assert_eq!(ids(&result), vec![walk_id]);
    }
}

#[cfg(test)]
mod proptests {
    use super::super::testing::*;
    use super::super::FilterConfig;
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    struct Shape {
        street_only: bool,
        trip: u8,
        offset: i64,
        duration: i64,
        cost: i64,
    }

    fn shape() -> impl Strategy<Value = Shape> {
        (any::<bool>(), 0u8..4, 0i64..180, 5i64..90, 100i64..8000).prop_map(
            |(street_only, trip, offset, duration, cost)| Shape {
                street_only,
                trip,
                offset,
                duration,
                cost,
            },
        )
    }

    fn build(shape: &Shape) -> Itinerary {
        let start = time("06:00") + Duration::minutes(shape.offset);
        let end = start + Duration::minutes(shape.duration);
        let (start, end) = (start.to_string(), end.to_string());
        let builder = itinerary("A");
        let builder = if shape.street_only {
            builder.walk(&start, &end, "B").distance(2000.0)
        } else {
            builder
                .bus(&format!("T{}", shape.trip), &start, &end, "B")
                .distance(10_000.0)
        };
        builder.cost(shape.cost).build()
    }

    fn config() -> impl Strategy<Value = (FilterConfig, i32, bool)> {
        (
            prop::option::of(0.5f64..=1.0),
            prop::option::of(0.5f64..=1.0),
            -1i32..6,
            -1i32..3,
            any::<bool>(),
            -1i32..8,
            any::<bool>(),
        )
            .prop_map(
                |(keep_one, keep_num, max, street, remove_transit, num, arrive_by)| {
                    let config = FilterConfig {
                        group_similarity_keep_one: keep_one.unwrap_or(0.0),
                        group_similarity_keep_num_of_itineraries: keep_num.unwrap_or(0.0),
                        max_number_of_itineraries: max,
                        max_number_of_on_street_only_itineraries: street,
                        remove_transit_with_higher_cost_than_best_on_street_only: remove_transit,
                        ..FilterConfig::default()
                    };
                    (config, num, arrive_by)
                },
            )
    }

    proptest! {
        #[test]
        fn chain_is_idempotent(
            shapes in prop::collection::vec(shape(), 0..12),
            (config, num, arrive_by) in config(),
        ) {
            let chain = config.to_builder(arrive_by, num).build().unwrap();
            let itineraries: Vec<Itinerary> = shapes.iter().map(build).collect();

            let once = chain.filter(itineraries);
            let twice = chain.filter(once.clone());

            prop_assert_eq!(ids(&once), ids(&twice));
        }

        #[test]
        fn chain_respects_count_limit(
            shapes in prop::collection::vec(shape(), 0..12),
            max in 1i32..6,
        ) {
            let config = FilterConfig {
                max_number_of_itineraries: max,
                ..FilterConfig::default()
            };
            let chain = config.to_builder(false, -1).build().unwrap();
            let itineraries: Vec<Itinerary> = shapes.iter().map(build).collect();

            let result = chain.filter(itineraries);

            prop_assert!(result.len() <= max as usize);
            prop_assert!(result.iter().filter(|i| i.is_street_only()).count() <= 1);
        }
    }
}
