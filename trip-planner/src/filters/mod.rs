//! Itinerary filter chain.
//!
//! Reduces a candidate itinerary list to a small, ranked set. Each filter
//! is an independent list transform; the chain applies them in a fixed
//! order decided by [`ItineraryFilterChainBuilder`].

mod absolute;
mod builder;
mod config;
mod cost;
mod debug;
mod flex;
mod group_by;
mod limit;
mod park_and_ride;
mod sort;

#[cfg(test)]
pub(crate) mod testing;

use tracing::debug;

use crate::domain::Itinerary;

pub use absolute::{LatestDepartureTimeFilter, RemovePruningItineraryFilter};
pub use builder::ItineraryFilterChainBuilder;
pub use config::{ConfigError, CostLinearFunction, FilterConfig};
pub use cost::{
    NonTransitGeneralizedCostFilter, RemoveTransitIfStreetOnlyIsBetterFilter,
    TransitGeneralizedCostFilter,
};
pub use debug::DebugFilterWrapper;
pub use flex::FlexOnlyToDestinationFilter;
pub use group_by::GroupBySimilarLegsFilter;
pub use limit::{MaxLimitFilter, MaxLimitSubscriber, MaxOnStreetOnlyLimitFilter};
pub use park_and_ride::{ParkAndRideDirectBikeItineraryFilter, RemoveBikeParkWithShortBikingFilter};
pub use sort::{SortOrderFilter, sort_itineraries};

/// A transform over a candidate itinerary list.
pub trait ItineraryFilter: Send + Sync {
    /// Name used in logs and debug notices.
    fn name(&self) -> &str;

    fn filter(&self, itineraries: Vec<Itinerary>) -> Vec<Itinerary>;

    /// Returns false for filters that only reorder.
    fn removes_itineraries(&self) -> bool {
        true
    }
}

/// An ordered list of filters applied one after another.
pub struct FilterChain {
    filters: Vec<Box<dyn ItineraryFilter>>,
}

impl FilterChain {
    pub fn new(filters: Vec<Box<dyn ItineraryFilter>>) -> Self {
        Self { filters }
    }

    /// Names of the filters in application order.
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    pub fn filter(&self, itineraries: Vec<Itinerary>) -> Vec<Itinerary> {
        self.filters.iter().fold(itineraries, |itineraries, filter| {
            let before = itineraries.len();
            let itineraries = filter.filter(itineraries);
            if itineraries.len() != before {
                debug!(
                    filter = filter.name(),
                    before,
                    after = itineraries.len(),
                    "Filter removed itineraries"
                );
            }
            itineraries
        })
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.filter_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    struct DropFirst;

    impl ItineraryFilter for DropFirst {
        fn name(&self) -> &str {
            "drop-first"
        }

        fn filter(&self, itineraries: Vec<Itinerary>) -> Vec<Itinerary> {
            itineraries.into_iter().skip(1).collect()
        }
    }

    #[test]
    fn chain_applies_filters_in_order() {
        let chain = FilterChain::new(vec![Box::new(DropFirst), Box::new(DropFirst)]);
        let a = itinerary("A").walk("09:00", "09:10", "B").build();
        let b = itinerary("A").walk("09:05", "09:15", "B").build();
        let c = itinerary("A").walk("09:10", "09:20", "B").build();
        let c_id = c.id();

        let result = chain.filter(vec![a, b, c]);

        assert_eq!(ids(&result), vec![c_id]);
        assert_eq!(chain.filter_names(), vec!["drop-first", "drop-first"]);
    }

    #[test]
    fn empty_chain_is_identity() {
        let chain = FilterChain::new(vec![]);
        let a = itinerary("A").walk("09:00", "09:10", "B").build();
        let id = a.id();

        assert_eq!(ids(&chain.filter(vec![a])), vec![id]);
    }
}
