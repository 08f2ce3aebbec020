//! Count caps applied to an already sorted list.

use std::fmt;
use std::sync::Arc;

use crate::domain::Itinerary;

use super::ItineraryFilter;

/// Called with the first itinerary a [`MaxLimitFilter`] drops.
pub type MaxLimitSubscriber = Arc<dyn Fn(&Itinerary) + Send + Sync>;

/// Keeps the first `limit` itineraries.
pub struct MaxLimitFilter {
    name: String,
    limit: usize,
    subscriber: Option<MaxLimitSubscriber>,
}

impl MaxLimitFilter {
    pub fn new(
        name: impl Into<String>,
        limit: usize,
        subscriber: Option<MaxLimitSubscriber>,
    ) -> Self {
        Self {
            name: name.into(),
            limit,
            subscriber,
        }
    }
}

impl fmt::Debug for MaxLimitFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaxLimitFilter")
            .field("name", &self.name)
            .field("limit", &self.limit)
            .field("subscriber", &self.subscriber.is_some())
            .finish()
    }
}

impl ItineraryFilter for MaxLimitFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn filter(&self, mut itineraries: Vec<Itinerary>) -> Vec<Itinerary> {
        if itineraries.len() <= self.limit {
            return itineraries;
        }
        if let Some(subscriber) = &self.subscriber {
            subscriber(&itineraries[self.limit]);
        }
        itineraries.truncate(self.limit);
        itineraries
    }
}

/// Keeps the first `limit` street-only itineraries and every transit one.
#[derive(Debug, Clone)]
pub struct MaxOnStreetOnlyLimitFilter {
    name: String,
    limit: usize,
}

impl MaxOnStreetOnlyLimitFilter {
    pub fn new(name: impl Into<String>, limit: usize) -> Self {
        Self {
            name: name.into(),
            limit,
        }
    }
}

impl ItineraryFilter for MaxOnStreetOnlyLimitFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn filter(&self, itineraries: Vec<Itinerary>) -> Vec<Itinerary> {
        let mut seen = 0;
        itineraries
            .into_iter()
            .filter(|it| {
                if !it.is_street_only() {
                    return true;
                }
                seen += 1;
                seen <= self.limit
            })
            .collect()
    }
}


#[cfg(test)]
mod proptests {
    use super::super::testing::*;
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn candidates() -> impl Strategy<Value = Vec<Itinerary>> {
        prop::collection::vec((any::<bool>(), 0i64..120, 5i64..60), 0..20).prop_map(|shapes| {
            shapes
                .into_iter()
                .map(|(street_only, offset, duration)| {
                    let start = time("07:00") + Duration::minutes(offset);
                    let end = start + Duration::minutes(duration);
                    let (start, end) = (start.to_string(), end.to_string());
                    if street_only {
                        itinerary("A").walk(&start, &end, "B").build()
                    } else {
                        itinerary("A").bus("T", &start, &end, "B").build()
                    }
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn never_exceeds_limit(list in candidates(), limit in 0usize..10) {
            let input = list.len();
            let result = MaxLimitFilter::new("test", limit, None).filter(list);

            prop_assert_eq!(result.len(), input.min(limit));
        }

        #[test]
        fn raising_limit_keeps_a_superset(list in candidates(), limit in 0usize..10) {
            let small = MaxLimitFilter::new("test", limit, None).filter(list.clone());
            let large = MaxLimitFilter::new("test", limit + 1, None).filter(list);

            let large = ids(&large);
            prop_assert!(ids(&small).iter().all(|id| large.contains(id)));
        }

        #[test]
        fn street_only_cap_holds(list in candidates(), limit in 0usize..5) {
            let transit = list.iter().filter(|it| !it.is_street_only()).count();
            let result = MaxOnStreetOnlyLimitFilter::new("test", limit).filter(list);

            let street_only = result.iter().filter(|it| it.is_street_only()).count();
            prop_assert!(street_only <= limit);
            prop_assert_eq!(result.len() - street_only, transit);
        }
    }
}
