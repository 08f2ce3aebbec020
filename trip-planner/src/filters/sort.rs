//! Default itinerary sort order.

use std::cmp::Ordering;

use crate::domain::Itinerary;

use super::ItineraryFilter;

/// Sort itineraries in the default presentation order.
///
/// Itineraries are ranked by:
/// 1. Arrival time, earliest first (depart-after searches), or departure
///    time, latest first (arrive-by searches)
/// 2. Generalized cost (lower is better)
/// 3. Total duration (shorter is better)
///
/// The sort is stable, so equal itineraries keep their relative order and
/// sorting an already sorted list leaves it unchanged.
pub fn sort_itineraries(itineraries: &mut [Itinerary], arrive_by: bool) {
    itineraries.sort_by(|a, b| compare(a, b, arrive_by));
}

fn compare(a: &Itinerary, b: &Itinerary, arrive_by: bool) -> Ordering {
    let primary = if arrive_by {
        b.start_time().cmp(&a.start_time())
    } else {
        a.end_time().cmp(&b.end_time())
    };

    primary
        .then_with(|| a.generalized_cost().cmp(&b.generalized_cost()))
        .then_with(|| a.duration().cmp(&b.duration()))
}

/// Filter stage that sorts without removing anything.
#[derive(Debug, Clone)]
pub struct SortOrderFilter {
    arrive_by: bool,
}

impl SortOrderFilter {
    pub fn new(arrive_by: bool) -> Self {
        Self { arrive_by }
    }
}

impl ItineraryFilter for SortOrderFilter {
    fn name(&self) -> &str {
        "sort-on-arrival-time-and-cost"
    }

    fn filter(&self, mut itineraries: Vec<Itinerary>) -> Vec<Itinerary> {
        sort_itineraries(&mut itineraries, self.arrive_by);
        itineraries
    }

    fn removes_itineraries(&self) -> bool {
        false
    }
}
