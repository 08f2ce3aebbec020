use std::collections::HashSet;

use crate::domain::{Itinerary, SystemNotice};

use super::ItineraryFilter;

/// Runs a filter but tags the itineraries it would remove instead of
/// dropping them.
///
/// Already tagged itineraries are hidden from the inner filter, so each
/// itinerary carries the notice of the first filter that rejected it.
pub struct DebugFilterWrapper {
    inner: Box<dyn ItineraryFilter>,
}

impl DebugFilterWrapper {
    pub fn new(inner: Box<dyn ItineraryFilter>) -> Self {
        Self { inner }
    }
}

impl ItineraryFilter for DebugFilterWrapper {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn filter(&self, itineraries: Vec<Itinerary>) -> Vec<Itinerary> {
        if !self.inner.removes_itineraries() {
            return self.inner.filter(itineraries);
        }

        let candidates: Vec<Itinerary> = itineraries
            .iter()
            .filter(|it| !it.is_marked_as_deleted())
            .cloned()
            .collect();
        let kept: HashSet<_> = self
            .inner
            .filter(candidates)
            .iter()
            .map(Itinerary::id)
            .collect();

        let name = self.inner.name();
        itineraries
            .into_iter()
            .map(|mut it| {
                if !it.is_marked_as_deleted() && !kept.contains(&it.id()) {
                    it.mark_as_deleted(SystemNotice::new(
                        name,
                        format!("This itinerary is marked as deleted by the {name} filter."),
                    ));
                }
                it
            })
            .collect()
    }

    fn removes_itineraries(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::super::{MaxLimitFilter, SortOrderFilter};
    use super::*;

    #[test]
    fn tags_instead_of_removing() {
        let wrapper = DebugFilterWrapper::new(Box::new(MaxLimitFilter::new("cap", 1, None)));
        let a = itinerary("A").bus("T1", "09:00", "09:20", "B").build();
        let b = itinerary("A").bus("T2", "09:10", "09:30", "B").build();

        let result = wrapper.filter(vec![a, b]);

        assert_eq!(result.len(), 2);
        assert!(!result[0].is_marked_as_deleted());
        assert_eq!(
            result[1].system_notices(),
            &[SystemNotice::new(
                "cap",
                "This itinerary is marked as deleted by the cap filter."
            )]
        );
    }

    #[test]
    fn tagged_itineraries_are_skipped_by_later_filters() {
        let first = DebugFilterWrapper::new(Box::new(MaxLimitFilter::new("first", 2, None)));
        let second = DebugFilterWrapper::new(Box::new(MaxLimitFilter::new("second", 1, None)));
        let a = itinerary("A").bus("T1", "09:00", "09:20", "B").build();
        let b = itinerary("A").bus("T2", "09:10", "09:30", "B").build();
        let c = itinerary("A").bus("T3", "09:20", "09:40", "B").build();

        let result = second.filter(first.filter(vec![a, b, c]));

        let tags: Vec<Vec<&str>> = result
            .iter()
            .map(|it| it.system_notices().iter().map(|n| n.tag.as_str()).collect())
            .collect();
        assert_eq!(tags, vec![vec![], vec!["second"], vec!["first"]]);
    }

    #[test]
    fn non_removing_filter_sees_everything() {
        let wrapper = DebugFilterWrapper::new(Box::new(SortOrderFilter::new(false)));
        let late = itinerary("A").bus("T1", "09:00", "10:00", "B").build();
        let mut early = itinerary("A").bus("T2", "09:00", "09:30", "B").build();
        early.mark_as_deleted(SystemNotice::new("x", "gone"));
        let expected = vec![early.id(), late.id()];

        let result = wrapper.filter(vec![late, early]);

        assert_eq!(ids(&result), expected);
        assert_eq!(wrapper.name(), "sort-on-arrival-time-and-cost");
    }
}
