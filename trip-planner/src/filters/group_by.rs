//! Similarity grouping on the main transit legs.

use std::collections::BTreeSet;

use crate::domain::{Itinerary, Leg};

use super::ItineraryFilter;

/// Identifies one ride: the trip and the stops boarded and alighted at.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct LegKey {
    trip_id: String,
    from_stop: Option<String>,
    to_stop: Option<String>,
}

impl LegKey {
    fn of(leg: &Leg) -> Self {
        Self {
            trip_id: leg.trip_id().unwrap_or_default().to_string(),
            from_stop: leg.from().stop_id.as_ref().map(|s| s.to_string()),
            to_stop: leg.to().stop_id.as_ref().map(|s| s.to_string()),
        }
    }
}

/// The transit legs that together cover at least `p` of the itinerary.
///
/// Legs are measured by distance, or by duration when the itinerary
/// carries no distances. Longest legs are taken first. Street-only
/// itineraries have an empty key.
fn main_legs(itinerary: &Itinerary, p: f64) -> BTreeSet<LegKey> {
    let use_distance = itinerary.total_distance_meters() > 0.0;
    let length = |leg: &Leg| {
        if use_distance {
            leg.distance_meters()
        } else {
            leg.duration().num_seconds() as f64
        }
    };

    let total: f64 = itinerary.legs().iter().map(length).sum();
    let limit = p * total;

    let mut transit: Vec<&Leg> = itinerary.transit_legs().collect();
    transit.sort_by(|a, b| length(b).total_cmp(&length(a)));

    let mut key = BTreeSet::new();
    let mut covered = 0.0;
    for leg in transit {
        if covered >= limit && !key.is_empty() {
            break;
        }
        covered += length(leg);
        key.insert(LegKey::of(leg));
    }
    key
}

/// Keeps the cheapest few itineraries among those sharing main legs.
///
/// Each group keeps one itinerary when there are at least `min_limit`
/// groups, otherwise `ceil(min_limit / groups)`. Survivors keep their
/// relative order.
#[derive(Debug, Clone)]
pub struct GroupBySimilarLegsFilter {
    name: String,
    group_by_p: f64,
    min_limit: usize,
}

impl GroupBySimilarLegsFilter {
    pub fn new(group_by_p: f64, min_limit: usize) -> Self {
        Self {
            name: format!("group-by-legs-filter@{group_by_p}"),
            group_by_p,
            min_limit,
        }
    }
}

impl ItineraryFilter for GroupBySimilarLegsFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn filter(&self, itineraries: Vec<Itinerary>) -> Vec<Itinerary> {
        // Group members as indices into `itineraries`, in first-seen order
        let mut keys: Vec<BTreeSet<LegKey>> = Vec::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();

        for (index, itinerary) in itineraries.iter().enumerate() {
            let key = main_legs(itinerary, self.group_by_p);
            let existing = if key.is_empty() {
                None
            } else {
                keys.iter().position(|k| *k == key)
            };
            match existing {
                Some(group) => groups[group].push(index),
                None => {
                    keys.push(key);
                    groups.push(vec![index]);
                }
            }
        }

        let keep_per_group = if groups.is_empty() || groups.len() >= self.min_limit {
            1
        } else {
            self.min_limit.div_ceil(groups.len())
        };

        let mut keep = vec![false; itineraries.len()];
        for mut group in groups {
            group.sort_by_key(|&i| itineraries[i].generalized_cost());
            for &i in group.iter().take(keep_per_group) {
                keep[i] = true;
            }
        }

        itineraries
            .into_iter()
            .zip(keep)
            .filter_map(|(itinerary, keep)| keep.then_some(itinerary))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;

    #[test]
    fn keeps_cheapest_of_same_trip() {
        let filter = GroupBySimilarLegsFilter::new(0.85, 1);
        let cheap = itinerary("A").bus("T1", "09:00", "09:30", "B").cost(500).build();
        let pricey = itinerary("A")
            .walk("08:50", "09:00", "A")
            .bus("T1", "09:00", "09:30", "B")
            .cost(700)
            .build();
        let other = itinerary("A").bus("T2", "09:10", "09:40", "B").cost(900).build();
        let expected = vec![cheap.id(), other.id()];

        let result = filter.filter(vec![pricey, cheap, other]);

        assert_eq!(ids(&result), expected);
    }

    #[test]
    fn short_legs_do_not_split_groups() {
        let filter = GroupBySimilarLegsFilter::new(0.8, 1);
        let direct = itinerary("A")
            .bus("T1", "09:00", "10:00", "C")
            .distance(50_000.0)
            .cost(4000)
            .build();
        let with_feeder = itinerary("X")
            .bus("F", "08:50", "08:55", "A")
            .distance(500.0)
            .bus("T1", "09:00", "10:00", "C")
            .distance(50_000.0)
            .cost(3000)
            .build();
        let expected = vec![with_feeder.id()];

        let result = filter.filter(vec![direct, with_feeder]);

        assert_eq!(ids(&result), expected);
    }

    #[test]
    fn few_groups_keep_more_each() {
        let filter = GroupBySimilarLegsFilter::new(0.68, 3);
        let a = itinerary("A").bus("T1", "09:00", "09:30", "B").cost(100).build();
        let b = itinerary("A").bus("T1", "09:00", "09:30", "B").cost(200).build();
        let c = itinerary("A").bus("T1", "09:00", "09:30", "B").cost(300).build();
        let d = itinerary("A").bus("T2", "09:10", "09:40", "B").cost(400).build();
        let e = itinerary("A").bus("T2", "09:10", "09:40", "B").cost(500).build();
        let f = itinerary("A").bus("T2", "09:10", "09:40", "B").cost(600).build();
        let expected = vec![a.id(), b.id(), d.id(), e.id()];

        // Two groups, three wanted: keep two per group
        let result = filter.filter(vec![a, b, c, d, e, f]);

        assert_eq!(ids(&result), expected);
    }

    #[test]
    fn street_only_itineraries_are_never_grouped() {
        let filter = GroupBySimilarLegsFilter::new(0.85, 1);
        let walk = itinerary("A").walk("09:00", "09:50", "B").cost(1000).build();
        let bike = itinerary("A").bicycle("09:00", "09:20", "B").cost(800).build();
        let expected = vec![walk.id(), bike.id()];

        let result = filter.filter(vec![walk, bike]);

        assert_eq!(ids(&result), expected);
    }

    #[test]
    fn name_carries_threshold() {
        assert_eq!(
            GroupBySimilarLegsFilter::new(0.85, 1).name(),
            "group-by-legs-filter@0.85"
        );
    }
}
