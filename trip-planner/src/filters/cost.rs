//! Generalized-cost thresholds.

use crate::domain::Itinerary;

use super::{CostLinearFunction, ItineraryFilter};

/// Drops transit itineraries costing more than `f(min transit cost)`.
#[derive(Debug, Clone)]
pub struct TransitGeneralizedCostFilter {
    cost_limit: CostLinearFunction,
}

impl TransitGeneralizedCostFilter {
    pub fn new(cost_limit: CostLinearFunction) -> Self {
        Self { cost_limit }
    }
}

impl ItineraryFilter for TransitGeneralizedCostFilter {
    fn name(&self) -> &str {
        "transit-cost-filter"
    }

    fn filter(&self, itineraries: Vec<Itinerary>) -> Vec<Itinerary> {
        let min_cost = itineraries
            .iter()
            .filter(|it| !it.is_street_only())
            .map(Itinerary::generalized_cost)
            .min();

        let Some(min_cost) = min_cost else {
            return itineraries;
        };
        let max_limit = self.cost_limit.apply(min_cost as f64);

        itineraries
            .into_iter()
            .filter(|it| it.is_street_only() || it.generalized_cost() as f64 <= max_limit)
            .collect()
    }
}

/// Drops street-only itineraries costing more than `f(min cost)`, where the
/// minimum is over every itinerary.
#[derive(Debug, Clone)]
pub struct NonTransitGeneralizedCostFilter {
    cost_limit: CostLinearFunction,
}

impl NonTransitGeneralizedCostFilter {
    pub fn new(cost_limit: CostLinearFunction) -> Self {
        Self { cost_limit }
    }
}

impl ItineraryFilter for NonTransitGeneralizedCostFilter {
    fn name(&self) -> &str {
        "non-transit-cost-filter"
    }

    fn filter(&self, itineraries: Vec<Itinerary>) -> Vec<Itinerary> {
        let Some(min_cost) = itineraries.iter().map(Itinerary::generalized_cost).min() else {
            return itineraries;
        };
        let max_limit = self.cost_limit.apply(min_cost as f64);

        itineraries
            .into_iter()
            .filter(|it| !it.is_street_only() || it.generalized_cost() as f64 <= max_limit)
            .collect()
    }
}

/// Drops transit itineraries costing more than the best street-only one.
#[derive(Debug, Clone, Default)]
pub struct RemoveTransitIfStreetOnlyIsBetterFilter;

impl ItineraryFilter for RemoveTransitIfStreetOnlyIsBetterFilter {
    fn name(&self) -> &str {
        "remove-transit-with-higher-cost-than-best-on-street-only"
    }

    fn filter(&self, itineraries: Vec<Itinerary>) -> Vec<Itinerary> {
        let best_street_only = itineraries
            .iter()
            .filter(|it| it.is_street_only())
            .map(Itinerary::generalized_cost)
            .min();

        let Some(limit) = best_street_only else {
            return itineraries;
        };

        itineraries
            .into_iter()
            .filter(|it| it.is_street_only() || it.generalized_cost() <= limit)
            .collect()
    }
}
