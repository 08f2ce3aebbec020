//! Itinerary builders shared by filter tests.

use chrono::{NaiveDate, NaiveTime};

use crate::domain::{Itinerary, ItineraryId, Leg, Place, StopId, TraverseMode, TripTime};

/// "HH:MM" on the given date.
pub(crate) fn time_on(s: &str, date: NaiveDate) -> TripTime {
    TripTime::new(date, NaiveTime::parse_from_str(s, "%H:%M").unwrap())
}

/// "HH:MM" on the fixture service day.
pub(crate) fn time(s: &str) -> TripTime {
    time_on(s, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
}

pub(crate) fn place(name: &str) -> Place {
    Place::stop(name, StopId::new(format!("F:{name}")).unwrap(), None)
}

pub(crate) fn ids(itineraries: &[Itinerary]) -> Vec<ItineraryId> {
    itineraries.iter().map(Itinerary::id).collect()
}

/// Builds an itinerary leg by leg, each leg starting where the last ended.
pub(crate) struct ItineraryBuilder {
    at: Place,
    legs: Vec<Leg>,
    cost: Option<i64>,
}

pub(crate) fn itinerary(origin: &str) -> ItineraryBuilder {
    ItineraryBuilder {
        at: place(origin),
        legs: Vec::new(),
        cost: None,
    }
}

impl ItineraryBuilder {
    fn push(mut self, leg: Leg) -> Self {
        self.at = leg.to().clone();
        self.legs.push(leg);
        self
    }

    fn street(self, mode: TraverseMode, start: &str, end: &str, to: &str) -> Self {
        let from = self.at.clone();
        let leg = Leg::new(mode, from, place(to), time(start), time(end)).unwrap();
        self.push(leg)
    }

    pub(crate) fn walk(self, start: &str, end: &str, to: &str) -> Self {
        self.street(TraverseMode::Walk, start, end, to)
    }

    pub(crate) fn bicycle(self, start: &str, end: &str, to: &str) -> Self {
        self.street(TraverseMode::Bicycle, start, end, to)
    }

    pub(crate) fn car(self, start: &str, end: &str, to: &str) -> Self {
        self.street(TraverseMode::Car, start, end, to)
    }

    pub(crate) fn bus(self, trip: &str, start: &str, end: &str, to: &str) -> Self {
        let from = self.at.clone();
        let leg =
            Leg::transit(TraverseMode::Bus, trip, from, place(to), time(start), time(end)).unwrap();
        self.push(leg)
    }

    pub(crate) fn flex(self, trip: &str, start: &str, end: &str, to: &str) -> Self {
        let from = self.at.clone();
        let leg = Leg::transit(TraverseMode::Bus, trip, from, place(to), time(start), time(end))
            .unwrap()
            .with_flexible_trip(true);
        self.push(leg)
    }

    /// Set the distance of the most recent leg.
    pub(crate) fn distance(mut self, meters: f64) -> Self {
        if let Some(leg) = self.legs.pop() {
            self.legs.push(leg.with_distance(meters));
        }
        self
    }

    /// Mark the most recent leg as walking a bicycle.
    pub(crate) fn walking_bike(mut self) -> Self {
        if let Some(leg) = self.legs.pop() {
            self.legs.push(leg.with_walking_bike(true));
        }
        self
    }

    pub(crate) fn cost(mut self, cost: i64) -> Self {
        self.cost = Some(cost);
        self
    }

    pub(crate) fn build(self) -> Itinerary {
        let itinerary = Itinerary::new(self.legs).unwrap();
        match self.cost {
            Some(cost) => itinerary.with_generalized_cost(cost),
            None => itinerary,
        }
    }
}
