//! Replaying recorded journeys.
//!
//! A scenario file holds a journey request, the configuration to route it
//! with, and the itineraries a search engine returned for it. Replaying
//! answers every sub-search from those canned itineraries, so a routing
//! run can be reproduced without a live engine.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::Itinerary;
use crate::filters::FilterConfig;
use crate::planner::{
    InputField, JourneyRequest, RoutingError, RoutingErrorCode, SearchConfig, SearchError,
    SearchWindow, SubSearch, SubSearchRequest, SubSearchResponse,
};

/// Error loading a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// Scenario file could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Scenario file is not a valid scenario
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A recorded journey.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub request: JourneyRequest,

    #[serde(default)]
    pub filters: FilterConfig,

    #[serde(default)]
    pub search: SearchConfig,

    /// Everything the search engine could return.
    pub itineraries: Vec<Itinerary>,
}

impl Scenario {
    /// Load a scenario from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ReplayError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// A search engine answering from this scenario's itineraries.
    pub fn search(&self) -> ReplaySearch {
        ReplaySearch::new(self.itineraries.clone())
    }
}

/// Answers sub-searches from a fixed set of itineraries.
///
/// An itinerary answers a request when it runs between the requested
/// locations on the right side of the request time: departing at or after
/// it for depart-after searches, arriving at or before it for arrive-by
/// searches. The request's window length is reported back as the window
/// used.
#[derive(Debug, Clone)]
pub struct ReplaySearch {
    itineraries: Vec<Itinerary>,
}

impl ReplaySearch {
    pub fn new(itineraries: Vec<Itinerary>) -> Self {
        Self { itineraries }
    }

    fn answer(&self, request: &SubSearchRequest) -> SubSearchResponse {
        let anchor = request.window.anchor(request.arrive_by);

        let from_origin: Vec<&Itinerary> = self
            .itineraries
            .iter()
            .filter(|it| request.from.matches(it.from_place()))
            .collect();
        if from_origin.is_empty() {
            return no_result(RoutingErrorCode::NoStopsInRange, Some(InputField::FromPlace));
        }

        let between: Vec<&Itinerary> = from_origin
            .into_iter()
            .filter(|it| request.to.matches(it.to_place()))
            .collect();
        if between.is_empty() {
            return no_result(RoutingErrorCode::NoStopsInRange, Some(InputField::ToPlace));
        }

        if !between
            .iter()
            .any(|it| it.start_time().date() == anchor.date() || it.end_time().date() == anchor.date())
        {
            return no_result(
                RoutingErrorCode::OutsideServicePeriod,
                Some(InputField::DateTime),
            );
        }

        let found: Vec<Itinerary> = between
            .into_iter()
            .filter(|it| {
                if request.arrive_by {
                    it.end_time() <= anchor
                } else {
                    it.start_time() >= anchor
                }
            })
            .cloned()
            .collect();
        if found.is_empty() {
            return no_result(RoutingErrorCode::NoTransitConnection, None);
        }

        let response = SubSearchResponse::new(found);
        match window_used(&request.window) {
            Some(window) => response.with_search_window_used(window),
            None => response,
        }
    }
}

fn no_result(code: RoutingErrorCode, input_field: Option<InputField>) -> SubSearchResponse {
    SubSearchResponse::default().with_routing_error(RoutingError::new(code, input_field))
}

fn window_used(window: &SearchWindow) -> Option<chrono::Duration> {
    window
        .search_window()
        .filter(|w| *w > chrono::Duration::zero())
}

impl SubSearch for ReplaySearch {
    async fn search(&self, request: &SubSearchRequest) -> Result<SubSearchResponse, SearchError> {
        Ok(self.answer(request))
    }
}
