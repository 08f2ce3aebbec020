//! Top-level routing through optional waypoints.
//!
//! A journey without intermediate waypoints is one sub-search, filtered
//! once. A journey with waypoints is driven step by step through a
//! [`WaypointSearchCoordinator`]; every sub-search result is filtered on its
//! own, joined onto the growing sequences, and the finished sequences are
//! filtered again as complete itineraries.

use std::future::Future;
use std::sync::{Arc, Mutex};

use chrono::Duration;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::domain::{DomainError, Itinerary, Location, RequestModes, TripTime};
use crate::filters::{
    ConfigError, FilterChain, FilterConfig, ItineraryFilterChainBuilder, MaxLimitSubscriber,
};

use super::config::{MAX_WINDOW_MINS, SearchConfig};
use super::coordinator::WaypointSearchCoordinator;
use super::sequence::Direction;
use super::waypoint::{Waypoint, WaypointLocation};
use super::window::SearchWindow;

/// Error from routing a journey.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    /// Invalid journey request
    #[error("invalid search request: {0}")]
    InvalidRequest(String),

    /// Router configuration out of range
    #[error("invalid search config: {name} = {value} minutes")]
    InvalidConfig { name: &'static str, value: i64 },

    /// The search engine failed for a reason other than a routing error
    #[error("search backend failed: {message}")]
    Backend { message: String },

    /// Invalid filter configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A composed itinerary could not be built
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Why a sub-search found nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingErrorCode {
    /// No stop within reach of an access or egress search
    NoStopsInRange,
    /// No path within the search window
    NoTransitConnection,
    /// The date is outside the loaded timetable
    OutsideServicePeriod,
}

/// The part of a request a routing error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputField {
    FromPlace,
    ToPlace,
    DateTime,
}

/// A non-fatal routing failure reported by a sub-search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingError {
    pub code: RoutingErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_field: Option<InputField>,
}

impl RoutingError {
    pub fn new(code: RoutingErrorCode, input_field: Option<InputField>) -> Self {
        Self { code, input_field }
    }
}

/// One point-to-point search handed to the search engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SubSearchRequest {
    pub from: Location,
    pub to: Location,
    pub arrive_by: bool,
    pub window: SearchWindow,
    pub modes: RequestModes,
}

/// What the search engine found for one [`SubSearchRequest`].
#[derive(Debug, Clone, Default)]
pub struct SubSearchResponse {
    pub itineraries: Vec<Itinerary>,

    pub routing_errors: Vec<RoutingError>,

    /// The window the engine actually searched, if it chose one.
    pub search_window_used: Option<Duration>,

    /// Itineraries used only to bound the search; never shown.
    pub pruning_itineraries: Vec<Itinerary>,
}

impl SubSearchResponse {
    pub fn new(itineraries: Vec<Itinerary>) -> Self {
        Self {
            itineraries,
            ..Self::default()
        }
    }

    pub fn with_routing_error(mut self, error: RoutingError) -> Self {
        self.routing_errors.push(error);
        self
    }

    pub fn with_search_window_used(mut self, window: Duration) -> Self {
        self.search_window_used = Some(window);
        self
    }

    pub fn with_pruning_itineraries(mut self, itineraries: Vec<Itinerary>) -> Self {
        self.pruning_itineraries = itineraries;
        self
    }
}

/// The point-to-point search engine the router composes.
///
/// This abstraction allows the router to be tested with canned results.
pub trait SubSearch {
    /// Search between two locations within a window.
    ///
    /// Routing failures are reported in the response; `Err` is for the
    /// engine itself failing.
    fn search(
        &self,
        request: &SubSearchRequest,
    ) -> impl Future<Output = Result<SubSearchResponse, SearchError>> + Send;
}

/// A journey as asked for by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyRequest {
    pub from: Location,

    pub to: Location,

    /// Places to pass through, in order.
    #[serde(default)]
    pub intermediate: Vec<Waypoint>,

    /// Earliest departure, or latest arrival when `arrive_by` is set.
    pub date_time: TripTime,

    #[serde(default)]
    pub arrive_by: bool,

    /// Search window (minutes); the configured default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_window_mins: Option<i64>,

    /// Number of itineraries wanted, `-1` for no preference.
    #[serde(default = "no_preference")]
    pub num_itineraries: i32,

    #[serde(default)]
    pub modes: RequestModes,
}

fn no_preference() -> i32 {
    -1
}

impl JourneyRequest {
    pub fn new(from: Location, to: Location, date_time: TripTime) -> Self {
        Self {
            from,
            to,
            intermediate: Vec::new(),
            date_time,
            arrive_by: false,
            search_window_mins: None,
            num_itineraries: no_preference(),
            modes: RequestModes::default(),
        }
    }

    pub fn via(mut self, waypoint: Waypoint) -> Self {
        self.intermediate.push(waypoint);
        self
    }

    pub fn arrive_by(mut self, arrive_by: bool) -> Self {
        self.arrive_by = arrive_by;
        self
    }

    pub fn with_search_window_mins(mut self, mins: i64) -> Self {
        self.search_window_mins = Some(mins);
        self
    }

    pub fn with_num_itineraries(mut self, n: i32) -> Self {
        self.num_itineraries = n;
        self
    }

    pub fn direction(&self) -> Direction {
        Direction::from_arrive_by(self.arrive_by)
    }

    /// Validate the request shape.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.num_itineraries < -1 {
            return Err(SearchError::InvalidRequest(format!(
                "num_itineraries must be -1 or non-negative, got {}",
                self.num_itineraries
            )));
        }
        self.search_window()?;

        let horizon = Duration::minutes(2 * MAX_WINDOW_MINS);
        if self.date_time.checked_add(horizon).is_none()
            || self.date_time.checked_sub(horizon).is_none()
        {
            return Err(SearchError::InvalidRequest(format!(
                "date_time {:?} is out of range",
                self.date_time
            )));
        }
        Ok(())
    }

    /// The requested search window, checked against `0..=MAX_WINDOW_MINS`.
    pub fn search_window(&self) -> Result<Option<Duration>, SearchError> {
        let Some(mins) = self.search_window_mins else {
            return Ok(None);
        };
        if !(0..=MAX_WINDOW_MINS).contains(&mins) {
            return Err(SearchError::InvalidRequest(format!(
                "search window must be between 0 and {MAX_WINDOW_MINS} minutes, got {mins}"
            )));
        }
        Ok(Some(Duration::minutes(mins)))
    }

    /// `[origin, ..intermediates, destination]` with resolved wait times.
    pub fn locations(&self, config: &SearchConfig) -> Result<Vec<WaypointLocation>, SearchError> {
        let mut locations = Vec::with_capacity(self.intermediate.len() + 2);
        locations.push(WaypointLocation::new(self.from.clone()));
        for waypoint in &self.intermediate {
            let location = waypoint
                .resolve(config.transfer_slack(), config.max_wait())
                .map_err(|e| SearchError::InvalidRequest(e.to_string()))?;
            locations.push(location);
        }
        locations.push(WaypointLocation::new(self.to.clone()));
        Ok(locations)
    }
}

/// The filtered itineraries for one journey request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoutingResponse {
    pub itineraries: Vec<Itinerary>,

    pub routing_errors: Vec<RoutingError>,

    /// The first itinerary cut by the count limit, for paging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_removed_itinerary: Option<Itinerary>,

    /// Number of sub-searches issued.
    pub sub_searches: usize,
}

/// Captures the first itinerary a count limit drops.
#[derive(Clone, Default)]
struct FirstRemoved(Arc<Mutex<Option<Itinerary>>>);

impl FirstRemoved {
    fn subscriber(&self) -> MaxLimitSubscriber {
        let slot = Arc::clone(&self.0);
        Arc::new(move |itinerary: &Itinerary| {
            if let Ok(mut slot) = slot.lock() {
                slot.get_or_insert_with(|| itinerary.clone());
            }
        })
    }

    fn take(&self) -> Option<Itinerary> {
        self.0.lock().ok().and_then(|mut slot| slot.take())
    }
}

/// Routes journeys by composing sub-searches.
pub struct Router<'a, S: SubSearch> {
    search: &'a S,
    config: &'a SearchConfig,
    filter_config: &'a FilterConfig,
}

impl<'a, S: SubSearch> Router<'a, S> {
    pub fn new(search: &'a S, config: &'a SearchConfig, filter_config: &'a FilterConfig) -> Self {
        Self {
            search,
            config,
            filter_config,
        }
    }

    /// Route a journey, through its waypoints if it has any.
    ///
    /// An empty result is not an error: it comes back with whatever routing
    /// errors the sub-searches reported.
    pub async fn route(&self, request: &JourneyRequest) -> Result<RoutingResponse, SearchError> {
        self.config.validate()?;
        request.validate()?;
        self.filter_config.validate()?;
        let locations = request.locations(self.config)?;

        let search_window = request
            .search_window()?
            .or(self.config.default_search_window());

        if request.intermediate.is_empty() {
            self.route_direct(request, search_window).await
        } else {
            self.route_via(request, locations, search_window).await
        }
    }

    async fn route_direct(
        &self,
        request: &JourneyRequest,
        search_window: Option<Duration>,
    ) -> Result<RoutingResponse, SearchError> {
        let sub_request = SubSearchRequest {
            from: request.from.clone(),
            to: request.to.clone(),
            arrive_by: request.arrive_by,
            window: SearchWindow::Unbounded {
                date_time: request.date_time,
                search_window,
            },
            modes: request.modes.clone(),
        };

        trace!(?sub_request, "Searching direct");
        let response = self.search.search(&sub_request).await?;
        log_routing_errors(&sub_request, &response.routing_errors);

        let first_removed = FirstRemoved::default();
        let builder = self
            .filter_config
            .to_builder(request.arrive_by, self.requested_count(request))
            .with_max_limit_reached_subscriber(first_removed.subscriber());
        let chain = with_sub_search_limits(builder, &sub_request, &response).build()?;
        let itineraries = chain.filter(response.itineraries);

        Ok(RoutingResponse {
            itineraries,
            routing_errors: response.routing_errors,
            first_removed_itinerary: first_removed.take(),
            sub_searches: 1,
        })
    }

    async fn route_via(
        &self,
        request: &JourneyRequest,
        locations: Vec<WaypointLocation>,
        search_window: Option<Duration>,
    ) -> Result<RoutingResponse, SearchError> {
        let mut coordinator = WaypointSearchCoordinator::new(
            request.direction(),
            locations,
            request.date_time,
            search_window,
            request.modes.clone(),
        )?;

        let mut routing_errors = Vec::new();
        let mut sub_searches = 0;
        let mut step = 0;

        while coordinator.has_next_location() {
            coordinator.next_location();
            step += 1;

            let windows = coordinator.collect_search_windows();
            let sub_requests: Vec<SubSearchRequest> = windows
                .iter()
                .filter_map(|window| coordinator.build_sub_request(window))
                .collect();

            debug!(step, windows = sub_requests.len(), "Searching waypoint step");

            let responses = join_all(sub_requests.iter().map(|sub_request| {
                trace!(?sub_request, "Searching sub-request");
                self.search.search(sub_request)
            }))
            .await;
            sub_searches += sub_requests.len();

            let mut found = Vec::new();
            for (sub_request, response) in sub_requests.iter().zip(responses) {
                let response = response?;
                log_routing_errors(sub_request, &response.routing_errors);
                routing_errors.extend_from_slice(&response.routing_errors);

                // In debug mode tagged itineraries survive this chain too, and
                // the composites built from them carry no notices.
                let chain = self.sub_search_chain(sub_request, &response)?;
                found.extend(chain.filter(response.itineraries));
            }

            coordinator.merge_results(found);
            debug!(
                step,
                sequences = coordinator.sequences().len(),
                "Merged waypoint step"
            );

            if !coordinator.has_sequences() {
                break;
            }
        }

        let first_removed = FirstRemoved::default();
        let chain = self
            .filter_config
            .to_builder(request.arrive_by, self.requested_count(request))
            .with_max_limit_reached_subscriber(first_removed.subscriber())
            .build()?;
        let itineraries = chain.filter(coordinator.itineraries()?);

        Ok(RoutingResponse {
            itineraries,
            routing_errors,
            first_removed_itinerary: first_removed.take(),
            sub_searches,
        })
    }

    /// The chain applied to one sub-search before its results are merged.
    fn sub_search_chain(
        &self,
        sub_request: &SubSearchRequest,
        response: &SubSearchResponse,
    ) -> Result<FilterChain, ConfigError> {
        let builder = self
            .filter_config
            .to_builder(sub_request.arrive_by, -1)
            .with_max_number_of_itineraries(self.max_itineraries());
        with_sub_search_limits(builder, sub_request, response).build()
    }

    fn requested_count(&self, request: &JourneyRequest) -> i32 {
        if request.num_itineraries < 0 {
            return request.num_itineraries;
        }
        request.num_itineraries.min(self.max_itineraries())
    }

    fn max_itineraries(&self) -> i32 {
        i32::try_from(self.config.max_number_of_itineraries).unwrap_or(i32::MAX)
    }
}

/// Add the cutoff and pruning set a sub-search response calls for.
fn with_sub_search_limits(
    mut builder: ItineraryFilterChainBuilder,
    sub_request: &SubSearchRequest,
    response: &SubSearchResponse,
) -> ItineraryFilterChainBuilder {
    if let Some(cutoff) = latest_departure_cutoff(sub_request, response) {
        builder = builder.with_latest_departure_time_limit(cutoff);
    }
    builder.with_pruning_itineraries(&response.pruning_itineraries)
}

/// Depart-after searches that report the window they used drop results
/// departing after it.
fn latest_departure_cutoff(
    sub_request: &SubSearchRequest,
    response: &SubSearchResponse,
) -> Option<TripTime> {
    if sub_request.arrive_by {
        return None;
    }
    let used = response.search_window_used?;
    if used <= Duration::zero() {
        return None;
    }
    sub_request.window.anchor(false).checked_add(used)
}

fn log_routing_errors(sub_request: &SubSearchRequest, errors: &[RoutingError]) {
    if errors.is_empty() {
        return;
    }
    warn!(
        from = ?sub_request.from,
        to = ?sub_request.to,
        ?errors,
        "Sub-search reported routing errors"
    );
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
