//! Journey routing through intermediate waypoints.
//!
//! A journey with waypoints is split into one point-to-point search per
//! junction. The coordinator decides which searches to run and joins their
//! results into itinerary sequences; the router drives it against a search
//! engine and filters what comes out.

mod config;
mod coordinator;
mod search;
mod sequence;
mod waypoint;
mod window;

pub use config::{MAX_WINDOW_MINS, SearchConfig};
pub use coordinator::WaypointSearchCoordinator;
pub use search::{
    InputField, JourneyRequest, Router, RoutingError, RoutingErrorCode, RoutingResponse,
    SearchError, SubSearch, SubSearchRequest, SubSearchResponse,
};
pub use sequence::{Direction, ItinerarySequence};
pub use waypoint::{Waypoint, WaypointLocation};
pub use window::{SearchWindow, SearchWindowAccumulator};
