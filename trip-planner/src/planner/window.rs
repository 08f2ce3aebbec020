//! Search windows for sub-searches.

use chrono::Duration;

use crate::domain::{Location, TripTime};

/// The time constraint of one sub-search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchWindow {
    /// Use the caller's own time and window, as for a plain point-to-point
    /// search.
    Unbounded {
        date_time: TripTime,
        search_window: Option<Duration>,
    },
    /// Cover exactly `[earliest, latest]`.
    Bounded {
        earliest: TripTime,
        latest: TripTime,
    },
}

impl SearchWindow {
    /// The request time: earliest departure for depart-after searches,
    /// latest arrival for arrive-by searches.
    pub fn anchor(&self, arrive_by: bool) -> TripTime {
        match *self {
            SearchWindow::Unbounded { date_time, .. } => date_time,
            SearchWindow::Bounded { earliest, latest } => {
                if arrive_by {
                    latest
                } else {
                    earliest
                }
            }
        }
    }

    /// Length of the window, if one is known.
    pub fn search_window(&self) -> Option<Duration> {
        match *self {
            SearchWindow::Unbounded { search_window, .. } => search_window,
            SearchWindow::Bounded { earliest, latest } => {
                Some(latest.signed_duration_since(earliest))
            }
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, SearchWindow::Unbounded { .. })
    }
}

/// Union of the instants a sub-search from (or to) one place must cover.
///
/// Starts out unbounded; each included instant widens the window to the
/// smallest interval containing every instant seen so far.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchWindowAccumulator {
    location: Location,
    min_time: Option<TripTime>,
    max_time: Option<TripTime>,
}

impl SearchWindowAccumulator {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            min_time: None,
            max_time: None,
        }
    }

    /// Widen the window to include `instant`.
    pub fn extend_to_include(&mut self, instant: TripTime) {
        self.min_time = Some(self.min_time.map_or(instant, |t| t.min(instant)));
        self.max_time = Some(self.max_time.map_or(instant, |t| t.max(instant)));
    }

    pub fn is_unbounded(&self) -> bool {
        self.min_time.is_none() && self.max_time.is_none()
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn min_time(&self) -> Option<TripTime> {
        self.min_time
    }

    pub fn max_time(&self) -> Option<TripTime> {
        self.max_time
    }

    /// Convert to a request window, falling back to the caller's time and
    /// window while unbounded.
    pub fn to_search_window(
        &self,
        date_time: TripTime,
        search_window: Option<Duration>,
    ) -> SearchWindow {
        match (self.min_time, self.max_time) {
            (Some(earliest), Some(latest)) => SearchWindow::Bounded { earliest, latest },
            _ => SearchWindow::Unbounded {
                date_time,
                search_window,
            },
        }
    }
}
