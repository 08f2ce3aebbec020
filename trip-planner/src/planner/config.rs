//! Search configuration for the router.

use chrono::Duration;
use serde::Deserialize;

use super::search::SearchError;

/// Longest waypoint wait or search window accepted (one day, in minutes).
pub const MAX_WINDOW_MINS: i64 = 24 * 60;

/// Configuration parameters for routing via waypoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Upper bound for any waypoint wait time (minutes).
    /// Requests asking for a longer wait are rejected.
    pub max_wait_mins: i64,

    /// Minimum wait at an intermediate waypoint that does not set one (minutes).
    pub transfer_slack_mins: i64,

    /// Search window forwarded to unbounded sub-searches (minutes).
    /// `None` lets the search engine pick its own window.
    pub default_search_window_mins: Option<i64>,

    /// Hard cap on the number of itineraries requested per search.
    pub max_number_of_itineraries: usize,
}

impl SearchConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        max_wait_mins: i64,
        transfer_slack_mins: i64,
        default_search_window_mins: Option<i64>,
        max_number_of_itineraries: usize,
    ) -> Self {
        Self {
            max_wait_mins,
            transfer_slack_mins,
            default_search_window_mins,
            max_number_of_itineraries,
        }
    }

    /// Check every minute value is within `0..=MAX_WINDOW_MINS`, and that
    /// the transfer slack fits under the maximum wait.
    pub fn validate(&self) -> Result<(), SearchError> {
        let out_of_range = |name, value| SearchError::InvalidConfig { name, value };

        if !(0..=MAX_WINDOW_MINS).contains(&self.max_wait_mins) {
            return Err(out_of_range("max_wait_mins", self.max_wait_mins));
        }
        if !(0..=self.max_wait_mins).contains(&self.transfer_slack_mins) {
            return Err(out_of_range("transfer_slack_mins", self.transfer_slack_mins));
        }
        if let Some(mins) = self.default_search_window_mins {
            if !(0..=MAX_WINDOW_MINS).contains(&mins) {
                return Err(out_of_range("default_search_window_mins", mins));
            }
        }
        Ok(())
    }

    /// Returns the maximum waypoint wait as a Duration.
    ///
    /// Out-of-range values are clamped; [`validate`](Self::validate) reports them.
    pub fn max_wait(&self) -> Duration {
        clamped_minutes(self.max_wait_mins)
    }

    /// Returns the transfer slack as a Duration.
    pub fn transfer_slack(&self) -> Duration {
        clamped_minutes(self.transfer_slack_mins)
    }

    /// Returns the default search window as a Duration, if any.
    pub fn default_search_window(&self) -> Option<Duration> {
        self.default_search_window_mins.map(clamped_minutes)
    }
}

fn clamped_minutes(mins: i64) -> Duration {
    Duration::minutes(mins.clamp(0, MAX_WINDOW_MINS))
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_wait_mins: 180, // 3 hours
            transfer_slack_mins: 0,
            default_search_window_mins: None,
            max_number_of_itineraries: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SearchConfig::default();

        assert_eq!(config.max_wait_mins, 180);
        assert_eq!(config.transfer_slack_mins, 0);
        assert_eq!(config.default_search_window_mins, None);
        assert_eq!(config.max_number_of_itineraries, 200);
    }

    #[test]
    fn duration_methods() {
        let config = SearchConfig::new(60, 2, Some(40), 50);

        assert_eq!(config.max_wait(), Duration::minutes(60));
        assert_eq!(config.transfer_slack(), Duration::minutes(2));
        assert_eq!(config.default_search_window(), Some(Duration::minutes(40)));
    }

    #[test]
    fn default_config_is_valid() {
        assert!(SearchConfig::default().validate().is_ok());
        assert!(SearchConfig::new(MAX_WINDOW_MINS, 10, Some(0), 5).validate().is_ok());
    }

    #[test]
    fn out_of_range_minutes_rejected() {
        let cases = [
            (SearchConfig::new(MAX_WINDOW_MINS + 1, 0, None, 200), "max_wait_mins"),
            (SearchConfig::new(-1, 0, None, 200), "max_wait_mins"),
            (SearchConfig::new(60, 61, None, 200), "transfer_slack_mins"),
            (SearchConfig::new(60, -2, None, 200), "transfer_slack_mins"),
            (
                SearchConfig::new(60, 0, Some(i64::MAX), 200),
                "default_search_window_mins",
            ),
        ];

        for (config, field) in cases {
            match config.validate() {
                Err(SearchError::InvalidConfig { name, .. }) => assert_eq!(name, field),
                other => panic!("expected {field} to be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn huge_minutes_are_clamped_not_panicking() {
        let config = SearchConfig::new(i64::MAX, i64::MIN, Some(i64::MAX), 200);

        assert_eq!(config.max_wait(), Duration::minutes(MAX_WINDOW_MINS));
        assert_eq!(config.transfer_slack(), Duration::zero());
        assert_eq!(
            config.default_search_window(),
            Some(Duration::minutes(MAX_WINDOW_MINS))
        );
    }

    #[test]
    fn deserialize_partial() {
        let config: SearchConfig = serde_json::from_str(r#"{"transfer_slack_mins": 3}"#).unwrap();

        assert_eq!(config.transfer_slack_mins, 3);
        assert_eq!(config.max_wait_mins, 180);
    }
}
