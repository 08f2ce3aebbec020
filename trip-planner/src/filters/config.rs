//! Filter chain configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ItineraryFilterChainBuilder;

/// Hard cap on itineraries kept by any chain.
pub(crate) const MAX_NUMBER_OF_ITINERARIES: i32 = 200;

/// Number of itineraries kept per similarity group when the request asks
/// for none in particular.
const DEFAULT_KEEP_NUM: i32 = 3;

/// Threshold at which a similarity option turns its grouping on.
const GROUP_BY_ENABLED: f64 = 0.5;

/// Error from validating a filter configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Limits must be -1 (unset) or non-negative
    #[error("invalid {name}: {value} (use -1 to disable)")]
    InvalidLimit { name: &'static str, value: i32 },

    /// Similarity thresholds are fractions
    #[error("invalid {name}: {value} (must be between 0.0 and 1.0)")]
    InvalidSimilarity { name: &'static str, value: f64 },

    /// Cost function could not be parsed
    #[error("invalid cost function '{0}' (expected 'a + b x')")]
    CostFunctionFormat(String),

    /// Cost function would not bound costs from above
    #[error(
        "invalid cost function {constant} + {coefficient} x: constant must be >= 0 and coefficient >= 1.0"
    )]
    CostFunctionRange { constant: f64, coefficient: f64 },

    /// Distances cannot be negative
    #[error("invalid {name}: {value} metres")]
    InvalidDistance { name: &'static str, value: f64 },
}

/// A linear function `f(x) = constant + coefficient * x`.
///
/// # Examples
///
/// ```
/// use trip_planner::filters::CostLinearFunction;
///
/// let f = CostLinearFunction::parse("1800 + 2.0 x").unwrap();
/// assert_eq!(f.apply(5000.0), 11800.0);
///
/// assert!(CostLinearFunction::parse("2.0 x").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CostLinearFunction {
    constant: f64,
    coefficient: f64,
}

impl CostLinearFunction {
    /// Create a function; only finite parameters are accepted here.
    /// Range checks happen in [`CostLinearFunction::validate`].
    pub fn new(constant: f64, coefficient: f64) -> Result<Self, ConfigError> {
        if !constant.is_finite() || !coefficient.is_finite() {
            return Err(ConfigError::CostFunctionRange {
                constant,
                coefficient,
            });
        }
        Ok(Self {
            constant,
            coefficient,
        })
    }

    /// Parse the string form `"a + b x"`.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let format_error = || ConfigError::CostFunctionFormat(s.to_string());

        let (constant, rest) = s.split_once('+').ok_or_else(format_error)?;
        let coefficient = rest
            .trim()
            .strip_suffix('x')
            .ok_or_else(format_error)?
            .trim();

        let constant: f64 = constant.trim().parse().map_err(|_| format_error())?;
        let coefficient: f64 = coefficient.parse().map_err(|_| format_error())?;
        Self::new(constant, coefficient)
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    pub fn apply(&self, x: f64) -> f64 {
        self.constant + self.coefficient * x
    }

    /// A usable limit never falls below its input.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.constant < 0.0 || self.coefficient < 1.0 {
            return Err(ConfigError::CostFunctionRange {
                constant: self.constant,
                coefficient: self.coefficient,
            });
        }
        Ok(())
    }
}

impl fmt::Display for CostLinearFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {} x", self.constant, self.coefficient)
    }
}

impl TryFrom<String> for CostLinearFunction {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        CostLinearFunction::parse(&s)
    }
}

impl From<CostLinearFunction> for String {
    fn from(f: CostLinearFunction) -> Self {
        f.to_string()
    }
}

/// User-facing filter options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterConfig {
    /// Keep one itinerary per group sharing at least this share of distance.
    pub group_similarity_keep_one: f64,

    /// Keep a few itineraries per group sharing at least this share of distance.
    pub group_similarity_keep_num_of_itineraries: f64,

    pub transit_generalized_cost_limit: CostLinearFunction,

    pub non_transit_generalized_cost_limit: CostLinearFunction,

    /// `-1` lets the request decide.
    pub max_number_of_itineraries: i32,

    /// `-1` to disable.
    pub max_number_of_on_street_only_itineraries: i32,

    pub remove_transit_with_higher_cost_than_best_on_street_only: bool,

    /// Tag removed itineraries instead of dropping them.
    pub debug: bool,

    /// Drop bike-and-ride itineraries that cycle this far or less before
    /// the first transit leg.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_bike_parking_distance: Option<f64>,

    /// Drop park-and-ride itineraries that never leave the bicycle.
    pub park_and_ride: bool,

    /// Keep only itineraries that reach the destination on a flexible trip.
    pub flex_only_to_destination: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        let cost_limit = CostLinearFunction {
            constant: 3600.0,
            coefficient: 2.0,
        };
        Self {
            group_similarity_keep_one: 0.85,
            group_similarity_keep_num_of_itineraries: 0.68,
            transit_generalized_cost_limit: cost_limit,
            non_transit_generalized_cost_limit: cost_limit,
            max_number_of_itineraries: -1,
            max_number_of_on_street_only_itineraries: 1,
            remove_transit_with_higher_cost_than_best_on_street_only: true,
            debug: false,
            min_bike_parking_distance: None,
            park_and_ride: false,
            flex_only_to_destination: false,
        }
    }
}

impl FilterConfig {
    /// Check every option without building a chain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("groupSimilarityKeepOne", self.group_similarity_keep_one),
            (
                "groupSimilarityKeepNumOfItineraries",
                self.group_similarity_keep_num_of_itineraries,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidSimilarity { name, value });
            }
        }
        self.to_builder(false, -1).validate()
    }

    /// Map the options onto a chain builder for one search.
    ///
    /// `num_itineraries` is the number of itineraries the caller asked for,
    /// `-1` if unspecified.
    pub fn to_builder(&self, arrive_by: bool, num_itineraries: i32) -> ItineraryFilterChainBuilder {
        let mut builder = ItineraryFilterChainBuilder::new(arrive_by);

        if self.group_similarity_keep_one >= GROUP_BY_ENABLED {
            builder = builder.add_group_by_similarity(self.group_similarity_keep_one, 1);
        }

        if self.group_similarity_keep_num_of_itineraries >= GROUP_BY_ENABLED {
            let keep = if num_itineraries < 0 {
                DEFAULT_KEEP_NUM
            } else {
                num_itineraries.min(DEFAULT_KEEP_NUM)
            };
            builder =
                builder.add_group_by_similarity(self.group_similarity_keep_num_of_itineraries, keep);
        }

        // Invalid values pass through for the builder to reject
        let requested = if self.max_number_of_itineraries == -1 {
            num_itineraries
        } else {
            self.max_number_of_itineraries
        };
        let max_itineraries = if requested == -1 {
            MAX_NUMBER_OF_ITINERARIES
        } else {
            requested.min(MAX_NUMBER_OF_ITINERARIES)
        };

        builder = builder
            .with_transit_generalized_cost_limit(self.transit_generalized_cost_limit)
            .with_non_transit_generalized_cost_limit(self.non_transit_generalized_cost_limit)
            .with_max_number_of_itineraries(max_itineraries)
            .with_max_number_of_on_street_only_itineraries(
                self.max_number_of_on_street_only_itineraries,
            )
            .with_remove_transit_with_higher_cost_than_best_on_street_only(
                self.remove_transit_with_higher_cost_than_best_on_street_only,
            )
            .with_park_and_ride(self.park_and_ride)
            .with_flex_only_to_destination(self.flex_only_to_destination)
            .with_debug_enabled(self.debug);

        if let Some(distance) = self.min_bike_parking_distance {
            builder = builder.with_min_bike_parking_distance(distance);
        }

        builder
    }
}
