//! Travel modes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The way a leg is travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraverseMode {
    Walk,
    Bicycle,
    Car,
    Bus,
    Tram,
    Rail,
    Subway,
    Ferry,
}

impl TraverseMode {
    /// Returns true for scheduled public transport modes.
    pub fn is_transit(&self) -> bool {
        matches!(
            self,
            TraverseMode::Bus
                | TraverseMode::Tram
                | TraverseMode::Rail
                | TraverseMode::Subway
                | TraverseMode::Ferry
        )
    }

    /// Returns true for walk, bicycle and car.
    pub fn is_on_street(&self) -> bool {
        !self.is_transit()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TraverseMode::Walk => "WALK",
            TraverseMode::Bicycle => "BICYCLE",
            TraverseMode::Car => "CAR",
            TraverseMode::Bus => "BUS",
            TraverseMode::Tram => "TRAM",
            TraverseMode::Rail => "RAIL",
            TraverseMode::Subway => "SUBWAY",
            TraverseMode::Ferry => "FERRY",
        }
    }
}

impl fmt::Display for TraverseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Modes a sub-search may use, passed through unchanged to the search engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestModes {
    pub access: TraverseMode,
    pub egress: TraverseMode,
    /// Mode for a street-only itinerary, `None` to disable direct routing.
    pub direct: Option<TraverseMode>,
    pub transit: Vec<TraverseMode>,
}

impl Default for RequestModes {
    fn default() -> Self {
        Self {
            access: TraverseMode::Walk,
            egress: TraverseMode::Walk,
            direct: Some(TraverseMode::Walk),
            transit: vec![
                TraverseMode::Bus,
                TraverseMode::Tram,
                TraverseMode::Rail,
                TraverseMode::Subway,
                TraverseMode::Ferry,
            ],
        }
    }
}
