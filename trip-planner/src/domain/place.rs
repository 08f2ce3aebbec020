//! Places, coordinates and stop references.
//!
//! A `Place` is where a leg starts or ends. A `Location` is what a caller
//! asks to travel from or to. Sub-search results are stitched together by
//! comparing places with [`Place::same_location`].

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::DomainError;

/// Two coordinates closer than this (in degrees) are the same location.
const COORDINATE_EPSILON: f64 = 1.0e-7;

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = DomainError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.lat, raw.lon)
    }
}

impl Coordinate {
    /// Create a coordinate, rejecting values outside the WGS84 range.
    pub fn new(lat: f64, lon: f64) -> Result<Self, DomainError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(DomainError::InvalidCoordinate { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Returns true if both coordinates are equal within tolerance.
    pub fn same_location(&self, other: &Coordinate) -> bool {
        (self.lat - other.lat).abs() < COORDINATE_EPSILON
            && (self.lon - other.lon).abs() < COORDINATE_EPSILON
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lon)
    }
}

/// A feed-scoped stop identifier.
///
/// The only validation is that the identifier is non-empty.
///
/// # Examples
///
/// ```
/// use trip_planner::domain::StopId;
///
/// let stop = StopId::new("RB:NSR:Quay:1").unwrap();
/// assert_eq!(stop.as_str(), "RB:NSR:Quay:1");
///
/// assert!(StopId::new("").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StopId(String);

impl StopId {
    pub fn new(s: impl Into<String>) -> Result<Self, DomainError> {
        let s = s.into();
        if s.is_empty() {
            return Err(DomainError::EmptyStopId);
        }
        Ok(StopId(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StopId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        StopId::new(s)
    }
}

impl From<StopId> for String {
    fn from(id: StopId) -> Self {
        id.0
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A point along a journey: a coordinate and/or a stop, with a display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_id: Option<StopId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
}

impl Place {
    /// A place at a transit stop.
    pub fn stop(name: impl Into<String>, stop_id: StopId, coordinate: Option<Coordinate>) -> Self {
        Self {
            name: name.into(),
            stop_id: Some(stop_id),
            coordinate,
        }
    }

    /// A place identified only by its coordinate.
    pub fn at(name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            name: name.into(),
            stop_id: None,
            coordinate: Some(coordinate),
        }
    }

    /// Returns true if both places denote the same location.
    ///
    /// Places match when their coordinates are equal within tolerance, or
    /// when both reference the same stop.
    pub fn same_location(&self, other: &Place) -> bool {
        if let (Some(a), Some(b)) = (&self.coordinate, &other.coordinate) {
            if a.same_location(b) {
                return true;
            }
        }
        matches!((&self.stop_id, &other.stop_id), (Some(a), Some(b)) if a == b)
    }

    /// Deterministic ordering: by stop id, then longitude, then latitude.
    /// Places without a stop or coordinate sort last.
    pub fn cmp_by_reference(&self, other: &Place) -> Ordering {
        let stops = match (&self.stop_id, &other.stop_id) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        stops.then_with(|| match (&self.coordinate, &other.coordinate) {
            (Some(a), Some(b)) => a
                .lon
                .total_cmp(&b.lon)
                .then_with(|| a.lat.total_cmp(&b.lat)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.stop_id, &self.coordinate) {
            (Some(stop), _) => write!(f, "{} ({})", self.name, stop),
            (None, Some(coordinate)) => write!(f, "{} {}", self.name, coordinate),
            (None, None) => f.write_str(&self.name),
        }
    }
}

/// A location requested by the caller: a stop, a coordinate, or both.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_id: Option<StopId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
}

impl Location {
    pub fn stop(stop_id: StopId) -> Self {
        Self {
            label: None,
            stop_id: Some(stop_id),
            coordinate: None,
        }
    }

    pub fn at(coordinate: Coordinate) -> Self {
        Self {
            label: None,
            stop_id: None,
            coordinate: Some(coordinate),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Returns true if a place resolves to this location.
    pub fn matches(&self, place: &Place) -> bool {
        let as_place = Place::from(self);
        as_place.same_location(place)
    }
}

impl From<&Place> for Location {
    fn from(place: &Place) -> Self {
        Self {
            label: Some(place.name.clone()),
            stop_id: place.stop_id.clone(),
            coordinate: place.coordinate,
        }
    }
}

impl From<&Location> for Place {
    fn from(location: &Location) -> Self {
        Self {
            name: location.label.clone().unwrap_or_default(),
            stop_id: location.stop_id.clone(),
            coordinate: location.coordinate,
        }
    }
}
