//! Domain types for the trip planner.
//!
//! This module contains the value types that flow through itinerary
//! composition and filtering. All types enforce their invariants at
//! construction time, so code that receives these types can trust their
//! validity.

mod error;
mod itinerary;
mod leg;
mod mode;
mod place;
mod time;

pub use error::DomainError;
pub use itinerary::{Itinerary, ItineraryId, SystemNotice};
pub use leg::Leg;
pub use mode::{RequestModes, TraverseMode};
pub use place::{Coordinate, Location, Place, StopId};
pub use time::TripTime;
