//! Multi-leg trip planning through intermediate waypoints.
//!
//! Composes point-to-point searches into journeys that pass through an
//! ordered list of places, each with an allowed wait, then reduces the
//! candidates to a small ranked set with a configurable filter chain.

pub mod domain;
pub mod filters;
pub mod planner;
pub mod replay;
