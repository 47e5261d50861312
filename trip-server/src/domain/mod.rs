//! Domain types for the trip planner.
//!
//! This module contains the itinerary model: trips, days, visits, and the
//! search candidates that can become visits. Validated value types enforce
//! their invariants at construction time, so code that receives them can
//! trust their validity.

mod day;
mod error;
mod time;
mod trip;
mod visit;

pub use day::{Day, WET_PRECIPITATION_THRESHOLD, Weather};
pub use error::DomainError;
pub use time::{ClockTime, MINUTES_PER_DAY, TimeError};
pub use trip::{CityRef, MAX_TRIP_DAYS, Trip, TripStatus, generate_empty_days};
pub use visit::{
    Candidate, Coordinates, INDOOR_CATEGORIES, OUTDOOR_CATEGORY, PriceLevel, Rating, Visit,
    VisitId, is_indoor, is_outdoor,
};
