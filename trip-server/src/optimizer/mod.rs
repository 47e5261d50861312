//! Strategy optimizer.
//!
//! Reorders every day of a trip with a named strategy, re-allocates
//! times, and measures the change against the original schedule.

mod error;
mod metrics;
mod phase;
mod pipeline;
mod report;
mod strategy;

pub use error::OptimizeError;
pub use metrics::{TripMetrics, day_distance_km, straight_line_km, weather_inversions};
pub use phase::{CancelToken, Phase, PhaseRecord};
pub use pipeline::{OptimizationResult, Optimizer, OptimizerState};
pub use report::{EstimatedSavings, ImprovementReport, OptimizeOptions, Warning, suggestions};
pub use strategy::{POPULAR_RATING, Strategy, popularity, smart_score, suits_weather};
