//! Scheduling configuration.

use chrono::Duration;

use crate::domain::ClockTime;

/// Default start of a day's schedule (09:00).
pub const DEFAULT_ANCHOR_MINS: u32 = 9 * 60;

/// Default end of a day used for overrun warnings (22:00).
pub const DEFAULT_DAY_END_MINS: u32 = 22 * 60;

/// Configuration parameters for time allocation and schedule metrics.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Idle time inserted between consecutive visits (minutes).
    pub travel_buffer_mins: u32,

    /// Start of the day when neither the day nor a strategy sets one.
    pub default_anchor: ClockTime,

    /// Duration assumed by a full scheduling pass (the optimizer) for
    /// visits with no explicit or category duration (minutes).
    pub initial_pass_duration_mins: u32,

    /// Duration assumed by incremental edits for visits with no explicit
    /// or category duration (minutes).
    pub fallback_duration_mins: u32,

    /// Minutes of transit assumed per straight-line kilometre.
    pub transit_mins_per_km: f64,

    /// Estimated spend per price level step, in local currency units.
    pub currency_per_price_level: u64,

    /// Latest reasonable end of a day; later schedules produce a warning.
    pub day_end: ClockTime,
}

impl ScheduleConfig {
    /// Set the travel buffer.
    pub fn with_travel_buffer(mut self, mins: u32) -> Self {
        self.travel_buffer_mins = mins;
        self
    }

    /// Set the default anchor.
    pub fn with_default_anchor(mut self, anchor: ClockTime) -> Self {
        self.default_anchor = anchor;
        self
    }

    /// Set both fallback durations.
    pub fn with_fallback_durations(mut self, initial_pass: u32, general: u32) -> Self {
        self.initial_pass_duration_mins = initial_pass;
        self.fallback_duration_mins = general;
        self
    }

    /// Set the day end used for overrun warnings.
    pub fn with_day_end(mut self, day_end: ClockTime) -> Self {
        self.day_end = day_end;
        self
    }

    /// Returns the travel buffer as a Duration.
    pub fn travel_buffer(&self) -> Duration {
        Duration::minutes(i64::from(self.travel_buffer_mins))
    }

    /// Returns the initial-pass fallback duration as a Duration.
    pub fn initial_pass_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.initial_pass_duration_mins))
    }

    /// Returns the general fallback duration as a Duration.
    pub fn fallback_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.fallback_duration_mins))
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            travel_buffer_mins: 20,
            default_anchor: ClockTime::from_minutes(DEFAULT_ANCHOR_MINS),
            initial_pass_duration_mins: 90,
            fallback_duration_mins: 60,
            transit_mins_per_km: 3.0,
            currency_per_price_level: 100_000,
            day_end: ClockTime::from_minutes(DEFAULT_DAY_END_MINS),
        }
    }
}
