//! Time allocation for day schedules.
//!
//! Given an ordered visit list and a start anchor, assigns each visit a
//! sequential time slot separated by a fixed travel buffer. Also checks
//! scheduled slots against free-text opening hours.

mod allocate;
mod config;
mod hours;

pub use allocate::{
    DurationFallback, allocate, allocate_day, allocate_in_place, resolve_duration,
    runs_past_midnight, unwrapped_end,
};
pub use config::ScheduleConfig;
pub use hours::{Conflict, ConflictKind, OpeningHours, check_day};
