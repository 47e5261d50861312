//! Itinerary edit errors.

use crate::domain::{DomainError, VisitId};

/// A rejected edit. The trip is unchanged whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    /// No day with this number
    #[error("day {0} not found")]
    DayNotFound(u32),

    /// Index outside the day's visit list
    #[error("index {index} out of range for day {day} with {len} visits")]
    IndexOutOfRange { day: u32, index: usize, len: usize },

    /// The candidate duplicates a visit already on the day
    #[error("{name} is already on day {day}")]
    AlreadyPresent { name: String, day: u32 },

    /// No visit with this id on the day
    #[error("visit {id} not found on day {day}")]
    VisitNotFound { id: VisitId, day: u32 },

    /// A field edit with an unusable value
    #[error("invalid edit: {0}")]
    InvalidPatch(String),

    /// The trip itself is malformed
    #[error(transparent)]
    Domain(#[from] DomainError),
}
