//! Domain error types.
//!
//! These errors represent validation failures and broken invariants in the
//! itinerary model. They are distinct from API/IO errors.

use chrono::NaiveDate;

use super::VisitId;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Trip ends before it starts
    #[error("invalid date range: {end} is before {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// Date range covers more days than a trip may hold
    #[error("trip spans {days} days, at most {max} allowed")]
    TripTooLong { days: i64, max: u32 },

    /// Day numbers are not exactly 1..=n in order
    #[error("day numbering broken: expected day {expected}, found {found}")]
    DayNumbering { expected: u32, found: u32 },

    /// A day's date does not match its offset from the trip start
    #[error("day {day} has date {found}, expected {expected}")]
    DayDateMismatch {
        day: u32,
        expected: NaiveDate,
        found: NaiveDate,
    },

    /// The same visit id appears more than once in a trip
    #[error("duplicate visit id: {0}")]
    DuplicateVisitId(VisitId),

    /// Price level outside 1..=4
    #[error("invalid price level: {0}")]
    InvalidPriceLevel(String),

    /// Rating outside 0..=5
    #[error("invalid rating: {0}")]
    InvalidRating(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let start = NaiveDate::from_ymd_opt(2025, 4, 20).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 4, 18).unwrap();
        let err = DomainError::InvalidDateRange { start, end };
        assert_eq!(
            err.to_string(),
            "invalid date range: 2025-04-18 is before 2025-04-20"
        );

        let err = DomainError::DayNumbering {
            expected: 2,
            found: 3,
        };
        assert_eq!(
            err.to_string(),
            "day numbering broken: expected day 2, found 3"
        );

        let err = DomainError::DuplicateVisitId(VisitId::new("v1"));
        assert_eq!(err.to_string(), "duplicate visit id: v1");

        let err = DomainError::TripTooLong { days: 400, max: 365 };
        assert_eq!(err.to_string(), "trip spans 400 days, at most 365 allowed");

        let err = DomainError::InvalidPriceLevel("7".into());
        assert_eq!(err.to_string(), "invalid price level: 7");
    }
}
