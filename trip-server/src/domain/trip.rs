//! Trip types.
//!
//! A `Trip` is the top-level multi-day itinerary. It owns an ordered list
//! of days, each holding the visits planned for that date.
//!
//! # Invariants
//!
//! - Day numbers are exactly `1..=n` in order
//! - Day `k` falls on `start_date + (k - 1)`
//! - Visit ids are unique across the whole trip

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{Day, DomainError, Visit, VisitId};

/// Longest date range, in days, a trip may cover.
pub const MAX_TRIP_DAYS: u32 = 365;

/// Lifecycle status of a trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    #[default]
    Draft,
    Planned,
    Completed,
}

/// Reference to the destination city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityRef {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub country: String,
}

/// A multi-day itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub name: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub days: Vec<Day>,
    #[serde(default)]
    pub status: TripStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_companions: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<CityRef>,
}

impl Trip {
    /// Create a trip with empty days spanning the date range.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `end` is before `start`.
    ///
    /// # Examples
    ///
    /// ```
    /// use trip_server::domain::Trip;
    /// use chrono::NaiveDate;
    ///
    /// let start = NaiveDate::from_ymd_opt(2025, 4, 20).unwrap();
    /// let end = NaiveDate::from_ymd_opt(2025, 4, 22).unwrap();
    /// let trip = Trip::new("t1", "Hanoi weekend", "Hanoi", start, end).unwrap();
    ///
    /// assert_eq!(trip.days.len(), 3);
    /// assert_eq!(trip.days[2].day_number, 3);
    /// assert_eq!(trip.days[2].date, end);
    /// ```
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        destination: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self, DomainError> {
        let days = generate_empty_days(start_date, end_date)?;
        Ok(Self {
            id: id.into(),
            name: name.into(),
            destination: destination.into(),
            start_date,
            end_date,
            days,
            status: TripStatus::Draft,
            description: None,
            estimated_budget: None,
            travel_companions: None,
            city: None,
        })
    }

    /// Number of calendar days covered by the date range.
    pub fn num_days(&self) -> u32 {
        let span = (self.end_date - self.start_date).num_days();
        if span < 0 { 0 } else { span as u32 + 1 }
    }

    /// Generate empty days when the trip was loaded without any.
    ///
    /// Returns true if days were generated.
    pub fn ensure_days(&mut self) -> Result<bool, DomainError> {
        if !self.days.is_empty() {
            return Ok(false);
        }
        self.days = generate_empty_days(self.start_date, self.end_date)?;
        Ok(true)
    }

    /// Look up a day by its 1-based number.
    pub fn day(&self, day_number: u32) -> Option<&Day> {
        self.days.iter().find(|d| d.day_number == day_number)
    }

    /// Mutable lookup of a day by its 1-based number.
    pub fn day_mut(&mut self, day_number: u32) -> Option<&mut Day> {
        self.days.iter_mut().find(|d| d.day_number == day_number)
    }

    /// Total number of visits across all days.
    pub fn visit_count(&self) -> usize {
        self.days.iter().map(Day::len).sum()
    }

    /// Iterate over every visit in day order.
    pub fn visits(&self) -> impl Iterator<Item = &Visit> {
        self.days.iter().flat_map(|d| d.visits.iter())
    }

    /// Find the day number and index holding the given visit.
    pub fn locate(&self, id: &VisitId) -> Option<(u32, usize)> {
        self.days
            .iter()
            .find_map(|d| d.position(id).map(|idx| (d.day_number, idx)))
    }

    /// True if any visit in the trip has this id.
    pub fn contains_visit(&self, id: &VisitId) -> bool {
        self.visits().any(|v| &v.id == id)
    }

    /// Check the trip's structural invariants.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.end_date < self.start_date {
            return Err(DomainError::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }

        for (offset, day) in self.days.iter().enumerate() {
            let expected = offset as u32 + 1;
            if day.day_number != expected {
                return Err(DomainError::DayNumbering {
                    expected,
                    found: day.day_number,
                });
            }
            let expected_date = self.start_date + Duration::days(offset as i64);
            if day.date != expected_date {
                return Err(DomainError::DayDateMismatch {
                    day: day.day_number,
                    expected: expected_date,
                    found: day.date,
                });
            }
        }

        let mut seen = HashSet::new();
        for visit in self.visits() {
            if !seen.insert(&visit.id) {
                return Err(DomainError::DuplicateVisitId(visit.id.clone()));
            }
        }

        Ok(())
    }
}

/// Build empty days `1..=n` for the inclusive date range.
///
/// Ranges longer than [`MAX_TRIP_DAYS`] are rejected.
pub fn generate_empty_days(start: NaiveDate, end: NaiveDate) -> Result<Vec<Day>, DomainError> {
    if end < start {
        return Err(DomainError::InvalidDateRange { start, end });
    }
    let count = (end - start).num_days() + 1;
    if count > i64::from(MAX_TRIP_DAYS) {
        return Err(DomainError::TripTooLong {
            days: count,
            max: MAX_TRIP_DAYS,
        });
    }
    Ok((1..=MAX_TRIP_DAYS)
        .zip(0..count)
        .map(|(number, offset)| Day::new(number, start + Duration::days(offset)))
        .collect())
}
