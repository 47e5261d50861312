//! Opening-hours conflict detection.
//!
//! Opening hours arrive as free-text display strings. Only the common
//! `H:MM - H:MM` shape is understood; anything else is reported as unknown
//! rather than as an error.

use crate::domain::{ClockTime, Day, VisitId};

/// A parsed daily opening window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningHours {
    pub open: ClockTime,
    pub close: ClockTime,
}

impl OpeningHours {
    /// Parse strings like `"9:00 - 17:00"` or `"07:30–22:00"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use trip_server::schedule::OpeningHours;
    ///
    /// let hours = OpeningHours::parse("9:00 - 17:30").unwrap();
    /// assert_eq!(hours.open.to_string(), "09:00");
    /// assert_eq!(hours.close.to_string(), "17:30");
    ///
    /// assert!(OpeningHours::parse("Mon-Fri, call ahead").is_none());
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.replace(['\u{2013}', '\u{2014}'], "-");
        let (open, close) = normalized.split_once('-')?;
        let open = ClockTime::parse_loose(open).ok()?;
        let close = ClockTime::parse_loose(close).ok()?;
        Some(Self { open, close })
    }

    /// True when the window wraps past midnight, e.g. 18:00 - 02:00.
    pub fn is_overnight(&self) -> bool {
        self.close < self.open
    }

    /// True when the given time falls inside the window (inclusive).
    pub fn contains(&self, t: ClockTime) -> bool {
        if self.is_overnight() {
            t >= self.open || t <= self.close
        } else {
            t >= self.open && t <= self.close
        }
    }
}

/// Why a visit's slot conflicts with its opening hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// The slot starts before the place opens.
    NotYetOpen,
    /// The slot ends after the place closes.
    ClosesBeforeEnd,
    /// The opening hours string could not be understood.
    UnknownHours,
}

/// An opening-hours problem for one scheduled visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub day_number: u32,
    pub visit_id: VisitId,
    pub visit_name: String,
    pub kind: ConflictKind,
    pub start: ClockTime,
}

/// Check every scheduled visit of a day against its opening hours.
///
/// Visits without schedule times or without opening hours are skipped.
pub fn check_day(day: &Day) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for visit in &day.visits {
        let (Some(start), Some(end)) = (visit.start_time, visit.end_time) else {
            continue;
        };
        let Some(raw) = visit.opening_hours.as_deref().filter(|s| !s.trim().is_empty()) else {
            continue;
        };

        let kind = match OpeningHours::parse(raw) {
            None => Some(ConflictKind::UnknownHours),
            Some(hours) if !hours.contains(start) => Some(ConflictKind::NotYetOpen),
            Some(hours) if !hours.contains(end) => Some(ConflictKind::ClosesBeforeEnd),
            Some(_) => None,
        };

        if let Some(kind) = kind {
            conflicts.push(Conflict {
                day_number: day.day_number,
                visit_id: visit.id.clone(),
                visit_name: visit.name.clone(),
                kind,
                start,
            });
        }
    }

    conflicts
}
