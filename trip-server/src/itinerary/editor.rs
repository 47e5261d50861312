//! Reordering engine.
//!
//! Every operation either applies completely or returns an [`EditError`]
//! with the trip untouched. Successful edits re-run the time allocator on
//! each day they touched, using the day's own anchor.

use serde::Deserialize;
use tracing::debug;

use crate::domain::{
    Candidate, ClockTime, Day, MINUTES_PER_DAY, Trip, Visit, VisitId, generate_empty_days,
};
use crate::schedule::{DurationFallback, ScheduleConfig, allocate_day};
use crate::search::find_near_duplicate;

use super::error::EditError;
use super::notify::{Notifier, NotifyKind};

/// Field edits for one visit. Absent fields are left unchanged.
///
/// Empty `notes` or `openingHours` clear the field. Manual start/end times
/// are applied after any re-allocation and hold until the next edit of the
/// day re-allocates it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitPatch {
    pub name: Option<String>,
    pub notes: Option<String>,
    /// Minutes; must be positive.
    pub duration: Option<u32>,
    pub start_time: Option<ClockTime>,
    pub end_time: Option<ClockTime>,
    pub opening_hours: Option<String>,
}

/// Applies move, insert, remove and edit commands to a trip.
pub struct ItineraryEditor<'a> {
    trip: &'a mut Trip,
    config: &'a ScheduleConfig,
    notifier: &'a dyn Notifier,
}

impl<'a> ItineraryEditor<'a> {
    pub fn new(trip: &'a mut Trip, config: &'a ScheduleConfig, notifier: &'a dyn Notifier) -> Self {
        Self {
            trip,
            config,
            notifier,
        }
    }

    pub fn trip(&self) -> &Trip {
        &*self.trip
    }

    /// Move the visit at `from` to position `to` within one day.
    ///
    /// Both indices must be within the day's current list.
    pub fn move_within_day(&mut self, day: u32, from: usize, to: usize) -> Result<(), EditError> {
        let result = self.try_move_within_day(day, from, to);
        self.report(result, |_| format!("Reordered day {day}"))
    }

    /// Move the visit at `from` on `source_day` to position `to` on
    /// `dest_day`, returning its id.
    ///
    /// `to` may equal the destination length to append. When both days are
    /// the same this is [`move_within_day`](Self::move_within_day).
    pub fn move_across_days(
        &mut self,
        source_day: u32,
        from: usize,
        dest_day: u32,
        to: usize,
    ) -> Result<VisitId, EditError> {
        let result = self.try_move_across_days(source_day, from, dest_day, to);
        self.report(result, |id| {
            format!("Moved {id} from day {source_day} to day {dest_day}")
        })
    }

    /// Insert a search candidate into a day, returning the new visit's id.
    ///
    /// Appends when `index` is `None`. A candidate matching a visit already
    /// on the day (same name, nearly the same place) is rejected with
    /// [`EditError::AlreadyPresent`].
    pub fn insert(
        &mut self,
        day: u32,
        candidate: Candidate,
        index: Option<usize>,
    ) -> Result<VisitId, EditError> {
        let name = candidate.name.clone();
        let result = self.try_insert(day, candidate, index);
        self.report(result, |_| format!("Added {name} to day {day}"))
    }

    /// Remove a visit from a day, returning it.
    pub fn remove(&mut self, day: u32, id: &VisitId) -> Result<Visit, EditError> {
        let result = self.try_remove(day, id);
        self.report(result, |visit| {
            format!("Removed {} from day {day}", visit.name)
        })
    }

    /// Apply field edits to one visit.
    ///
    /// A duration change re-allocates the day.
    pub fn update_visit(
        &mut self,
        day: u32,
        id: &VisitId,
        patch: VisitPatch,
    ) -> Result<(), EditError> {
        let result = self.try_update_visit(day, id, patch);
        self.report(result, |_| format!("Updated {id}"))
    }

    fn try_move_within_day(&mut self, day: u32, from: usize, to: usize) -> Result<(), EditError> {
        let idx = self.day_index(day)?;
        let target = &mut self.trip.days[idx];
        check_index(day, from, target.len(), false)?;
        check_index(day, to, target.len(), false)?;

        let visit = target.visits.remove(from);
        target.visits.insert(to, visit);
        allocate_day(target, self.config, DurationFallback::General);

        debug!(day, from, to, "moved visit within day");
        Ok(())
    }

    fn try_move_across_days(
        &mut self,
        source_day: u32,
        from: usize,
        dest_day: u32,
        to: usize,
    ) -> Result<VisitId, EditError> {
        if source_day == dest_day {
            self.try_move_within_day(source_day, from, to)?;
            let idx = self.day_index(dest_day)?;
            return Ok(self.trip.days[idx].visits[to].id.clone());
        }

        let src = self.day_index(source_day)?;
        let dst = self.day_index(dest_day)?;
        check_index(source_day, from, self.trip.days[src].len(), false)?;
        check_index(dest_day, to, self.trip.days[dst].len(), true)?;

        let visit = self.trip.days[src].visits.remove(from);
        let id = visit.id.clone();
        self.trip.days[dst].visits.insert(to, visit);

        allocate_day(&mut self.trip.days[src], self.config, DurationFallback::General);
        allocate_day(&mut self.trip.days[dst], self.config, DurationFallback::General);

        debug!(%id, source_day, from, dest_day, to, "moved visit across days");
        Ok(id)
    }

    fn try_insert(
        &mut self,
        day: u32,
        candidate: Candidate,
        index: Option<usize>,
    ) -> Result<VisitId, EditError> {
        // A trip loaded without days gets them now, but only once the
        // insert is known to succeed.
        let generated = if self.trip.days.is_empty() {
            Some(generate_empty_days(self.trip.start_date, self.trip.end_date)?)
        } else {
            None
        };
        let days: &[Day] = generated.as_deref().unwrap_or(&self.trip.days);

        let idx = days
            .iter()
            .position(|d| d.day_number == day)
            .ok_or(EditError::DayNotFound(day))?;
        let target = &days[idx];
        let index = index.unwrap_or(target.len());
        check_index(day, index, target.len(), true)?;

        if let Some(existing) = find_near_duplicate(&target.visits, &candidate) {
            return Err(EditError::AlreadyPresent {
                name: existing.name.clone(),
                day,
            });
        }

        if let Some(days) = generated {
            self.trip.days = days;
        }
        let id = self.next_visit_id(&candidate.id);
        let target = &mut self.trip.days[idx];
        target.visits.insert(index, candidate.into_visit(id.clone()));
        allocate_day(target, self.config, DurationFallback::General);

        debug!(%id, day, index, "inserted visit");
        Ok(id)
    }

    fn try_remove(&mut self, day: u32, id: &VisitId) -> Result<Visit, EditError> {
        let idx = self.day_index(day)?;
        let target = &mut self.trip.days[idx];
        let position = target.position(id).ok_or_else(|| EditError::VisitNotFound {
            id: id.clone(),
            day,
        })?;

        let visit = target.visits.remove(position);
        allocate_day(target, self.config, DurationFallback::General);

        debug!(%id, day, "removed visit");
        Ok(visit)
    }

    fn try_update_visit(
        &mut self,
        day: u32,
        id: &VisitId,
        patch: VisitPatch,
    ) -> Result<(), EditError> {
        let name = match patch.name.as_deref().map(str::trim) {
            Some("") => return Err(EditError::InvalidPatch("name must not be empty".into())),
            other => other.map(str::to_string),
        };
        match patch.duration {
            Some(0) => {
                return Err(EditError::InvalidPatch("duration must be positive".into()));
            }
            Some(d) if d > MINUTES_PER_DAY => {
                return Err(EditError::InvalidPatch(format!(
                    "duration must not exceed {MINUTES_PER_DAY} minutes"
                )));
            }
            _ => {}
        }

        let idx = self.day_index(day)?;
        let target = &mut self.trip.days[idx];
        let position = target.position(id).ok_or_else(|| EditError::VisitNotFound {
            id: id.clone(),
            day,
        })?;

        let visit = &mut target.visits[position];
        if let Some(name) = name {
            visit.name = name;
        }
        if let Some(notes) = patch.notes {
            visit.notes = non_empty(notes);
        }
        if let Some(hours) = patch.opening_hours {
            visit.opening_hours = non_empty(hours);
        }
        let duration_changed = patch.duration.is_some() && patch.duration != visit.duration;
        if duration_changed {
            visit.duration = patch.duration;
            allocate_day(target, self.config, DurationFallback::General);
        }

        let visit = &mut target.visits[position];
        if let Some(start) = patch.start_time {
            visit.start_time = Some(start);
        }
        if let Some(end) = patch.end_time {
            visit.end_time = Some(end);
        }

        debug!(%id, day, duration_changed, "updated visit");
        Ok(())
    }

    fn day_index(&self, day: u32) -> Result<usize, EditError> {
        self.trip
            .days
            .iter()
            .position(|d| d.day_number == day)
            .ok_or(EditError::DayNotFound(day))
    }

    /// First free id of the form `suggested_<candidate>_<n>`.
    fn next_visit_id(&self, candidate_id: &str) -> VisitId {
        let mut n = 1u32;
        loop {
            let id = VisitId::new(format!("suggested_{candidate_id}_{n}"));
            if !self.trip.contains_visit(&id) {
                return id;
            }
            n += 1;
        }
    }

    fn report<T>(
        &self,
        result: Result<T, EditError>,
        success: impl FnOnce(&T) -> String,
    ) -> Result<T, EditError> {
        match &result {
            Ok(value) => self.notifier.notify(NotifyKind::Success, &success(value)),
            Err(err @ EditError::AlreadyPresent { .. }) => {
                self.notifier.notify(NotifyKind::Info, &err.to_string())
            }
            Err(err) => self.notifier.notify(NotifyKind::Error, &err.to_string()),
        }
        result
    }
}

/// `index` must address an element, or the end when `append` is set.
fn check_index(day: u32, index: usize, len: usize, append: bool) -> Result<(), EditError> {
    if index < len || (append && index == len) {
        Ok(())
    } else {
        Err(EditError::IndexOutOfRange { day, index, len })
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
#[path = "editor_tests.rs"]
mod editor_tests;
