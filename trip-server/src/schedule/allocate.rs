//! Sequential time allocation.
//!
//! Walks an ordered visit list from a start anchor and assigns each visit a
//! start and end time. Visits are never reordered here; the allocator only
//! recomputes times after the order has changed.

use crate::domain::{ClockTime, Day, MINUTES_PER_DAY, Visit};

use super::config::ScheduleConfig;

/// Which default applies to visits with no explicit or category duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationFallback {
    /// Full scheduling pass over a trip (optimizer runs).
    InitialPass,
    /// Incremental edits: moves, inserts, removals.
    General,
}

impl DurationFallback {
    /// The fallback duration in minutes under the given config.
    pub fn minutes(self, config: &ScheduleConfig) -> u32 {
        match self {
            DurationFallback::InitialPass => config.initial_pass_duration_mins,
            DurationFallback::General => config.fallback_duration_mins,
        }
    }
}

/// Resolve a visit's duration in minutes.
///
/// Order: explicit `duration`, then the category average, then the
/// fallback. Zero values count as missing.
pub fn resolve_duration(visit: &Visit, fallback_mins: u32) -> u32 {
    visit
        .duration
        .filter(|d| *d > 0)
        .or(visit.avg_duration_minutes.filter(|d| *d > 0))
        .unwrap_or(fallback_mins)
}

/// Assign sequential start/end times to a list of visits.
///
/// Returns a new list in the same order. The first visit starts at
/// `anchor`; each following visit starts one travel buffer after the
/// previous one ends. Times wrap at midnight.
///
/// # Examples
///
/// ```
/// use trip_server::domain::{ClockTime, Visit};
/// use trip_server::schedule::{DurationFallback, ScheduleConfig, allocate};
///
/// let mut a = Visit::new("a", "A", "cafe");
/// a.duration = Some(60);
/// let mut b = Visit::new("b", "B", "cafe");
/// b.duration = Some(90);
///
/// let anchor = ClockTime::parse_hhmm("09:00").unwrap();
/// let out = allocate(&[a, b], anchor, &ScheduleConfig::default(), DurationFallback::General);
///
/// assert_eq!(out[0].end_time.unwrap().to_string(), "10:00");
/// assert_eq!(out[1].start_time.unwrap().to_string(), "10:20");
/// assert_eq!(out[1].end_time.unwrap().to_string(), "11:50");
/// ```
pub fn allocate(
    visits: &[Visit],
    anchor: ClockTime,
    config: &ScheduleConfig,
    fallback: DurationFallback,
) -> Vec<Visit> {
    let mut out = visits.to_vec();
    allocate_in_place(&mut out, anchor, config, fallback);
    out
}

/// In-place variant of [`allocate`].
///
/// Returns the unwrapped end of the last visit in minutes after midnight,
/// which exceeds a day's length when the schedule runs past midnight.
/// Minute sums saturate rather than overflow.
pub fn allocate_in_place(
    visits: &mut [Visit],
    anchor: ClockTime,
    config: &ScheduleConfig,
    fallback: DurationFallback,
) -> u32 {
    let fallback_mins = fallback.minutes(config);
    let mut current = anchor.minutes();
    let mut last_end = current;

    for (index, visit) in visits.iter_mut().enumerate() {
        if index > 0 {
            current = last_end.saturating_add(config.travel_buffer_mins);
        }
        let end = current.saturating_add(resolve_duration(visit, fallback_mins));
        visit.start_time = Some(ClockTime::from_minutes(current));
        visit.end_time = Some(ClockTime::from_minutes(end));
        last_end = end;
    }

    last_end
}

/// Re-run allocation over a day using its own anchor or the config default.
///
/// Returns the unwrapped end minute as [`allocate_in_place`] does.
pub fn allocate_day(day: &mut Day, config: &ScheduleConfig, fallback: DurationFallback) -> u32 {
    let anchor = day.start_anchor.unwrap_or(config.default_anchor);
    allocate_in_place(&mut day.visits, anchor, config, fallback)
}

/// Unwrapped end minute of a schedule without mutating it.
pub fn unwrapped_end(
    visits: &[Visit],
    anchor: ClockTime,
    config: &ScheduleConfig,
    fallback: DurationFallback,
) -> u32 {
    let fallback_mins = fallback.minutes(config);
    let busy = visits
        .iter()
        .map(|v| resolve_duration(v, fallback_mins))
        .fold(0u32, u32::saturating_add);
    let gaps = u32::try_from(visits.len().saturating_sub(1))
        .unwrap_or(u32::MAX)
        .saturating_mul(config.travel_buffer_mins);
    anchor.minutes().saturating_add(busy).saturating_add(gaps)
}

/// True when an unwrapped end minute lies past midnight.
pub fn runs_past_midnight(unwrapped_end: u32) -> bool {
    unwrapped_end > MINUTES_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> ClockTime {
        ClockTime::parse_hhmm(s).unwrap()
    }

    fn visit(id: &str, duration: Option<u32>) -> Visit {
        let mut v = Visit::new(id, id.to_uppercase(), "tourist_attraction");
        v.duration = duration;
        v
    }

    fn slots(visits: &[Visit]) -> Vec<(String, String)> {
        visits
            .iter()
            .map(|v| {
                (
                    v.start_time.unwrap().to_string(),
                    v.end_time.unwrap().to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn two_visits_with_buffer() {
        let out = allocate(
            &[visit("a", Some(60)), visit("b", Some(90))],
            t("09:00"),
            &ScheduleConfig::default(),
            DurationFallback::General,
        );
        assert_eq!(
            slots(&out),
            vec![
                ("09:00".to_string(), "10:00".to_string()),
                ("10:20".to_string(), "11:50".to_string())
            ]
        );
    }

    #[test]
    fn empty_list() {
        let out = allocate(
            &[],
            t("09:00"),
            &ScheduleConfig::default(),
            DurationFallback::General,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn duration_resolution_order() {
        let config = ScheduleConfig::default();

        let mut explicit = visit("a", Some(30));
        explicit.avg_duration_minutes = Some(45);
        assert_eq!(resolve_duration(&explicit, 60), 30);

        let mut category = visit("b", None);
        category.avg_duration_minutes = Some(45);
        assert_eq!(resolve_duration(&category, 60), 45);

        let zero = visit("c", Some(0));
        assert_eq!(
            resolve_duration(&zero, DurationFallback::General.minutes(&config)),
            60
        );
        assert_eq!(
            resolve_duration(&zero, DurationFallback::InitialPass.minutes(&config)),
            90
        );
    }

    #[test]
    fn fallbacks_differ_by_pass() {
        let config = ScheduleConfig::default();
        let visits = [visit("a", None)];

        let general = allocate(&visits, t("09:00"), &config, DurationFallback::General);
        let initial = allocate(&visits, t("09:00"), &config, DurationFallback::InitialPass);

        assert_eq!(general[0].end_time, Some(t("10:00")));
        assert_eq!(initial[0].end_time, Some(t("10:30")));
    }

    #[test]
    fn wraps_past_midnight() {
        let config = ScheduleConfig::default();
        let visits = [visit("a", Some(60)), visit("b", Some(60))];

        let mut out = visits.to_vec();
        let end = allocate_in_place(&mut out, t("22:30"), &config, DurationFallback::General);

        assert_eq!(out[1].start_time, Some(t("23:50")));
        assert_eq!(out[1].end_time, Some(t("00:50")));
        assert!(runs_past_midnight(end));
        assert_eq!(
            end,
            unwrapped_end(&visits, t("22:30"), &config, DurationFallback::General)
        );
    }

    #[test]
    fn huge_durations_saturate() {
        let config = ScheduleConfig::default();
        let visits = [visit("a", Some(u32::MAX)), visit("b", Some(u32::MAX))];

        let mut out = visits.to_vec();
        let end = allocate_in_place(&mut out, t("09:00"), &config, DurationFallback::General);

        assert_eq!(end, u32::MAX);
        assert!(runs_past_midnight(end));
        assert_eq!(
            unwrapped_end(&visits, t("09:00"), &config, DurationFallback::General),
            u32::MAX
        );
    }

    #[test]
    fn does_not_reorder_or_touch_other_fields() {
        let mut a = visit("a", Some(10));
        a.notes = Some("bring cash".into());
        let b = visit("b", Some(10));
        let out = allocate(
            &[a.clone(), b],
            t("08:00"),
            &ScheduleConfig::default(),
            DurationFallback::General,
        );
        assert_eq!(out[0].id, a.id);
        assert_eq!(out[0].notes, a.notes);
        assert_eq!(out[1].id.as_str(), "b");
    }

    #[test]
    fn day_anchor_overrides_default() {
        let mut day = Day::new(1, chrono::NaiveDate::from_ymd_opt(2025, 4, 20).unwrap());
        day.visits.push(visit("a", Some(30)));
        let config = ScheduleConfig::default();

        allocate_day(&mut day, &config, DurationFallback::General);
        assert_eq!(day.visits[0].start_time, Some(t("09:00")));

        day.start_anchor = Some(t("07:30"));
        allocate_day(&mut day, &config, DurationFallback::General);
        assert_eq!(day.visits[0].start_time, Some(t("07:30")));
    }
}
