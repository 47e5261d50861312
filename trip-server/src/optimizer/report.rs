//! Improvement report, warnings and suggestions.

use std::fmt;

use serde::Serialize;

use crate::domain::ClockTime;
use crate::schedule::{Conflict, ConflictKind};

use super::metrics::TripMetrics;
use super::strategy::Strategy;

/// Options that shape a run and what it reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizeOptions {
    /// Report weather fit and warn about forecasts.
    pub consider_weather: bool,
    /// Report crowd avoidance.
    pub consider_crowds: bool,
    /// Anchor for strategies without their own; the schedule default
    /// applies when unset.
    pub preferred_start: Option<ClockTime>,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            consider_weather: true,
            consider_crowds: true,
            preferred_start: None,
        }
    }
}

/// Percentage improvements per category. Positive means better; a
/// category with nothing to measure reports zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementReport {
    pub total_distance: f64,
    pub time_efficiency: f64,
    pub budget_optimization: f64,
    pub weather_consideration: f64,
    pub crowd_avoidance: f64,
}

impl ImprovementReport {
    pub fn compare(before: &TripMetrics, after: &TripMetrics, options: &OptimizeOptions) -> Self {
        Self {
            total_distance: reduction_pct(before.distance_km, after.distance_km),
            time_efficiency: reduction_pct(before.total_minutes(), after.total_minutes()),
            budget_optimization: reduction_pct(
                before.estimated_spend as f64,
                after.estimated_spend as f64,
            ),
            weather_consideration: if options.consider_weather {
                reduction_pct(
                    f64::from(before.weather_inversions),
                    f64::from(after.weather_inversions),
                )
            } else {
                0.0
            },
            crowd_avoidance: if options.consider_crowds {
                reduction_pct(
                    f64::from(before.crowd_exposure),
                    f64::from(after.crowd_exposure),
                )
            } else {
                0.0
            },
        }
    }
}

/// Absolute savings; never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatedSavings {
    /// Minutes.
    pub time: u32,
    /// Local currency units.
    pub money: u64,
    /// Kilometres, one decimal.
    pub distance: f64,
}

impl EstimatedSavings {
    pub fn compare(before: &TripMetrics, after: &TripMetrics) -> Self {
        let minutes = (before.total_minutes() - after.total_minutes()).max(0.0);
        let km = (before.distance_km - after.distance_km).max(0.0);
        Self {
            time: minutes.round() as u32,
            money: before.estimated_spend.saturating_sub(after.estimated_spend),
            distance: (km * 10.0).round() / 10.0,
        }
    }
}

/// Relative reduction from `before` to `after` in percent.
fn reduction_pct(before: f64, after: f64) -> f64 {
    if before <= 0.0 {
        return 0.0;
    }
    (before - after) / before * 100.0
}

/// A problem found while reviewing the optimized schedule.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// A slot falls outside the place's opening hours.
    OpeningHours(Conflict),
    /// The day's last visit ends after midnight.
    PastMidnight { day: u32 },
    /// The day's last visit ends after the configured day end.
    LateFinish { day: u32, end: ClockTime },
    /// Outdoor visits remain on a wet day.
    WetOutdoor { day: u32, count: usize },
    /// Estimated spend exceeds the trip budget.
    OverBudget { estimated: u64, budget: f64 },
    /// No forecast for the day.
    MissingWeather { day: u32 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::OpeningHours(conflict) => match conflict.kind {
                ConflictKind::NotYetOpen => write!(
                    f,
                    "Day {}: {} is scheduled at {} before it opens",
                    conflict.day_number, conflict.visit_name, conflict.start
                ),
                ConflictKind::ClosesBeforeEnd => write!(
                    f,
                    "Day {}: {} closes before the visit ends",
                    conflict.day_number, conflict.visit_name
                ),
                ConflictKind::UnknownHours => write!(
                    f,
                    "Day {}: opening hours of {} could not be checked",
                    conflict.day_number, conflict.visit_name
                ),
            },
            Warning::PastMidnight { day } => {
                write!(f, "Day {day}: the schedule runs past midnight")
            }
            Warning::LateFinish { day, end } => {
                write!(f, "Day {day}: the last visit ends late, at {end}")
            }
            Warning::WetOutdoor { day, count } => write!(
                f,
                "Day {day}: {count} outdoor visit(s) on a day with likely rain"
            ),
            Warning::OverBudget { estimated, budget } => write!(
                f,
                "Estimated spend of {estimated} exceeds the budget of {budget:.0}"
            ),
            Warning::MissingWeather { day } => {
                write!(f, "Day {day}: no weather forecast available")
            }
        }
    }
}

impl Serialize for Warning {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Human-readable suggestions summarizing a run.
pub fn suggestions(
    strategy: Strategy,
    report: &ImprovementReport,
    savings: &EstimatedSavings,
) -> Vec<String> {
    let mut out = Vec::new();

    if report.total_distance > 0.5 {
        out.push(format!(
            "Apply {} to shorten the straight-line route by {:.0}%",
            strategy.name(),
            report.total_distance
        ));
    } else {
        out.push(format!(
            "{} keeps the route length about the same",
            strategy.name()
        ));
    }
    if savings.time > 0 {
        out.push(format!("Saves about {} minutes of transit", savings.time));
    }
    if savings.money > 0 {
        out.push(format!("Saves about {} in estimated spend", savings.money));
    }
    if report.weather_consideration > 0.5 {
        out.push(format!(
            "Matches indoor and outdoor visits to the forecast {:.0}% better",
            report.weather_consideration
        ));
    }
    if report.crowd_avoidance > 0.5 {
        out.push(format!(
            "Visits popular places {:.0}% earlier in the day",
            report.crowd_avoidance
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VisitId;

    fn metrics(distance_km: f64, scheduled: u32, spend: u64, inversions: u32, crowd: u32) -> TripMetrics {
        TripMetrics {
            visits: 3,
            distance_km,
            scheduled_minutes: scheduled,
            transit_minutes: distance_km * 3.0,
            price_level_total: (spend / 100_000) as u32,
            estimated_spend: spend,
            weather_inversions: inversions,
            crowd_exposure: crowd,
        }
    }

    #[test]
    fn percentages_from_real_deltas() {
        let before = metrics(10.0, 300, 500_000, 4, 1000);
        let after = metrics(5.0, 300, 500_000, 1, 500);
        let report = ImprovementReport::compare(&before, &after, &OptimizeOptions::default());

        assert_eq!(report.total_distance, 50.0);
        // 330 -> 315 minutes
        assert!((report.time_efficiency - 15.0 / 330.0 * 100.0).abs() < 1e-9);
        assert_eq!(report.budget_optimization, 0.0);
        assert_eq!(report.weather_consideration, 75.0);
        assert_eq!(report.crowd_avoidance, 50.0);
    }

    #[test]
    fn regressions_are_negative_and_flags_zero_out() {
        let before = metrics(5.0, 300, 0, 1, 500);
        let after = metrics(10.0, 300, 0, 2, 600);
        let options = OptimizeOptions {
            consider_weather: false,
            consider_crowds: false,
            preferred_start: None,
        };
        let report = ImprovementReport::compare(&before, &after, &options);
        assert_eq!(report.total_distance, -100.0);
        assert_eq!(report.weather_consideration, 0.0);
        assert_eq!(report.crowd_avoidance, 0.0);

        let savings = EstimatedSavings::compare(&before, &after);
        assert_eq!(savings, EstimatedSavings::default());
    }

    #[test]
    fn savings_round() {
        let before = metrics(7.26, 300, 400_000, 0, 0);
        let after = metrics(2.0, 300, 300_000, 0, 0);
        let savings = EstimatedSavings::compare(&before, &after);
        assert_eq!(savings.distance, 5.3);
        assert_eq!(savings.time, 16);
        assert_eq!(savings.money, 100_000);
    }

    #[test]
    fn warning_text() {
        let conflict = Conflict {
            day_number: 2,
            visit_id: VisitId::new("v"),
            visit_name: "Temple".into(),
            kind: ConflictKind::NotYetOpen,
            start: ClockTime::from_hm(7, 30).unwrap(),
        };
        assert_eq!(
            Warning::OpeningHours(conflict).to_string(),
            "Day 2: Temple is scheduled at 07:30 before it opens"
        );
        assert_eq!(
            serde_json::to_string(&Warning::PastMidnight { day: 3 }).unwrap(),
            "\"Day 3: the schedule runs past midnight\""
        );
    }

    #[test]
    fn suggestions_follow_figures() {
        let report = ImprovementReport {
            total_distance: 42.0,
            ..Default::default()
        };
        let savings = EstimatedSavings {
            time: 12,
            money: 0,
            distance: 3.1,
        };
        let out = suggestions(Strategy::TimeEfficient, &report, &savings);
        assert_eq!(
            out,
            vec![
                "Apply Time saver to shorten the straight-line route by 42%".to_string(),
                "Saves about 12 minutes of transit".to_string(),
            ]
        );
    }
}
