//! Phased optimization pipeline and its state machine.
//!
//! A run works on a copy of the trip and never touches the caller's trip.
//! The result stays pending until it is applied or discarded.
//!
//! ```text
//! idle -> running -> complete -> applied
//!                 \           \-> discarded
//!                  \-> failed
//! ```

use tracing::{debug, info, warn};

use crate::domain::Trip;
use crate::schedule::{
    DurationFallback, ScheduleConfig, allocate_day, check_day, runs_past_midnight, unwrapped_end,
};

use super::error::OptimizeError;
use super::metrics::TripMetrics;
use super::phase::{CancelToken, Phase, PhaseRecord};
use super::report::{EstimatedSavings, ImprovementReport, OptimizeOptions, Warning, suggestions};
use super::strategy::Strategy;

/// Everything a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    pub strategy: Strategy,
    pub updated_trip: Trip,
    pub report: ImprovementReport,
    pub savings: EstimatedSavings,
    pub warnings: Vec<Warning>,
    pub suggestions: Vec<String>,
    pub phases: Vec<PhaseRecord>,
    pub before: TripMetrics,
    pub after: TripMetrics,
}

/// Where the optimizer is in its lifecycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum OptimizerState {
    #[default]
    Idle,
    Running {
        strategy: Strategy,
        phase: Phase,
    },
    Complete(Box<OptimizationResult>),
    Applied,
    Discarded,
    Failed(OptimizeError),
}

impl OptimizerState {
    pub fn name(&self) -> &'static str {
        match self {
            OptimizerState::Idle => "idle",
            OptimizerState::Running { .. } => "running",
            OptimizerState::Complete(_) => "complete",
            OptimizerState::Applied => "applied",
            OptimizerState::Discarded => "discarded",
            OptimizerState::Failed(_) => "failed",
        }
    }
}

/// Runs strategies over a trip and holds the pending result.
#[derive(Debug, Default)]
pub struct Optimizer {
    state: OptimizerState,
}

impl Optimizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &OptimizerState {
        &self.state
    }

    /// The pending result, if a run completed and was not yet resolved.
    pub fn pending(&self) -> Option<&OptimizationResult> {
        match &self.state {
            OptimizerState::Complete(result) => Some(result),
            _ => None,
        }
    }

    /// Run a strategy over a copy of `trip`.
    ///
    /// Phases run strictly in order. A new run replaces any pending result.
    ///
    /// # Errors
    ///
    /// Returns the failing phase's error; the optimizer is then `Failed`
    /// and `trip` is untouched.
    pub fn run(
        &mut self,
        trip: &Trip,
        strategy: Strategy,
        options: &OptimizeOptions,
        config: &ScheduleConfig,
        cancel: &CancelToken,
    ) -> Result<&OptimizationResult, OptimizeError> {
        info!(trip_id = %trip.id, strategy = %strategy, "starting optimization");

        let mut run = Run {
            strategy,
            options,
            config,
            trip: trip.clone(),
            phases: Vec::with_capacity(Phase::ALL.len()),
            before: TripMetrics::default(),
            after: TripMetrics::default(),
            report: ImprovementReport::default(),
            savings: EstimatedSavings::default(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
        };

        for phase in Phase::ALL {
            if cancel.is_cancelled() {
                warn!(trip_id = %trip.id, %phase, "optimization cancelled");
                let err = OptimizeError::Cancelled(phase);
                self.state = OptimizerState::Failed(err.clone());
                return Err(err);
            }
            self.state = OptimizerState::Running { strategy, phase };

            match run.step(phase) {
                Ok(detail) => {
                    debug!(%phase, %detail, "phase complete");
                    run.phases.push(PhaseRecord { phase, detail });
                }
                Err(err) => {
                    let err = err.in_phase(phase);
                    warn!(trip_id = %trip.id, %phase, error = %err, "optimization failed");
                    self.state = OptimizerState::Failed(err.clone());
                    return Err(err);
                }
            }
        }

        info!(
            trip_id = %trip.id,
            strategy = %strategy,
            distance_pct = run.report.total_distance,
            warnings = run.warnings.len(),
            "optimization complete"
        );

        self.state = OptimizerState::Complete(Box::new(run.finish()));
        self.pending().ok_or(OptimizeError::NoPendingResult)
    }

    /// Take the pending result's trip; the optimizer becomes `Applied`.
    pub fn apply(&mut self) -> Result<Trip, OptimizeError> {
        match std::mem::take(&mut self.state) {
            OptimizerState::Complete(result) => {
                self.state = OptimizerState::Applied;
                Ok(result.updated_trip)
            }
            other => {
                self.state = other;
                Err(OptimizeError::NoPendingResult)
            }
        }
    }

    /// Drop the pending result; the optimizer becomes `Discarded`.
    pub fn discard(&mut self) -> Result<(), OptimizeError> {
        match self.state {
            OptimizerState::Complete(_) => {
                self.state = OptimizerState::Discarded;
                Ok(())
            }
            _ => Err(OptimizeError::NoPendingResult),
        }
    }
}

/// Working state of one run.
struct Run<'a> {
    strategy: Strategy,
    options: &'a OptimizeOptions,
    config: &'a ScheduleConfig,
    trip: Trip,
    phases: Vec<PhaseRecord>,
    before: TripMetrics,
    after: TripMetrics,
    report: ImprovementReport,
    savings: EstimatedSavings,
    warnings: Vec<Warning>,
    suggestions: Vec<String>,
}

impl Run<'_> {
    fn step(&mut self, phase: Phase) -> Result<String, OptimizeError> {
        match phase {
            Phase::AnalyzingPlaces => self.analyze(),
            Phase::IntegratingWeather => Ok(self.integrate_weather()),
            Phase::ComputingRoute => Ok(self.compute_route()),
            Phase::OptimizingSchedule => Ok(self.schedule()),
            Phase::MeasuringImprovements => Ok(self.measure()),
            Phase::ReviewingConstraints => Ok(self.review()),
            Phase::Finalizing => Ok(self.finalize()),
        }
    }

    fn analyze(&mut self) -> Result<String, OptimizeError> {
        self.trip.validate().map_err(OptimizeError::InvalidTrip)?;
        if self.trip.visit_count() == 0 {
            return Err(OptimizeError::EmptyTrip);
        }
        self.before = TripMetrics::measure(&self.trip, self.config);
        Ok(format!(
            "{} visits across {} days",
            self.before.visits,
            self.trip.days.len()
        ))
    }

    fn integrate_weather(&mut self) -> String {
        let with_weather = self.trip.days.iter().filter(|d| d.weather.is_some()).count();
        if self.options.consider_weather {
            for day in self.trip.days.iter().filter(|d| d.weather.is_none()) {
                self.warnings.push(Warning::MissingWeather {
                    day: day.day_number,
                });
            }
        }
        let wet = self.trip.days.iter().filter(|d| d.is_wet()).count();
        format!(
            "forecasts for {with_weather} of {} days, {wet} wet",
            self.trip.days.len()
        )
    }

    fn compute_route(&mut self) -> String {
        let mut moved = 0;
        for day in &mut self.trip.days {
            let original: Vec<_> = day.visits.iter().map(|v| v.id.clone()).collect();
            self.strategy.sort_visits(&mut day.visits, day.weather.as_ref());
            moved += day
                .visits
                .iter()
                .zip(&original)
                .filter(|(v, id)| &v.id != *id)
                .count();
        }
        format!("{moved} visits changed position")
    }

    fn schedule(&mut self) -> String {
        let anchor = self
            .strategy
            .anchor_override()
            .or(self.options.preferred_start)
            .unwrap_or(self.config.default_anchor);
        for day in &mut self.trip.days {
            day.start_anchor = Some(anchor);
            allocate_day(day, self.config, DurationFallback::InitialPass);
        }
        format!("days start at {anchor}")
    }

    fn measure(&mut self) -> String {
        self.after = TripMetrics::measure(&self.trip, self.config);
        self.report = ImprovementReport::compare(&self.before, &self.after, self.options);
        self.savings = EstimatedSavings::compare(&self.before, &self.after);
        format!(
            "distance {:.1} -> {:.1} km",
            self.before.distance_km, self.after.distance_km
        )
    }

    fn review(&mut self) -> String {
        let found_before = self.warnings.len();

        for day in &self.trip.days {
            self.warnings
                .extend(check_day(day).into_iter().map(Warning::OpeningHours));

            if let Some(anchor) = day.start_anchor {
                let end = unwrapped_end(
                    &day.visits,
                    anchor,
                    self.config,
                    DurationFallback::InitialPass,
                );
                if runs_past_midnight(end) {
                    self.warnings.push(Warning::PastMidnight {
                        day: day.day_number,
                    });
                } else if !day.is_empty() && end > self.config.day_end.minutes() {
                    if let Some(last) = day.visits.last().and_then(|v| v.end_time) {
                        self.warnings.push(Warning::LateFinish {
                            day: day.day_number,
                            end: last,
                        });
                    }
                }
            }

            if self.options.consider_weather && day.is_wet() {
                let count = day.visits.iter().filter(|v| v.is_outdoor()).count();
                if count > 0 {
                    self.warnings.push(Warning::WetOutdoor {
                        day: day.day_number,
                        count,
                    });
                }
            }
        }

        if let Some(budget) = self.trip.estimated_budget {
            if budget > 0.0 && self.after.estimated_spend as f64 > budget {
                self.warnings.push(Warning::OverBudget {
                    estimated: self.after.estimated_spend,
                    budget,
                });
            }
        }

        format!("{} warnings", self.warnings.len() - found_before)
    }

    fn finalize(&mut self) -> String {
        self.suggestions = suggestions(self.strategy, &self.report, &self.savings);
        format!("{} suggestions", self.suggestions.len())
    }

    fn finish(self) -> OptimizationResult {
        OptimizationResult {
            strategy: self.strategy,
            updated_trip: self.trip,
            report: self.report,
            savings: self.savings,
            warnings: self.warnings,
            suggestions: self.suggestions,
            phases: self.phases,
            before: self.before,
            after: self.after,
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod pipeline_tests;
