//! Pipeline phases and cancellation.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

/// Optimizer pipeline phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AnalyzingPlaces,
    IntegratingWeather,
    ComputingRoute,
    OptimizingSchedule,
    MeasuringImprovements,
    ReviewingConstraints,
    Finalizing,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Phase::AnalyzingPlaces,
        Phase::IntegratingWeather,
        Phase::ComputingRoute,
        Phase::OptimizingSchedule,
        Phase::MeasuringImprovements,
        Phase::ReviewingConstraints,
        Phase::Finalizing,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Phase::AnalyzingPlaces => "analyzing places",
            Phase::IntegratingWeather => "integrating weather",
            Phase::ComputingRoute => "computing optimal route",
            Phase::OptimizingSchedule => "optimizing schedule",
            Phase::MeasuringImprovements => "measuring improvements",
            Phase::ReviewingConstraints => "reviewing constraints",
            Phase::Finalizing => "finalizing",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One completed phase and what it found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseRecord {
    pub phase: Phase,
    pub detail: String,
}

/// Shared flag for cancelling a run between phases.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_are_ordered() {
        let mut sorted = Phase::ALL;
        sorted.sort();
        assert_eq!(sorted, Phase::ALL);
        assert_eq!(Phase::ComputingRoute.to_string(), "computing optimal route");
    }

    #[test]
    fn cancel_is_shared() {
        let token = CancelToken::new();
        let handle = token.clone();
        assert!(!token.is_cancelled());
        handle.cancel();
        assert!(token.is_cancelled());
    }
}
