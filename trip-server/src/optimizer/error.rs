//! Optimizer errors.

use crate::domain::DomainError;

use super::phase::Phase;

/// Errors from running or resolving an optimization.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OptimizeError {
    /// The trip has no visits to reorder
    #[error("trip has no visits to optimize")]
    EmptyTrip,

    /// The trip breaks a structural invariant
    #[error("invalid trip: {0}")]
    InvalidTrip(#[source] DomainError),

    /// The run was cancelled before the given phase started
    #[error("optimization cancelled before {0}")]
    Cancelled(Phase),

    /// A phase failed; wraps the underlying cause
    #[error("optimization failed during {phase}: {source}")]
    PhaseFailed {
        phase: Phase,
        #[source]
        source: Box<OptimizeError>,
    },

    /// Apply or discard without a completed run
    #[error("no optimization result is pending")]
    NoPendingResult,

    /// The trip changed after the pending result was computed
    #[error("trip was edited after optimization; run it again")]
    Outdated,

    /// Unrecognized strategy identifier
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),
}

impl OptimizeError {
    /// The phase a failed run stopped in, if the error came from a run.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            OptimizeError::Cancelled(phase) => Some(*phase),
            OptimizeError::PhaseFailed { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    pub(crate) fn in_phase(self, phase: Phase) -> Self {
        match self {
            OptimizeError::Cancelled(_) | OptimizeError::PhaseFailed { .. } => self,
            other => OptimizeError::PhaseFailed {
                phase,
                source: Box::new(other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_is_attached_once() {
        let err = OptimizeError::EmptyTrip
            .in_phase(Phase::AnalyzingPlaces)
            .in_phase(Phase::Finalizing);
        assert_eq!(err.phase(), Some(Phase::AnalyzingPlaces));
        assert_eq!(
            err.to_string(),
            "optimization failed during analyzing places: trip has no visits to optimize"
        );
    }

    #[test]
    fn cancelled_reports_phase() {
        let err = OptimizeError::Cancelled(Phase::ComputingRoute);
        assert_eq!(err.phase(), Some(Phase::ComputingRoute));
        assert_eq!(OptimizeError::NoPendingResult.phase(), None);
    }
}
