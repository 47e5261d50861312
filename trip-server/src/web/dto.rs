//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Candidate, ClockTime, Trip};
use crate::optimizer::{
    EstimatedSavings, ImprovementReport, OptimizationResult, OptimizeOptions, PhaseRecord,
    Strategy, TripMetrics, Warning,
};
use crate::search::{CandidatePool, MergeOutcome, SearchQuery};

/// Request to reorder visits within one day.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub from: usize,
    pub to: usize,
}

/// Request to move a visit between days.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub source_day: u32,
    pub from_index: usize,
    pub dest_day: u32,
    pub to_index: usize,
}

/// Request to add a search candidate to a day.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertRequest {
    pub candidate_id: String,
    /// Position in the day; appends when absent.
    pub index: Option<usize>,
}

/// Query string of a fresh search.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// Free text
    pub q: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
}

impl From<SearchParams> for SearchQuery {
    fn from(params: SearchParams) -> Self {
        let clean = |s: Option<String>| s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        SearchQuery {
            text: clean(params.q),
            category: clean(params.category),
            city: clean(params.city),
        }
    }
}

/// Options accepted by the optimize endpoint. Omitted fields keep their
/// defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeOptionsRequest {
    pub consider_weather: Option<bool>,
    pub consider_crowds: Option<bool>,
    /// `HH:MM`
    pub preferred_start: Option<ClockTime>,
}

impl From<OptimizeOptionsRequest> for OptimizeOptions {
    fn from(req: OptimizeOptionsRequest) -> Self {
        let defaults = OptimizeOptions::default();
        OptimizeOptions {
            consider_weather: req.consider_weather.unwrap_or(defaults.consider_weather),
            consider_crowds: req.consider_crowds.unwrap_or(defaults.consider_crowds),
            preferred_start: req.preferred_start.or(defaults.preferred_start),
        }
    }
}

/// Request to run a strategy.
#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    /// Strategy id, e.g. `time_efficient`
    pub strategy: String,
    #[serde(default)]
    pub options: OptimizeOptionsRequest,
}

/// The current trip of a session.
#[derive(Debug, Serialize)]
pub struct TripResponse {
    pub trip: Trip,
    pub revision: u64,
}

/// Pool contents after a search page was merged.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub candidates: Vec<Candidate>,
    pub added: usize,
    pub duplicates: usize,
    pub has_more: bool,
    pub total: Option<u64>,
}

impl SearchResponse {
    pub fn new(pool: &CandidatePool, outcome: MergeOutcome) -> Self {
        Self {
            candidates: pool.candidates().to_vec(),
            added: outcome.added,
            duplicates: outcome.duplicates,
            has_more: outcome.has_more,
            total: pool.total(),
        }
    }
}

/// A pending optimization, ready to apply or discard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeResponse {
    pub strategy: Strategy,
    pub strategy_name: &'static str,
    pub updated_trip: Trip,
    pub improvement_report: ImprovementReport,
    pub estimated_savings: EstimatedSavings,
    pub warnings: Vec<Warning>,
    pub suggestions: Vec<String>,
    pub phases: Vec<PhaseRecord>,
    pub before: TripMetrics,
    pub after: TripMetrics,
}

impl From<&OptimizationResult> for OptimizeResponse {
    fn from(result: &OptimizationResult) -> Self {
        Self {
            strategy: result.strategy,
            strategy_name: result.strategy.name(),
            updated_trip: result.updated_trip.clone(),
            improvement_report: result.report,
            estimated_savings: result.savings,
            warnings: result.warnings.clone(),
            suggestions: result.suggestions.clone(),
            phases: result.phases.clone(),
            before: result.before,
            after: result.after,
        }
    }
}

/// One entry of the strategy list.
#[derive(Debug, Serialize)]
pub struct StrategyInfo {
    pub id: &'static str,
    pub name: &'static str,
}

/// Result of saving a trip.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub saved_visits: usize,
    /// Visits left out because they lack a name or a location.
    pub skipped_visits: usize,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
