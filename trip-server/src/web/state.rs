//! Application state for the web layer.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::cache::CachedBackend;
use crate::itinerary::{Notifier, PlannerSession, TracingNotifier};
use crate::schedule::ScheduleConfig;
use crate::search::SearchPaging;

/// Open planner sessions, keyed by trip id.
pub type Sessions = Arc<Mutex<HashMap<String, PlannerSession>>>;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Backend with cached weather
    pub backend: Arc<CachedBackend>,

    /// Open sessions. Never held across backend calls.
    pub sessions: Sessions,

    /// Scheduling parameters for new sessions
    pub schedule: Arc<ScheduleConfig>,

    /// Search paging for new sessions
    pub paging: SearchPaging,

    /// Where session notifications go
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Create a new app state that reports notifications through tracing.
    pub fn new(backend: CachedBackend, schedule: ScheduleConfig, paging: SearchPaging) -> Self {
        Self {
            backend: Arc::new(backend),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            schedule: Arc::new(schedule),
            paging,
            notifier: Arc::new(TracingNotifier),
        }
    }

    /// Replace the notifier.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }
}
