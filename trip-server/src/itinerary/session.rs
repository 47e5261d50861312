//! Planner session: the single owner of one open trip.
//!
//! All mutation of the trip goes through a session. Network results are
//! fetched elsewhere and handed in here, where stale ones are dropped.

use std::sync::Arc;

use tracing::info;

use crate::domain::{DomainError, Trip, Visit, VisitId, Weather};
use crate::optimizer::{
    CancelToken, OptimizationResult, OptimizeError, OptimizeOptions, Optimizer, Strategy,
};
use crate::schedule::ScheduleConfig;
use crate::search::{
    CandidatePool, MergeOutcome, SearchError, SearchPage, SearchPaging, SearchQuery, SearchTicket,
};

use super::editor::{ItineraryEditor, VisitPatch};
use super::error::EditError;
use super::notify::{Notifier, NotifyKind};

/// Errors from session commands.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Optimize(#[from] OptimizeError),
}

/// Mutable planning state for one trip.
pub struct PlannerSession {
    trip: Trip,
    config: ScheduleConfig,
    pool: CandidatePool,
    optimizer: Optimizer,
    notifier: Arc<dyn Notifier>,
    /// Bumped on every change to `trip`.
    revision: u64,
    /// Revision the pending optimization was computed from.
    optimized_at: Option<u64>,
}

impl PlannerSession {
    /// Open a session, generating empty days for a trip stored without any.
    pub fn open(
        mut trip: Trip,
        config: ScheduleConfig,
        paging: SearchPaging,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, DomainError> {
        if trip.ensure_days()? {
            info!(trip_id = %trip.id, days = trip.days.len(), "generated empty days");
        }
        trip.validate()?;
        Ok(Self {
            trip,
            config,
            pool: CandidatePool::new(paging),
            optimizer: Optimizer::new(),
            notifier,
            revision: 0,
            optimized_at: None,
        })
    }

    pub fn trip(&self) -> &Trip {
        &self.trip
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn pool(&self) -> &CandidatePool {
        &self.pool
    }

    pub fn optimizer(&self) -> &Optimizer {
        &self.optimizer
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Report an upstream failure to the user.
    pub fn notify_failure(&self, message: &str) {
        self.notifier.notify(NotifyKind::Error, message);
    }

    pub fn move_within_day(&mut self, day: u32, from: usize, to: usize) -> Result<(), SessionError> {
        self.edit(|editor| editor.move_within_day(day, from, to))
    }

    pub fn move_across_days(
        &mut self,
        source_day: u32,
        from: usize,
        dest_day: u32,
        to: usize,
    ) -> Result<VisitId, SessionError> {
        self.edit(|editor| editor.move_across_days(source_day, from, dest_day, to))
    }

    /// Insert a candidate from the current search results.
    pub fn insert_candidate(
        &mut self,
        day: u32,
        candidate_id: &str,
        index: Option<usize>,
    ) -> Result<VisitId, SessionError> {
        let candidate = self.pool.take(candidate_id)?;
        self.edit(|editor| editor.insert(day, candidate, index))
    }

    pub fn remove(&mut self, day: u32, id: &VisitId) -> Result<Visit, SessionError> {
        self.edit(|editor| editor.remove(day, id))
    }

    pub fn update_visit(
        &mut self,
        day: u32,
        id: &VisitId,
        patch: VisitPatch,
    ) -> Result<(), SessionError> {
        self.edit(|editor| editor.update_visit(day, id, patch))
    }

    /// Begin a new search; earlier in-flight pages become stale.
    pub fn start_search(&mut self, query: SearchQuery) -> SearchTicket {
        self.pool.start(query)
    }

    pub fn next_search_page(&mut self) -> Result<SearchTicket, SessionError> {
        Ok(self.pool.next_page()?)
    }

    /// Merge a fetched page if it is still current.
    pub fn accept_search(
        &mut self,
        ticket: &SearchTicket,
        page: SearchPage,
    ) -> Result<MergeOutcome, SessionError> {
        Ok(self.pool.accept(ticket, page)?)
    }

    /// Release a page whose fetch failed.
    pub fn abandon_search(&mut self, ticket: &SearchTicket, message: &str) {
        self.pool.abandon(ticket);
        self.notify_failure(message);
    }

    /// Set or clear one day's weather. Returns false for an unknown day.
    pub fn set_weather(&mut self, day: u32, weather: Option<Weather>) -> bool {
        match self.trip.day_mut(day) {
            Some(d) => {
                d.weather = weather;
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    /// Run a strategy over the current trip; the result stays pending.
    pub fn optimize(
        &mut self,
        strategy: Strategy,
        options: &OptimizeOptions,
        cancel: &CancelToken,
    ) -> Result<&OptimizationResult, SessionError> {
        self.optimized_at = None;
        let result = self
            .optimizer
            .run(&self.trip, strategy, options, &self.config, cancel)?;
        self.optimized_at = Some(self.revision);
        Ok(result)
    }

    /// Replace the trip with the pending optimization.
    ///
    /// # Errors
    ///
    /// [`OptimizeError::Outdated`] if the trip was edited after the run;
    /// the pending result is kept so the caller can discard it.
    pub fn apply_optimization(&mut self) -> Result<&Trip, SessionError> {
        let strategy = self
            .optimizer
            .pending()
            .map(|r| r.strategy)
            .ok_or(OptimizeError::NoPendingResult)?;
        if self.optimized_at != Some(self.revision) {
            return Err(OptimizeError::Outdated.into());
        }

        self.trip = self.optimizer.apply()?;
        self.revision += 1;
        self.optimized_at = None;
        self.notifier.notify(
            NotifyKind::Success,
            &format!("Applied {} to the itinerary", strategy.name()),
        );
        Ok(&self.trip)
    }

    pub fn discard_optimization(&mut self) -> Result<(), SessionError> {
        self.optimizer.discard()?;
        self.optimized_at = None;
        self.notifier
            .notify(NotifyKind::Info, "Discarded the optimization result");
        Ok(())
    }

    fn edit<T>(
        &mut self,
        f: impl FnOnce(&mut ItineraryEditor<'_>) -> Result<T, EditError>,
    ) -> Result<T, SessionError> {
        let mut editor = ItineraryEditor::new(&mut self.trip, &self.config, self.notifier.as_ref());
        let value = f(&mut editor)?;
        self.revision += 1;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Candidate, Coordinates, PriceLevel};
    use crate::itinerary::notify::testing::RecordingNotifier;
    use crate::search::Pagination;
    use chrono::NaiveDate;

    fn session_with(notifier: Arc<RecordingNotifier>) -> PlannerSession {
        let start = NaiveDate::from_ymd_opt(2025, 4, 20).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 4, 21).unwrap();
        let mut trip = Trip::new("trip-1", "Hanoi", "Hanoi", start, end).unwrap();
        trip.days.clear();
        PlannerSession::open(
            trip,
            ScheduleConfig::default(),
            SearchPaging { page_size: 2 },
            notifier,
        )
        .unwrap()
    }

    fn candidate(id: &str, name: &str, price: u8) -> Candidate {
        let mut c = Candidate::new(id, name, "restaurant");
        c.price_level = Some(PriceLevel::new(price).unwrap());
        c.location = Some(Coordinates::new(21.03, 105.85));
        c
    }

    fn load(session: &mut PlannerSession, candidates: Vec<Candidate>) {
        let ticket = session.start_search(SearchQuery::text("food"));
        let total = candidates.len() as u64;
        session
            .accept_search(
                &ticket,
                SearchPage {
                    candidates,
                    pagination: Some(Pagination {
                        total,
                        page: 1,
                        limit: 2,
                        total_pages: 1,
                    }),
                },
            )
            .unwrap();
    }

    #[test]
    fn open_generates_days() {
        let session = session_with(Arc::default());
        assert_eq!(session.trip().days.len(), 2);
        assert_eq!(session.revision(), 0);
    }

    #[test]
    fn insert_from_search_results() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mut session = session_with(notifier.clone());
        load(&mut session, vec![candidate("p1", "Pho 10", 1)]);

        let id = session.insert_candidate(1, "p1", None).unwrap();
        assert_eq!(id.as_str(), "suggested_p1_1");
        assert_eq!(session.revision(), 1);
        assert_eq!(notifier.kinds(), vec![NotifyKind::Success]);

        let err = session.insert_candidate(1, "nope", None).unwrap_err();
        assert_eq!(
            err,
            SessionError::Search(SearchError::UnknownCandidate("nope".into()))
        );
        assert_eq!(session.revision(), 1);
    }

    #[test]
    fn rejected_edit_keeps_revision() {
        let mut session = session_with(Arc::default());
        assert!(session.move_within_day(1, 0, 0).is_err());
        assert_eq!(session.revision(), 0);
    }

    #[test]
    fn optimize_then_apply() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mut session = session_with(notifier.clone());
        load(
            &mut session,
            vec![candidate("a", "Expensive", 4), candidate("b", "Cheap", 1)],
        );
        session.insert_candidate(1, "a", None).unwrap();
        session.insert_candidate(1, "b", None).unwrap();

        let before = session.trip().clone();
        session
            .optimize(
                Strategy::BudgetConscious,
                &OptimizeOptions::default(),
                &CancelToken::new(),
            )
            .unwrap();
        assert_eq!(session.trip(), &before);

        let trip = session.apply_optimization().unwrap();
        let names: Vec<_> = trip.days[0].visits.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Cheap", "Expensive"]);
        assert_eq!(
            notifier.events().last().unwrap().1,
            "Applied Budget saver to the itinerary"
        );
    }

    #[test]
    fn edit_after_optimize_blocks_apply() {
        let mut session = session_with(Arc::default());
        load(
            &mut session,
            vec![candidate("a", "A", 4), candidate("b", "B", 1)],
        );
        session.insert_candidate(1, "a", None).unwrap();
        session
            .optimize(Strategy::Smart, &OptimizeOptions::default(), &CancelToken::new())
            .unwrap();

        session.insert_candidate(2, "b", None).unwrap();
        assert_eq!(
            session.apply_optimization().unwrap_err(),
            SessionError::Optimize(OptimizeError::Outdated)
        );
        session.discard_optimization().unwrap();
        assert_eq!(
            session.apply_optimization().unwrap_err(),
            SessionError::Optimize(OptimizeError::NoPendingResult)
        );
        assert_eq!(session.trip().visit_count(), 2);
    }

    #[test]
    fn weather_is_marshalled_in() {
        let mut session = session_with(Arc::default());
        let weather = Weather {
            temperature_high: 30.0,
            temperature_low: 24.0,
            condition: "sunny".into(),
            precipitation_chance: 5,
        };
        assert!(session.set_weather(2, Some(weather.clone())));
        assert!(!session.set_weather(9, Some(weather)));
        assert!(session.trip().days[1].weather.is_some());
    }

    #[test]
    fn failed_page_notifies_and_allows_retry() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mut session = session_with(notifier.clone());
        let ticket = session.start_search(SearchQuery::text("cafe"));
        session
            .accept_search(
                &ticket,
                SearchPage {
                    candidates: vec![candidate("a", "A", 1), candidate("b", "B", 1)],
                    pagination: None,
                },
            )
            .unwrap();

        let page2 = session.next_search_page().unwrap();
        session.abandon_search(&page2, "search failed");
        assert_eq!(notifier.kinds(), vec![NotifyKind::Error]);
        assert_eq!(session.next_search_page().unwrap().page, 2);
    }
}
