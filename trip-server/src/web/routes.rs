//! HTTP route handlers.
//!
//! Every handler locks the session map only around synchronous session
//! calls. Backend requests run with the lock released; their results are
//! handed back to the session, which drops stale search pages by sequence
//! number.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::{error, info, warn};

use crate::backend::{BackendError, TripUpdate};
use crate::domain::{DomainError, VisitId};
use crate::itinerary::{EditError, NotifyKind, PlannerSession, SessionError, VisitPatch};
use crate::optimizer::{CancelToken, OptimizeError, OptimizeOptions, Strategy};
use crate::search::{SearchError, SearchTicket};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/strategies", get(list_strategies))
        .route("/trips/:id", get(get_trip))
        .route("/trips/:id/open", post(open_trip))
        .route("/trips/:id/days/:day/reorder", post(reorder))
        .route("/trips/:id/move", post(move_visit))
        .route("/trips/:id/days/:day/visits", post(insert_visit))
        .route(
            "/trips/:id/days/:day/visits/:visit_id",
            axum::routing::delete(remove_visit).patch(update_visit),
        )
        .route("/trips/:id/search", get(search))
        .route("/trips/:id/search/more", get(search_more))
        .route("/trips/:id/optimize", post(optimize))
        .route("/trips/:id/optimize/apply", post(apply_optimization))
        .route("/trips/:id/optimize/discard", post(discard_optimization))
        .route("/trips/:id/save", post(save_trip))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Available optimization strategies.
async fn list_strategies() -> Json<Vec<StrategyInfo>> {
    Json(
        Strategy::ALL
            .into_iter()
            .map(|s| StrategyInfo {
                id: s.id(),
                name: s.name(),
            })
            .collect(),
    )
}

/// Run `f` against an open session while holding the session lock.
async fn with_session<T>(
    state: &AppState,
    id: &str,
    f: impl FnOnce(&mut PlannerSession) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions.get_mut(id).ok_or_else(|| AppError::NotFound {
        message: format!("trip {id} is not open"),
    })?;
    f(session)
}

fn trip_response(session: &PlannerSession) -> TripResponse {
    TripResponse {
        trip: session.trip().clone(),
        revision: session.revision(),
    }
}

/// Load a trip and its weather into a fresh session.
///
/// Reopening a trip replaces its session.
async fn open_trip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TripResponse>, AppError> {
    let trip = state.backend.get_trip(&id).await?;
    let mut session = PlannerSession::open(
        trip,
        state.schedule.as_ref().clone(),
        state.paging,
        state.notifier.clone(),
    )?;

    let weather = state.backend.load_weather(session.trip()).await;
    let with_weather = weather.iter().filter(|(_, w)| w.is_some()).count();
    for (day, w) in weather {
        session.set_weather(day, w);
    }

    let response = trip_response(&session);
    state.sessions.lock().await.insert(id.clone(), session);
    info!(trip_id = %id, days = response.trip.days.len(), with_weather, "opened trip");
    Ok(Json(response))
}

async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TripResponse>, AppError> {
    with_session(&state, &id, |s| Ok(Json(trip_response(s)))).await
}

async fn reorder(
    State(state): State<AppState>,
    Path((id, day)): Path<(String, u32)>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<TripResponse>, AppError> {
    with_session(&state, &id, |s| {
        s.move_within_day(day, req.from, req.to)?;
        Ok(Json(trip_response(s)))
    })
    .await
}

async fn move_visit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<TripResponse>, AppError> {
    with_session(&state, &id, |s| {
        s.move_across_days(req.source_day, req.from_index, req.dest_day, req.to_index)?;
        Ok(Json(trip_response(s)))
    })
    .await
}

async fn insert_visit(
    State(state): State<AppState>,
    Path((id, day)): Path<(String, u32)>,
    Json(req): Json<InsertRequest>,
) -> Result<Json<TripResponse>, AppError> {
    with_session(&state, &id, |s| {
        s.insert_candidate(day, &req.candidate_id, req.index)?;
        Ok(Json(trip_response(s)))
    })
    .await
}

async fn remove_visit(
    State(state): State<AppState>,
    Path((id, day, visit_id)): Path<(String, u32, String)>,
) -> Result<Json<TripResponse>, AppError> {
    with_session(&state, &id, |s| {
        s.remove(day, &VisitId::new(visit_id))?;
        Ok(Json(trip_response(s)))
    })
    .await
}

async fn update_visit(
    State(state): State<AppState>,
    Path((id, day, visit_id)): Path<(String, u32, String)>,
    Json(patch): Json<VisitPatch>,
) -> Result<Json<TripResponse>, AppError> {
    with_session(&state, &id, |s| {
        s.update_visit(day, &VisitId::new(visit_id), patch)?;
        Ok(Json(trip_response(s)))
    })
    .await
}

/// Start a fresh search, discarding earlier results.
async fn search(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let ticket = with_session(&state, &id, |s| Ok(s.start_search(params.into()))).await?;
    fetch_page(&state, &id, ticket).await
}

/// Fetch the next page of the current search.
async fn search_more(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SearchResponse>, AppError> {
    let ticket = with_session(&state, &id, |s| Ok(s.next_search_page()?)).await?;
    fetch_page(&state, &id, ticket).await
}

async fn fetch_page(
    state: &AppState,
    id: &str,
    ticket: SearchTicket,
) -> Result<Json<SearchResponse>, AppError> {
    match state.backend.search_places(&ticket).await {
        Ok(page) => {
            with_session(state, id, |s| {
                let outcome = s.accept_search(&ticket, page)?;
                Ok(Json(SearchResponse::new(s.pool(), outcome)))
            })
            .await
        }
        Err(e) => {
            warn!(trip_id = id, seq = ticket.seq, page = ticket.page, error = %e, "search failed");
            if let Some(session) = state.sessions.lock().await.get_mut(id) {
                session.abandon_search(&ticket, "Search failed, please try again");
            }
            Err(e.into())
        }
    }
}

/// Run a strategy. The result stays pending until applied or discarded.
async fn optimize(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, AppError> {
    let strategy: Strategy = req.strategy.parse()?;
    let options: OptimizeOptions = req.options.into();
    with_session(&state, &id, |s| {
        let result = s.optimize(strategy, &options, &CancelToken::new())?;
        Ok(Json(OptimizeResponse::from(result)))
    })
    .await
}

async fn apply_optimization(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TripResponse>, AppError> {
    with_session(&state, &id, |s| {
        s.apply_optimization()?;
        Ok(Json(trip_response(s)))
    })
    .await
}

async fn discard_optimization(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TripResponse>, AppError> {
    with_session(&state, &id, |s| {
        s.discard_optimization()?;
        Ok(Json(trip_response(s)))
    })
    .await
}

/// Persist the session's trip through the backend.
async fn save_trip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SaveResponse>, AppError> {
    let (update, total) = with_session(&state, &id, |s| {
        Ok((TripUpdate::from_trip(s.trip()), s.trip().visit_count()))
    })
    .await?;

    if let Err(e) = state.backend.put_trip(&id, &update).await {
        state
            .notifier
            .notify(NotifyKind::Error, "Failed to save the trip, please try again");
        return Err(e.into());
    }

    let saved_visits = update.visit_count();
    state.notifier.notify(NotifyKind::Success, "Trip saved");
    info!(trip_id = %id, saved_visits, "saved trip");
    Ok(Json(SaveResponse {
        saved_visits,
        skipped_visits: total.saturating_sub(saved_visits),
    }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    Upstream { message: String },
    Internal { message: String },
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::BadRequest { message }
            | AppError::NotFound { message }
            | AppError::Conflict { message }
            | AppError::Upstream { message }
            | AppError::Internal { message } => message,
        }
    }
}

impl From<BackendError> for AppError {
    fn from(e: BackendError) -> Self {
        let message = e.to_string();
        match e {
            BackendError::NotFound(_) => AppError::NotFound { message },
            BackendError::Io(_) => AppError::Internal { message },
            _ => AppError::Upstream { message },
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<EditError> for AppError {
    fn from(e: EditError) -> Self {
        let message = e.to_string();
        match e {
            EditError::DayNotFound(_) | EditError::VisitNotFound { .. } => {
                AppError::NotFound { message }
            }
            EditError::AlreadyPresent { .. } => AppError::Conflict { message },
            EditError::IndexOutOfRange { .. }
            | EditError::InvalidPatch(_)
            | EditError::Domain(_) => AppError::BadRequest { message },
        }
    }
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        let message = e.to_string();
        match e {
            SearchError::Stale { .. } | SearchError::OutOfOrder { .. } => {
                AppError::Conflict { message }
            }
            SearchError::UnknownCandidate(_) => AppError::NotFound { message },
            SearchError::NoActiveSearch | SearchError::NoMorePages => {
                AppError::BadRequest { message }
            }
        }
    }
}

impl From<OptimizeError> for AppError {
    fn from(e: OptimizeError) -> Self {
        let message = e.to_string();
        let cause = match &e {
            OptimizeError::PhaseFailed { source, .. } => source.as_ref(),
            other => other,
        };
        match cause {
            OptimizeError::Outdated | OptimizeError::Cancelled(_) => AppError::Conflict { message },
            OptimizeError::EmptyTrip
            | OptimizeError::InvalidTrip(_)
            | OptimizeError::NoPendingResult
            | OptimizeError::UnknownStrategy(_) => AppError::BadRequest { message },
            OptimizeError::PhaseFailed { .. } => AppError::Internal { message },
        }
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Edit(e) => e.into(),
            SessionError::Search(e) => e.into(),
            SessionError::Optimize(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = self.message().to_string();

        if status.is_server_error() {
            error!(%status, "{message}");
        } else {
            warn!(%status, "{message}");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod routes_tests;
