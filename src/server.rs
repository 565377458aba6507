use crate::config::DEFAULT_SESSION_TTL_SECS;
use crate::models::ReviewForm;
use crate::panel::PanelSnapshot;
use crate::render::render_page;
use crate::submission::{SubmissionHandler, SubmissionOutcome};
use crate::tools::AnalysisBackend;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    backend: Arc<dyn AnalysisBackend>,
    sessions: Arc<DashMap<Uuid, Arc<SubmissionHandler>>>,
    session_ttl: Duration,
}

impl AppState {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self {
            backend,
            sessions: Arc::new(DashMap::new()),
            session_ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECS as i64),
        }
    }

    /// Sets how long a session may sit without panel activity before eviction.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Opens a page session with its own results panel.
    pub fn open_session(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions
            .insert(id, Arc::new(SubmissionHandler::new(self.backend.clone())));
        id
    }

    pub fn session(&self, id: &Uuid) -> Option<Arc<SubmissionHandler>> {
        self.sessions.get(id).map(|handler| handler.value().clone())
    }

    /// Drops sessions whose panel has been idle for at least the TTL as of
    /// `now`. A panel still waiting on a reply is kept.
    pub async fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        let handlers: Vec<(Uuid, Arc<SubmissionHandler>)> = self
            .sessions
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        let mut evicted = 0;
        for (id, handler) in handlers {
            let snapshot = handler.panel().snapshot().await;
            if snapshot.loading || now - snapshot.updated_at < self.session_ttl {
                continue;
            }
            if self.sessions.remove(&id).is_some() {
                evicted += 1;
            }
        }
        evicted
    }
}

/// Periodically evicts idle sessions.
pub fn spawn_session_sweeper(state: AppState, every: std::time::Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let evicted = state.evict_idle(Utc::now()).await;
            if evicted > 0 {
                debug!(
                    "Evicted {} idle sessions, {} remain",
                    evicted,
                    state.session_count()
                );
            }
        }
    })
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(index))
        .route("/sessions/:id/submit", post(submit))
        .route("/sessions/:id/results", get(results))
        .route("/api/sessions/:id", get(snapshot))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let id = state.open_session();

    match render_page(&id.to_string()) {
        Ok(page) => {
            info!("Opened page session {}", id);
            Ok(Html(page))
        }
        Err(e) => {
            error!("Page template failed: {}", e);
            state.sessions.remove(&id);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[instrument(skip(state, form))]
async fn submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<ReviewForm>,
) -> Result<Response, StatusCode> {
    let handler = state.session(&id).ok_or(StatusCode::NOT_FOUND)?;

    match handler.submit(form).await {
        SubmissionOutcome::Rendered { markup, .. } => Ok(Html(markup).into_response()),
        SubmissionOutcome::Superseded { .. } => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

async fn results(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, StatusCode> {
    let handler = state.session(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Html(handler.panel().content().await))
}

async fn snapshot(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PanelSnapshot>, StatusCode> {
    let handler = state.session(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(handler.panel().snapshot().await))
}
