//! HTTP API endpoints for trivia content and session snapshots.
//!
//! Authoring goes through here: records are created blank, filled one
//! category and question at a time, then published once they pass the
//! authoring limits and the play-time content checks.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::game::authoring::{self, AuthoringError, QuestionDraft};
use crate::game::{Content, GameError};
use crate::protocol::SessionView;
use crate::state::{AppState, SessionError};
use crate::store::{StoreError, TriviaRecord, TriviaStatus};
use crate::types::TriviaId;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Authoring(#[from] AuthoringError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Content(#[from] GameError),

    #[error("Trivia is already published and can no longer be edited.")]
    AlreadyPublished,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Store(StoreError::NotFound(_)) => (StatusCode::NOT_FOUND, "TRIVIA_NOT_FOUND"),
            ApiError::Store(StoreError::InvalidId(_)) => (StatusCode::BAD_REQUEST, "INVALID_ID"),
            ApiError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
            ApiError::Authoring(_) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            ApiError::Session(e) => {
                let status = match e {
                    SessionError::SessionNotFound(_) | SessionError::Store(StoreError::NotFound(_)) => {
                        StatusCode::NOT_FOUND
                    }
                    _ => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (status, e.code())
            }
            ApiError::Content(_) => (StatusCode::UNPROCESSABLE_ENTITY, "CONTENT_INVALID"),
            ApiError::AlreadyPublished => (StatusCode::CONFLICT, "ALREADY_PUBLISHED"),
        };

        if status.is_server_error() {
            tracing::error!("API request failed: {}", self);
        }

        let body = ErrorBody {
            code,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Listing entry for the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriviaSummary {
    pub id: TriviaId,
    pub title: String,
    pub status: TriviaStatus,
    pub categories: usize,
    pub questions: usize,
    pub created_at: String,
}

impl From<&TriviaRecord> for TriviaSummary {
    fn from(record: &TriviaRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            status: record.status,
            categories: record.content.len(),
            questions: record.content.values().map(Vec::len).sum(),
            created_at: record.created_at.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewTrivia {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct NewCategory {
    pub name: String,
}

/// Whether a record could be played right now
#[derive(Debug, Serialize, Deserialize)]
pub struct PlayabilityReport {
    pub playable: bool,
    pub problems: Vec<String>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/trivia", get(list_trivia).post(create_trivia))
        .route("/api/trivia/{id}", get(get_trivia).delete(delete_trivia))
        .route("/api/trivia/{id}/check", get(check_trivia))
        .route("/api/trivia/{id}/publish", post(publish_trivia))
        .route("/api/trivia/{id}/categories", post(add_category))
        .route("/api/trivia/{id}/categories/{category}", delete(delete_category))
        .route(
            "/api/trivia/{id}/categories/{category}/questions",
            post(add_question),
        )
        .route(
            "/api/trivia/{id}/categories/{category}/questions/{index}",
            delete(delete_question),
        )
        .route("/api/sessions/{id}", get(get_session))
}

/// GET /api/trivia
pub async fn list_trivia(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<TriviaSummary>>> {
    let records = state.store.list().await?;
    Ok(Json(records.iter().map(TriviaSummary::from).collect()))
}

/// POST /api/trivia
///
/// Creates a blank record with status "in progress".
pub async fn create_trivia(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewTrivia>,
) -> ApiResult<(StatusCode, Json<TriviaRecord>)> {
    let title = body.title.trim();
    if title.is_empty() {
        return Err(AuthoringError::TitleRequired.into());
    }

    let record = TriviaRecord::new(title);
    state.store.save(&record).await?;
    tracing::info!("Trivia {} created: {}", record.id, record.title);
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/trivia/{id}
pub async fn get_trivia(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<TriviaRecord>> {
    Ok(Json(state.store.fetch(&id).await?))
}

/// DELETE /api/trivia/{id}
pub async fn delete_trivia(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.store.delete(&id).await?;
    tracing::info!("Trivia {} deleted", id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/trivia/{id}/check
///
/// Runs the same checks a new session runs, reporting every problem.
pub async fn check_trivia(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<PlayabilityReport>> {
    let record = state.store.fetch(&id).await?;
    let report = match Content::from_stored(&record.content) {
        Ok(_) => PlayabilityReport {
            playable: true,
            problems: Vec::new(),
        },
        Err(GameError::ContentInvalid(problems)) => PlayabilityReport {
            playable: false,
            problems: problems.iter().map(ToString::to_string).collect(),
        },
        Err(e) => return Err(e.into()),
    };
    Ok(Json(report))
}

/// Fetch a record that may still be edited
async fn editable(state: &AppState, id: &str) -> ApiResult<TriviaRecord> {
    let record = state.store.fetch(id).await?;
    if record.status == TriviaStatus::Completed {
        return Err(ApiError::AlreadyPublished);
    }
    Ok(record)
}

/// POST /api/trivia/{id}/publish
pub async fn publish_trivia(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<TriviaRecord>> {
    let mut record = editable(&state, &id).await?;
    authoring::check_publishable(&record.content, &state.config.authoring)?;
    Content::from_stored(&record.content)?;

    record.status = TriviaStatus::Completed;
    state.store.save(&record).await?;
    tracing::info!("Trivia {} published", id);
    Ok(Json(record))
}

/// POST /api/trivia/{id}/categories
pub async fn add_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<NewCategory>,
) -> ApiResult<(StatusCode, Json<TriviaRecord>)> {
    let mut record = editable(&state, &id).await?;
    authoring::add_category(&mut record.content, &body.name, &state.config.authoring)?;
    state.store.save(&record).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /api/trivia/{id}/categories/{category}
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path((id, category)): Path<(String, String)>,
) -> ApiResult<Json<TriviaRecord>> {
    let mut record = editable(&state, &id).await?;
    authoring::delete_category(&mut record.content, &category)?;
    state.store.save(&record).await?;
    tracing::info!("Category \"{}\" deleted from trivia {}", category, id);
    Ok(Json(record))
}

/// POST /api/trivia/{id}/categories/{category}/questions
pub async fn add_question(
    State(state): State<Arc<AppState>>,
    Path((id, category)): Path<(String, String)>,
    Json(draft): Json<QuestionDraft>,
) -> ApiResult<(StatusCode, Json<TriviaRecord>)> {
    let mut record = editable(&state, &id).await?;
    authoring::add_question(&mut record.content, &category, &draft, &state.config.authoring)?;
    state.store.save(&record).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /api/trivia/{id}/categories/{category}/questions/{index}
pub async fn delete_question(
    State(state): State<Arc<AppState>>,
    Path((id, category, index)): Path<(String, String, usize)>,
) -> ApiResult<Json<TriviaRecord>> {
    let mut record = editable(&state, &id).await?;
    authoring::delete_question(&mut record.content, &category, index)?;
    state.store.save(&record).await?;
    Ok(Json(record))
}

/// GET /api/sessions/{id}
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionView>> {
    Ok(Json(state.view(&id).await?))
}
