//! Handlers for `/sessions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/sessions` | Optional filter body; 201. Drops idle sessions |
//! | `GET`  | `/sessions/{id}` | 404 if not found |
//! | `DELETE` | `/sessions/{id}` | 204, or 404 if not found |
//! | `PUT`  | `/sessions/{id}/filter` | Body: a filter |
//! | `POST` | `/sessions/{id}/next` | 404 when no player matches |
//! | `POST` | `/sessions/{id}/answer` | Body: `{"guess":"..."}` |
//! | `POST` | `/sessions/{id}/challenge` | 409 unless the last answer was an unchallenged miss |
//! | `POST` | `/sessions/{id}/reset` | |

use std::sync::Arc;

use alma_core::quiz::{AnswerOutcome, PlayerCard, PoolFilter, QuizSession, Score};
use axum::{
  Json,
  body::Bytes,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  error::ApiError,
  state::{QuizState, touch},
};

/// Everything a client needs to render a session.
#[derive(Debug, Serialize)]
pub struct SessionView {
  pub id:          Uuid,
  pub filter:      PoolFilter,
  pub score:       Score,
  pub accuracy:    f64,
  pub remaining:   usize,
  pub current:     Option<PlayerCard>,
  pub last_result: Option<AnswerOutcome>,
}

impl SessionView {
  fn of(id: Uuid, session: &QuizSession) -> Self {
    Self {
      id,
      filter: session.filter().clone(),
      score: session.score(),
      accuracy: session.score().accuracy(),
      remaining: session.remaining(),
      current: session.current().map(PlayerCard::from),
      last_result: session.last_result().cloned(),
    }
  }
}

fn missing(id: Uuid) -> ApiError { ApiError::NotFound(format!("session {id} not found")) }

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /sessions`. An empty body starts with the default filter.
pub async fn create(
  State(state): State<Arc<QuizState>>,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
  let filter = if body.iter().all(u8::is_ascii_whitespace) {
    PoolFilter::default()
  } else {
    serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?
  };

  let id = Uuid::new_v4();
  let session = QuizSession::new(state.players.clone(), filter);
  let view = SessionView::of(id, &session);

  let mut sessions = state.sessions.lock().await;
  if !state.session_ttl.is_zero() {
    let evicted = sessions.evict_idle(Instant::now(), state.session_ttl);
    if evicted > 0 {
      info!(evicted, "dropped idle sessions");
    }
  }
  sessions.insert(id, session);
  debug!(%id, open = sessions.open.len(), "session created");
  Ok((StatusCode::CREATED, Json(view)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /sessions/{id}`
pub async fn get_one(
  State(state): State<Arc<QuizState>>,
  Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
  let mut sessions = state.sessions.lock().await;
  let session = touch(&mut sessions.open, id).ok_or_else(|| missing(id))?;
  Ok(Json(SessionView::of(id, session)))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /sessions/{id}`
pub async fn delete(
  State(state): State<Arc<QuizState>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  let mut sessions = state.sessions.lock().await;
  sessions.open.remove(&id).ok_or_else(|| missing(id))?;
  debug!(%id, open = sessions.open.len(), "session deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Filter ──────────────────────────────────────────────────────────────────

/// `PUT /sessions/{id}/filter`
pub async fn set_filter(
  State(state): State<Arc<QuizState>>,
  Path(id): Path<Uuid>,
  Json(filter): Json<PoolFilter>,
) -> Result<Json<SessionView>, ApiError> {
  let mut sessions = state.sessions.lock().await;
  let session = touch(&mut sessions.open, id).ok_or_else(|| missing(id))?;
  session.set_filter(filter);
  Ok(Json(SessionView::of(id, session)))
}

// ─── Draw ────────────────────────────────────────────────────────────────────

/// `POST /sessions/{id}/next`: the player to guess. Repeats the same
/// player until it is answered.
pub async fn next(
  State(state): State<Arc<QuizState>>,
  Path(id): Path<Uuid>,
) -> Result<Json<PlayerCard>, ApiError> {
  let mut guard = state.sessions.lock().await;
  let sessions = &mut *guard;
  let session = touch(&mut sessions.open, id).ok_or_else(|| missing(id))?;
  let athlete = session
    .next_player(&mut sessions.rng)
    .ok_or_else(|| ApiError::NotFound("no players match the current filter".to_string()))?;
  Ok(Json(PlayerCard::from(athlete)))
}

// ─── Answer ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnswerBody {
  pub guess: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
  pub outcome: AnswerOutcome,
  pub score:   Score,
}

/// `POST /sessions/{id}/answer`, body `{"guess":"..."}`
pub async fn answer(
  State(state): State<Arc<QuizState>>,
  Path(id): Path<Uuid>,
  Json(body): Json<AnswerBody>,
) -> Result<Json<AnswerResponse>, ApiError> {
  let mut sessions = state.sessions.lock().await;
  let session = touch(&mut sessions.open, id).ok_or_else(|| missing(id))?;
  let outcome = session.answer(&body.guess, &state.aliases)?;
  Ok(Json(AnswerResponse { outcome, score: session.score() }))
}

/// `POST /sessions/{id}/challenge`
pub async fn challenge(
  State(state): State<Arc<QuizState>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Score>, ApiError> {
  let mut sessions = state.sessions.lock().await;
  let session = touch(&mut sessions.open, id).ok_or_else(|| missing(id))?;
  Ok(Json(session.challenge()?))
}

/// `POST /sessions/{id}/reset`
pub async fn reset(
  State(state): State<Arc<QuizState>>,
  Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
  let mut sessions = state.sessions.lock().await;
  let session = touch(&mut sessions.open, id).ok_or_else(|| missing(id))?;
  session.reset();
  Ok(Json(SessionView::of(id, session)))
}
