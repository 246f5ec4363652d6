//! Read-only handlers over the quiz-ready players and the alias table.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/players` | `?league=&position=&team=&status=active\|all` |
//! | `GET`  | `/filters` | Optional `?league=` |
//! | `GET`  | `/colleges/{id}` | 404 if the alias table has no such college |

use std::sync::Arc;

use alma_core::{
  athlete::League,
  quiz::{FilterOptions, PlayerCard, PoolFilter, filter_options, get_quiz_pool},
};
use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, state::QuizState};

// ─── Players ─────────────────────────────────────────────────────────────────

/// `GET /players`: every player matching the filter.
pub async fn list(
  State(state): State<Arc<QuizState>>,
  Query(filter): Query<PoolFilter>,
) -> Json<Vec<PlayerCard>> {
  let pool = get_quiz_pool(&state.players, &filter);
  Json(pool.into_iter().map(PlayerCard::from).collect())
}

// ─── Filters ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FilterParams {
  pub league: Option<League>,
}

/// `GET /filters[?league=<league>]`
pub async fn options(
  State(state): State<Arc<QuizState>>,
  Query(params): Query<FilterParams>,
) -> Json<FilterOptions> {
  Json(filter_options(&state.players, params.league))
}

// ─── Colleges ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct College {
  pub college_id:   String,
  pub display_name: String,
}

/// `GET /colleges/{id}`
pub async fn college(
  State(state): State<Arc<QuizState>>,
  Path(id): Path<String>,
) -> Result<Json<College>, ApiError> {
  let display_name = state
    .aliases
    .display_name(&id)
    .ok_or_else(|| ApiError::NotFound(format!("college {id} not found")))?
    .to_string();
  Ok(Json(College { college_id: id, display_name }))
}
