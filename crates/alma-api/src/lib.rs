//! JSON API for the college quiz.
//!
//! Exposes an axum [`Router`] over a [`QuizState`]: the quiz-ready players,
//! the alias table, and per-user sessions. Each session owns its pool, so
//! concurrent users never draw from or retire players in each other's game.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", alma_api::api_router(Arc::new(state)))
//! ```

pub mod error;
pub mod players;
pub mod sessions;
pub mod state;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::QuizState;

/// Build the API router for `state`.
pub fn api_router(state: Arc<QuizState>) -> Router<()> {
  Router::new()
    // Players
    .route("/players", get(players::list))
    .route("/filters", get(players::options))
    .route("/colleges/{id}", get(players::college))
    // Sessions
    .route("/sessions", post(sessions::create))
    .route("/sessions/{id}", get(sessions::get_one).delete(sessions::delete))
    .route("/sessions/{id}/filter", put(sessions::set_filter))
    .route("/sessions/{id}/next", post(sessions::next))
    .route("/sessions/{id}/answer", post(sessions::answer))
    .route("/sessions/{id}/challenge", post(sessions::challenge))
    .route("/sessions/{id}/reset", post(sessions::reset))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use alma_core::{
    alias::{AliasRecord, AliasTable},
    athlete::{Athlete, CollegeAttribution, League, Provenance},
  };
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::{TimeZone, Utc};
  use rand::{SeedableRng, rngs::StdRng};
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  fn player(id: &str, league: League, active: bool, college_id: &str, college: &str) -> Athlete {
    let mut a = Athlete::new(id, league, Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap());
    a.full_name = Some(format!("Player {id}"));
    a.position = Some("QB".into());
    a.team = Some("PHI".into());
    a.active = Some(active);
    a.experience_years = Some(3);
    a.college = CollegeAttribution {
      name:       Some(college.into()),
      id:         Some(college_id.into()),
      provenance: Provenance::CollegeAthlete,
    };
    a
  }

  fn quiz_state() -> QuizState {
    let players = vec![
      player("1", League::Nfl, true, "87", "Notre Dame Fighting Irish"),
      player("2", League::Nfl, false, "2294", "Iowa Hawkeyes"),
      player("3", League::Nba, true, "2294", "Iowa Hawkeyes"),
    ];
    let aliases = AliasTable::from_records([AliasRecord {
      college_id:   "87".into(),
      college:      Some("Notre Dame Fighting Irish".into()),
      display_name: Some("Notre Dame".into()),
      variants:     vec!["ND".into(), "Norte Dame".into()],
    }]);
    QuizState::with_rng(players, aliases, StdRng::seed_from_u64(1))
  }

  fn state() -> Arc<QuizState> { Arc::new(quiz_state()) }

  async fn call(
    state: &Arc<QuizState>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = api_router(state.clone())
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
  }

  async fn open_session(state: &Arc<QuizState>, filter: Value) -> String {
    let (status, body) = call(state, "POST", "/sessions", Some(filter)).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
  }

  // ── Players ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn players_default_to_active_only() {
    let state = state();
    let (status, body) = call(&state, "GET", "/players", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body.as_array().unwrap().iter().map(|p| p["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["1", "3"]);

    let (_, body) = call(&state, "GET", "/players?league=nfl&status=all", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn league_query_ignores_case() {
    let state = state();
    let (status, body) = call(&state, "GET", "/players?league=NFL", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = call(&state, "GET", "/players?league=xfl", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn player_cards_hide_the_college() {
    let state = state();
    let (_, body) = call(&state, "GET", "/players?status=all", None).await;
    for card in body.as_array().unwrap() {
      assert!(card.get("college").is_none(), "{card}");
    }
  }

  #[tokio::test]
  async fn filters_list_positions_and_teams() {
    let state = state();
    let (status, body) = call(&state, "GET", "/filters?league=nfl", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["positions"], json!([{ "position": "QB", "count": 2 }]));
    assert_eq!(body["teams"], json!(["PHI"]));
  }

  #[tokio::test]
  async fn college_display_name_or_404() {
    let state = state();
    let (status, body) = call(&state, "GET", "/colleges/87", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_name"], "Notre Dame");

    let (status, body) = call(&state, "GET", "/colleges/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("9999"));
  }

  // ── Sessions ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn session_plays_through_its_pool() {
    let state = state();
    let id = open_session(&state, json!({ "league": "nfl" })).await;

    let (status, card) = call(&state, "POST", &format!("/sessions/{id}/next"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["id"], "1");
    assert!(card.get("college").is_none());

    let (status, body) = call(
      &state,
      "POST",
      &format!("/sessions/{id}/answer"),
      Some(json!({ "guess": "  norte dame " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["correct"], true);
    assert_eq!(body["outcome"]["display_name"], "Notre Dame");
    assert_eq!(body["score"]["correct"], 1);

    // The only active NFL player has been answered.
    let (status, _) = call(&state, "POST", &format!("/sessions/{id}/next"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, view) = call(&state, "POST", &format!("/sessions/{id}/reset"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["remaining"], 1);
    assert_eq!(view["score"]["total"], 0);
  }

  #[tokio::test]
  async fn a_miss_can_be_challenged_once() {
    let state = state();
    let id = open_session(&state, json!({ "league": "nba" })).await;
    call(&state, "POST", &format!("/sessions/{id}/next"), None).await;

    let (_, body) = call(
      &state,
      "POST",
      &format!("/sessions/{id}/answer"),
      Some(json!({ "guess": "Iowa State" })),
    )
    .await;
    assert_eq!(body["outcome"]["correct"], false);
    // No alias row for 2294, so the ingested name is shown.
    assert_eq!(body["outcome"]["display_name"], "Iowa Hawkeyes");

    let (status, score) = call(&state, "POST", &format!("/sessions/{id}/challenge"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(score["correct"], 1);
    assert_eq!(score["challenges"], 1);

    let (status, body) = call(&state, "POST", &format!("/sessions/{id}/challenge"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn a_challenged_miss_stays_challenged_after_next_draw() {
    let state = state();
    let id = open_session(&state, json!({ "league": "nfl", "status": "all" })).await;
    call(&state, "POST", &format!("/sessions/{id}/next"), None).await;
    call(&state, "POST", &format!("/sessions/{id}/answer"), Some(json!({ "guess": "wrong" }))).await;

    let (status, _) = call(&state, "POST", &format!("/sessions/{id}/challenge"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&state, "POST", &format!("/sessions/{id}/next"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&state, "POST", &format!("/sessions/{id}/challenge"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, view) = call(&state, "GET", &format!("/sessions/{id}"), None).await;
    assert_eq!(view["score"]["challenges"], 1);
    assert_eq!(view["score"]["correct"], 1);
  }

  #[tokio::test]
  async fn answering_before_drawing_is_a_conflict() {
    let state = state();
    let id = open_session(&state, json!({})).await;
    let (status, _) = call(
      &state,
      "POST",
      &format!("/sessions/{id}/answer"),
      Some(json!({ "guess": "ND" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn changing_the_filter_drops_the_current_player() {
    let state = state();
    let id = open_session(&state, json!({ "league": "nfl" })).await;
    call(&state, "POST", &format!("/sessions/{id}/next"), None).await;

    let (status, view) = call(
      &state,
      "PUT",
      &format!("/sessions/{id}/filter"),
      Some(json!({ "league": "nba" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(view["current"].is_null());

    let (_, card) = call(&state, "POST", &format!("/sessions/{id}/next"), None).await;
    assert_eq!(card["id"], "3");
  }

  #[tokio::test]
  async fn sessions_do_not_share_pools() {
    let state = state();
    let a = open_session(&state, json!({ "league": "nba" })).await;
    let b = open_session(&state, json!({ "league": "nba" })).await;

    call(&state, "POST", &format!("/sessions/{a}/next"), None).await;
    call(&state, "POST", &format!("/sessions/{a}/answer"), Some(json!({ "guess": "x" }))).await;

    let (status, card) = call(&state, "POST", &format!("/sessions/{b}/next"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["id"], "3");
  }

  #[tokio::test]
  async fn empty_body_uses_default_filter_and_unknown_session_is_404() {
    let state = state();
    let (status, view) = call(&state, "POST", "/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(view["filter"]["status"], "active");
    assert_eq!(view["remaining"], 2);

    let unknown = uuid::Uuid::new_v4();
    let (status, _) = call(&state, "GET", &format!("/sessions/{unknown}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&state, "GET", "/sessions/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn deleted_sessions_are_gone() {
    let state = state();
    let id = open_session(&state, json!({})).await;

    let (status, _) = call(&state, "DELETE", &format!("/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&state, "GET", &format!("/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&state, "DELETE", &format!("/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(state.sessions.lock().await.open.is_empty());
  }

  #[tokio::test(start_paused = true)]
  async fn idle_sessions_are_dropped_when_another_opens() {
    let state = Arc::new(quiz_state().with_session_ttl(Duration::from_secs(60)));
    let idle = open_session(&state, json!({})).await;
    let busy = open_session(&state, json!({})).await;

    tokio::time::advance(Duration::from_secs(45)).await;
    let (status, _) = call(&state, "POST", &format!("/sessions/{busy}/next"), None).await;
    assert_eq!(status, StatusCode::OK);
    tokio::time::advance(Duration::from_secs(30)).await;

    open_session(&state, json!({})).await;
    let (status, _) = call(&state, "GET", &format!("/sessions/{idle}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&state, "GET", &format!("/sessions/{busy}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.sessions.lock().await.open.len(), 2);
  }

  #[tokio::test(start_paused = true)]
  async fn zero_ttl_keeps_every_session() {
    let state = Arc::new(quiz_state().with_session_ttl(Duration::ZERO));
    let first = open_session(&state, json!({})).await;
    tokio::time::advance(Duration::from_secs(24 * 60 * 60)).await;
    open_session(&state, json!({})).await;

    let (status, _) = call(&state, "GET", &format!("/sessions/{first}"), None).await;
    assert_eq!(status, StatusCode::OK);
  }
}
