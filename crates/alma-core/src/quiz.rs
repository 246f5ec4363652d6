//! Quiz pool queries and per-session quiz state.
//!
//! The quiz-ready player list is shared and immutable. Everything that changes
//! while a user plays (which players are used up, the current player, the
//! score) lives in an explicit [`QuizSession`] value owned by that user.

use std::{
  collections::{BTreeSet, HashMap, HashSet},
  sync::Arc,
};

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  alias::AliasTable,
  athlete::{Athlete, AthleteKey, League},
};

// ─── Filters ─────────────────────────────────────────────────────────────────

/// Which playing statuses to include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
  #[default]
  Active,
  All,
}

/// Criteria restricting the pool a player is drawn from. `None` means "all".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoolFilter {
  #[serde(default)]
  pub league:   Option<League>,
  /// Compared case-insensitively.
  #[serde(default)]
  pub position: Option<String>,
  /// Team abbreviation, compared exactly.
  #[serde(default)]
  pub team:     Option<String>,
  #[serde(default)]
  pub status:   StatusFilter,
}

impl PoolFilter {
  pub fn matches(&self, athlete: &Athlete) -> bool {
    if self.league.is_some_and(|l| l != athlete.league) {
      return false;
    }
    if let Some(position) = self.position.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
      let actual = athlete.position.as_deref().unwrap_or("").trim();
      if !actual.eq_ignore_ascii_case(position) {
        return false;
      }
    }
    if let Some(team) = self.team.as_deref().filter(|t| !t.is_empty())
      && athlete.team.as_deref().unwrap_or("") != team
    {
      return false;
    }
    match self.status {
      StatusFilter::Active => athlete.active == Some(true),
      StatusFilter::All => true,
    }
  }
}

/// Players from `players` that match `filter`.
pub fn get_quiz_pool<'a>(players: &'a [Athlete], filter: &PoolFilter) -> Vec<&'a Athlete> {
  players.iter().filter(|a| filter.matches(a)).collect()
}

/// A uniformly random player from `pool`, or `None` if it is empty.
pub fn sample_one<'a, R>(pool: &[&'a Athlete], rng: &mut R) -> Option<&'a Athlete>
where
  R: Rng + ?Sized,
{
  pool.choose(rng).copied()
}

// ─── Filter options ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionCount {
  pub position: String,
  pub count:    usize,
}

/// The choices a filter UI can offer for one league (or all leagues).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FilterOptions {
  /// Most common first; ties by name.
  pub positions: Vec<PositionCount>,
  /// Sorted alphabetically.
  pub teams:     Vec<String>,
}

pub fn filter_options(players: &[Athlete], league: Option<League>) -> FilterOptions {
  let mut counts: HashMap<&str, usize> = HashMap::new();
  let mut teams: BTreeSet<&str> = BTreeSet::new();

  for athlete in players.iter().filter(|a| league.is_none_or(|l| l == a.league)) {
    if let Some(p) = athlete.position.as_deref().filter(|p| !p.is_empty()) {
      *counts.entry(p).or_default() += 1;
    }
    if let Some(t) = athlete.team.as_deref().filter(|t| !t.is_empty()) {
      teams.insert(t);
    }
  }

  let mut positions: Vec<PositionCount> = counts
    .into_iter()
    .map(|(position, count)| PositionCount { position: position.to_string(), count })
    .collect();
  positions.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.position.cmp(&b.position)));

  FilterOptions {
    positions,
    teams: teams.into_iter().map(str::to_string).collect(),
  }
}

// ─── Cards and outcomes ──────────────────────────────────────────────────────

/// What the quiz shows about the current player. Carries no college fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerCard {
  pub id:               String,
  pub league:           League,
  pub full_name:        Option<String>,
  pub position:         Option<String>,
  pub team:             Option<String>,
  pub experience_years: Option<u32>,
  /// `None` for undrafted players.
  pub draft_year:       Option<u16>,
  pub draft_round:      Option<u8>,
  pub active:           bool,
}

impl From<&Athlete> for PlayerCard {
  fn from(a: &Athlete) -> Self {
    Self {
      id:               a.id.clone(),
      league:           a.league,
      full_name:        a.full_name.clone(),
      position:         a.position.clone(),
      team:             a.team.clone(),
      experience_years: a.experience_years,
      draft_year:       a.draft.year,
      draft_round:      a.draft.round,
      active:           a.active == Some(true),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Score {
  pub correct:    u32,
  pub total:      u32,
  pub challenges: u32,
}

impl Score {
  /// Percentage of correct answers; zero before the first answer.
  pub fn accuracy(&self) -> f64 {
    if self.total == 0 {
      0.0
    } else {
      f64::from(self.correct) / f64::from(self.total) * 100.0
    }
  }
}

/// The result of answering the current player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerOutcome {
  pub athlete:      AthleteKey,
  pub correct:      bool,
  pub college_id:   Option<String>,
  /// The name shown as the right answer.
  pub display_name: String,
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// One user's quiz state.
#[derive(Debug, Clone)]
pub struct QuizSession {
  players:         Arc<Vec<Athlete>>,
  answered:        HashSet<AthleteKey>,
  filter:          PoolFilter,
  /// Index into `players`.
  current:         Option<usize>,
  score:           Score,
  last_result:     Option<AnswerOutcome>,
  challenged_last: bool,
}

impl QuizSession {
  pub fn new(players: Arc<Vec<Athlete>>, filter: PoolFilter) -> Self {
    Self {
      players,
      answered: HashSet::new(),
      filter,
      current: None,
      score: Score::default(),
      last_result: None,
      challenged_last: false,
    }
  }

  pub fn filter(&self) -> &PoolFilter { &self.filter }

  pub fn score(&self) -> Score { self.score }

  pub fn last_result(&self) -> Option<&AnswerOutcome> { self.last_result.as_ref() }

  pub fn current(&self) -> Option<&Athlete> { self.current.map(|i| &self.players[i]) }

  fn pool_indices(&self) -> Vec<usize> {
    self
      .players
      .iter()
      .enumerate()
      .filter(|(_, a)| !self.answered.contains(&a.key()) && self.filter.matches(a))
      .map(|(i, _)| i)
      .collect()
  }

  /// Players still available under the current filter.
  pub fn pool(&self) -> Vec<&Athlete> {
    self.pool_indices().into_iter().map(|i| &self.players[i]).collect()
  }

  pub fn remaining(&self) -> usize { self.pool_indices().len() }

  /// Replace the filter. A changed filter drops the current player so the
  /// next draw honours it. Returns whether the filter changed.
  pub fn set_filter(&mut self, filter: PoolFilter) -> bool {
    if filter == self.filter {
      return false;
    }
    self.filter = filter;
    self.current = None;
    true
  }

  /// The player awaiting an answer, drawing one from the pool if needed.
  /// `None` when no player matches the filter.
  pub fn next_player<R>(&mut self, rng: &mut R) -> Option<&Athlete>
  where
    R: Rng + ?Sized,
  {
    if self.current.is_none() {
      self.current = self.pool_indices().choose(rng).copied();
    }
    self.current()
  }

  /// Judge `guess` against the current player's college, score it, and
  /// retire the player from this session's pool.
  pub fn answer(&mut self, guess: &str, aliases: &AliasTable) -> Result<AnswerOutcome> {
    let idx = self.current.take().ok_or(Error::NoCurrentPlayer)?;
    let athlete = &self.players[idx];

    let college_id = athlete.college.id.clone();
    let correct = college_id
      .as_deref()
      .is_some_and(|id| aliases.is_correct(guess, id));
    let display_name = college_id
      .as_deref()
      .and_then(|id| aliases.display_name(id))
      .or(athlete.college.name.as_deref())
      .unwrap_or("Unknown")
      .to_string();

    let outcome = AnswerOutcome {
      athlete: athlete.key(),
      correct,
      college_id,
      display_name,
    };

    self.answered.insert(outcome.athlete.clone());
    self.score.total += 1;
    if correct {
      self.score.correct += 1;
    }
    self.last_result = Some(outcome.clone());
    self.challenged_last = false;
    Ok(outcome)
  }

  /// Credit the last answer after the user disputes it. Only an incorrect
  /// answer can be challenged, and only once.
  pub fn challenge(&mut self) -> Result<Score> {
    let eligible = self.last_result.as_ref().is_some_and(|r| !r.correct) && !self.challenged_last;
    if !eligible {
      return Err(Error::ChallengeNotAllowed);
    }
    self.score.correct += 1;
    self.score.challenges += 1;
    self.challenged_last = true;
    Ok(self.score)
  }

  /// Start over with the full pool and a zero score. The filter is kept.
  pub fn reset(&mut self) {
    self.answered.clear();
    self.current = None;
    self.score = Score::default();
    self.last_result = None;
    self.challenged_last = false;
  }
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};
  use rand::{SeedableRng, rngs::StdRng};

  use super::*;
  use crate::{
    alias::AliasRecord,
    athlete::{CollegeAttribution, Provenance},
  };

  fn player(id: &str, league: League, position: &str, team: &str, active: bool) -> Athlete {
    let mut a = Athlete::new(id, league, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    a.full_name = Some(format!("Player {id}"));
    a.position = Some(position.into());
    a.team = Some(team.into());
    a.active = Some(active);
    a.experience_years = Some(2);
    a.college = CollegeAttribution {
      name:       Some("Notre Dame Fighting Irish".into()),
      id:         Some("87".into()),
      provenance: Provenance::CollegeAthlete,
    };
    a
  }

  fn roster() -> Arc<Vec<Athlete>> {
    Arc::new(vec![
      player("1", League::Nfl, "QB", "KC", true),
      player("2", League::Nfl, "WR", "KC", true),
      player("3", League::Nfl, "QB", "BUF", false),
      player("4", League::Nba, "G", "BOS", true),
    ])
  }

  fn aliases() -> AliasTable {
    AliasTable::from_records([AliasRecord {
      college_id:   "87".into(),
      college:      Some("Notre Dame Fighting Irish".into()),
      display_name: Some("Notre Dame".into()),
      variants:     vec!["ND".into()],
    }])
  }

  fn rng() -> StdRng { StdRng::seed_from_u64(7) }

  #[test]
  fn pool_filters_by_league_position_team_and_status() {
    let players = roster();
    let all = PoolFilter { status: StatusFilter::All, ..PoolFilter::default() };
    assert_eq!(get_quiz_pool(&players, &all).len(), 4);

    let active = PoolFilter::default();
    assert_eq!(get_quiz_pool(&players, &active).len(), 3);

    let nfl_qbs = PoolFilter {
      league:   Some(League::Nfl),
      position: Some("qb".into()),
      status:   StatusFilter::All,
      ..PoolFilter::default()
    };
    let ids: Vec<_> = get_quiz_pool(&players, &nfl_qbs).iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);

    let kc = PoolFilter { team: Some("KC".into()), ..PoolFilter::default() };
    assert_eq!(get_quiz_pool(&players, &kc).len(), 2);
  }

  #[test]
  fn sample_from_empty_pool_is_none() {
    assert!(sample_one(&[], &mut rng()).is_none());
    let players = roster();
    let pool = get_quiz_pool(&players, &PoolFilter::default());
    assert!(sample_one(&pool, &mut rng()).is_some());
  }

  #[test]
  fn answered_players_leave_the_session_pool() {
    let players = roster();
    let mut session = QuizSession::new(players.clone(), PoolFilter::default());
    let mut rng = rng();

    let mut seen = HashSet::new();
    while let Some(current) = session.next_player(&mut rng) {
      assert!(seen.insert(current.key()), "player drawn twice");
      session.answer("nd", &aliases()).unwrap();
    }
    assert_eq!(seen.len(), 3);
    assert_eq!(session.remaining(), 0);
    assert_eq!(session.score(), Score { correct: 3, total: 3, challenges: 0 });
  }

  #[test]
  fn next_player_is_stable_until_answered() {
    let mut session = QuizSession::new(roster(), PoolFilter::default());
    let mut rng = rng();
    let first = session.next_player(&mut rng).unwrap().key();
    let again = session.next_player(&mut rng).unwrap().key();
    assert_eq!(first, again);
  }

  #[test]
  fn answer_reports_display_name_and_scores() {
    let mut session = QuizSession::new(roster(), PoolFilter::default());
    let mut rng = rng();
    session.next_player(&mut rng);

    let outcome = session.answer("norte dame", &aliases()).unwrap();
    assert!(!outcome.correct);
    assert_eq!(outcome.display_name, "Notre Dame");
    assert_eq!(session.score().total, 1);
    assert_eq!(session.score().correct, 0);
    assert!(session.current().is_none());
  }

  #[test]
  fn answer_without_current_player_is_an_error() {
    let mut session = QuizSession::new(roster(), PoolFilter::default());
    assert!(matches!(session.answer("nd", &aliases()), Err(Error::NoCurrentPlayer)));
  }

  #[test]
  fn unknown_college_falls_back_to_ingested_name() {
    let mut session = QuizSession::new(roster(), PoolFilter::default());
    session.next_player(&mut rng());
    let outcome = session.answer("notre dame", &AliasTable::default()).unwrap();
    assert!(!outcome.correct);
    assert_eq!(outcome.display_name, "Notre Dame Fighting Irish");
  }

  #[test]
  fn only_an_unchallenged_miss_can_be_challenged() {
    let mut session = QuizSession::new(roster(), PoolFilter::default());
    let mut rng = rng();
    assert!(session.challenge().is_err());

    session.next_player(&mut rng);
    session.answer("nd", &aliases()).unwrap();
    assert!(session.challenge().is_err(), "correct answers cannot be challenged");

    session.next_player(&mut rng);
    session.answer("wrong", &aliases()).unwrap();
    let score = session.challenge().unwrap();
    assert_eq!(score, Score { correct: 2, total: 2, challenges: 1 });
    assert!(session.challenge().is_err(), "second challenge rejected");
  }

  #[test]
  fn challenge_survives_next_draw() {
    let mut session = QuizSession::new(roster(), PoolFilter::default());
    let mut rng = rng();

    session.next_player(&mut rng);
    session.answer("wrong", &aliases()).unwrap();
    session.challenge().unwrap();

    session.next_player(&mut rng);
    assert!(matches!(session.challenge(), Err(Error::ChallengeNotAllowed)));
    assert_eq!(session.score(), Score { correct: 1, total: 1, challenges: 1 });
  }

  #[test]
  fn changing_the_filter_drops_the_current_player() {
    let mut session = QuizSession::new(roster(), PoolFilter::default());
    let mut rng = rng();
    session.next_player(&mut rng);

    assert!(!session.set_filter(PoolFilter::default()));
    assert!(session.current().is_some());

    let nba = PoolFilter { league: Some(League::Nba), ..PoolFilter::default() };
    assert!(session.set_filter(nba));
    assert!(session.current().is_none());
    assert_eq!(session.next_player(&mut rng).unwrap().league, League::Nba);
    assert_eq!(session.score().total, 0);
  }

  #[test]
  fn reset_restores_the_pool() {
    let mut session = QuizSession::new(roster(), PoolFilter::default());
    let mut rng = rng();
    session.next_player(&mut rng);
    session.answer("x", &aliases()).unwrap();
    assert_eq!(session.remaining(), 2);

    session.reset();
    assert_eq!(session.remaining(), 3);
    assert_eq!(session.score(), Score::default());
    assert!(session.last_result().is_none());
  }

  #[test]
  fn filter_options_count_positions_and_sort_teams() {
    let players = roster();
    let nfl = filter_options(&players, Some(League::Nfl));
    assert_eq!(nfl.positions[0], PositionCount { position: "QB".into(), count: 2 });
    assert_eq!(nfl.positions[1], PositionCount { position: "WR".into(), count: 1 });
    assert_eq!(nfl.teams, vec!["BUF".to_string(), "KC".to_string()]);

    let all = filter_options(&players, None);
    assert_eq!(all.teams.len(), 3);
  }

  #[test]
  fn card_hides_the_college() {
    let players = roster();
    let card = PlayerCard::from(&players[0]);
    let json = serde_json::to_value(&card).unwrap();
    assert!(json.get("college").is_none());
    assert_eq!(json["position"], "QB");
  }

  #[test]
  fn accuracy_is_zero_before_answers() {
    assert_eq!(Score::default().accuracy(), 0.0);
    let s = Score { correct: 1, total: 4, challenges: 0 };
    assert!((s.accuracy() - 25.0).abs() < f64::EPSILON);
  }
}
