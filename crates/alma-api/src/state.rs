//! Shared server state: the quiz-ready players, the alias table, and every
//! open session.

use std::{collections::HashMap, sync::Arc, time::Duration};

use alma_core::{alias::AliasTable, athlete::Athlete, quiz::QuizSession};
use rand::{SeedableRng, rngs::StdRng};
use tokio::{sync::Mutex, time::Instant};
use uuid::Uuid;

/// How long a session may sit unused before the next `POST /sessions` drops
/// it.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// A session and the last time a request touched it.
#[derive(Debug)]
pub struct OpenSession {
  pub quiz:      QuizSession,
  pub last_used: Instant,
}

/// Sessions and the random source used to draw players, behind one lock so
/// that answering and drawing never interleave within a session.
#[derive(Debug)]
pub struct Sessions {
  pub open: HashMap<Uuid, OpenSession>,
  pub rng:  StdRng,
}

impl Sessions {
  pub fn insert(&mut self, id: Uuid, quiz: QuizSession) {
    self.open.insert(id, OpenSession { quiz, last_used: Instant::now() });
  }

  /// Drop every session idle for `ttl` or longer. Returns how many went.
  pub fn evict_idle(&mut self, now: Instant, ttl: Duration) -> usize {
    let before = self.open.len();
    self.open.retain(|_, s| now.saturating_duration_since(s.last_used) < ttl);
    before - self.open.len()
  }
}

/// Look up `id` in `open` and mark it as used now.
pub fn touch(open: &mut HashMap<Uuid, OpenSession>, id: Uuid) -> Option<&mut QuizSession> {
  let entry = open.get_mut(&id)?;
  entry.last_used = Instant::now();
  Some(&mut entry.quiz)
}

#[derive(Debug)]
pub struct QuizState {
  pub players:     Arc<Vec<Athlete>>,
  pub aliases:     Arc<AliasTable>,
  pub sessions:    Mutex<Sessions>,
  /// Zero keeps sessions until they are deleted.
  pub session_ttl: Duration,
}

impl QuizState {
  pub fn new(players: Vec<Athlete>, aliases: AliasTable) -> Self {
    Self::with_rng(players, aliases, StdRng::from_entropy())
  }

  /// Like [`QuizState::new`] with a caller-supplied random source.
  pub fn with_rng(players: Vec<Athlete>, aliases: AliasTable, rng: StdRng) -> Self {
    Self {
      players:     Arc::new(players),
      aliases:     Arc::new(aliases),
      sessions:    Mutex::new(Sessions { open: HashMap::new(), rng }),
      session_ttl: DEFAULT_SESSION_TTL,
    }
  }

  pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
    self.session_ttl = ttl;
    self
  }
}
