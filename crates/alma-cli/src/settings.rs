//! Runtime settings, layered from an optional TOML file and `ALMA_*`
//! environment variables over built-in defaults.

use std::{collections::HashSet, path::PathBuf, time::Duration};

use alma_espn::{IngestSettings, endpoints::DEFAULT_BASE_URL, ingest::DEFAULT_EXCLUDED_IDS};
use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub data_dir:             PathBuf,
  pub api_base_url:         String,
  pub page_size:            u32,
  pub page_delay_ms:        u64,
  pub athlete_delay_ms:     u64,
  pub request_timeout_secs: u64,
  pub user_agent:           String,
  pub excluded_ids:         Vec<String>,
  pub host:                 String,
  pub port:                 u16,
  /// Seconds a quiz session may sit idle; 0 keeps sessions until deleted.
  pub session_ttl_secs:     u64,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      data_dir:             PathBuf::from("data"),
      api_base_url:         DEFAULT_BASE_URL.to_string(),
      page_size:            18_000,
      page_delay_ms:        500,
      athlete_delay_ms:     50,
      request_timeout_secs: 10,
      user_agent:           "college-script/1.0".to_string(),
      excluded_ids:         DEFAULT_EXCLUDED_IDS.iter().map(|s| s.to_string()).collect(),
      host:                 "127.0.0.1".to_string(),
      port:                 8501,
      session_ttl_secs:     60 * 60,
    }
  }
}

impl Settings {
  /// Read `path` (if it exists), then `ALMA_*` variables on top.
  pub fn load(path: PathBuf) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("ALMA"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  pub fn ingest(&self) -> IngestSettings {
    IngestSettings {
      page_size:     self.page_size,
      page_delay:    Duration::from_millis(self.page_delay_ms),
      athlete_delay: Duration::from_millis(self.athlete_delay_ms),
      excluded_ids:  self.excluded_ids.iter().cloned().collect::<HashSet<_>>(),
    }
  }

  pub fn request_timeout(&self) -> Duration { Duration::from_secs(self.request_timeout_secs) }

  pub fn session_ttl(&self) -> Duration { Duration::from_secs(self.session_ttl_secs) }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}
