//! `alma`: ingest athlete data, build the quiz table, and serve the quiz.
//!
//! # Usage
//!
//! ```text
//! alma ingest --league nfl,nba --skip-existing
//! alma prepare
//! alma serve --config /etc/alma/alma.toml
//! ```

mod commands;
mod settings;

use std::path::PathBuf;

use alma_core::athlete::League;
use clap::{Parser, Subcommand};
use strum::IntoEnumIterator as _;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use commands::IngestFlags;
use settings::Settings;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "alma", version, about = "College quiz data pipeline and server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "alma.toml", env = "ALMA_CONFIG")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Pull athletes from the upstream API into the history tables.
  Ingest {
    /// Leagues to pull, comma-separated. Defaults to every league.
    #[arg(short, long, value_delimiter = ',', value_parser = League::parse)]
    league: Vec<League>,

    /// Only fetch athletes with no history row yet.
    #[arg(long)]
    skip_existing: bool,

    /// Do not append rows identical to the athlete's current row.
    #[arg(long)]
    skip_unchanged: bool,
  },
  /// Rebuild the quiz-ready table from the history tables.
  Prepare,
  /// Serve the quiz API.
  Serve,
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(cli.config)?;

  match cli.command {
    Command::Ingest { league, skip_existing, skip_unchanged } => {
      let leagues = if league.is_empty() { League::iter().collect() } else { league };
      let flags = IngestFlags { skip_existing, skip_unchanged };
      commands::ingest(&settings, &leagues, flags).await
    }
    Command::Prepare => commands::prepare(&settings).await,
    Command::Serve => commands::serve(&settings).await,
  }
}
