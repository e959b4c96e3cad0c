//! gosync driver binary.
//!
//! Loads the GO release file and the `ec2go` cross-reference file, opens the
//! SQLite store, and reconciles inside a single transaction: the run commits
//! as one unit, or rolls back wholesale on failure or under `--test-mode`.
//!
//! Settings come from an optional TOML file (`--config`), `GOSYNC_*`
//! environment variables, and command-line flags, in rising precedence.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use gosync_core::{
  context::EditStamp,
  record::{NewRecord, RecordClass},
  store::TermStore as _,
};
use gosync_engine::{REFERENCE_SOURCE_NAME, Reconciler};
use gosync_store_sqlite::SqliteStore;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
  author,
  version,
  about = "Synchronize stored GO term records with an upstream GO release"
)]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Path to the GO release flat file (go.obo).
  #[arg(long)]
  go_file: Option<PathBuf>,

  /// Path to the EC-to-GO cross-reference file.
  #[arg(long)]
  ec2go_file: Option<PathBuf>,

  /// Path to the SQLite store.
  #[arg(long)]
  store: Option<PathBuf>,

  /// Author recorded on the run's edit stamps.
  #[arg(long)]
  author: Option<String>,

  /// Run the full reconciliation, then roll the transaction back.
  #[arg(long)]
  test_mode: bool,

  /// Create the GO reference-source anchor record if the store lacks one.
  #[arg(long)]
  bootstrap: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct Settings {
  #[serde(default = "default_go_file")]
  go_file:    PathBuf,
  #[serde(default = "default_ec2go_file")]
  ec2go_file: PathBuf,
  #[serde(default = "default_store_path")]
  store_path: PathBuf,
  #[serde(default = "default_author")]
  author:     String,
}

fn default_go_file() -> PathBuf { PathBuf::from("go.obo") }
fn default_ec2go_file() -> PathBuf { PathBuf::from("ec2go") }
fn default_store_path() -> PathBuf { PathBuf::from("gosync.db") }
fn default_author() -> String { "gosync".to_string() }

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
  let mut builder = config::Config::builder();
  if let Some(path) = &cli.config {
    builder =
      builder.add_source(config::File::from(path.clone()).required(true));
  }
  let raw = builder
    .add_source(config::Environment::with_prefix("GOSYNC"))
    .build()
    .context("failed to read configuration")?;

  let mut settings: Settings = raw
    .try_deserialize()
    .context("failed to deserialise settings")?;

  // Command-line flags win over file and environment.
  if let Some(path) = &cli.go_file {
    settings.go_file = path.clone();
  }
  if let Some(path) = &cli.ec2go_file {
    settings.ec2go_file = path.clone();
  }
  if let Some(path) = &cli.store {
    settings.store_path = path.clone();
  }
  if let Some(author) = &cli.author {
    settings.author = author.clone();
  }

  Ok(settings)
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
  let settings = load_settings(&cli)?;

  // Load and parse both source files before touching the store; a parse
  // failure must abort with no mutation at all.
  let go_text = std::fs::read_to_string(&settings.go_file)
    .with_context(|| format!("failed to read GO file {:?}", settings.go_file))?;
  let ec_text = std::fs::read_to_string(&settings.ec2go_file).with_context(
    || format!("failed to read ec2go file {:?}", settings.ec2go_file),
  )?;

  let go_file = gosync_obo::parse_go_file(go_text.lines())
    .context("the GO file failed to parse")?;
  let ec_index = gosync_obo::parse_ec_index(ec_text.lines());
  tracing::info!(
    terms = go_file.terms.len(),
    lines = go_file.lines_read,
    "parsed the GO release file"
  );

  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| {
      format!("failed to open store at {:?}", settings.store_path)
    })?;

  if cli.bootstrap {
    bootstrap_reference_source(&store).await?;
  }

  store
    .begin_work()
    .await
    .context("failed to begin the transaction")?;

  let stamp = EditStamp::new(settings.author.as_str());
  let outcome = async {
    let reconciler = Reconciler::new(&store, stamp).await?;
    reconciler.run(&go_file.terms, &ec_index).await
  }
  .await;

  match outcome {
    Ok(mut report) => {
      report.lines_read = go_file.lines_read;
      report.terms_read = go_file.terms_read;

      if cli.test_mode {
        store
          .rollback_work()
          .await
          .context("failed to roll back the transaction")?;
        tracing::info!("test mode: transaction rolled back");
      } else {
        store
          .commit_work()
          .await
          .context("failed to commit the transaction")?;
      }

      println!("{report}");
      Ok(())
    }
    Err(err) => {
      if let Err(rollback_err) = store.rollback_work().await {
        tracing::error!(error = %rollback_err, "rollback failed too");
      }
      Err(err).context("reconciliation failed; transaction rolled back")
    }
  }
}

/// Seed the GO reference-source anchor into a fresh store. Existing anchors
/// are left alone.
async fn bootstrap_reference_source(store: &SqliteStore) -> anyhow::Result<()> {
  let existing = store
    .find_by_name(RecordClass::ReferenceSource, REFERENCE_SOURCE_NAME)
    .await?;
  if existing.is_empty() {
    let mut anchor = NewRecord::new(RecordClass::ReferenceSource);
    anchor.name = Some(REFERENCE_SOURCE_NAME.to_string());
    anchor.display_name = Some(REFERENCE_SOURCE_NAME.to_string());
    let id = store.create_record(anchor).await?;
    tracing::info!(record_id = id, "created the GO reference-source record");
  }
  Ok(())
}
