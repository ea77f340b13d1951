//! Operator binary for the notification engine.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite store, and runs one dispatch for the given event. Useful for
//! re-driving a dispatch after an outage and for smoke-testing a deployment;
//! in production the application process raises events through
//! [`hotline_notify::Engine`] instead.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use hotline_notify::{Dispatcher, NotifyConfig, links::SignedLinks, mailers::LogMailer};
use hotline_store_sqlite::SqliteStore;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about = "Invasives Hotline notification dispatch")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  event: EventArg,
}

#[derive(Subcommand)]
enum EventArg {
  /// Dispatch match notices for a created report.
  Report { report_id: Uuid },
  /// Send the submitter's receipt for a submitted report.
  Submitted { report_id: Uuid },
  /// Dispatch discussion notices for a comment.
  Comment { comment_id: Uuid },
  /// Notify a subscription's new owner.
  OwnerChanged {
    subscription_id: Uuid,
    previous_owner:  Uuid,
    new_owner:       Uuid,
  },
  /// Notify an invited expert.
  Invite {
    invite_id: Uuid,
    #[arg(long, default_value = "")]
    message:   String,
  },
}

#[derive(Debug, Clone, Deserialize)]
struct WorkerConfig {
  store_path: PathBuf,

  #[serde(flatten)]
  notify: NotifyConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("HOTLINE"))
    .build()
    .context("failed to read config file")?;

  let worker_cfg: WorkerConfig = settings
    .try_deserialize()
    .context("failed to deserialise WorkerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&worker_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let notify_cfg = Arc::new(worker_cfg.notify);
  let links = SignedLinks::new(&notify_cfg);
  let dispatcher = Dispatcher::new(
    Arc::new(store),
    Arc::new(LogMailer),
    Arc::new(links),
    Arc::clone(&notify_cfg),
  );

  let summary = match cli.event {
    EventArg::Report { report_id } => {
      dispatcher.run_report_created(report_id).await?
    }
    EventArg::Submitted { report_id } => {
      dispatcher.run_report_submitted(report_id).await?
    }
    EventArg::Comment { comment_id } => {
      dispatcher.run_comment_created(comment_id).await?
    }
    EventArg::OwnerChanged {
      subscription_id,
      previous_owner,
      new_owner,
    } => {
      dispatcher
        .run_owner_changed(subscription_id, previous_owner, new_owner)
        .await?
    }
    EventArg::Invite { invite_id, message } => {
      dispatcher.run_invite_created(invite_id, &message).await?
    }
  };

  tracing::info!(sent = summary.sent, "dispatch complete");

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
