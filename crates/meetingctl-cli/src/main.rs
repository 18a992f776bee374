mod calendar_setup;
mod capabilities;
mod commands;
mod config;
mod output;
mod platform_arg;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use meetingctl_core::queue::FailureMode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::Config;
use output::CliOutcome;

#[derive(Parser)]
#[command(name = "meetingctl", about = "Local meeting-capture control plane")]
struct Cli {
    /// Emit a single JSON object on stdout instead of a human summary.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start recording the current or next calendar event (or an ad-hoc meeting).
    Start {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        platform: Option<String>,
    },
    /// Stop the active recording and enqueue post-processing.
    Stop,
    /// Report whether a recording is currently in progress.
    Status,
    /// Resolve the current/next calendar event without touching recording state.
    Event {
        #[arg(long)]
        nearest_to: Option<String>,
    },
    /// Run environment preconditions checks.
    Doctor,
    /// Patch one or more managed regions of a note.
    PatchNote {
        #[arg(long)]
        note: PathBuf,
        /// `region=content`, may be repeated.
        #[arg(long = "set", value_name = "REGION=CONTENT")]
        updates: Vec<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Drain the post-processing job queue.
    ProcessQueue {
        #[arg(long, default_value_t = 10)]
        max_jobs: usize,
        #[arg(long, default_value = "stop")]
        mode: String,
    },
    /// One-shot backfill over existing recordings.
    Backfill {
        files: Vec<PathBuf>,
        #[arg(long)]
        match_calendar: bool,
        #[arg(long)]
        rename: bool,
        #[arg(long)]
        dry_run: bool,
    },
    /// Continuously promote stray recordings into the pipeline.
    IngestWatch {
        #[arg(long)]
        once: bool,
        #[arg(long)]
        max_polls: Option<usize>,
        #[arg(long, default_value_t = 60)]
        poll_seconds: u64,
        #[arg(long, default_value_t = 60)]
        min_age_seconds: i64,
        #[arg(long)]
        match_calendar: bool,
    },
    /// Audit every note in the vault's meetings folder for consistency issues.
    AuditNotes,
}

fn config_error_outcome(e: config::ConfigError) -> CliOutcome {
    CliOutcome::error(serde_json::json!({"error": e.to_string()}), e.to_string())
}

fn parse_updates(raw: &[String]) -> Result<std::collections::BTreeMap<String, String>, String> {
    let mut updates = std::collections::BTreeMap::new();
    for entry in raw {
        let (region, content) = entry.split_once('=').ok_or_else(|| format!("--set value `{entry}` must be REGION=CONTENT"))?;
        updates.insert(region.to_string(), content.to_string());
    }
    Ok(updates)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)).with(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            let outcome = config_error_outcome(e);
            std::process::exit(outcome.emit(cli.json));
        }
    };

    let outcome = match cli.command {
        Command::Start { title, platform } => commands::start::run(&config, commands::start::StartArgs { title, platform }).await,
        Command::Stop => commands::stop::run(&config).await,
        Command::Status => commands::status::run(&config),
        Command::Event { nearest_to } => {
            let nearest_to = match nearest_to.map(|v| chrono::DateTime::parse_from_rfc3339(&v)).transpose() {
                Ok(parsed) => parsed,
                Err(e) => {
                    let outcome = CliOutcome::error(serde_json::json!({"error": e.to_string()}), e.to_string());
                    std::process::exit(outcome.emit(cli.json));
                }
            };
            commands::event::run(&config, commands::event::EventArgs { nearest_to }).await
        }
        Command::Doctor => commands::doctor::run(&config),
        Command::PatchNote { note, updates, dry_run } => {
            let updates = match parse_updates(&updates) {
                Ok(u) => u,
                Err(e) => {
                    let outcome = CliOutcome::error(serde_json::json!({"error": e}), e);
                    std::process::exit(outcome.emit(cli.json));
                }
            };
            commands::patch_note::run(commands::patch_note::PatchNoteArgs { note_path: note, updates, dry_run })
        }
        Command::ProcessQueue { max_jobs, mode } => {
            let mode = match mode.as_str() {
                "stop" => FailureMode::Stop,
                "dead-letter" => FailureMode::DeadLetter,
                other => {
                    let msg = format!("unknown --mode `{other}`, expected `stop` or `dead-letter`");
                    let outcome = CliOutcome::error(serde_json::json!({"error": msg}), msg);
                    std::process::exit(outcome.emit(cli.json));
                }
            };
            commands::process_queue::run(&config, commands::process_queue::ProcessQueueArgs { max_jobs, mode }).await
        }
        Command::Backfill { files, match_calendar, rename, dry_run } => {
            let explicit_files = if files.is_empty() { None } else { Some(files) };
            commands::backfill::run(&config, commands::backfill::BackfillArgs { explicit_files, match_calendar, rename, dry_run }).await
        }
        Command::IngestWatch { once, max_polls, poll_seconds, min_age_seconds, match_calendar } => {
            commands::ingest_watch::run(
                &config,
                commands::ingest_watch::IngestWatchArgs { once, max_polls, poll_seconds, min_age_seconds, match_calendar },
            )
            .await
        }
        Command::AuditNotes => commands::audit_notes::run(&config),
    };

    std::process::exit(outcome.emit(cli.json));
}
