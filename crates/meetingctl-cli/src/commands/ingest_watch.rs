use meetingctl_calendar::fetch_events_cascade;
use meetingctl_daemon::{run_ingest_watch, IngestInputs};

use crate::calendar_setup::Backends;
use crate::config::Config;
use crate::output::CliOutcome;

const RECORDING_EXTENSIONS: &[&str] = &["wav", "m4a", "mp3"];

pub struct IngestWatchArgs {
    pub once: bool,
    pub max_polls: Option<usize>,
    pub poll_seconds: u64,
    pub min_age_seconds: i64,
    pub match_calendar: bool,
}

pub async fn run(config: &Config, args: IngestWatchArgs) -> CliOutcome {
    let inputs = IngestInputs {
        recordings_root: &config.recordings_path,
        vault_root: &config.vault_path,
        meetings_folder: &config.meetings_folder,
        queue_file: &config.process_queue_file,
        ingested_files_file: &config.ingested_files_file,
        min_age_seconds: args.min_age_seconds,
        match_window_minutes: config.match_window_minutes,
        voice_memo_tz: config.voicememo_filename_tz,
        filename_tz: config.recording_filename_tz,
        extensions: RECORDING_EXTENSIONS,
    };

    let backends = Backends::new(config);
    let match_calendar = args.match_calendar;
    let fetch_events = || async {
        if !match_calendar {
            return None;
        }
        fetch_events_cascade(&backends.as_slice(), None, None).await.ok().map(|r| r.events)
    };

    match run_ingest_watch(&inputs, args.once, args.max_polls, args.poll_seconds, fetch_events, chrono::Utc::now).await {
        Ok(outcome) => CliOutcome::success(
            serde_json::to_value(&outcome).unwrap_or_default(),
            format!(
                "Ran {} poll(s); created {} note(s), enqueued {}.",
                outcome.polls_run, outcome.totals.created_notes, outcome.totals.enqueued
            ),
        ),
        Err(e) => CliOutcome::error(serde_json::json!({"error": e.to_string()}), e.to_string()),
    }
}
