use std::path::PathBuf;

use meetingctl_calendar::fetch_events_cascade;
use meetingctl_daemon::{run_backfill, BackfillInputs};

use crate::calendar_setup::Backends;
use crate::config::Config;
use crate::output::CliOutcome;

const RECORDING_EXTENSIONS: &[&str] = &["wav", "m4a", "mp3"];

pub struct BackfillArgs {
    pub explicit_files: Option<Vec<PathBuf>>,
    pub match_calendar: bool,
    pub rename: bool,
    pub dry_run: bool,
}

pub async fn run(config: &Config, args: BackfillArgs) -> CliOutcome {
    let events = if args.match_calendar {
        let backends = Backends::new(config);
        match fetch_events_cascade(&backends.as_slice(), None, None).await {
            Ok(result) => Some(result.events),
            Err(e) => return CliOutcome::error(e.to_payload(), e.message),
        }
    } else {
        None
    };

    let inputs = BackfillInputs {
        recordings_root: &config.recordings_path,
        vault_root: &config.vault_path,
        meetings_folder: &config.meetings_folder,
        queue_file: &config.process_queue_file,
        extensions: RECORDING_EXTENSIONS,
        explicit_files: args.explicit_files.as_deref(),
        match_calendar: args.match_calendar,
        rename: args.rename,
        dry_run: args.dry_run,
        voice_memo_tz: config.voicememo_filename_tz,
        filename_tz: config.recording_filename_tz,
        match_window_minutes: config.match_window_minutes,
    };

    match run_backfill(&inputs, events.as_deref()) {
        Ok(outcome) => CliOutcome::success(
            serde_json::to_value(&outcome).unwrap_or_default(),
            format!(
                "Discovered {} file(s), queued {}, failed {}.",
                outcome.discovered_files, outcome.queued_jobs, outcome.failed_jobs
            ),
        ),
        Err(e) => CliOutcome::error(serde_json::json!({"error": e.to_string()}), e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[serial]
    #[tokio::test]
    async fn dry_run_with_no_recordings_is_empty_success() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("VAULT_PATH", dir.path().join("vault"));
        std::env::set_var("RECORDINGS_PATH", dir.path().join("recordings"));
        let config = Config::from_env().unwrap();

        let outcome = run(&config, BackfillArgs { explicit_files: None, match_calendar: false, rename: false, dry_run: true }).await;
        assert_eq!(outcome.exit_code, 0);
        assert_eq!(outcome.json["discovered_files"], 0);

        std::env::remove_var("VAULT_PATH");
        std::env::remove_var("RECORDINGS_PATH");
    }
}
