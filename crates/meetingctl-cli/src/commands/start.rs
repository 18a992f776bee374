use meetingctl_calendar::{fetch_events_cascade, infer_join_url, infer_platform, resolve_event, SelectionMode};
use meetingctl_core::session;
use meetingctl_core::state::RuntimeStateStore;
use meetingctl_core::MeetingError;
use meetingctl_daemon::{create_adhoc_note, create_note_from_event};
use serde_json::json;

use crate::calendar_setup::Backends;
use crate::capabilities;
use crate::config::Config;
use crate::output::CliOutcome;
use crate::platform_arg::parse_platform;

pub struct StartArgs {
    pub title: Option<String>,
    pub platform: Option<String>,
}

fn error_outcome(message: String) -> CliOutcome {
    CliOutcome::error(json!({"error": message}), message)
}

pub async fn run(config: &Config, args: StartArgs) -> CliOutcome {
    let now_utc = config.now();
    let t = now_utc.with_timezone(&config.recording_filename_tz);
    let store = RuntimeStateStore::new(config.state_file.clone());
    let recorder = capabilities::recorder(config);

    let resolved = match &args.title {
        Some(title) => match create_adhoc_note(title, t, &config.vault_path, &config.meetings_folder, None) {
            Ok(created) => {
                let platform = args.platform.as_deref().map(parse_platform).unwrap_or(meetingctl_calendar::Platform::Unknown);
                Ok((title.clone(), platform, created.meeting_id, created.note_path.display().to_string()))
            }
            Err(e) => Err(error_outcome(format!("failed to create note: {e}"))),
        },
        None => {
            let backends = Backends::new(config);
            match resolve_event(
                &backends.as_slice(),
                t,
                SelectionMode::NowOrNext { window_minutes: config.start_window_minutes },
                None,
                None,
            )
            .await
            {
                Ok((event, _backend, _fallback_used)) => match create_note_from_event(&event, &config.vault_path, &config.meetings_folder, None) {
                    Ok(created) => {
                        let join_url = infer_join_url(&event);
                        let platform = infer_platform(join_url.as_deref());
                        Ok((event.title.clone(), platform, created.meeting_id, created.note_path.display().to_string()))
                    }
                    Err(e) => Err(error_outcome(format!("failed to create note: {e}"))),
                },
                Err(e) => Err(CliOutcome::error(e.to_payload(), e.message.clone())),
            }
        }
    };

    let (title, platform, meeting_id, note_path) = match resolved {
        Ok(v) => v,
        Err(outcome) => return outcome,
    };

    match session::start(&store, recorder.as_ref(), &title, platform, &meeting_id, &note_path, now_utc).await {
        Ok(outcome) => CliOutcome::success(
            json!({
                "recording": outcome.recording,
                "meeting_id": outcome.meeting_id,
                "title": outcome.title,
                "platform": outcome.platform,
                "note_path": outcome.note_path,
                "fallback_used": outcome.fallback_used,
            }),
            format!("Recording started: {} ({})", outcome.title, outcome.platform),
        ),
        Err(MeetingError::AlreadyRecording) => {
            CliOutcome::precondition_failed(json!({"error": "a meeting is already in progress"}), "A meeting is already in progress.")
        }
        Err(e) => error_outcome(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[serial]
    #[tokio::test]
    async fn adhoc_title_skips_calendar_resolution() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("VAULT_PATH", dir.path().join("vault"));
        std::env::set_var("RECORDINGS_PATH", dir.path().join("recordings"));
        std::env::set_var("MEETINGCTL_STATE_FILE", dir.path().join("current.json"));
        std::env::set_var("MEETINGCTL_RECORDER_DRY_RUN", "1");
        let config = Config::from_env().unwrap();

        let outcome = run(&config, StartArgs { title: Some("Retro".to_string()), platform: Some("zoom".to_string()) }).await;
        assert_eq!(outcome.exit_code, 0);
        assert_eq!(outcome.json["title"], "Retro");
        assert_eq!(outcome.json["platform"], "zoom");

        std::env::remove_var("VAULT_PATH");
        std::env::remove_var("RECORDINGS_PATH");
        std::env::remove_var("MEETINGCTL_STATE_FILE");
        std::env::remove_var("MEETINGCTL_RECORDER_DRY_RUN");
    }
}
