use meetingctl_core::domain::Job;
use meetingctl_core::queue::enqueue;
use meetingctl_core::session;
use meetingctl_core::state::RuntimeStateStore;

use crate::capabilities;
use crate::config::Config;
use crate::output::CliOutcome;

pub async fn run(config: &Config) -> CliOutcome {
    let store = RuntimeStateStore::new(config.state_file.clone());
    let recorder = capabilities::recorder(config);
    let queue_file = config.process_queue_file.clone();

    let process_trigger = |state: meetingctl_core::domain::SessionState| {
        let queue_file = queue_file.clone();
        async move {
            let meeting_id = state.meeting_id.ok_or_else(|| "missing meeting_id on stopped session".to_string())?;
            let note_path = state.note_path.ok_or_else(|| "missing note_path on stopped session".to_string())?;
            let job = Job { meeting_id, note_path, wav_path: None };
            enqueue(&queue_file, &job).map_err(|e| e.to_string())
        }
    };

    match session::stop(&store, recorder.as_ref(), process_trigger).await {
        Ok(outcome) => {
            let human = if !outcome.recording && outcome.meeting_id.is_none() {
                outcome.warning.clone().unwrap_or_else(|| "No active recording.".to_string())
            } else if let Some(warning) = &outcome.warning {
                warning.clone()
            } else {
                format!("Recording stopped: {}", outcome.title.clone().unwrap_or_default())
            };
            CliOutcome::success(
                serde_json::json!({
                    "recording": outcome.recording,
                    "meeting_id": outcome.meeting_id,
                    "title": outcome.title,
                    "platform": outcome.platform,
                    "note_path": outcome.note_path,
                    "processing_triggered": outcome.processing_triggered,
                    "warning": outcome.warning,
                }),
                human,
            )
        }
        Err(e) => CliOutcome::error(serde_json::json!({"error": e.to_string()}), e.to_string()),
    }
}
