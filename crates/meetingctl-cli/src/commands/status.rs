use meetingctl_core::session;
use meetingctl_core::state::RuntimeStateStore;

use crate::config::Config;
use crate::output::CliOutcome;

pub fn run(config: &Config) -> CliOutcome {
    let store = RuntimeStateStore::new(config.state_file.clone());
    match session::status(&store, config.now()) {
        Ok(outcome) => {
            let human = if outcome.recording {
                format!(
                    "Recording: {} ({}) — {}",
                    outcome.title.clone().unwrap_or_default(),
                    outcome.platform.clone().unwrap_or_default(),
                    outcome.duration_human
                )
            } else {
                "Not recording.".to_string()
            };
            CliOutcome::success(
                serde_json::json!({
                    "recording": outcome.recording,
                    "meeting_id": outcome.meeting_id,
                    "title": outcome.title,
                    "platform": outcome.platform,
                    "duration_human": outcome.duration_human,
                    "note_path": outcome.note_path,
                }),
                human,
            )
        }
        Err(e) => CliOutcome::error(serde_json::json!({"error": e.to_string()}), e.to_string()),
    }
}
