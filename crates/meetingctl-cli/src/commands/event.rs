use meetingctl_calendar::{infer_join_url, infer_platform, resolve_event, SelectionMode};

use crate::calendar_setup::Backends;
use crate::config::Config;
use crate::output::CliOutcome;

pub struct EventArgs {
    pub nearest_to: Option<chrono::DateTime<chrono::FixedOffset>>,
}

pub async fn run(config: &Config, args: EventArgs) -> CliOutcome {
    let backends = Backends::new(config);
    let t = match args.nearest_to {
        Some(t) => t,
        None => config.now().with_timezone(&config.recording_filename_tz),
    };
    let mode = match args.nearest_to {
        Some(_) => SelectionMode::NearestTo { window_minutes: config.match_window_minutes },
        None => SelectionMode::NowOrNext { window_minutes: config.start_window_minutes },
    };

    match resolve_event(&backends.as_slice(), t, mode, None, None).await {
        Ok((event, backend, fallback_used)) => {
            let join_url = infer_join_url(&event);
            let platform = infer_platform(join_url.as_deref());
            CliOutcome::success(
                serde_json::json!({
                    "title": event.title,
                    "start": event.start.to_rfc3339(),
                    "end": event.end.to_rfc3339(),
                    "calendar_name": event.calendar_name,
                    "location": event.location,
                    "join_url": join_url,
                    "platform": platform.to_string(),
                    "backend": backend.as_str(),
                    "fallback_used": fallback_used,
                }),
                format!("{} ({}) via {}", event.title, platform, backend.as_str()),
            )
        }
        Err(e) => CliOutcome::error(e.to_payload(), e.message.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[serial]
    #[tokio::test]
    async fn no_backends_available_reports_structured_error() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("VAULT_PATH", dir.path().join("vault"));
        std::env::set_var("RECORDINGS_PATH", dir.path().join("recordings"));
        std::env::set_var("MEETINGCTL_EVENTKIT_HELPER", dir.path().join("missing_helper.py"));
        std::env::set_var("MEETINGCTL_ICALBUDDY_BIN", dir.path().join("missing_icalbuddy"));
        let config = Config::from_env().unwrap();

        let outcome = run(&config, EventArgs { nearest_to: None }).await;
        assert_eq!(outcome.exit_code, 2);
        assert!(outcome.json.get("error").is_some());

        std::env::remove_var("VAULT_PATH");
        std::env::remove_var("RECORDINGS_PATH");
        std::env::remove_var("MEETINGCTL_EVENTKIT_HELPER");
        std::env::remove_var("MEETINGCTL_ICALBUDDY_BIN");
    }
}
