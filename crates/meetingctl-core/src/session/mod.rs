//! Start/stop/status orchestration wiring the recorder capability, the
//! runtime state store, and note/queue creation, per spec.md §4.6.

use chrono::{DateTime, Utc};

use crate::capability::Recorder;
use crate::domain::{Platform, SessionState};
use crate::error::MeetingError;
use crate::state::RuntimeStateStore;

fn duration_human(started_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let total_minutes = (now - started_at).num_minutes().max(0);
    if total_minutes < 60 {
        format!("{total_minutes}m")
    } else {
        format!("{}h {}m", total_minutes / 60, total_minutes % 60)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StartOutcome {
    pub recording: bool,
    pub meeting_id: String,
    pub title: String,
    pub platform: String,
    pub note_path: String,
    pub fallback_used: bool,
}

/// Map a freshly-resolved event's inferred platform to a session name;
/// unknown platforms fall back to `system` with `fallback_used=true`.
pub fn resolve_session_platform(platform: Platform) -> (Platform, &'static str, bool) {
    match platform {
        Platform::Unknown => (Platform::System, Platform::System.session_name(), true),
        other => (other, other.session_name(), false),
    }
}

pub async fn start(
    store: &RuntimeStateStore,
    recorder: &dyn Recorder,
    title: &str,
    platform: Platform,
    meeting_id: &str,
    note_path: &str,
    now: DateTime<Utc>,
) -> Result<StartOutcome, MeetingError> {
    if let Some(existing) = store.load()? {
        if existing.recording {
            return Err(MeetingError::AlreadyRecording);
        }
    }

    let (resolved_platform, session_name, fallback_used) = resolve_session_platform(platform);

    let _guard = store.lock()?;
    recorder.start(session_name).await?;
    store.write(&SessionState {
        recording: true,
        meeting_id: Some(meeting_id.to_string()),
        title: Some(title.to_string()),
        platform: Some(resolved_platform.to_string()),
        note_path: Some(note_path.to_string()),
        started_at: Some(now),
        session_name: Some(session_name.to_string()),
    })?;

    Ok(StartOutcome {
        recording: true,
        meeting_id: meeting_id.to_string(),
        title: title.to_string(),
        platform: resolved_platform.to_string(),
        note_path: note_path.to_string(),
        fallback_used,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct StopOutcome {
    pub recording: bool,
    pub meeting_id: Option<String>,
    pub title: Option<String>,
    pub platform: Option<String>,
    pub note_path: Option<String>,
    pub processing_triggered: bool,
    pub warning: Option<String>,
}

/// `process_trigger` enqueues post-processing work. A failure there must
/// not reverse the stop — it only downgrades `processing_triggered`.
pub async fn stop<F, Fut>(
    store: &RuntimeStateStore,
    recorder: &dyn Recorder,
    process_trigger: F,
) -> Result<StopOutcome, MeetingError>
where
    F: FnOnce(SessionState) -> Fut,
    Fut: std::future::Future<Output = Result<(), String>>,
{
    let state = store.load()?;
    let Some(state) = state.filter(|s| s.recording) else {
        return Ok(StopOutcome {
            recording: false,
            meeting_id: None,
            title: None,
            platform: None,
            note_path: None,
            processing_triggered: false,
            warning: Some("No active recording. Start a meeting before calling stop.".to_string()),
        });
    };

    let session_name = state.session_name.clone().unwrap_or_else(|| Platform::System.session_name().to_string());
    {
        let _guard = store.lock()?;
        recorder.stop(&session_name).await?;
        store.clear()?;
    }

    let mut outcome = StopOutcome {
        recording: false,
        meeting_id: state.meeting_id.clone(),
        title: state.title.clone(),
        platform: state.platform.clone(),
        note_path: state.note_path.clone(),
        processing_triggered: true,
        warning: None,
    };

    if let Err(e) = process_trigger(state).await {
        outcome.processing_triggered = false;
        outcome.warning = Some(format!("Recording stopped but processing trigger failed: {e}"));
    }

    Ok(outcome)
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusOutcome {
    pub recording: bool,
    pub meeting_id: Option<String>,
    pub title: Option<String>,
    pub platform: Option<String>,
    pub duration_human: String,
    pub note_path: Option<String>,
}

pub fn status(store: &RuntimeStateStore, now: DateTime<Utc>) -> Result<StatusOutcome, MeetingError> {
    let state = store.load()?.unwrap_or_else(SessionState::idle);
    if !state.recording {
        return Ok(StatusOutcome {
            recording: false,
            meeting_id: None,
            title: None,
            platform: None,
            duration_human: "0m".to_string(),
            note_path: None,
        });
    }
    let duration = state.started_at.map(|s| duration_human(s, now)).unwrap_or_else(|| "0m".to_string());
    Ok(StatusOutcome {
        recording: true,
        meeting_id: state.meeting_id,
        title: state.title,
        platform: state.platform,
        duration_human: duration,
        note_path: state.note_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubRecorder {
        start_calls: AtomicUsize,
        stop_calls: AtomicUsize,
    }

    impl StubRecorder {
        fn new() -> Self {
            Self { start_calls: AtomicUsize::new(0), stop_calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl Recorder for StubRecorder {
        async fn start(&self, _session_name: &str) -> Result<(), MeetingError> {
            self.start_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn stop(&self, _session_name: &str) -> Result<(), MeetingError> {
            self.stop_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn start_fails_when_already_recording() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuntimeStateStore::new(dir.path().join("current.json"));
        let recorder = StubRecorder::new();
        start(&store, &recorder, "Sync", Platform::Zoom, "m-1", "/vault/n.md", Utc::now()).await.unwrap();
        let err = start(&store, &recorder, "Sync2", Platform::Zoom, "m-2", "/vault/n2.md", Utc::now()).await.unwrap_err();
        assert!(matches!(err, MeetingError::AlreadyRecording));
    }

    #[tokio::test]
    async fn start_falls_back_to_system_for_unknown_platform() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuntimeStateStore::new(dir.path().join("current.json"));
        let recorder = StubRecorder::new();
        let outcome = start(&store, &recorder, "Sync", Platform::Unknown, "m-1", "/vault/n.md", Utc::now()).await.unwrap();
        assert!(outcome.fallback_used);
        assert_eq!(outcome.platform, "system");
    }

    #[tokio::test]
    async fn idle_stop_never_touches_recorder() {
        // Boundary scenario 6
        let dir = tempfile::tempdir().unwrap();
        let store = RuntimeStateStore::new(dir.path().join("current.json"));
        let recorder = StubRecorder::new();
        let outcome = stop(&store, &recorder, |_| async { Ok(()) }).await.unwrap();
        assert!(!outcome.recording);
        assert_eq!(outcome.warning.as_deref(), Some("No active recording. Start a meeting before calling stop."));
        assert_eq!(recorder.stop_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn stop_clears_state_even_when_process_trigger_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuntimeStateStore::new(dir.path().join("current.json"));
        let recorder = StubRecorder::new();
        start(&store, &recorder, "Sync", Platform::Zoom, "m-1", "/vault/n.md", Utc::now()).await.unwrap();

        let outcome = stop(&store, &recorder, |_| async { Err("queue full".to_string()) }).await.unwrap();
        assert!(!outcome.processing_triggered);
        assert!(outcome.warning.is_some());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn status_invariant_idle_has_no_session_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuntimeStateStore::new(dir.path().join("current.json"));
        let status = status(&store, Utc::now()).unwrap();
        assert!(!status.recording);
        assert!(status.meeting_id.is_none());
    }

    #[test]
    fn duration_human_formats_hours_and_minutes() {
        let now = Utc::now();
        assert_eq!(duration_human(now - chrono::Duration::minutes(30), now), "30m");
        assert_eq!(duration_human(now - chrono::Duration::minutes(125), now), "2h 5m");
    }
}
