use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The "current recording" record persisted as one JSON object.
/// `recording=false` implies every other field is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub recording: bool,
    pub meeting_id: Option<String>,
    pub title: Option<String>,
    pub platform: Option<String>,
    pub note_path: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub session_name: Option<String>,
}

impl SessionState {
    pub fn idle() -> Self {
        Self {
            recording: false,
            meeting_id: None,
            title: None,
            platform: None,
            note_path: None,
            started_at: None,
            session_name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_state_has_no_session_fields() {
        let s = SessionState::idle();
        assert!(!s.recording);
        assert!(s.meeting_id.is_none());
        assert!(s.started_at.is_none());
    }

    #[test]
    fn round_trips_through_json() {
        let s = SessionState {
            recording: true,
            meeting_id: Some("m-0123456789".to_string()),
            title: Some("Sync".to_string()),
            platform: Some("zoom".to_string()),
            note_path: Some("/vault/meetings/note.md".to_string()),
            started_at: Some(Utc::now()),
            session_name: Some("Zoom+Mic".to_string()),
        };
        let json = serde_json::to_string(&s).unwrap();
        let back: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
