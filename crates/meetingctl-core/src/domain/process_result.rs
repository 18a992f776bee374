use serde::{Deserialize, Serialize};

/// Emitted as one JSONL line per successfully processed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResult {
    pub meeting_id: String,
    pub note_path: String,
    pub transcript_path: String,
    pub audio_path: String,
    pub reused_transcript: bool,
    pub reused_summary: bool,
}
