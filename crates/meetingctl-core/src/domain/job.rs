use serde::{Deserialize, Serialize};

/// One line of the process queue file. `meeting_id` and `note_path` are
/// required non-empty strings; `wav_path`, when present, must refer to a
/// file under the configured recordings root (checked by the pipeline).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub meeting_id: String,
    pub note_path: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub wav_path: Option<String>,
}
