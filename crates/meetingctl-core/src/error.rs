use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeetingError {
    #[error("a meeting is already in progress")]
    AlreadyRecording,

    #[error("runtime state is locked at {0}. If stale, remove the lock file.")]
    StateLocked(PathBuf),

    #[error("queue lock already held: {0}")]
    QueueLockError(PathBuf),

    #[error("path {0} is outside the configured root {1}")]
    InvalidPath(PathBuf, PathBuf),

    #[error("no input audio found: {0}")]
    MissingInput(String),

    #[error("failed to parse summarizer output: {0}")]
    SummaryParseError(String),

    #[error("transcription failed: {0}")]
    TranscriptionError(String),

    #[error(transparent)]
    Patch(#[from] meetingctl_notefs::PatchError),

    #[error(transparent)]
    Calendar(#[from] meetingctl_calendar::CalendarError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
