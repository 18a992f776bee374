//! Narrow async capability traits for the external collaborators the core
//! shells out to: recorder, transcriber, summarizer, audio converter.
//! Constructed at the edge (the CLI) and passed down — no global singletons.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::MeetingError;

const HELPER_TIMEOUT_SECS: u64 = 15;

#[async_trait]
pub trait Recorder: Send + Sync {
    async fn start(&self, session_name: &str) -> Result<(), MeetingError>;
    async fn stop(&self, session_name: &str) -> Result<(), MeetingError>;
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, wav_path: &Path, transcript_path: &Path) -> Result<(), MeetingError>;
}

/// What the summarizer returns. `reused` is opaque advisory metadata
/// (Open Question #1): passed through to `ProcessResult` unchanged, never
/// interpreted by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryPayload {
    pub minutes: String,
    pub decisions: Vec<String>,
    pub action_items: Vec<String>,
    pub reused: bool,
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, transcript_path: &Path) -> Result<SummaryPayload, MeetingError>;
}

#[async_trait]
pub trait Converter: Send + Sync {
    /// Convert `wav_path` to `mp3_path`. Responsible for deleting the WAV
    /// on success.
    async fn convert(&self, wav_path: &Path, mp3_path: &Path) -> Result<(), MeetingError>;
}

async fn run_helper(mut command: Command, timeout_secs: u64) -> Result<std::process::Output, MeetingError> {
    let output = timeout(Duration::from_secs(timeout_secs), command.output())
        .await
        .map_err(|_| MeetingError::TranscriptionError("helper process timed out".to_string()))??;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MeetingError::TranscriptionError(format!("helper exited with {}: {}", output.status, stderr.trim())));
    }
    Ok(output)
}

/// Shells out to a recorder CLI taking `start|stop <session_name>`.
pub struct SubprocessRecorder {
    pub binary: std::path::PathBuf,
}

#[async_trait]
impl Recorder for SubprocessRecorder {
    async fn start(&self, session_name: &str) -> Result<(), MeetingError> {
        let mut command = Command::new(&self.binary);
        command.args(["start", session_name]);
        run_helper(command, HELPER_TIMEOUT_SECS).await?;
        Ok(())
    }

    async fn stop(&self, session_name: &str) -> Result<(), MeetingError> {
        let mut command = Command::new(&self.binary);
        command.args(["stop", session_name]);
        run_helper(command, HELPER_TIMEOUT_SECS).await?;
        Ok(())
    }
}

/// Shells out to a transcriber binary: `<bin> <wav> <transcript_path>`,
/// producing `transcript_path` plus sibling `.srt`/`.json`.
pub struct SubprocessTranscriber {
    pub binary: std::path::PathBuf,
}

#[async_trait]
impl Transcriber for SubprocessTranscriber {
    async fn transcribe(&self, wav_path: &Path, transcript_path: &Path) -> Result<(), MeetingError> {
        let mut command = Command::new(&self.binary);
        command.arg(wav_path).arg(transcript_path);
        run_helper(command, HELPER_TIMEOUT_SECS)
            .await
            .map_err(|e| MeetingError::TranscriptionError(e.to_string()))?;
        Ok(())
    }
}

/// Shells out to a summarizer binary that writes `{minutes, decisions,
/// action_items, reused?}` JSON to stdout given a transcript path.
pub struct SubprocessSummarizer {
    pub binary: std::path::PathBuf,
}

#[async_trait]
impl Summarizer for SubprocessSummarizer {
    async fn summarize(&self, transcript_path: &Path) -> Result<SummaryPayload, MeetingError> {
        let mut command = Command::new(&self.binary);
        command.arg(transcript_path);
        let output = run_helper(command, HELPER_TIMEOUT_SECS).await?;
        let raw = String::from_utf8_lossy(&output.stdout);
        crate::pipeline::summary::parse_summary_json(&raw)
    }
}

/// Shells out to `ffmpeg`-style converter: `<bin> -i <wav> <mp3>`, deleting
/// the WAV on success.
pub struct SubprocessConverter {
    pub binary: std::path::PathBuf,
}

#[async_trait]
impl Converter for SubprocessConverter {
    async fn convert(&self, wav_path: &Path, mp3_path: &Path) -> Result<(), MeetingError> {
        let mut command = Command::new(&self.binary);
        command.args(["-y", "-i"]).arg(wav_path).arg(mp3_path);
        run_helper(command, HELPER_TIMEOUT_SECS).await?;
        std::fs::remove_file(wav_path)?;
        Ok(())
    }
}

/// No-op stand-ins selected by `MEETINGCTL_*_DRY_RUN`, mirroring the
/// original's dry-run plumbing in `transcription.py`/`audio.py`.
pub mod dry_run {
    use super::*;

    pub struct DryRunRecorder;

    #[async_trait]
    impl Recorder for DryRunRecorder {
        async fn start(&self, _session_name: &str) -> Result<(), MeetingError> {
            Ok(())
        }
        async fn stop(&self, _session_name: &str) -> Result<(), MeetingError> {
            Ok(())
        }
    }

    pub struct DryRunTranscriber;

    #[async_trait]
    impl Transcriber for DryRunTranscriber {
        async fn transcribe(&self, _wav_path: &Path, transcript_path: &Path) -> Result<(), MeetingError> {
            if let Some(parent) = transcript_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(transcript_path, "")?;
            Ok(())
        }
    }

    pub struct DryRunSummarizer;

    #[async_trait]
    impl Summarizer for DryRunSummarizer {
        async fn summarize(&self, _transcript_path: &Path) -> Result<SummaryPayload, MeetingError> {
            Ok(SummaryPayload { minutes: String::new(), decisions: vec![], action_items: vec![], reused: false })
        }
    }

    pub struct DryRunConverter;

    #[async_trait]
    impl Converter for DryRunConverter {
        async fn convert(&self, _wav_path: &Path, _mp3_path: &Path) -> Result<(), MeetingError> {
            Ok(())
        }
    }
}
