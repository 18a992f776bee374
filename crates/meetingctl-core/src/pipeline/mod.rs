//! Per-job transcribe -> summarize -> patch-note -> convert-audio pipeline,
//! with reuse detection, per spec.md §4.8.

pub mod summary;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::capability::{Converter, Summarizer, Transcriber};
use crate::domain::{Job, ProcessResult};
use crate::error::MeetingError;

/// Extensions that are kept as-is (no re-encode) because they already
/// imply the canonical compressed artifact.
const NO_REENCODE_EXTENSIONS: &[&str] = &["m4a"];

pub struct ProcessContext {
    pub meeting_id: String,
    pub note_path: PathBuf,
    pub audio_path: PathBuf,
    pub transcript_path: PathBuf,
    pub mp3_path: PathBuf,
    pub vault_root: PathBuf,
    pub recordings_root: PathBuf,
}

fn require_inside(path: &Path, root: &Path) -> Result<(), MeetingError> {
    if path.starts_with(root) {
        Ok(())
    } else {
        Err(MeetingError::InvalidPath(path.to_path_buf(), root.to_path_buf()))
    }
}

/// Resolve the job's input audio per spec.md §4.8 step 2: explicit
/// `wav_path` must exist; otherwise fall back to `<recordings>/<meeting_id>.wav`.
pub fn resolve_input_audio(job: &Job, recordings_root: &Path) -> Result<PathBuf, MeetingError> {
    match &job.wav_path {
        Some(wav_path) => {
            let path = PathBuf::from(wav_path);
            require_inside(&path, recordings_root)?;
            if !path.exists() {
                return Err(MeetingError::MissingInput(wav_path.clone()));
            }
            Ok(path)
        }
        None => {
            let default_path = recordings_root.join(format!("{}.wav", job.meeting_id));
            if !default_path.exists() {
                return Err(MeetingError::MissingInput(default_path.display().to_string()));
            }
            Ok(default_path)
        }
    }
}

fn append_process_result(processed_jobs_file: &Path, result: &ProcessResult) -> std::io::Result<()> {
    use std::io::Write as _;
    if let Some(parent) = processed_jobs_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(processed_jobs_file)?;
    let line = serde_json::to_string(result)?;
    writeln!(file, "{line}")
}

pub struct ProcessOutcome {
    pub result: ProcessResult,
    pub reused_transcript: bool,
    pub reused_summary: bool,
}

#[allow(clippy::too_many_arguments)]
pub async fn run_processing(
    ctx: &ProcessContext,
    transcriber: &dyn Transcriber,
    summarizer: &dyn Summarizer,
    converter: &dyn Converter,
    processed_jobs_file: &Path,
) -> Result<ProcessOutcome, MeetingError> {
    require_inside(&ctx.note_path, &ctx.vault_root)?;
    require_inside(&ctx.audio_path, &ctx.recordings_root)?;

    let reused_transcript =
        ctx.transcript_path.exists() && std::fs::metadata(&ctx.transcript_path).map(|m| m.len() > 0).unwrap_or(false);
    if !reused_transcript {
        transcriber.transcribe(&ctx.audio_path, &ctx.transcript_path).await?;
    }

    let summary = summarizer.summarize(&ctx.transcript_path).await?;
    let reused_summary = summary.reused;

    let mut updates: BTreeMap<String, String> = summary::summary_to_patch_regions(&summary);

    let already_compressed = ctx
        .audio_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| NO_REENCODE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false);
    let final_audio_path = if already_compressed {
        ctx.audio_path.clone()
    } else {
        converter.convert(&ctx.audio_path, &ctx.mp3_path).await?;
        ctx.mp3_path.clone()
    };

    let transcript_text = std::fs::read_to_string(&ctx.transcript_path).unwrap_or_default();
    updates.insert("transcript".to_string(), format!("```\n{}\n```", transcript_text.trim_end()));

    let existing_note = std::fs::read_to_string(&ctx.note_path)?;
    if crate::references::note_has_references_region(&existing_note) {
        updates.insert(
            "references".to_string(),
            crate::references::render_references(&ctx.transcript_path, &final_audio_path, true),
        );
    }

    meetingctl_notefs::patch_note(&ctx.note_path, &updates, false)?;

    let result = ProcessResult {
        meeting_id: ctx.meeting_id.clone(),
        note_path: ctx.note_path.display().to_string(),
        transcript_path: ctx.transcript_path.display().to_string(),
        audio_path: final_audio_path.display().to_string(),
        reused_transcript,
        reused_summary,
    };
    append_process_result(processed_jobs_file, &result)?;

    Ok(ProcessOutcome { result, reused_transcript, reused_summary })
}
