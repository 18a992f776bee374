//! One-shot backfill over existing recordings: infer each file's start time,
//! optionally match it to a calendar event, create its note, optionally
//! rename the recording (and siblings) to the canonical `<meeting_id>`
//! stem, and enqueue it for processing.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use meetingctl_calendar::{nearest_to, Event};
use meetingctl_core::domain::Job;
use meetingctl_core::queue::enqueue;
use meetingctl_notefs::{build_note_filename, ensure_collision_safe_path, generate_meeting_id};
use serde::Serialize;

use crate::filetime::infer_start_time;
use crate::note_creation::{create_adhoc_note, create_note_from_event};

pub struct BackfillInputs<'a> {
    pub recordings_root: &'a Path,
    pub vault_root: &'a Path,
    pub meetings_folder: &'a str,
    pub queue_file: &'a Path,
    pub extensions: &'a [&'a str],
    /// Restrict discovery to exactly these files (still must live under
    /// `recordings_root`). `None` discovers everything matching `extensions`.
    pub explicit_files: Option<&'a [PathBuf]>,
    pub match_calendar: bool,
    pub rename: bool,
    /// When set, only computes and returns `plans` — no notes written, no
    /// renames, no enqueue.
    pub dry_run: bool,
    pub voice_memo_tz: FixedOffset,
    pub filename_tz: FixedOffset,
    pub match_window_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackfillPlan {
    pub source_path: String,
    pub inferred_start: DateTime<FixedOffset>,
    pub matched_title: Option<String>,
    pub meeting_id: String,
    pub note_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BackfillOutcome {
    pub discovered_files: usize,
    pub queued_jobs: usize,
    pub failed_jobs: usize,
    pub plans: Vec<BackfillPlan>,
}

fn discover_files(inputs: &BackfillInputs) -> std::io::Result<Vec<PathBuf>> {
    if let Some(explicit) = inputs.explicit_files {
        return Ok(explicit.to_vec());
    }
    if !inputs.recordings_root.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(inputs.recordings_root)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| inputs.extensions.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);
        if matches_ext {
            files.push(path);
        }
    }
    files.sort_by_key(|p| std::fs::metadata(p).and_then(|m| m.modified()).ok());
    Ok(files)
}

/// Renames `path` and any sibling files sharing its stem (`.txt`, `.mp3`) to
/// `<meeting_id>.<ext>`. Refuses to clobber an existing destination.
fn rename_with_siblings(path: &Path, meeting_id: &str) -> std::io::Result<PathBuf> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default().to_string();

    let main_ext = path.extension().and_then(|e| e.to_str()).unwrap_or("wav");
    let new_main_path = parent.join(format!("{meeting_id}.{main_ext}"));
    if new_main_path.exists() && new_main_path != path {
        return Err(std::io::Error::new(std::io::ErrorKind::AlreadyExists, format!("{} already exists", new_main_path.display())));
    }

    for sibling_ext in ["txt", "mp3"] {
        let sibling_path = parent.join(format!("{stem}.{sibling_ext}"));
        if sibling_path.exists() {
            let new_sibling_path = parent.join(format!("{meeting_id}.{sibling_ext}"));
            if new_sibling_path.exists() {
                return Err(std::io::Error::new(std::io::ErrorKind::AlreadyExists, format!("{} already exists", new_sibling_path.display())));
            }
            std::fs::rename(&sibling_path, &new_sibling_path)?;
        }
    }

    std::fs::rename(path, &new_main_path)?;
    Ok(new_main_path)
}

pub fn run_backfill(inputs: &BackfillInputs, calendar_events: Option<&[Event]>) -> std::io::Result<BackfillOutcome> {
    let mut outcome = BackfillOutcome::default();
    let files = discover_files(inputs)?;
    outcome.discovered_files = files.len();

    for path in files {
        let (start, _source) = infer_start_time(&path, inputs.voice_memo_tz, inputs.filename_tz)?;

        let matched_event = if inputs.match_calendar {
            calendar_events.and_then(|events| nearest_to(events, start, inputs.match_window_minutes))
        } else {
            None
        };

        let title = matched_event.as_ref().map(|e| e.title.clone()).unwrap_or_else(|| {
            path.file_stem().and_then(|s| s.to_str()).unwrap_or("Untitled Recording").to_string()
        });
        let meeting_id = generate_meeting_id(&title, &start.to_rfc3339());
        let planned_filename = build_note_filename(&start, &title, &meeting_id);
        let planned_note_path = ensure_collision_safe_path(&inputs.vault_root.join(inputs.meetings_folder).join(planned_filename));

        if inputs.dry_run {
            outcome.plans.push(BackfillPlan {
                source_path: path.display().to_string(),
                inferred_start: start,
                matched_title: matched_event.as_ref().map(|e| e.title.clone()),
                meeting_id,
                note_path: planned_note_path.display().to_string(),
            });
            continue;
        }

        let created = match &matched_event {
            Some(event) => create_note_from_event(event, inputs.vault_root, inputs.meetings_folder, None),
            None => create_adhoc_note(&title, start, inputs.vault_root, inputs.meetings_folder, None),
        };

        let created = match created {
            Ok(c) => c,
            Err(_) => {
                outcome.failed_jobs += 1;
                continue;
            }
        };

        let final_path = if inputs.rename {
            match rename_with_siblings(&path, &created.meeting_id) {
                Ok(renamed) => renamed,
                Err(_) => {
                    outcome.failed_jobs += 1;
                    continue;
                }
            }
        } else {
            path.clone()
        };

        let job = Job {
            meeting_id: created.meeting_id.clone(),
            note_path: created.note_path.display().to_string(),
            wav_path: Some(final_path.display().to_string()),
        };
        if enqueue(inputs.queue_file, &job).is_err() {
            outcome.failed_jobs += 1;
            continue;
        }
        outcome.queued_jobs += 1;
    }

    Ok(outcome)
}
