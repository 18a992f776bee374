//! Polls a recordings directory for loose audio files, matches each against
//! calendar events, creates a note, and enqueues a processing job. Mirrors
//! the ingest-watch poll loop.

use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Utc};
use meetingctl_calendar::{nearest_to, Event};
use meetingctl_core::domain::Job;
use meetingctl_core::queue::enqueue;
use serde::{Deserialize, Serialize};

use crate::filetime::infer_start_time;
use crate::note_creation::{create_adhoc_note, create_note_from_event};

#[derive(Debug, Serialize, Deserialize)]
struct IngestedRecord {
    path: String,
    meeting_id: String,
    ingested_at: DateTime<Utc>,
}

fn load_ingested_paths(path: &Path) -> HashSet<String> {
    let Ok(raw) = std::fs::read_to_string(path) else {
        return HashSet::new();
    };
    raw.lines()
        .filter_map(|line| serde_json::from_str::<IngestedRecord>(line).ok())
        .map(|record| record.path)
        .collect()
}

fn append_ingested_path(path: &Path, record: &IngestedRecord) -> std::io::Result<()> {
    use std::io::Write as _;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
    let line = serde_json::to_string(record)?;
    writeln!(file, "{line}")
}

fn discover_candidate_files(recordings_root: &Path, extensions: &[&str]) -> std::io::Result<Vec<PathBuf>> {
    let mut candidates = Vec::new();
    if !recordings_root.exists() {
        return Ok(candidates);
    }
    for entry in std::fs::read_dir(recordings_root)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| extensions.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);
        if matches_ext {
            candidates.push(path);
        }
    }
    candidates.sort_by_key(|p| std::fs::metadata(p).and_then(|m| m.modified()).ok());
    Ok(candidates)
}

pub struct IngestInputs<'a> {
    pub recordings_root: &'a Path,
    pub vault_root: &'a Path,
    pub meetings_folder: &'a str,
    pub queue_file: &'a Path,
    pub ingested_files_file: &'a Path,
    pub min_age_seconds: i64,
    pub match_window_minutes: i64,
    pub voice_memo_tz: FixedOffset,
    pub filename_tz: FixedOffset,
    pub extensions: &'a [&'a str],
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub discovered: usize,
    pub skipped_already_ingested: usize,
    pub skipped_too_new: usize,
    pub matched_calendar: usize,
    pub created_notes: usize,
    pub enqueued: usize,
}

/// One pass over `recordings_root`. `calendar_events` is fetched once by the
/// caller (a fresh cascade lookup per poll) and matched locally per file via
/// [`nearest_to`] so a single poll only hits the calendar back end once.
pub fn run_ingest_once(inputs: &IngestInputs, calendar_events: Option<&[Event]>, now: DateTime<Utc>) -> std::io::Result<IngestStats> {
    let mut stats = IngestStats::default();
    let already_ingested = load_ingested_paths(inputs.ingested_files_file);
    let candidates = discover_candidate_files(inputs.recordings_root, inputs.extensions)?;
    stats.discovered = candidates.len();

    for path in candidates {
        let abs_path = path.canonicalize().unwrap_or(path.clone()).to_string_lossy().to_string();
        if already_ingested.contains(&abs_path) {
            stats.skipped_already_ingested += 1;
            continue;
        }

        let age_seconds = std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .map(|modified| now.signed_duration_since(DateTime::<Utc>::from(modified)).num_seconds())
            .unwrap_or(0);
        if age_seconds < inputs.min_age_seconds {
            stats.skipped_too_new += 1;
            continue;
        }

        let (start, _source) = infer_start_time(&path, inputs.voice_memo_tz, inputs.filename_tz)?;

        let matched_event = calendar_events.and_then(|events| nearest_to(events, start, inputs.match_window_minutes));

        let created = match &matched_event {
            Some(event) => {
                stats.matched_calendar += 1;
                create_note_from_event(event, inputs.vault_root, inputs.meetings_folder, None)?
            }
            None => {
                let title = path.file_stem().and_then(|s| s.to_str()).unwrap_or("Untitled Recording").to_string();
                create_adhoc_note(&title, start, inputs.vault_root, inputs.meetings_folder, None)?
            }
        };
        stats.created_notes += 1;

        let job = Job { meeting_id: created.meeting_id.clone(), note_path: created.note_path.display().to_string(), wav_path: Some(path.display().to_string()) };
        enqueue(inputs.queue_file, &job).map_err(std::io::Error::other)?;
        stats.enqueued += 1;

        append_ingested_path(inputs.ingested_files_file, &IngestedRecord { path: abs_path, meeting_id: created.meeting_id, ingested_at: now })?;
    }

    Ok(stats)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestWatchOutcome {
    pub polls_run: usize,
    pub totals: IngestStats,
}

impl IngestStats {
    fn accumulate(&mut self, other: &IngestStats) {
        self.discovered += other.discovered;
        self.skipped_already_ingested += other.skipped_already_ingested;
        self.skipped_too_new += other.skipped_too_new;
        self.matched_calendar += other.matched_calendar;
        self.created_notes += other.created_notes;
        self.enqueued += other.enqueued;
    }
}

/// `fetch_events` re-resolves the calendar once per poll (so a long-running
/// watch session always matches against a fresh window). `once` wins over
/// `max_polls` when both are set.
pub async fn run_ingest_watch<F, Fut>(
    inputs: &IngestInputs<'_>,
    once: bool,
    max_polls: Option<usize>,
    poll_seconds: u64,
    mut fetch_events: F,
    mut now_fn: impl FnMut() -> DateTime<Utc>,
) -> std::io::Result<IngestWatchOutcome>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<Vec<Event>>>,
{
    let mut outcome = IngestWatchOutcome::default();
    loop {
        let events = fetch_events().await;
        let stats = run_ingest_once(inputs, events.as_deref(), now_fn())?;
        outcome.totals.accumulate(&stats);
        outcome.polls_run += 1;

        if once {
            break;
        }
        if let Some(max) = max_polls {
            if outcome.polls_run >= max {
                break;
            }
        }
        tokio::time::sleep(std::time::Duration::from_secs(poll_seconds)).await;
    }
    Ok(outcome)
}
