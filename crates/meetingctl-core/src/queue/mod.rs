//! Append-only JSONL job queue with an exclusive lock, atomic rewrite, and
//! stop-vs-dead-letter failure policy, per spec.md §4.7.

use std::future::Future;
use std::io::Write as _;
use std::path::Path;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::Job;
use crate::error::MeetingError;
use crate::lockfile::FileLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    Stop,
    DeadLetter,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueueOutcome {
    pub processed_jobs: usize,
    pub failed_jobs: usize,
    pub remaining_jobs: usize,
    pub failure_reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DeadLetterRecord {
    failed_at: chrono::DateTime<Utc>,
    error: String,
    payload: serde_json::Value,
}

fn random_hex() -> String {
    let bytes: [u8; 8] = rand::rng().random();
    hex::encode(bytes)
}

fn atomic_write_lines(path: &Path, lines: &[String]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension(format!("{}.tmp", random_hex()));
    let result = (|| -> std::io::Result<()> {
        let mut file = std::fs::File::create(&temp_path)?;
        for line in lines {
            writeln!(file, "{line}")?;
        }
        file.sync_all()?;
        Ok(())
    })();
    if let Err(e) = result {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e);
    }
    std::fs::rename(&temp_path, path)
}

#[cfg(unix)]
fn set_owner_only(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn set_owner_only(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

fn append_dead_letter(dead_letter_file: &Path, record: &DeadLetterRecord) -> std::io::Result<()> {
    if let Some(parent) = dead_letter_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let is_new = !dead_letter_file.exists();
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(dead_letter_file)?;
    let line = serde_json::to_string(record).map_err(std::io::Error::other)?;
    writeln!(file, "{line}")?;
    if is_new {
        set_owner_only(dead_letter_file)?;
    }
    Ok(())
}

/// Append one job to `queue_file`.
pub fn enqueue(queue_file: &Path, job: &Job) -> Result<(), MeetingError> {
    if let Some(parent) = queue_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(queue_file)?;
    let line = serde_json::to_string(job)?;
    writeln!(file, "{line}")?;
    Ok(())
}

/// Drain up to `max_jobs` jobs from `queue_file` through `handler`.
///
/// `stop` mode halts at the first failure and leaves it (and everything
/// after it) in the queue. `dead_letter` mode records the failure and keeps
/// draining subsequent jobs.
pub async fn process_jobs<F, Fut>(
    queue_file: &Path,
    dead_letter_file: Option<&Path>,
    max_jobs: usize,
    mode: FailureMode,
    handler: F,
) -> Result<QueueOutcome, MeetingError>
where
    F: Fn(Job) -> Fut,
    Fut: Future<Output = Result<(), String>>,
{
    let lock_file = queue_file.with_extension("lock");
    let _guard = FileLock::acquire(&lock_file).map_err(|e| match e.kind() {
        std::io::ErrorKind::AlreadyExists => MeetingError::QueueLockError(lock_file.clone()),
        _ => MeetingError::Io(e),
    })?;

    if !queue_file.exists() {
        return Ok(QueueOutcome::default());
    }

    let raw = std::fs::read_to_string(queue_file)?;
    let raw_lines: Vec<String> = raw.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect();
    if raw_lines.is_empty() {
        let _ = std::fs::remove_file(queue_file);
        return Ok(QueueOutcome::default());
    }

    let mut processed = 0usize;
    let mut failed = 0usize;
    let mut failure_reason = None;
    let limit = max_jobs.min(raw_lines.len());
    let mut cursor = 0usize;

    while cursor < limit {
        let line = &raw_lines[cursor];
        let outcome = match serde_json::from_str::<serde_json::Value>(line) {
            Ok(value) => match serde_json::from_value::<Job>(value.clone()) {
                Ok(job) => match handler(job).await {
                    Ok(()) => Ok(()),
                    Err(e) => Err((e, value)),
                },
                Err(e) => Err((e.to_string(), value)),
            },
            Err(e) => Err((e.to_string(), serde_json::Value::String(line.clone()))),
        };

        match outcome {
            Ok(()) => {
                processed += 1;
                cursor += 1;
            }
            Err((error, payload)) => match mode {
                FailureMode::Stop => {
                    failed = 1;
                    failure_reason = Some(error);
                    break;
                }
                FailureMode::DeadLetter => {
                    failed += 1;
                    if let Some(dlf) = dead_letter_file {
                        let record = DeadLetterRecord { failed_at: Utc::now(), error, payload };
                        append_dead_letter(dlf, &record)?;
                    }
                    cursor += 1;
                }
            },
        }
    }

    let remaining_lines = &raw_lines[cursor..];
    if !remaining_lines.is_empty() {
        atomic_write_lines(queue_file, remaining_lines)?;
    } else {
        let _ = std::fs::remove_file(queue_file);
    }

    Ok(QueueOutcome {
        processed_jobs: processed,
        failed_jobs: failed,
        remaining_jobs: remaining_lines.len(),
        failure_reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn job(meeting_id: &str) -> Job {
        Job { meeting_id: meeting_id.to_string(), note_path: "/vault/meetings/n.md".to_string(), wav_path: None }
    }

    #[tokio::test]
    async fn dead_letter_mode_continues_past_failures() {
        // Boundary scenario 5: m-1, m-2, m-3; handler throws on m-2; dead_letter mode.
        let dir = tempfile::tempdir().unwrap();
        let queue_file = dir.path().join("process_queue.jsonl");
        let dead_letter_file = dir.path().join("process_queue.deadletter.jsonl");
        enqueue(&queue_file, &job("m-1")).unwrap();
        enqueue(&queue_file, &job("m-2")).unwrap();
        enqueue(&queue_file, &job("m-3")).unwrap();

        let outcome = process_jobs(&queue_file, Some(&dead_letter_file), 10, FailureMode::DeadLetter, |j| async move {
            if j.meeting_id == "m-2" {
                Err("boom".to_string())
            } else {
                Ok(())
            }
        })
        .await
        .unwrap();

        assert_eq!(outcome.processed_jobs, 2);
        assert_eq!(outcome.failed_jobs, 1);
        assert_eq!(outcome.remaining_jobs, 0);
        assert!(!queue_file.exists());

        let dead_letter_raw = std::fs::read_to_string(&dead_letter_file).unwrap();
        let lines: Vec<&str> = dead_letter_raw.lines().collect();
        assert_eq!(lines.len(), 1);
        let record: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(record["payload"]["meeting_id"], "m-2");
    }

    #[tokio::test]
    async fn stop_mode_leaves_failed_and_remaining_jobs_queued() {
        let dir = tempfile::tempdir().unwrap();
        let queue_file = dir.path().join("process_queue.jsonl");
        enqueue(&queue_file, &job("m-1")).unwrap();
        enqueue(&queue_file, &job("m-2")).unwrap();
        enqueue(&queue_file, &job("m-3")).unwrap();

        let outcome = process_jobs(&queue_file, None, 10, FailureMode::Stop, |j| async move {
            if j.meeting_id == "m-2" {
                Err("boom".to_string())
            } else {
                Ok(())
            }
        })
        .await
        .unwrap();

        assert_eq!(outcome.processed_jobs, 1);
        assert_eq!(outcome.failed_jobs, 1);
        assert_eq!(outcome.remaining_jobs, 2);
        assert!(queue_file.exists());
        let remaining = std::fs::read_to_string(&queue_file).unwrap();
        assert!(remaining.contains("m-2"));
        assert!(remaining.contains("m-3"));
    }

    #[tokio::test]
    async fn queue_invariant_processed_failed_remaining_equals_initial() {
        let dir = tempfile::tempdir().unwrap();
        let queue_file = dir.path().join("process_queue.jsonl");
        for i in 0..5 {
            enqueue(&queue_file, &job(&format!("m-{i}"))).unwrap();
        }
        let calls = AtomicUsize::new(0);
        let outcome = process_jobs(&queue_file, None, 5, FailureMode::Stop, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .await
        .unwrap();
        assert_eq!(outcome.processed_jobs + outcome.failed_jobs + outcome.remaining_jobs, 5);
        assert!(!queue_file.exists());
    }

    #[tokio::test]
    async fn missing_queue_file_is_empty_result() {
        let dir = tempfile::tempdir().unwrap();
        let queue_file = dir.path().join("process_queue.jsonl");
        let outcome = process_jobs(&queue_file, None, 10, FailureMode::Stop, |_| async { Ok(()) }).await.unwrap();
        assert_eq!(outcome, QueueOutcome::default());
    }
}
