//! Single-writer, crash-safe JSON "current session" file with an advisory
//! lock, per spec.md §4.3.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::domain::SessionState;
use crate::error::MeetingError;
use crate::lockfile::FileLock;

pub struct RuntimeStateStore {
    state_file: PathBuf,
    lock_file: PathBuf,
}

impl RuntimeStateStore {
    pub fn new(state_file: PathBuf) -> Self {
        let lock_file = state_file.with_extension("lock");
        Self { state_file, lock_file }
    }

    /// Acquire the exclusive lock for the duration of the returned guard.
    pub fn lock(&self) -> Result<FileLock, MeetingError> {
        FileLock::acquire(&self.lock_file).map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => MeetingError::StateLocked(self.lock_file.clone()),
            _ => MeetingError::Io(e),
        })
    }

    fn random_hex() -> String {
        let bytes: [u8; 8] = rand::rng().random();
        hex::encode(bytes)
    }

    /// Write `state` via temp file + fsync + rename; partial writes are
    /// never visible to [`Self::load`].
    pub fn write(&self, state: &SessionState) -> Result<(), MeetingError> {
        if let Some(parent) = self.state_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let temp_path = self.state_file.with_extension(format!("{}.tmp", Self::random_hex()));
        let write_result = (|| -> std::io::Result<()> {
            let mut file = std::fs::File::create(&temp_path)?;
            let json = serde_json::to_vec_pretty(state).map_err(std::io::Error::other)?;
            file.write_all(&json)?;
            file.sync_all()?;
            Ok(())
        })();
        if let Err(e) = write_result {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e.into());
        }
        if let Err(e) = std::fs::rename(&temp_path, &self.state_file) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }

    pub fn load(&self) -> Result<Option<SessionState>, MeetingError> {
        if !self.state_file.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.state_file)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    pub fn clear(&self) -> Result<(), MeetingError> {
        if self.state_file.exists() {
            std::fs::remove_file(&self.state_file)?;
        }
        Ok(())
    }

    /// True when `recording=true` and `now - started_at > max_age`.
    pub fn is_stale(&self, max_age: chrono::Duration, now: DateTime<Utc>) -> Result<bool, MeetingError> {
        let Some(state) = self.load()? else {
            return Ok(false);
        };
        if !state.recording {
            return Ok(false);
        }
        let Some(started_at) = state.started_at else {
            return Ok(false);
        };
        Ok(now - started_at > max_age)
    }

    pub fn state_path(&self) -> &Path {
        &self.state_file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_state(started_at: DateTime<Utc>) -> SessionState {
        SessionState {
            recording: true,
            meeting_id: Some("m-0123456789".to_string()),
            title: Some("Sync".to_string()),
            platform: Some("zoom".to_string()),
            note_path: Some("/vault/meetings/note.md".to_string()),
            started_at: Some(started_at),
            session_name: Some("Zoom+Mic".to_string()),
        }
    }

    #[test]
    fn write_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuntimeStateStore::new(dir.path().join("current.json"));
        let state = sample_state(Utc::now());
        store.write(&state).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn load_with_no_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuntimeStateStore::new(dir.path().join("current.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn clear_removes_state_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuntimeStateStore::new(dir.path().join("current.json"));
        store.write(&sample_state(Utc::now())).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn is_stale_detects_overlong_recordings() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuntimeStateStore::new(dir.path().join("current.json"));
        let started = Utc::now() - Duration::hours(5);
        store.write(&sample_state(started)).unwrap();
        assert!(store.is_stale(Duration::hours(1), Utc::now()).unwrap());
        assert!(!store.is_stale(Duration::hours(10), Utc::now()).unwrap());
    }

    #[test]
    fn is_stale_false_when_idle() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuntimeStateStore::new(dir.path().join("current.json"));
        store.write(&SessionState::idle()).unwrap();
        assert!(!store.is_stale(Duration::zero(), Utc::now()).unwrap());
    }

    #[test]
    fn lock_is_exclusive_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuntimeStateStore::new(dir.path().join("current.json"));
        let guard = store.lock().unwrap();
        assert!(matches!(store.lock(), Err(MeetingError::StateLocked(_))));
        drop(guard);
        assert!(store.lock().is_ok());
    }

    #[test]
    fn no_stray_temp_files_after_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuntimeStateStore::new(dir.path().join("current.json"));
        store.write(&sample_state(Utc::now())).unwrap();
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|x| x.to_string_lossy().contains("tmp")).unwrap_or(false))
            .collect();
        assert!(leftovers.is_empty());
    }
}
