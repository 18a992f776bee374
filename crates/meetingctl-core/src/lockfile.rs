//! Exclusive-create lock files shared by the runtime state store and the
//! job queue. A lock is a sibling file whose creation must fail if it
//! already exists; release always deletes it, including on failure.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

pub struct FileLock {
    path: PathBuf,
}

impl FileLock {
    /// Acquire the lock at `path`, creating parent directories as needed.
    /// Returns `Err(AlreadyExists)` on contention; the caller maps that to
    /// its own `StateLocked`/`QueueLockError` kind.
    pub fn acquire(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create_new(true).write(true).open(path)?;
        Ok(Self { path: path.to_path_buf() })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_while_first_is_held() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.lock");
        let guard = FileLock::acquire(&path).unwrap();
        let err = FileLock::acquire(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        drop(guard);
        assert!(FileLock::acquire(&path).is_ok());
    }

    #[test]
    fn lock_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.lock");
        {
            let _guard = FileLock::acquire(&path).unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }
}
