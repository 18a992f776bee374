//! Environment-driven configuration, loaded once at process start (the only
//! process-wide state this binary carries), mirroring the teacher's
//! `Config::from_env` pattern.

use std::path::{Path, PathBuf};

use chrono::FixedOffset;

fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"))
    } else if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir().map(|home| home.join(rest)).unwrap_or_else(|| PathBuf::from(path))
    } else {
        PathBuf::from(path)
    }
}

fn state_dir() -> PathBuf {
    dirs::state_dir().unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".local/state")).join("meetingctl")
}

fn env_path(key: &str, default: PathBuf) -> PathBuf {
    std::env::var(key).map(|v| expand_tilde(&v)).unwrap_or(default)
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_offset(key: &str) -> FixedOffset {
    std::env::var(key)
        .ok()
        .and_then(|v| chrono::DateTime::parse_from_str(&format!("2026-01-01T00:00:00{v}"), "%Y-%m-%dT%H:%M:%S%z").ok())
        .map(|dt| *dt.offset())
        .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap())
}

fn env_flag(key: &str) -> bool {
    std::env::var(key).as_deref() == Ok("1")
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is not set")]
    Missing(&'static str),
    #[error("{0} must resolve to an absolute path, got {1}")]
    NotAbsolute(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub vault_path: PathBuf,
    pub recordings_path: PathBuf,
    pub meetings_folder: String,
    pub state_file: PathBuf,
    pub process_queue_file: PathBuf,
    pub process_queue_dead_letter_file: PathBuf,
    pub processed_jobs_file: PathBuf,
    pub ingested_files_file: PathBuf,
    pub now_override: Option<chrono::DateTime<chrono::Utc>>,
    pub recorder_dry_run: bool,
    pub transcriber_dry_run: bool,
    pub summarizer_dry_run: bool,
    pub converter_dry_run: bool,
    pub recording_filename_tz: FixedOffset,
    pub voicememo_filename_tz: FixedOffset,
    pub match_window_minutes: i64,
    pub start_window_minutes: i64,
    pub recorder_bin: PathBuf,
    pub transcriber_bin: PathBuf,
    pub summarizer_bin: PathBuf,
    pub converter_bin: PathBuf,
    pub eventkit_helper: PathBuf,
    pub jxa_script: Option<PathBuf>,
    pub icalbuddy_bin: PathBuf,
}

fn require_absolute(key: &'static str, path: PathBuf) -> Result<PathBuf, ConfigError> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Err(ConfigError::NotAbsolute(key, path.display().to_string()))
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let vault_path_raw = std::env::var("VAULT_PATH").map_err(|_| ConfigError::Missing("VAULT_PATH"))?;
        let vault_path = require_absolute("VAULT_PATH", expand_tilde(&vault_path_raw))?;

        let recordings_path_raw = std::env::var("RECORDINGS_PATH").map_err(|_| ConfigError::Missing("RECORDINGS_PATH"))?;
        let recordings_path = require_absolute("RECORDINGS_PATH", expand_tilde(&recordings_path_raw))?;

        let state = state_dir();

        Ok(Self {
            vault_path,
            recordings_path,
            meetings_folder: std::env::var("DEFAULT_MEETINGS_FOLDER").unwrap_or_else(|_| "meetings".to_string()),
            state_file: env_path("MEETINGCTL_STATE_FILE", state.join("current.json")),
            process_queue_file: env_path("MEETINGCTL_PROCESS_QUEUE_FILE", state.join("process_queue.jsonl")),
            process_queue_dead_letter_file: env_path(
                "MEETINGCTL_PROCESS_QUEUE_DEAD_LETTER_FILE",
                state.join("process_queue.deadletter.jsonl"),
            ),
            processed_jobs_file: env_path("MEETINGCTL_PROCESSED_JOBS_FILE", state.join("processed_jobs.jsonl")),
            ingested_files_file: env_path("MEETINGCTL_INGESTED_FILES_FILE", state.join("ingested_files.jsonl")),
            now_override: std::env::var("MEETINGCTL_NOW_ISO")
                .ok()
                .and_then(|v| chrono::DateTime::parse_from_rfc3339(&v).ok())
                .map(|dt| dt.with_timezone(&chrono::Utc)),
            recorder_dry_run: env_flag("MEETINGCTL_RECORDER_DRY_RUN"),
            transcriber_dry_run: env_flag("MEETINGCTL_TRANSCRIBER_DRY_RUN"),
            summarizer_dry_run: env_flag("MEETINGCTL_SUMMARIZER_DRY_RUN"),
            converter_dry_run: env_flag("MEETINGCTL_CONVERTER_DRY_RUN"),
            recording_filename_tz: env_offset("MEETINGCTL_RECORDING_FILENAME_TIMEZONE"),
            voicememo_filename_tz: env_offset("MEETINGCTL_VOICEMEMO_FILENAME_TIMEZONE"),
            match_window_minutes: env_i64("MEETINGCTL_MATCH_WINDOW_MINUTES", 10),
            start_window_minutes: env_i64("MEETINGCTL_START_WINDOW_MINUTES", 90),
            recorder_bin: env_path("MEETINGCTL_RECORDER_BIN", PathBuf::from("audio-hijack-cli")),
            transcriber_bin: env_path("MEETINGCTL_TRANSCRIBER_BIN", PathBuf::from("meetingctl-transcriber")),
            summarizer_bin: env_path("MEETINGCTL_SUMMARIZER_BIN", PathBuf::from("meetingctl-summarizer")),
            converter_bin: env_path("MEETINGCTL_CONVERTER_BIN", PathBuf::from("ffmpeg")),
            eventkit_helper: env_path("MEETINGCTL_EVENTKIT_HELPER", state.join("eventkit_helper.py")),
            jxa_script: std::env::var("MEETINGCTL_JXA_SCRIPT").ok().map(|v| expand_tilde(&v)),
            icalbuddy_bin: env_path("MEETINGCTL_ICALBUDDY_BIN", PathBuf::from("icalBuddy")),
        })
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.now_override.unwrap_or_else(chrono::Utc::now)
    }

    pub fn meetings_root(&self) -> PathBuf {
        self.vault_path.join(&self.meetings_folder)
    }
}

/// True when `path` exists as given, or (for a bare binary name) is found
/// somewhere on `PATH` — the `shutil.which` check the original doctor used.
pub fn is_executable(path: &Path) -> bool {
    if path.is_absolute() || path.components().count() > 1 {
        return path.exists();
    }
    let Some(path_var) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path_var).any(|dir| dir.join(path).exists())
}
