//! Calendar back-ends, each reduced to "fetch events in `[start, end]`".
//!
//! Three concrete back-ends shell out to macOS-specific tooling (EventKit
//! helper script, JXA via `osascript`, `icalBuddy`). Each honors a
//! `MEETINGCTL_<NAME>_UNAVAILABLE=1` override and a `MEETINGCTL_<NAME>_EVENTS_JSON`
//! payload override for deterministic testing, mirroring the original
//! Python back-ends' env-var test seams.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::BackendError;
use crate::event::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendName {
    EventKit,
    Jxa,
    ICalBuddy,
}

impl BackendName {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendName::EventKit => "eventkit",
            BackendName::Jxa => "jxa",
            BackendName::ICalBuddy => "icalbuddy",
        }
    }
}

impl std::fmt::Display for BackendName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait CalendarBackend: Send + Sync {
    fn name(&self) -> BackendName;

    async fn fetch_events(
        &self,
        start: Option<DateTime<FixedOffset>>,
        end: Option<DateTime<FixedOffset>>,
    ) -> Result<Vec<Event>, BackendError>;
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    title: String,
    #[serde(default)]
    start: String,
    #[serde(default)]
    end: String,
    #[serde(default)]
    calendar_name: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    url: String,
}

fn parse_raw_events(name: BackendName, raw: &str) -> Result<Vec<Event>, BackendError> {
    let parsed: Vec<RawEvent> = serde_json::from_str(raw.trim())
        .map_err(|e| BackendError::OperationalError(format!("{name}: failed to parse backend output: {e}")))?;
    parsed
        .into_iter()
        .map(|r| {
            let start = DateTime::parse_from_rfc3339(&r.start)
                .map_err(|e| BackendError::OperationalError(format!("{name}: invalid start timestamp: {e}")))?;
            let end = DateTime::parse_from_rfc3339(&r.end)
                .map_err(|e| BackendError::OperationalError(format!("{name}: invalid end timestamp: {e}")))?;
            Ok(Event {
                title: r.title,
                start,
                end,
                calendar_name: r.calendar_name,
                location: r.location,
                notes: r.notes,
                url: r.url,
            })
        })
        .collect()
}

/// Shared helper: honor the two env-var test seams, then spawn `command`
/// under `timeout_secs` and parse its stdout as a JSON array of events.
async fn run_subprocess_backend(
    name: BackendName,
    unavailable_env: &str,
    events_json_env: &str,
    mut command: Command,
    timeout_secs: u64,
) -> Result<Vec<Event>, BackendError> {
    if std::env::var(unavailable_env).as_deref() == Ok("1") {
        return Err(BackendError::BackendUnavailable(format!("{name} backend unavailable on this machine")));
    }
    if let Ok(raw) = std::env::var(events_json_env) {
        return parse_raw_events(name, &raw);
    }

    let output = timeout(Duration::from_secs(timeout_secs), command.output())
        .await
        .map_err(|_| BackendError::OperationalError(format!("{name} timed out")))?
        .map_err(|e| BackendError::BackendUnavailable(format!("{name}: failed to spawn: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(BackendError::BackendUnavailable(format!(
            "{name} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_raw_events(name, &stdout)
}

/// Primary back-end: a small helper script invoked via `python3`, reachable
/// through `MEETINGCTL_EVENTKIT_HELPER` or a conventional default location.
pub struct EventKitBackend {
    pub helper_path: PathBuf,
    pub timeout_secs: u64,
}

impl EventKitBackend {
    pub fn new(helper_path: PathBuf) -> Self {
        Self { helper_path, timeout_secs: 15 }
    }
}

#[async_trait]
impl CalendarBackend for EventKitBackend {
    fn name(&self) -> BackendName {
        BackendName::EventKit
    }

    async fn fetch_events(
        &self,
        _start: Option<DateTime<FixedOffset>>,
        _end: Option<DateTime<FixedOffset>>,
    ) -> Result<Vec<Event>, BackendError> {
        if std::env::var("MEETINGCTL_EVENTKIT_UNAVAILABLE").as_deref() == Ok("1") {
            return Err(BackendError::BackendUnavailable("EventKit backend unavailable on this machine".into()));
        }
        if let Ok(raw) = std::env::var("MEETINGCTL_EVENTKIT_EVENTS_JSON") {
            return parse_raw_events(BackendName::EventKit, &raw);
        }
        if !self.helper_path.exists() {
            return Err(BackendError::BackendUnavailable(format!(
                "EventKit helper not found: {}",
                self.helper_path.display()
            )));
        }
        let mut command = Command::new("python3");
        command.arg(&self.helper_path);
        run_subprocess_backend(
            BackendName::EventKit,
            "MEETINGCTL_EVENTKIT_UNAVAILABLE",
            "MEETINGCTL_EVENTKIT_EVENTS_JSON",
            command,
            self.timeout_secs,
        )
        .await
    }
}

/// Secondary back-end: a JXA script run through `osascript`.
pub struct JxaBackend {
    pub script_path: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl JxaBackend {
    pub fn new(script_path: Option<PathBuf>) -> Self {
        Self { script_path, timeout_secs: 15 }
    }
}

#[async_trait]
impl CalendarBackend for JxaBackend {
    fn name(&self) -> BackendName {
        BackendName::Jxa
    }

    async fn fetch_events(
        &self,
        _start: Option<DateTime<FixedOffset>>,
        _end: Option<DateTime<FixedOffset>>,
    ) -> Result<Vec<Event>, BackendError> {
        let mut command = Command::new("osascript");
        command.arg("-l").arg("JavaScript");
        match &self.script_path {
            Some(path) => {
                command.arg(path);
            }
            None => {
                return Err(BackendError::BackendUnavailable("no JXA script configured".into()));
            }
        }
        run_subprocess_backend(
            BackendName::Jxa,
            "MEETINGCTL_JXA_UNAVAILABLE",
            "MEETINGCTL_JXA_EVENTS_JSON",
            command,
            self.timeout_secs,
        )
        .await
    }
}

/// Tertiary back-end: the `icalBuddy` CLI tool.
pub struct ICalBuddyBackend {
    pub binary: PathBuf,
    pub timeout_secs: u64,
}

impl ICalBuddyBackend {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary, timeout_secs: 15 }
    }
}

#[async_trait]
impl CalendarBackend for ICalBuddyBackend {
    fn name(&self) -> BackendName {
        BackendName::ICalBuddy
    }

    async fn fetch_events(
        &self,
        _start: Option<DateTime<FixedOffset>>,
        _end: Option<DateTime<FixedOffset>>,
    ) -> Result<Vec<Event>, BackendError> {
        let mut command = Command::new(&self.binary);
        command.args(["eventsToday+1", "-ea", "-json"]);
        run_subprocess_backend(
            BackendName::ICalBuddy,
            "MEETINGCTL_ICALBUDDY_UNAVAILABLE",
            "MEETINGCTL_ICALBUDDY_EVENTS_JSON",
            command,
            self.timeout_secs,
        )
        .await
    }
}
