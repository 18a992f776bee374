//! Declarative precondition checks and a structured diagnostic payload, per
//! spec.md §4.10.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Check {
    pub name: String,
    pub ok: bool,
    pub message: String,
    pub hint: String,
}

impl Check {
    fn new(name: &str, ok: bool, message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self { name: name.to_string(), ok, message: message.into(), hint: hint.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoctorReport {
    pub ok: bool,
    pub checks: Vec<Check>,
}

/// Inputs the doctor probes. Kept narrow and plain so the check list stays
/// side-effect-free beyond reading these and (for `audio_hijack`) invoking
/// a single diagnostic helper.
pub struct DoctorInputs {
    pub vault_path: Option<String>,
    pub recordings_path: Option<String>,
    pub eventkit_available: bool,
    pub jxa_available: bool,
    pub icalbuddy_available: bool,
    pub ffmpeg_available: bool,
    pub eventkit_helper_available: bool,
    pub audio_hijack_installed: bool,
}

/// Checks named `ffmpeg` are excluded from the aggregate `ok` — recording
/// can proceed without re-encoding, so a missing `ffmpeg` is advisory only.
const NON_MANDATORY_CHECKS: &[&str] = &["ffmpeg"];

pub fn run_doctor(inputs: &DoctorInputs) -> DoctorReport {
    let mut checks = Vec::new();

    checks.push(Check::new(
        "vault_path",
        inputs.vault_path.is_some(),
        if inputs.vault_path.is_some() { "Vault path is set." } else { "Vault path is missing." },
        "Set VAULT_PATH in your configured env file.",
    ));

    checks.push(Check::new(
        "recordings_path",
        inputs.recordings_path.is_some(),
        if inputs.recordings_path.is_some() { "Recordings path is set." } else { "Recordings path is missing." },
        "Set RECORDINGS_PATH in your configured env file.",
    ));

    let any_calendar_backend = inputs.eventkit_available || inputs.jxa_available || inputs.icalbuddy_available;
    checks.push(Check::new(
        "calendar_backend",
        any_calendar_backend,
        if any_calendar_backend { "At least one calendar backend is available." } else { "No calendar backend available." },
        "Enable EventKit, JXA, or icalBuddy, then run `meetingctl doctor` again.",
    ));

    checks.push(Check::new(
        "ffmpeg",
        inputs.ffmpeg_available,
        if inputs.ffmpeg_available { "ffmpeg available." } else { "ffmpeg not found." },
        "Install ffmpeg (e.g., `brew install ffmpeg`).",
    ));

    checks.push(Check::new(
        "eventkit_helper",
        inputs.eventkit_helper_available,
        if inputs.eventkit_helper_available { "EventKit helper is available." } else { "EventKit helper missing or not executable." },
        "Ensure the EventKit helper script exists and is executable.",
    ));

    checks.push(Check::new(
        "audio_hijack",
        inputs.audio_hijack_installed,
        if inputs.audio_hijack_installed { "Audio Hijack installed." } else { "Audio Hijack not found." },
        "Install Audio Hijack from https://rogueamoeba.com/audiohijack/",
    ));

    if let Some(vault_path) = &inputs.vault_path {
        let absolute = std::path::Path::new(vault_path).is_absolute();
        checks.push(Check::new(
            "vault_path_absolute",
            absolute,
            if absolute { "Vault path is absolute." } else { "Vault path is not absolute." },
            "Use an absolute VAULT_PATH for reliable cross-tool behavior.",
        ));
    }

    let ok = checks.iter().filter(|c| !NON_MANDATORY_CHECKS.contains(&c.name.as_str())).all(|c| c.ok);
    DoctorReport { ok, checks }
}
