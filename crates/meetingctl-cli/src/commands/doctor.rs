use std::path::Path;

use meetingctl_daemon::{run_doctor, DoctorInputs};

use crate::config::{is_executable, Config};
use crate::output::CliOutcome;

fn audio_hijack_installed() -> bool {
    Path::new("/Applications/Audio Hijack.app").exists()
}

pub fn run(config: &Config) -> CliOutcome {
    let inputs = DoctorInputs {
        vault_path: Some(config.vault_path.display().to_string()),
        recordings_path: Some(config.recordings_path.display().to_string()),
        eventkit_available: config.eventkit_helper.exists() && is_executable(Path::new("python3")),
        jxa_available: config.jxa_script.as_deref().map(Path::exists).unwrap_or(false) && is_executable(Path::new("osascript")),
        icalbuddy_available: is_executable(&config.icalbuddy_bin),
        ffmpeg_available: is_executable(&config.converter_bin),
        eventkit_helper_available: config.eventkit_helper.exists(),
        audio_hijack_installed: audio_hijack_installed(),
    };
    let report = run_doctor(&inputs);
    let human = if report.ok {
        "All checks passed.".to_string()
    } else {
        let failing: Vec<&str> = report.checks.iter().filter(|c| !c.ok).map(|c| c.name.as_str()).collect();
        format!("Some checks failed: {}", failing.join(", "))
    };
    CliOutcome::success(serde_json::to_value(&report).unwrap_or_default(), human)
}
