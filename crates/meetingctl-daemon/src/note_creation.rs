//! Turns a resolved calendar [`Event`] (or an ad-hoc title/time pair) into a
//! rendered, collision-safe note on disk. Shared by backfill and
//! ingest-watch.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use meetingctl_calendar::{infer_join_url, infer_platform, Event};
use meetingctl_notefs::{build_note_filename, ensure_collision_safe_path, generate_meeting_id, render_meeting_note, TemplateValues};

pub struct CreatedNote {
    pub meeting_id: String,
    pub note_path: PathBuf,
}

fn write_note(path: &Path, body: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, body)
}

fn values_for(
    meeting_id: &str,
    title: &str,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    calendar_name: &str,
    platform: &str,
    join_url: &str,
) -> TemplateValues {
    let mut values = TemplateValues::new();
    values.insert("meeting_id".to_string(), meeting_id.to_string());
    values.insert("title".to_string(), title.to_string());
    values.insert("start_iso".to_string(), start.to_rfc3339());
    values.insert("end_iso".to_string(), end.to_rfc3339());
    values.insert("calendar_name".to_string(), calendar_name.to_string());
    values.insert("platform".to_string(), platform.to_string());
    values.insert("start_human".to_string(), start.format("%-I:%M %p").to_string());
    values.insert("end_human".to_string(), end.format("%-I:%M %p").to_string());
    values.insert("join_url".to_string(), join_url.to_string());
    values.insert("recording_wav_rel".to_string(), String::new());
    values
}

pub fn create_note_from_event(
    event: &Event,
    vault_root: &Path,
    meetings_folder: &str,
    template: Option<&str>,
) -> std::io::Result<CreatedNote> {
    let meeting_id = generate_meeting_id(&event.title, &event.start.to_rfc3339());
    let filename = build_note_filename(&event.start, &event.title, &meeting_id);
    let note_path = ensure_collision_safe_path(&vault_root.join(meetings_folder).join(filename));

    let join_url = infer_join_url(event).unwrap_or_default();
    let platform = infer_platform(Some(&join_url).filter(|u| !u.is_empty()));

    let values = values_for(&meeting_id, &event.title, event.start, event.end, &event.calendar_name, &platform.to_string(), &join_url);
    write_note(&note_path, &render_meeting_note(&values, template))?;

    Ok(CreatedNote { meeting_id, note_path })
}

/// No calendar match: an ad-hoc title derived from the filename and the
/// inferred recording start.
pub fn create_adhoc_note(
    title: &str,
    start: DateTime<FixedOffset>,
    vault_root: &Path,
    meetings_folder: &str,
    template: Option<&str>,
) -> std::io::Result<CreatedNote> {
    let meeting_id = generate_meeting_id(title, &start.to_rfc3339());
    let filename = build_note_filename(&start, title, &meeting_id);
    let note_path = ensure_collision_safe_path(&vault_root.join(meetings_folder).join(filename));

    let values = values_for(&meeting_id, title, start, start, "Ad-hoc", "unknown", "");
    write_note(&note_path, &render_meeting_note(&values, template))?;

    Ok(CreatedNote { meeting_id, note_path })
}
