//! Deterministic meeting identity and collision-safe note paths.
//!
//! Pure functions, no I/O except [`ensure_collision_safe_path`]'s existence check.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use sha1::{Digest, Sha1};

/// Collapse any run of non-alphanumeric characters to a single space and trim.
/// Falls back to "Untitled Meeting" when the result would be empty.
pub fn sanitize_title(title: &str) -> String {
    let mut cleaned = String::with_capacity(title.len());
    let mut last_was_space = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch);
            last_was_space = false;
        } else if !last_was_space {
            cleaned.push(' ');
            last_was_space = true;
        }
    }
    let trimmed = cleaned.trim().to_string();
    if trimmed.is_empty() {
        "Untitled Meeting".to_string()
    } else {
        trimmed
    }
}

/// `"m-" + first 10 hex chars of sha1(start_iso + "|" + lowercase(sanitized_title))`.
pub fn generate_meeting_id(title: &str, start_iso: &str) -> String {
    let token = format!("{start_iso}|{}", sanitize_title(title).to_lowercase());
    let mut hasher = Sha1::new();
    hasher.update(token.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("m-{}", &digest[..10])
}

/// `"YYYY-MM-DD HHMM - <sanitized title> - <meeting_id>.md"`, using the start
/// time rendered in the local timezone the caller already resolved.
pub fn build_note_filename(start_local: &DateTime<FixedOffset>, title: &str, meeting_id: &str) -> String {
    format!(
        "{} - {} - {}.md",
        start_local.format("%Y-%m-%d %H%M"),
        sanitize_title(title),
        meeting_id,
    )
}

/// Append ` (2)`, ` (3)`, ... before the extension until `path` does not exist.
pub fn ensure_collision_safe_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("note");
    let ext = path.extension().and_then(|s| s.to_str());
    let parent = path.parent();
    let mut counter = 2u32;
    loop {
        let candidate_name = match ext {
            Some(ext) => format!("{stem} ({counter}).{ext}"),
            None => format!("{stem} ({counter})"),
        };
        let candidate = match parent {
            Some(parent) => parent.join(candidate_name),
            None => PathBuf::from(candidate_name),
        };
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
