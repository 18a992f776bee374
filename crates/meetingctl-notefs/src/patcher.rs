//! Sentinel-delimited region patching for managed meeting notes.
//!
//! Each managed region is bounded by literal HTML-comment sentinels
//! `<!-- <NAME>_START -->` / `<!-- <NAME>_END -->`. Everything outside a known
//! sentinel pair is immutable to this system.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;

/// The five managed regions a note may carry. `references` is optional per the
/// data model; its absence from a note is not an error.
pub const KNOWN_REGIONS: &[&str] = &["minutes", "decisions", "action_items", "transcript", "references"];

#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("missing sentinel `{0}` in {1}")]
    MissingSentinel(String, PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result of a [`patch_note`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    pub changed: bool,
    pub changed_regions: Vec<String>,
    pub write_performed: bool,
}

fn sentinel_pair(region: &str) -> (String, String) {
    let upper = region.to_uppercase();
    (format!("<!-- {upper}_START -->"), format!("<!-- {upper}_END -->"))
}

/// Replace the span strictly between `start_marker` and the first `end_marker`
/// occurring after it, re-wrapping `content` with exactly one leading and one
/// trailing newline.
fn replace_region(
    note_text: &str,
    start_marker: &str,
    end_marker: &str,
    content: &str,
    note_path: &Path,
) -> Result<String, PatchError> {
    let start_idx = note_text
        .find(start_marker)
        .ok_or_else(|| PatchError::MissingSentinel(start_marker.to_string(), note_path.to_path_buf()))?;
    let search_from = start_idx + start_marker.len();
    let end_idx = note_text[search_from..]
        .find(end_marker)
        .map(|i| i + search_from)
        .ok_or_else(|| PatchError::MissingSentinel(end_marker.to_string(), note_path.to_path_buf()))?;

    let mut inner_start = search_from;
    if note_text.as_bytes().get(inner_start) == Some(&b'\n') {
        inner_start += 1;
    }
    let mut inner_end = end_idx;
    if inner_end > 0 && note_text.as_bytes().get(inner_end - 1) == Some(&b'\n') {
        inner_end -= 1;
    }

    let replacement = content.trim_end_matches('\n');
    let mut out = String::with_capacity(note_text.len() + replacement.len());
    out.push_str(&note_text[..inner_start]);
    out.push_str(replacement);
    out.push('\n');
    out.push_str(&note_text[inner_end..]);
    Ok(out)
}

/// Apply `updates` to `note_text` in map-iteration order, skipping any region
/// outside [`KNOWN_REGIONS`]. Returns the patched text and the regions that
/// actually changed.
pub fn apply_managed_patch(
    note_text: &str,
    updates: &BTreeMap<String, String>,
    note_path: &Path,
) -> Result<(String, Vec<String>), PatchError> {
    let mut patched = note_text.to_string();
    let mut changed_regions = Vec::new();
    for (region, content) in updates {
        if !KNOWN_REGIONS.contains(&region.as_str()) {
            continue;
        }
        let (start_marker, end_marker) = sentinel_pair(region);
        let updated = replace_region(&patched, &start_marker, &end_marker, content, note_path)?;
        if updated != patched {
            changed_regions.push(region.clone());
            patched = updated;
        }
    }
    Ok((patched, changed_regions))
}

fn random_hex() -> String {
    let bytes: [u8; 8] = rand::rng().random();
    hex::encode(bytes)
}

fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let temp_path = path.with_extension(format!("{}.tmp", random_hex()));
    if let Err(e) = std::fs::write(&temp_path, content) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e);
    }
    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e);
    }
    Ok(())
}

/// Read `note_path`, apply `updates` to its managed regions, and — unless
/// `dry_run` — write the result back atomically (temp file + rename).
pub fn patch_note(
    note_path: &Path,
    updates: &BTreeMap<String, String>,
    dry_run: bool,
) -> Result<PatchOutcome, PatchError> {
    let original = std::fs::read_to_string(note_path)?;
    let (patched, changed_regions) = apply_managed_patch(&original, updates, note_path)?;
    let changed = patched != original;
    let write_performed = if changed && !dry_run {
        atomic_write(note_path, &patched)?;
        true
    } else {
        false
    };
    Ok(PatchOutcome {
        changed,
        changed_regions,
        write_performed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note_with_regions() -> String {
        [
            "---",
            "meeting_id: m-0123456789",
            "---",
            "",
            "# Sync",
            "",
            "<!-- MINUTES_START -->",
            "> _Pending_",
            "<!-- MINUTES_END -->",
            "",
            "<!-- DECISIONS_START -->",
            "> _Pending_",
            "<!-- DECISIONS_END -->",
            "",
            "Some untouched text.",
            "",
        ]
        .join("\n")
    }

    fn updates(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn patch_replaces_only_named_regions() {
        let note = note_with_regions();
        let path = PathBuf::from("note.md");
        let (patched, changed) =
            apply_managed_patch(&note, &updates(&[("minutes", "Discussed roadmap.")]), &path).unwrap();
        assert_eq!(changed, vec!["minutes"]);
        assert!(patched.contains("Discussed roadmap."));
        assert!(patched.contains("> _Pending_")); // decisions untouched
        assert!(patched.contains("Some untouched text."));
    }

    #[test]
    fn unknown_region_is_silently_ignored() {
        let note = note_with_regions();
        let path = PathBuf::from("note.md");
        let (patched, changed) =
            apply_managed_patch(&note, &updates(&[("bogus", "x")]), &path).unwrap();
        assert!(changed.is_empty());
        assert_eq!(patched, note);
    }

    #[test]
    fn missing_sentinel_is_an_error() {
        let note = "no sentinels here".to_string();
        let path = PathBuf::from("note.md");
        let err = apply_managed_patch(&note, &updates(&[("minutes", "x")]), &path).unwrap_err();
        assert!(matches!(err, PatchError::MissingSentinel(_, _)));
    }

    #[test]
    fn patch_is_idempotent() {
        let note = note_with_regions();
        let path = PathBuf::from("note.md");
        let upd = updates(&[("minutes", "Same content.\n\n")]);
        let (once, _) = apply_managed_patch(&note, &upd, &path).unwrap();
        let (twice, changed_second_time) = apply_managed_patch(&once, &upd, &path).unwrap();
        assert_eq!(once, twice);
        assert!(changed_second_time.is_empty());
    }

    #[test]
    fn text_outside_sentinels_is_byte_identical() {
        let note = note_with_regions();
        let path = PathBuf::from("note.md");
        let (patched, _) =
            apply_managed_patch(&note, &updates(&[("minutes", "New minutes.")]), &path).unwrap();
        let prefix_before = &note[..note.find("<!-- MINUTES_START -->").unwrap()];
        let prefix_after = &patched[..patched.find("<!-- MINUTES_START -->").unwrap()];
        assert_eq!(prefix_before, prefix_after);
        let suffix_before = &note[note.find("<!-- DECISIONS_END -->").unwrap()..];
        let suffix_after = &patched[patched.find("<!-- DECISIONS_END -->").unwrap()..];
        assert_eq!(suffix_before, suffix_after);
    }

    #[test]
    fn dry_run_skips_write_but_computes_changed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.md");
        std::fs::write(&path, note_with_regions()).unwrap();
        let outcome = patch_note(&path, &updates(&[("minutes", "Updated.")]), true).unwrap();
        assert!(outcome.changed);
        assert!(!outcome.write_performed);
        let after = std::fs::read_to_string(&path).unwrap();
        assert_eq!(after, note_with_regions());
    }

    #[test]
    fn write_is_atomic_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.md");
        std::fs::write(&path, note_with_regions()).unwrap();
        let outcome = patch_note(&path, &updates(&[("minutes", "Updated.")]), false).unwrap();
        assert!(outcome.write_performed);
        let after = std::fs::read_to_string(&path).unwrap();
        assert!(after.contains("Updated."));
        // no stray temp files left behind
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|x| x.to_string_lossy().contains("tmp")).unwrap_or(false))
            .collect();
        assert!(leftovers.is_empty());
    }
}
