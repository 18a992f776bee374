//! Rendering for the optional `references` region.
//!
//! Open Question #3 leaves intermediate formatting to the implementer but
//! requires the region to end with a `status:` line; this lists the
//! transcript and final audio paths (relative to nothing in particular —
//! callers may pre-relativize them) followed by that status line.

use std::path::Path;

pub fn note_has_references_region(note_text: &str) -> bool {
    note_text.contains("<!-- REFERENCES_START -->") && note_text.contains("<!-- REFERENCES_END -->")
}

pub fn render_references(transcript_path: &Path, audio_path: &Path, complete: bool) -> String {
    let status = if complete { "complete" } else { "partial" };
    format!(
        "- transcript: `{}`\n- audio: `{}`\nstatus: {status}",
        transcript_path.display(),
        audio_path.display()
    )
}
