//! Consistency checks over managed notes, used by the `audit-notes` subcommand.

use crate::frontmatter::parse_frontmatter;
use crate::patcher::KNOWN_REGIONS;

/// One discrepancy found while auditing a single note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditIssue {
    /// A mandatory region (`minutes`/`decisions`/`action_items`/`transcript`) has no sentinel pair.
    MissingRegion(String),
    /// The note has no frontmatter block at all.
    MissingFrontmatter,
    /// `meeting_id` frontmatter disagrees with the id embedded in the filename.
    MeetingIdMismatch { frontmatter: String, filename: String },
}

const MANDATORY_REGIONS: &[&str] = &["minutes", "decisions", "action_items", "transcript"];

/// Audit one note's raw content against `filename`'s embedded meeting id
/// (the trailing `m-XXXXXXXXXX` token before `.md`).
pub fn audit_note(raw: &str, filename: &str) -> Vec<AuditIssue> {
    let mut issues = Vec::new();

    for region in MANDATORY_REGIONS {
        let upper = region.to_uppercase();
        let start = format!("<!-- {upper}_START -->");
        let end = format!("<!-- {upper}_END -->");
        if !raw.contains(&start) || !raw.contains(&end) {
            issues.push(AuditIssue::MissingRegion(region.to_string()));
        }
    }
    debug_assert!(KNOWN_REGIONS.contains(&"references"));

    let parsed = parse_frontmatter(raw);
    match parsed.frontmatter {
        None => issues.push(AuditIssue::MissingFrontmatter),
        Some(fm) => {
            if let Some(fm_id) = fm.get("meeting_id").and_then(|v| v.as_str()) {
                if let Some(filename_id) = extract_meeting_id_from_filename(filename) {
                    if fm_id != filename_id {
                        issues.push(AuditIssue::MeetingIdMismatch {
                            frontmatter: fm_id.to_string(),
                            filename: filename_id,
                        });
                    }
                }
            }
        }
    }

    issues
}

fn extract_meeting_id_from_filename(filename: &str) -> Option<String> {
    let stem = filename.strip_suffix(".md")?;
    let (_, id) = stem.rsplit_once(" - ")?;
    if id.starts_with("m-") { Some(id.to_string()) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_note_has_no_issues() {
        let raw = "---\nmeeting_id: m-0123456789\n---\n\n<!-- MINUTES_START -->\nx\n<!-- MINUTES_END -->\n<!-- DECISIONS_START -->\nx\n<!-- DECISIONS_END -->\n<!-- ACTION_ITEMS_START -->\nx\n<!-- ACTION_ITEMS_END -->\n<!-- TRANSCRIPT_START -->\nx\n<!-- TRANSCRIPT_END -->\n";
        let issues = audit_note(raw, "2026-07-28 0900 - Sync - m-0123456789.md");
        assert!(issues.is_empty());
    }

    #[test]
    fn flags_missing_region() {
        let raw = "---\nmeeting_id: m-0123456789\n---\n\n<!-- MINUTES_START -->\nx\n<!-- MINUTES_END -->\n";
        let issues = audit_note(raw, "2026-07-28 0900 - Sync - m-0123456789.md");
        assert!(issues.contains(&AuditIssue::MissingRegion("decisions".to_string())));
    }

    #[test]
    fn flags_meeting_id_mismatch() {
        let raw = "---\nmeeting_id: m-aaaaaaaaaa\n---\n\n<!-- MINUTES_START -->\nx\n<!-- MINUTES_END -->\n<!-- DECISIONS_START -->\nx\n<!-- DECISIONS_END -->\n<!-- ACTION_ITEMS_START -->\nx\n<!-- ACTION_ITEMS_END -->\n<!-- TRANSCRIPT_START -->\nx\n<!-- TRANSCRIPT_END -->\n";
        let issues = audit_note(raw, "2026-07-28 0900 - Sync - m-bbbbbbbbbb.md");
        assert!(matches!(issues[0], AuditIssue::MeetingIdMismatch { .. }));
    }

    #[test]
    fn flags_missing_frontmatter() {
        let raw = "<!-- MINUTES_START -->\nx\n<!-- MINUTES_END -->\n<!-- DECISIONS_START -->\nx\n<!-- DECISIONS_END -->\n<!-- ACTION_ITEMS_START -->\nx\n<!-- ACTION_ITEMS_END -->\n<!-- TRANSCRIPT_START -->\nx\n<!-- TRANSCRIPT_END -->\n";
        let issues = audit_note(raw, "2026-07-28 0900 - Sync - m-0123456789.md");
        assert!(issues.contains(&AuditIssue::MissingFrontmatter));
    }
}
