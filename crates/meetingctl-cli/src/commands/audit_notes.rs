use meetingctl_notefs::{audit_note, AuditIssue};

use crate::config::Config;
use crate::output::CliOutcome;

fn issue_to_json(issue: &AuditIssue) -> serde_json::Value {
    match issue {
        AuditIssue::MissingRegion(region) => serde_json::json!({"kind": "missing_region", "region": region}),
        AuditIssue::MissingFrontmatter => serde_json::json!({"kind": "missing_frontmatter"}),
        AuditIssue::MeetingIdMismatch { frontmatter, filename } => {
            serde_json::json!({"kind": "meeting_id_mismatch", "frontmatter": frontmatter, "filename": filename})
        }
    }
}

pub fn run(config: &Config) -> CliOutcome {
    let meetings_root = config.meetings_root();
    if !meetings_root.exists() {
        return CliOutcome::success(serde_json::json!({"notes_checked": 0, "notes_with_issues": [] }), "No meetings folder found.".to_string());
    }

    let entries = match std::fs::read_dir(&meetings_root) {
        Ok(entries) => entries,
        Err(e) => return CliOutcome::error(serde_json::json!({"error": e.to_string()}), e.to_string()),
    };

    let mut notes_checked = 0usize;
    let mut notes_with_issues = Vec::new();

    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => return CliOutcome::error(serde_json::json!({"error": e.to_string()}), e.to_string()),
        };
        let path = entry.path();
        let is_markdown = path.extension().and_then(|e| e.to_str()) == Some("md");
        if !path.is_file() || !is_markdown {
            continue;
        }
        let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string();
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => return CliOutcome::error(serde_json::json!({"error": e.to_string()}), e.to_string()),
        };
        notes_checked += 1;

        let issues = audit_note(&raw, &filename);
        if !issues.is_empty() {
            notes_with_issues.push(serde_json::json!({
                "note_path": path.display().to_string(),
                "issues": issues.iter().map(issue_to_json).collect::<Vec<_>>(),
            }));
        }
    }

    let human = if notes_with_issues.is_empty() {
        format!("Checked {notes_checked} note(s); no issues found.")
    } else {
        format!("Checked {notes_checked} note(s); {} with issues.", notes_with_issues.len())
    };
    CliOutcome::success(serde_json::json!({"notes_checked": notes_checked, "notes_with_issues": notes_with_issues}), human)
}
