use std::collections::BTreeMap;
use std::path::PathBuf;

use meetingctl_notefs::patch_note;

use crate::output::CliOutcome;

pub struct PatchNoteArgs {
    pub note_path: PathBuf,
    pub updates: BTreeMap<String, String>,
    pub dry_run: bool,
}

pub fn run(args: PatchNoteArgs) -> CliOutcome {
    match patch_note(&args.note_path, &args.updates, args.dry_run) {
        Ok(outcome) => CliOutcome::success(
            serde_json::json!({
                "changed": outcome.changed,
                "changed_regions": outcome.changed_regions,
                "write_performed": outcome.write_performed,
            }),
            if outcome.changed {
                format!("Patched regions: {}", outcome.changed_regions.join(", "))
            } else {
                "No regions changed.".to_string()
            },
        ),
        Err(e) => CliOutcome::error(serde_json::json!({"error": e.to_string()}), e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patches_known_region_and_reports_change() {
        let dir = tempfile::tempdir().unwrap();
        let note_path = dir.path().join("note.md");
        std::fs::write(
            &note_path,
            "---\nmeeting_id: m-0123456789\n---\n\n<!-- MINUTES_START -->\n> _Pending_\n<!-- MINUTES_END -->\n",
        )
        .unwrap();

        let mut updates = BTreeMap::new();
        updates.insert("minutes".to_string(), "Discussed roadmap.".to_string());
        let outcome = run(PatchNoteArgs { note_path: note_path.clone(), updates, dry_run: false });

        assert_eq!(outcome.exit_code, 0);
        assert_eq!(outcome.json["changed"], true);
        let written = std::fs::read_to_string(&note_path).unwrap();
        assert!(written.contains("Discussed roadmap."));
    }

    #[test]
    fn missing_sentinel_is_structured_error() {
        let dir = tempfile::tempdir().unwrap();
        let note_path = dir.path().join("note.md");
        std::fs::write(&note_path, "# No regions here\n").unwrap();

        let mut updates = BTreeMap::new();
        updates.insert("minutes".to_string(), "x".to_string());
        let outcome = run(PatchNoteArgs { note_path, updates, dry_run: false });

        assert_eq!(outcome.exit_code, 2);
    }
}
