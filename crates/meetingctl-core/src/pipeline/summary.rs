//! Summarizer JSON parsing and its translation into note-patch regions.
//!
//! `action_items` renders as checkboxes (`- [ ] item`) rather than the
//! original's plain bullets — the spec requires actionable checkboxes here.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::capability::SummaryPayload;
use crate::error::MeetingError;

#[derive(Debug, Deserialize)]
struct RawSummary {
    minutes: Option<serde_json::Value>,
    decisions: Option<serde_json::Value>,
    action_items: Option<serde_json::Value>,
    #[serde(default)]
    reused: bool,
}

fn as_string_list(value: &serde_json::Value) -> Option<Vec<String>> {
    let arr = value.as_array()?;
    arr.iter().map(|v| v.as_str().map(str::to_string)).collect()
}

pub fn parse_summary_json(raw: &str) -> Result<SummaryPayload, MeetingError> {
    let parsed: RawSummary =
        serde_json::from_str(raw).map_err(|e| MeetingError::SummaryParseError(format!("malformed summary JSON: {e}")))?;

    let minutes = match parsed.minutes {
        Some(serde_json::Value::String(s)) => s,
        _ => return Err(MeetingError::SummaryParseError("minutes must be a string".to_string())),
    };
    let decisions = parsed
        .decisions
        .as_ref()
        .and_then(as_string_list)
        .ok_or_else(|| MeetingError::SummaryParseError("decisions must be a list of strings".to_string()))?;
    let action_items = parsed
        .action_items
        .as_ref()
        .and_then(as_string_list)
        .ok_or_else(|| MeetingError::SummaryParseError("action_items must be a list of strings".to_string()))?;

    Ok(SummaryPayload { minutes, decisions, action_items, reused: parsed.reused })
}

/// Best-effort coercion used when the repair attempt (§7) still fails:
/// any text becomes `minutes`, lists default empty.
pub fn coerce_summary(raw: &str) -> SummaryPayload {
    SummaryPayload { minutes: raw.trim().to_string(), decisions: vec![], action_items: vec![], reused: false }
}

pub fn summary_to_patch_regions(summary: &SummaryPayload) -> BTreeMap<String, String> {
    let mut regions = BTreeMap::new();
    regions.insert("minutes".to_string(), summary.minutes.clone());
    regions.insert(
        "decisions".to_string(),
        if summary.decisions.is_empty() {
            "> _Pending_".to_string()
        } else {
            summary.decisions.iter().map(|d| format!("- {d}")).collect::<Vec<_>>().join("\n")
        },
    );
    regions.insert(
        "action_items".to_string(),
        if summary.action_items.is_empty() {
            "> _Pending_".to_string()
        } else {
            summary.action_items.iter().map(|item| format!("- [ ] {item}")).collect::<Vec<_>>().join("\n")
        },
    );
    regions
}
