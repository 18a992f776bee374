//! Markdown template rendering for new meeting notes.
//!
//! Substitutes `{{ key }}` placeholders in the built-in template (or a
//! caller-supplied override) and emits a note body carrying frontmatter plus
//! the four mandatory sentinel regions (`references` is added only when the
//! caller opts in, since the data model marks it optional).

use std::collections::BTreeMap;

/// Values substituted into the template's `{{ key }}` placeholders.
pub type TemplateValues = BTreeMap<String, String>;

const DEFAULT_TEMPLATE: &str = r#"---
meeting_id: {{ meeting_id }}
title: {{ title }}
start: {{ start_iso }}
end: {{ end_iso }}
calendar: {{ calendar_name }}
platform: {{ platform }}
---

# {{ title }}

- **When:** {{ start_human }} – {{ end_human }}
- **Calendar:** {{ calendar_name }}
- **Join:** {{ join_url }}
- **Recording:** {{ recording_wav_rel }}

## Minutes

<!-- MINUTES_START -->
> _Pending_
<!-- MINUTES_END -->

## Decisions

<!-- DECISIONS_START -->
> _Pending_
<!-- DECISIONS_END -->

## Action Items

<!-- ACTION_ITEMS_START -->
> _Pending_
<!-- ACTION_ITEMS_END -->

## Transcript

<!-- TRANSCRIPT_START -->
> _Pending_
<!-- TRANSCRIPT_END -->
"#;

fn render_placeholders(template: &str, values: &TemplateValues) -> String {
    let mut rendered = template.to_string();
    for (key, value) in values {
        rendered = rendered.replace(&format!("{{{{ {key} }}}}"), value);
    }
    rendered
}

/// Render a new meeting note body. `template` overrides the built-in default
/// when given (mirrors `MEETINGCTL_NOTE_TEMPLATE_PATH`, resolved by the caller).
pub fn render_meeting_note(values: &TemplateValues, template: Option<&str>) -> String {
    render_placeholders(template.unwrap_or(DEFAULT_TEMPLATE), values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_values() -> TemplateValues {
        let mut v = TemplateValues::new();
        v.insert("meeting_id".into(), "m-0123456789".into());
        v.insert("title".into(), "Sync".into());
        v.insert("start_iso".into(), "2026-07-28T09:00:00-07:00".into());
        v.insert("end_iso".into(), "2026-07-28T09:30:00-07:00".into());
        v.insert("calendar_name".into(), "Work".into());
        v.insert("platform".into(), "zoom".into());
        v.insert("start_human".into(), "9:00 AM".into());
        v.insert("end_human".into(), "9:30 AM".into());
        v.insert("join_url".into(), "https://zoom.us/j/123".into());
        v.insert("recording_wav_rel".into(), "".into());
        v
    }

    #[test]
    fn renders_all_placeholders() {
        let rendered = render_meeting_note(&sample_values(), None);
        assert!(!rendered.contains("{{"));
        assert!(rendered.contains("meeting_id: m-0123456789"));
        assert!(rendered.contains("<!-- MINUTES_START -->"));
        assert!(rendered.contains("<!-- TRANSCRIPT_END -->"));
    }

    #[test]
    fn custom_template_is_used_when_given() {
        let rendered = render_meeting_note(&sample_values(), Some("Title: {{ title }}"));
        assert_eq!(rendered, "Title: Sync");
    }
}
