//! Join-URL extraction and platform inference over an [`Event`]'s
//! `url`/`location`/`notes` fields.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::event::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Teams,
    Zoom,
    Meet,
    Webex,
    System,
    Unknown,
}

impl Platform {
    /// Each platform maps to exactly one recorder session name; unknown
    /// falls back to `"System+Mic"`.
    pub fn session_name(self) -> &'static str {
        match self {
            Platform::Teams => "Teams+Mic",
            Platform::Zoom => "Zoom+Mic",
            Platform::Meet | Platform::Webex => "Browser+Mic",
            Platform::System | Platform::Unknown => "System+Mic",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Platform::Teams => "teams",
            Platform::Zoom => "zoom",
            Platform::Meet => "meet",
            Platform::Webex => "webex",
            Platform::System => "system",
            Platform::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

const PREFERRED_HOSTS: &[(&str, Platform)] = &[
    ("teams.microsoft.com", Platform::Teams),
    ("zoom.us", Platform::Zoom),
    ("meet.google.com", Platform::Meet),
    ("webex.com", Platform::Webex),
];

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://[^\s<>\)\]]+").expect("static regex"))
}

fn extract_urls(text: &str) -> Vec<String> {
    url_regex().find_iter(text).map(|m| m.as_str().trim_end_matches(['.', ',']).to_string()).collect()
}

/// Scan `url`, `location`, `notes` (in order) for URLs; among matches prefer
/// the hosts in [`PREFERRED_HOSTS`] order, else return the first URL found.
pub fn infer_join_url(event: &Event) -> Option<String> {
    let mut found = Vec::new();
    for field in [&event.url, &event.location, &event.notes] {
        found.extend(extract_urls(field));
    }
    if found.is_empty() {
        return None;
    }
    for (host, _) in PREFERRED_HOSTS {
        if let Some(u) = found.iter().find(|u| u.contains(host)) {
            return Some(u.clone());
        }
    }
    Some(found.into_iter().next().unwrap())
}

/// Map a join URL's host to a [`Platform`]; `None` input or no recognized
/// host yields `Unknown`.
pub fn infer_platform(join_url: Option<&str>) -> Platform {
    let Some(url) = join_url else {
        return Platform::Unknown;
    };
    for (host, platform) in PREFERRED_HOSTS {
        if url.contains(host) {
            return *platform;
        }
    }
    Platform::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn event(url: &str, location: &str, notes: &str) -> Event {
        let offset = FixedOffset::west_opt(7 * 3600).unwrap();
        let ts = offset.with_ymd_and_hms(2026, 7, 28, 9, 0, 0).unwrap();
        Event {
            title: "Sync".to_string(),
            start: ts,
            end: ts,
            calendar_name: "Work".to_string(),
            location: location.to_string(),
            notes: notes.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn join_url_preference_picks_teams_over_aka_ms() {
        // Boundary scenario 3
        let e = event(
            "",
            "",
            "Join: https://aka.ms/JoinTeamsMeeting?x=1 or https://teams.microsoft.com/l/meetup-join/abc",
        );
        let url = infer_join_url(&e).unwrap();
        assert!(url.contains("teams.microsoft.com"));
        assert_eq!(infer_platform(Some(&url)), Platform::Teams);
    }

    #[test]
    fn falls_back_to_first_url_when_no_preferred_host_matches() {
        let e = event("https://example.com/join/1", "", "");
        assert_eq!(infer_join_url(&e).unwrap(), "https://example.com/join/1");
        assert_eq!(infer_platform(Some("https://example.com/join/1")), Platform::Unknown);
    }

    #[test]
    fn no_url_yields_unknown_platform() {
        let e = event("", "", "");
        assert!(infer_join_url(&e).is_none());
        assert_eq!(infer_platform(None), Platform::Unknown);
    }

    #[test]
    fn zoom_url_is_detected() {
        let e = event("", "", "https://zoom.us/j/123456");
        assert_eq!(infer_platform(infer_join_url(&e).as_deref()), Platform::Zoom);
    }

    #[test]
    fn session_name_mapping() {
        assert_eq!(Platform::Teams.session_name(), "Teams+Mic");
        assert_eq!(Platform::Unknown.session_name(), "System+Mic");
    }
}
