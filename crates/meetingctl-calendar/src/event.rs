//! The normalized calendar item produced by back-ends and consumed read-only
//! by the rest of the system.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub calendar_name: String,
    pub location: String,
    pub notes: String,
    pub url: String,
}

impl Event {
    /// Events whose title begins with `"Canceled:"` (case-sensitive) are
    /// excluded from selection.
    pub fn is_canceled(&self) -> bool {
        self.title.starts_with("Canceled:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(h: u32, m: u32) -> DateTime<FixedOffset> {
        let offset = FixedOffset::west_opt(7 * 3600).unwrap();
        offset.with_ymd_and_hms(2026, 7, 28, h, m, 0).unwrap()
    }

    fn event(title: &str) -> Event {
        Event {
            title: title.to_string(),
            start: ts(9, 0),
            end: ts(9, 30),
            calendar_name: "Work".to_string(),
            location: String::new(),
            notes: String::new(),
            url: String::new(),
        }
    }

    #[test]
    fn canceled_prefix_is_detected() {
        assert!(event("Canceled: Sync").is_canceled());
        assert!(!event("Sync").is_canceled());
        assert!(!event("canceled: Sync").is_canceled());
    }
}
