//! Parses the `--platform` CLI value into a [`Platform`]; used only at this
//! boundary since the domain type itself has no `FromStr` (it's always
//! inferred from a join URL elsewhere).

use meetingctl_calendar::Platform;

pub fn parse_platform(s: &str) -> Platform {
    match s.to_lowercase().as_str() {
        "teams" => Platform::Teams,
        "zoom" => Platform::Zoom,
        "meet" => Platform::Meet,
        "webex" => Platform::Webex,
        "system" => Platform::System,
        _ => Platform::Unknown,
    }
}
