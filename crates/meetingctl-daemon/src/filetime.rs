//! Start-time inference for loose recording files, per spec.md §4.9 step 1:
//! voice-memo stem pattern, then filename-timezone pattern, then birthtime,
//! then mtime.

use std::path::Path;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSource {
    VoiceMemoStem,
    FilenameTimezone,
    Birthtime,
    Mtime,
}

fn voicememo_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{8}) (\d{6})").expect("static regex"))
}

fn filename_tz_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{8})[_-](\d{4})").expect("static regex"))
}

fn naive(ymd: &str, hm_or_hms: &str, with_seconds: bool) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(ymd, "%Y%m%d").ok()?;
    let time = if with_seconds {
        chrono::NaiveTime::parse_from_str(hm_or_hms, "%H%M%S").ok()?
    } else {
        chrono::NaiveTime::parse_from_str(hm_or_hms, "%H%M").ok()?
    };
    Some(date.and_time(time))
}

/// `voice_memo_tz`/`filename_tz` are the configured offsets for each
/// pattern (`MEETINGCTL_VOICEMEMO_FILENAME_TIMEZONE` /
/// `MEETINGCTL_RECORDING_FILENAME_TIMEZONE`).
pub fn infer_start_time(
    path: &Path,
    voice_memo_tz: FixedOffset,
    filename_tz: FixedOffset,
) -> std::io::Result<(DateTime<FixedOffset>, TimeSource)> {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();

    if let Some(caps) = voicememo_regex().captures(stem) {
        if let Some(dt) = naive(&caps[1], &caps[2], true) {
            if let Some(resolved) = voice_memo_tz.from_local_datetime(&dt).single() {
                return Ok((resolved, TimeSource::VoiceMemoStem));
            }
        }
    }

    if let Some(caps) = filename_tz_regex().captures(stem) {
        if let Some(dt) = naive(&caps[1], &caps[2], false) {
            if let Some(resolved) = filename_tz.from_local_datetime(&dt).single() {
                return Ok((resolved, TimeSource::FilenameTimezone));
            }
        }
    }

    let metadata = std::fs::metadata(path)?;
    if let Ok(created) = metadata.created() {
        return Ok((DateTime::<chrono::Utc>::from(created).into(), TimeSource::Birthtime));
    }
    let modified = metadata.modified()?;
    Ok((DateTime::<chrono::Utc>::from(modified).into(), TimeSource::Mtime))
}
