//! Pure event-selection algorithms over a list of [`Event`]s and a reference
//! instant. Canceled events are excluded before either algorithm runs.

use chrono::{DateTime, Duration, FixedOffset};

use crate::event::Event;

fn eligible(events: &[Event]) -> impl Iterator<Item = &Event> {
    events.iter().filter(|e| !e.is_canceled())
}

fn sort_key(e: &Event) -> (DateTime<FixedOffset>, String) {
    (e.start, e.title.clone())
}

/// `ongoing = {start <= t < end}`, smallest `(start, title)` wins; else the
/// smallest `(start, title)` among `upcoming = {t < start <= t + window}`;
/// else `None`.
pub fn now_or_next(events: &[Event], t: DateTime<FixedOffset>, window_minutes: i64) -> Option<Event> {
    let window_end = t + Duration::minutes(window_minutes);

    let mut ongoing: Vec<&Event> = eligible(events).filter(|e| e.start <= t && t < e.end).collect();
    if !ongoing.is_empty() {
        ongoing.sort_by_key(|e| sort_key(e));
        return ongoing.into_iter().next().cloned();
    }

    let mut upcoming: Vec<&Event> = eligible(events).filter(|e| t < e.start && e.start <= window_end).collect();
    if upcoming.is_empty() {
        return None;
    }
    upcoming.sort_by_key(|e| sort_key(e));
    upcoming.into_iter().next().cloned()
}

/// `distance = 0` while ongoing (start <= t < end, end exclusive), else
/// `|start - t|`. Events farther than `window` are dropped. Returns the
/// unique minimum; two or more events tying on `(distance, start, title)`'s
/// distance component is ambiguous and yields `None`.
pub fn nearest_to(events: &[Event], t: DateTime<FixedOffset>, window_minutes: i64) -> Option<Event> {
    let window = Duration::minutes(window_minutes);

    let mut candidates: Vec<(Duration, &Event)> = eligible(events)
        .filter_map(|e| {
            let distance = if e.start <= t && t < e.end {
                Duration::zero()
            } else if e.start > t {
                e.start - t
            } else {
                t - e.start
            };
            if distance <= window {
                Some((distance, e))
            } else {
                None
            }
        })
        .collect();

    if candidates.is_empty() {
        return None;
    }

    candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| sort_key(a.1).cmp(&sort_key(b.1))));

    let min_distance = candidates[0].0;
    let tied = candidates.iter().filter(|(d, _)| *d == min_distance).count();
    if tied > 1 {
        return None;
    }
    Some(candidates[0].1.clone())
}
