//! Primary -> secondary -> tertiary backend cascade with empty-result
//! fallback, plus the event-selection step that turns a resolved event list
//! into the single chosen [`Event`].

use chrono::{DateTime, FixedOffset};

use crate::backend::{BackendName, CalendarBackend};
use crate::error::{BackendError, CalendarResolutionError};
use crate::event::Event;
use crate::selector::{nearest_to, now_or_next};

/// Outcome of resolving the cascade: the event list, which backend supplied
/// it, and whether a fallback past the primary occurred.
pub struct CascadeResult {
    pub events: Vec<Event>,
    pub backend: BackendName,
    pub fallback_used: bool,
}

/// Run the primary/secondary/tertiary cascade. `backends` must be given in
/// priority order; at least one backend is required.
pub async fn fetch_events_cascade(
    backends: &[&dyn CalendarBackend],
    start: Option<DateTime<FixedOffset>>,
    end: Option<DateTime<FixedOffset>>,
) -> Result<CascadeResult, CalendarResolutionError> {
    let mut any_unavailable_or_empty = false;
    let mut last_name = None;

    for (idx, backend) in backends.iter().enumerate() {
        let is_primary = idx == 0;
        last_name = Some(backend.name());
        match backend.fetch_events(start, end).await {
            Ok(events) if !events.is_empty() => {
                return Ok(CascadeResult {
                    events,
                    backend: backend.name(),
                    fallback_used: !is_primary || any_unavailable_or_empty,
                });
            }
            Ok(_empty) => {
                any_unavailable_or_empty = true;
                continue;
            }
            Err(BackendError::BackendUnavailable(_)) => {
                any_unavailable_or_empty = true;
                continue;
            }
            Err(BackendError::OperationalError(msg)) => {
                // Only surfaces immediately when no earlier backend in the
                // cascade has a chance left to still produce a result, i.e.
                // we are at the primary, or every earlier backend already
                // failed/was empty and this is the last one.
                if is_primary || idx == backends.len() - 1 {
                    return Err(CalendarResolutionError::new(Some(backend.name().as_str()), msg));
                }
                any_unavailable_or_empty = true;
                continue;
            }
        }
    }

    Err(CalendarResolutionError::new(
        last_name.map(|n| n.as_str()),
        "No backend returned any events",
    )
    .with_hint("Run `meetingctl doctor` for diagnostics"))
}

#[derive(Debug, Clone, Copy)]
pub enum SelectionMode {
    NowOrNext { window_minutes: i64 },
    NearestTo { window_minutes: i64 },
}

/// Resolve the cascade, then apply the chosen [`SelectionMode`] over the
/// winning event list.
pub async fn resolve_event(
    backends: &[&dyn CalendarBackend],
    t: DateTime<FixedOffset>,
    mode: SelectionMode,
    start: Option<DateTime<FixedOffset>>,
    end: Option<DateTime<FixedOffset>>,
) -> Result<(Event, BackendName, bool), CalendarResolutionError> {
    let cascade = fetch_events_cascade(backends, start, end).await?;
    let picked = match mode {
        SelectionMode::NowOrNext { window_minutes } => now_or_next(&cascade.events, t, window_minutes),
        SelectionMode::NearestTo { window_minutes } => nearest_to(&cascade.events, t, window_minutes),
    };
    match picked {
        Some(event) => Ok((event, cascade.backend, cascade.fallback_used)),
        None => Err(CalendarResolutionError::new(
            Some(cascade.backend.as_str()),
            "No ongoing/upcoming event in window",
        )
        .with_hint("Check your calendar or widen the match window")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;

    struct StubBackend {
        name: BackendName,
        result: Result<Vec<Event>, BackendError>,
    }

    fn dup_err(e: &BackendError) -> BackendError {
        match e {
            BackendError::BackendUnavailable(s) => BackendError::BackendUnavailable(s.clone()),
            BackendError::OperationalError(s) => BackendError::OperationalError(s.clone()),
        }
    }

    #[async_trait]
    impl CalendarBackend for StubBackend {
        fn name(&self) -> BackendName {
            self.name
        }
        async fn fetch_events(
            &self,
            _start: Option<DateTime<FixedOffset>>,
            _end: Option<DateTime<FixedOffset>>,
        ) -> Result<Vec<Event>, BackendError> {
            match &self.result {
                Ok(events) => Ok(events.clone()),
                Err(e) => Err(dup_err(e)),
            }
        }
    }

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

    #[tokio::test]
    async fn cascade_falls_through_to_tertiary() {
        // Boundary scenario 4: primary unavailable, secondary empty, tertiary has one event.
        let primary = StubBackend {
            name: BackendName::EventKit,
            result: Err(BackendError::BackendUnavailable("no permission".into())),
        };
        let secondary = StubBackend { name: BackendName::Jxa, result: Ok(vec![]) };
        let tertiary = StubBackend { name: BackendName::ICalBuddy, result: Ok(vec![event("Sync")]) };
        let backends: Vec<&dyn CalendarBackend> = vec![&primary, &secondary, &tertiary];

        let result = fetch_events_cascade(&backends, None, None).await.unwrap();
        assert_eq!(result.backend, BackendName::ICalBuddy);
        assert!(result.fallback_used);
        assert_eq!(result.events.len(), 1);
    }

    #[tokio::test]
    async fn primary_operational_error_surfaces_immediately() {
        let primary = StubBackend {
            name: BackendName::EventKit,
            result: Err(BackendError::OperationalError("boom".into())),
        };
        let secondary = StubBackend { name: BackendName::Jxa, result: Ok(vec![event("Sync")]) };
        let backends: Vec<&dyn CalendarBackend> = vec![&primary, &secondary];
        let err = fetch_events_cascade(&backends, None, None).await.unwrap_err();
        assert_eq!(err.backend, Some("eventkit"));
    }

    #[tokio::test]
    async fn no_events_anywhere_is_resolution_error() {
        let primary = StubBackend { name: BackendName::EventKit, result: Ok(vec![]) };
        let secondary = StubBackend { name: BackendName::Jxa, result: Ok(vec![]) };
        let tertiary = StubBackend { name: BackendName::ICalBuddy, result: Ok(vec![]) };
        let backends: Vec<&dyn CalendarBackend> = vec![&primary, &secondary, &tertiary];
        let err = fetch_events_cascade(&backends, None, None).await.unwrap_err();
        assert_eq!(err.message, "No backend returned any events");
    }

    #[tokio::test]
    async fn resolve_event_surfaces_no_match_error() {
        let primary = StubBackend { name: BackendName::EventKit, result: Ok(vec![event("Sync")]) };
        let backends: Vec<&dyn CalendarBackend> = vec![&primary];
        let err = resolve_event(&backends, ts(14, 0), SelectionMode::NowOrNext { window_minutes: 5 }, None, None)
            .await
            .unwrap_err();
        assert_eq!(err.message, "No ongoing/upcoming event in window");
    }
}
