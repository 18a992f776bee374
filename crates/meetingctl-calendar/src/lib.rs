//! Calendar event model, pure selectors, backend cascade, and join-URL /
//! platform inference.

mod backend;
mod cascade;
mod error;
mod event;
mod platform;
mod selector;

pub use backend::{BackendName, CalendarBackend, EventKitBackend, ICalBuddyBackend, JxaBackend};
pub use cascade::{fetch_events_cascade, resolve_event, CascadeResult, SelectionMode};
pub use error::{BackendError, CalendarError, CalendarResolutionError};
pub use event::Event;
pub use platform::{infer_join_url, infer_platform, Platform};
pub use selector::{nearest_to, now_or_next};
