mod job;
mod process_result;
mod session_state;

pub use job::Job;
pub use process_result::ProcessResult;
pub use session_state::SessionState;

pub use meetingctl_calendar::{Event, Platform};
