//! Backfill, ingest-watch polling, and the doctor self-check — the
//! file-discovery and precondition layer that sits above `meetingctl-core`.

pub mod backfill;
pub mod doctor;
pub mod filetime;
pub mod ingest;
pub mod note_creation;

pub use backfill::{run_backfill, BackfillInputs, BackfillOutcome, BackfillPlan};
pub use doctor::{run_doctor, DoctorInputs, DoctorReport};
pub use filetime::{infer_start_time, TimeSource};
pub use ingest::{run_ingest_once, run_ingest_watch, IngestInputs, IngestStats, IngestWatchOutcome};
pub use note_creation::{create_adhoc_note, create_note_from_event, CreatedNote};
