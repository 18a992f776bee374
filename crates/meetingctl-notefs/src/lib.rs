//! Identity, frontmatter, template rendering and sentinel-region patching for
//! meeting notes. Pure functions except where noted; no network I/O.

mod audit;
mod frontmatter;
mod identity;
mod patcher;
mod template;

pub use audit::{audit_note, AuditIssue};
pub use frontmatter::{parse_frontmatter, split_frontmatter, Frontmatter, ParsedNote};
pub use identity::{build_note_filename, ensure_collision_safe_path, generate_meeting_id, sanitize_title};
pub use patcher::{apply_managed_patch, patch_note, PatchError, PatchOutcome, KNOWN_REGIONS};
pub use template::{render_meeting_note, TemplateValues};
