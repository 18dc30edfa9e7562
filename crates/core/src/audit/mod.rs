//! The audit trail: fail-open recording and read-only reporting.
//!
//! Every sensitive read and every mutation in the system writes exactly one
//! entry here after its primary effect has succeeded. The recorder never
//! propagates a failure to its caller; the reporting service reads the same
//! append-only table.

pub mod query;
pub mod recorder;

pub use query::{AuditLogFilter, AuditQueryService, Page};
pub use recorder::{AuditEvent, AuditRecorder};

/// Action kinds recorded in the trail.
pub mod actions {
    pub const LOGIN: &str = "LOGIN";
    pub const LOGOUT: &str = "LOGOUT";
    pub const VIEW: &str = "VIEW";
    pub const VIEW_ENCOUNTERS: &str = "VIEW_ENCOUNTERS";
    pub const SEARCH: &str = "SEARCH";
    pub const UPDATE: &str = "UPDATE";
    pub const CREATE: &str = "CREATE";
}

/// Coarse subsystem tags.
pub mod modules {
    pub const AUTH: &str = "AUTH";
    pub const PATIENTS: &str = "PATIENTS";
}
