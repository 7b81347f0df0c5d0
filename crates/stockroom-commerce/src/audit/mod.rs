//! Product audit trail.

mod entry;

pub use entry::{AuditAction, AuditLogEntry, AuditStats, EnrichedLogEntry};
