//! Append-only audit log entries (admin-visible actions).

pub mod entry;

pub use entry::AuditEntry;
