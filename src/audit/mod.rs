//! Audit Trail
//!
//! Tamper-evident recording of document approval and rejection actions.
//! Each action is committed to by content hash, anchored in a transparency
//! log, and kept in an append-only local store.

pub mod action;
pub mod commitment;
pub mod entry;
pub mod logger;
pub mod recorder;
pub mod store;
pub mod verify;

pub use action::{ActionRecord, ActionRequest, ActionType};
pub use commitment::{Commitment, HashCommitter};
pub use entry::AuditEntry;
pub use logger::AuditLogger;
pub use recorder::{AuditRecorder, RecordOutcome};
pub use store::{open_store, AuditEntryStore, MemoryAuditStore};
pub use verify::{verify_entries, verify_entry, EntryIssue, VerificationReport};
