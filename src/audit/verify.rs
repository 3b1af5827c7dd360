//! Audit Trail Verification
//!
//! Re-checks persisted entries offline: the stored fields must still hash to
//! the committed value, every entry must carry a complete log receipt, and
//! verification URLs must match their log index.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{info, warn};

use crate::audit::entry::AuditEntry;
use crate::rekor::verification_url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryIssue {
    HashMismatch { expected: String, actual: String },
    MissingLogEntryId,
    VerificationUrlMismatch { expected: String, actual: String },
    DuplicateLogEntryId { first_position: usize },
}

impl fmt::Display for EntryIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryIssue::HashMismatch { expected, actual } => {
                write!(f, "content hash mismatch: stored {}, recomputed {}", actual, expected)
            }
            EntryIssue::MissingLogEntryId => write!(f, "missing log entry id"),
            EntryIssue::VerificationUrlMismatch { expected, actual } => {
                write!(f, "verification url {} does not match {}", actual, expected)
            }
            EntryIssue::DuplicateLogEntryId { first_position } => {
                write!(f, "log entry id already used by entry {}", first_position)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub entry_count: usize,
    /// (position in the trail, issue)
    pub issues: Vec<(usize, EntryIssue)>,
}

impl VerificationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Verify a single entry against the search URL it was recorded with.
pub fn verify_entry(entry: &AuditEntry, search_url: &str) -> Vec<EntryIssue> {
    let mut issues = Vec::new();

    let recomputed = entry.recompute_hash();
    if recomputed != entry.content_hash {
        issues.push(EntryIssue::HashMismatch {
            expected: recomputed,
            actual: entry.content_hash.clone(),
        });
    }

    if entry.log_entry_id.trim().is_empty() {
        issues.push(EntryIssue::MissingLogEntryId);
    }

    let expected_url = verification_url(search_url, entry.log_index);
    if expected_url != entry.verification_url {
        issues.push(EntryIssue::VerificationUrlMismatch {
            expected: expected_url,
            actual: entry.verification_url.clone(),
        });
    }

    issues
}

/// Verify a whole trail in stored order.
pub fn verify_entries(entries: &[AuditEntry], search_url: &str) -> VerificationReport {
    let mut issues = Vec::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for (position, entry) in entries.iter().enumerate() {
        for issue in verify_entry(entry, search_url) {
            issues.push((position, issue));
        }

        if entry.log_entry_id.is_empty() {
            continue;
        }
        if let Some(&first_position) = seen.get(entry.log_entry_id.as_str()) {
            issues.push((position, EntryIssue::DuplicateLogEntryId { first_position }));
        } else {
            seen.insert(&entry.log_entry_id, position);
        }
    }

    if issues.is_empty() {
        info!("Audit trail verification successful: {} entries", entries.len());
    } else {
        warn!(
            "Audit trail verification found {} issues in {} entries",
            issues.len(),
            entries.len()
        );
    }

    VerificationReport {
        entry_count: entries.len(),
        issues,
    }
}
