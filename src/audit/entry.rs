//! Audit Entry
//!
//! The durable record of one approval/rejection action together with the
//! transparency-log receipt that anchors it.

use serde::{Deserialize, Serialize};

use crate::audit::action::{ActionRecord, ActionType};
use crate::audit::commitment::{Commitment, HashCommitter};
use crate::rekor::{verification_url, LogReceipt};

/// Immutable audit entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub document_id: String,
    pub recipient_id: String,
    pub recipient_name: String,
    pub recipient_role: String,
    pub action_type: ActionType,
    pub timestamp: String,
    pub content_hash: String,
    pub log_entry_id: String,
    pub log_index: u64,
    pub verification_url: String,
    #[serde(default)]
    pub signature_data: Option<serde_json::Value>,
}

impl AuditEntry {
    /// Build the entry for an action that the log has accepted.
    pub fn new(
        record: ActionRecord,
        timestamp: String,
        commitment: &Commitment,
        receipt: LogReceipt,
        search_url: &str,
    ) -> Self {
        Self {
            document_id: record.document_id,
            recipient_id: record.recipient_id,
            recipient_name: record.recipient_name,
            recipient_role: record.recipient_role,
            action_type: record.action_type,
            timestamp,
            content_hash: commitment.content_hash.clone(),
            log_entry_id: receipt.log_entry_id,
            verification_url: verification_url(search_url, receipt.log_index),
            log_index: receipt.log_index,
            signature_data: record.signature_data.filter(|v| !v.is_null()),
        }
    }

    /// The action fields of this entry.
    pub fn action_record(&self) -> ActionRecord {
        ActionRecord {
            document_id: self.document_id.clone(),
            recipient_id: self.recipient_id.clone(),
            recipient_name: self.recipient_name.clone(),
            recipient_role: self.recipient_role.clone(),
            action_type: self.action_type,
            signature_data: self.signature_data.clone(),
        }
    }

    /// Recompute the commitment from the stored fields.
    pub fn recompute_hash(&self) -> String {
        HashCommitter::new()
            .commit(&self.action_record(), &self.timestamp)
            .content_hash
    }

    pub fn verify_hash(&self) -> bool {
        self.content_hash == self.recompute_hash()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} {} by {} -> {} (index {})",
            self.action_type, self.document_id, self.recipient_id, self.log_entry_id, self.log_index
        )
    }
}
