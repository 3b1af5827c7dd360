//! Hash Commitments
//!
//! Canonical serialization and SHA-256 content hashing of audited actions.
//! The content hash is the only thing submitted to the transparency log.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::audit::action::{ActionRecord, ActionType};

/// Canonical payload and its content hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commitment {
    pub canonical_payload: String,
    pub content_hash: String,
}

/// Fields are declared in alphabetical order; serde emits them in declaration
/// order, so the output does not depend on any map implementation.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalPayload<'a> {
    action_type: ActionType,
    document_id: &'a str,
    recipient_id: &'a str,
    recipient_name: &'a str,
    recipient_role: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    signature_data: Option<&'a serde_json::Value>,
    timestamp: &'a str,
}

/// Computes commitments over action records.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashCommitter;

impl HashCommitter {
    pub fn new() -> Self {
        Self
    }

    /// Serialize `record` with `timestamp` as a sibling field and hash it.
    pub fn commit(&self, record: &ActionRecord, timestamp: &str) -> Commitment {
        let canonical_payload = canonical_payload(record, timestamp);
        let content_hash = sha256_hex(canonical_payload.as_bytes());
        Commitment {
            canonical_payload,
            content_hash,
        }
    }
}

/// Compact JSON with a fixed key order.
pub fn canonical_payload(record: &ActionRecord, timestamp: &str) -> String {
    let payload = CanonicalPayload {
        action_type: record.action_type,
        document_id: &record.document_id,
        recipient_id: &record.recipient_id,
        recipient_name: &record.recipient_name,
        recipient_role: &record.recipient_role,
        // A null signature is stored as absent, so it is committed as absent.
        signature_data: record.signature_data.as_ref().filter(|v| !v.is_null()),
        timestamp,
    };

    serde_json::to_string(&payload).expect("canonical payload serializes")
}

/// Lowercase hex SHA-256 digest.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
