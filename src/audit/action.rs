//! Approval Actions
//!
//! The approval/rejection actions that enter the audit trail, together with
//! the unvalidated request shape received from action handlers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AuditError, AuditResult};

/// The two actions a recipient can take on a routed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Approve,
    Reject,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Approve => "approve",
            ActionType::Reject => "reject",
        }
    }

    pub fn parse(value: &str) -> AuditResult<Self> {
        match value {
            "approve" => Ok(ActionType::Approve),
            "reject" => Ok(ActionType::Reject),
            other => Err(AuditError::invalid_action_type(other)),
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw action payload as supplied by an approval handler.
///
/// Every field is optional so that incomplete payloads are reported as
/// validation failures instead of deserialization failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub document_id: Option<String>,
    pub recipient_id: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_role: Option<String>,
    pub action_type: Option<String>,
    pub signature_data: Option<serde_json::Value>,
}

impl ActionRequest {
    /// Validate the request into an `ActionRecord`.
    pub fn validate(self) -> AuditResult<ActionRecord> {
        let document_id = required("documentId", self.document_id)?;
        let recipient_id = required("recipientId", self.recipient_id)?;
        let recipient_name = required("recipientName", self.recipient_name)?;
        let recipient_role = required("recipientRole", self.recipient_role)?;
        let action_type = ActionType::parse(&required("actionType", self.action_type)?)?;

        Ok(ActionRecord {
            document_id,
            recipient_id,
            recipient_name,
            recipient_role,
            action_type,
            signature_data: self.signature_data,
        })
    }
}

fn required(field: &str, value: Option<String>) -> AuditResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AuditError::missing_field(field)),
    }
}

/// A validated approval or rejection action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    pub document_id: String,
    pub recipient_id: String,
    pub recipient_name: String,
    pub recipient_role: String,
    pub action_type: ActionType,
    /// Opaque signature payload, carried through without interpretation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_data: Option<serde_json::Value>,
}

impl ActionRecord {
    /// Re-check the identity and document invariants.
    ///
    /// Records built through `ActionRequest::validate` always pass; records
    /// assembled by hand go through this before anything is hashed.
    pub fn validate(&self) -> AuditResult<()> {
        for (field, value) in [
            ("documentId", &self.document_id),
            ("recipientId", &self.recipient_id),
            ("recipientName", &self.recipient_name),
            ("recipientRole", &self.recipient_role),
        ] {
            if value.trim().is_empty() {
                return Err(AuditError::missing_field(field));
            }
        }
        Ok(())
    }

    pub fn summary(&self) -> String {
        format!(
            "{} {} by {} ({}, {})",
            self.action_type,
            self.document_id,
            self.recipient_name,
            self.recipient_id,
            self.recipient_role
        )
    }
}

impl TryFrom<ActionRequest> for ActionRecord {
    type Error = AuditError;

    fn try_from(request: ActionRequest) -> AuditResult<Self> {
        request.validate()
    }
}
