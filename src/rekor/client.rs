//! Rekor Client
//!
//! Handles communication with a Rekor server for submitting hashed-record
//! entries and parsing the receipts it assigns.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{AuditError, AuditResult};

const ENTRIES_PATH: &str = "/api/v1/log/entries";
const ENTRY_KIND: &str = "hashedrekord";
const ENTRY_API_VERSION: &str = "0.0.1";
const HASH_ALGORITHM: &str = "sha256";

/// Identifier and position assigned by the transparency log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogReceipt {
    pub log_entry_id: String,
    pub log_index: u64,
}

/// An append-only, externally verifiable log of hash commitments.
#[async_trait]
pub trait TransparencyLogClient: Send + Sync {
    /// Submit one commitment. Performs exactly one attempt.
    async fn submit(&self, content_hash: &str) -> AuditResult<LogReceipt>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProposedEntry<'a> {
    kind: &'static str,
    api_version: &'static str,
    spec: HashedRekordSpec<'a>,
}

#[derive(Serialize)]
struct HashedRekordSpec<'a> {
    data: HashedRekordData<'a>,
}

#[derive(Serialize)]
struct HashedRekordData<'a> {
    hash: HashValue<'a>,
}

#[derive(Serialize)]
struct HashValue<'a> {
    algorithm: &'static str,
    value: &'a str,
}

impl<'a> ProposedEntry<'a> {
    fn hashed_rekord(content_hash: &'a str) -> Self {
        Self {
            kind: ENTRY_KIND,
            api_version: ENTRY_API_VERSION,
            spec: HashedRekordSpec {
                data: HashedRekordData {
                    hash: HashValue {
                        algorithm: HASH_ALGORITHM,
                        value: content_hash,
                    },
                },
            },
        }
    }
}

/// HTTP client for a Rekor server
pub struct RekorClient {
    base_url: String,
    http_client: Client,
}

impl RekorClient {
    /// Create new client against a Rekor base URL (e.g. `https://rekor.sigstore.dev`)
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AuditResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuditError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn entries_url(&self) -> String {
        format!("{}{}", self.base_url, ENTRIES_PATH)
    }
}

#[async_trait]
impl TransparencyLogClient for RekorClient {
    async fn submit(&self, content_hash: &str) -> AuditResult<LogReceipt> {
        let url = self.entries_url();
        debug!("Submitting commitment {} to {}", content_hash, url);

        let response = self
            .http_client
            .post(&url)
            .json(&ProposedEntry::hashed_rekord(content_hash))
            .send()
            .await
            .map_err(|e| AuditError::LogSubmissionError {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown status");
            let body = response.text().await.unwrap_or_default();
            warn!("Rekor rejected submission with {}: {}", status, body.trim());
            let message = if body.trim().is_empty() {
                reason.to_string()
            } else {
                format!("{}: {}", reason, body.trim())
            };
            return Err(AuditError::LogSubmissionError {
                status: Some(status.as_u16()),
                message,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AuditError::MalformedResponse(format!("Response is not JSON: {}", e)))?;

        let receipt = parse_receipt(&body)?;
        info!(
            "Commitment {} logged as {} at index {}",
            content_hash, receipt.log_entry_id, receipt.log_index
        );
        Ok(receipt)
    }
}

/// Extract the receipt from a Rekor creation response.
///
/// The response is an object with a single key, the entry UUID, whose value
/// holds a non-negative integer `logIndex`.
pub fn parse_receipt(body: &Value) -> AuditResult<LogReceipt> {
    let object = body
        .as_object()
        .ok_or_else(|| AuditError::MalformedResponse("Expected a JSON object".to_string()))?;

    if object.len() != 1 {
        return Err(AuditError::MalformedResponse(format!(
            "Expected exactly one log entry, found {}",
            object.len()
        )));
    }

    let (log_entry_id, entry) = object
        .iter()
        .next()
        .ok_or_else(|| AuditError::MalformedResponse("Empty response".to_string()))?;

    if log_entry_id.trim().is_empty() {
        return Err(AuditError::MalformedResponse(
            "Log entry identifier is empty".to_string(),
        ));
    }

    let log_index = entry
        .get("logIndex")
        .ok_or_else(|| AuditError::MalformedResponse("Missing logIndex".to_string()))?
        .as_u64()
        .ok_or_else(|| {
            AuditError::MalformedResponse("logIndex is not a non-negative integer".to_string())
        })?;

    Ok(LogReceipt {
        log_entry_id: log_entry_id.clone(),
        log_index,
    })
}
