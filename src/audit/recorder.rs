//! Audit Recorder
//!
//! Records approval/rejection actions: validates the action, commits to its
//! content, anchors the commitment in the transparency log, and appends the
//! resulting entry to the local store.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::audit::action::{ActionRecord, ActionRequest};
use crate::audit::commitment::HashCommitter;
use crate::audit::entry::AuditEntry;
use crate::audit::store::AuditEntryStore;
use crate::error::{AuditError, AuditResult};
use crate::rekor::TransparencyLogClient;

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Result returned to the action handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOutcome {
    pub success: bool,
    pub log_entry_id: String,
}

#[derive(Clone)]
pub struct AuditRecorder {
    committer: HashCommitter,
    log_client: Arc<dyn TransparencyLogClient>,
    store: Arc<dyn AuditEntryStore>,
    search_url: String,
    clock: Clock,
}

impl AuditRecorder {
    pub fn new(
        log_client: Arc<dyn TransparencyLogClient>,
        store: Arc<dyn AuditEntryStore>,
        search_url: impl Into<String>,
    ) -> Self {
        Self {
            committer: HashCommitter::new(),
            log_client,
            store,
            search_url: search_url.into(),
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the timestamp source.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Validate and record a raw action payload.
    pub async fn record_action(&self, request: ActionRequest) -> AuditResult<RecordOutcome> {
        let record = request.validate().map_err(|e| {
            warn!("Rejected audit action: {}", e);
            e
        })?;
        self.record(record).await
    }

    /// Record an already-typed action.
    ///
    /// Makes exactly one submission to the transparency log. Repeated calls
    /// for the same action produce independent entries.
    pub async fn record(&self, record: ActionRecord) -> AuditResult<RecordOutcome> {
        record.validate()?;

        // Captured before any I/O; the hash and the stored entry share it.
        let timestamp = (self.clock)().to_rfc3339_opts(SecondsFormat::Millis, true);
        let commitment = self.committer.commit(&record, &timestamp);

        let receipt = match self.log_client.submit(&commitment.content_hash).await {
            Ok(receipt) => receipt,
            Err(e) => {
                if e.is_divergence() {
                    warn!(
                        content_hash = %commitment.content_hash,
                        document_id = %record.document_id,
                        "Transparency log may hold an unreceipted commitment: {}", e
                    );
                } else {
                    warn!("Failed to log {}: {}", record.summary(), e);
                }
                return Err(e);
            }
        };

        let log_entry_id = receipt.log_entry_id.clone();
        let log_index = receipt.log_index;
        let entry = AuditEntry::new(record, timestamp, &commitment, receipt, &self.search_url);

        if let Err(e) = self.store.append(entry).await {
            error!(
                log_entry_id = %log_entry_id,
                log_index,
                content_hash = %commitment.content_hash,
                "AUDIT DIVERGENCE: action logged externally but not persisted locally: {}", e
            );
            return Err(match e {
                AuditError::PersistenceError(message) => AuditError::PersistenceError(message),
                other => AuditError::PersistenceError(other.to_string()),
            });
        }

        info!("Recorded audit entry {} (index {})", log_entry_id, log_index);
        Ok(RecordOutcome {
            success: true,
            log_entry_id,
        })
    }

    /// All recorded entries in append order.
    pub async fn entries(&self) -> AuditResult<Vec<AuditEntry>> {
        self.store.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::action::ActionType;
    use crate::audit::logger::AuditLogger;
    use crate::audit::store::MemoryAuditStore;
    use crate::audit::verify::verify_entries;
    use crate::rekor::LogReceipt;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    /// Log double that records submitted hashes.
    #[derive(Default)]
    struct FakeLog {
        submitted: Mutex<Vec<String>>,
        next_index: AtomicU64,
        fail_with: Option<u16>,
    }

    #[async_trait]
    impl TransparencyLogClient for FakeLog {
        async fn submit(&self, content_hash: &str) -> AuditResult<LogReceipt> {
            self.submitted.lock().unwrap().push(content_hash.to_string());
            if let Some(status) = self.fail_with {
                return Err(AuditError::LogSubmissionError {
                    status: Some(status),
                    message: "Service Unavailable".to_string(),
                });
            }
            let log_index = self.next_index.fetch_add(1, Ordering::SeqCst);
            Ok(LogReceipt {
                log_entry_id: format!("entry-{}", log_index),
                log_index,
            })
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl AuditEntryStore for BrokenStore {
        async fn append(&self, _entry: AuditEntry) -> AuditResult<()> {
            Err(AuditError::PersistenceError("disk full".to_string()))
        }

        async fn list(&self) -> AuditResult<Vec<AuditEntry>> {
            Ok(Vec::new())
        }
    }

    fn request() -> ActionRequest {
        ActionRequest {
            document_id: Some("doc-1".to_string()),
            recipient_id: Some("r-1".to_string()),
            recipient_name: Some("Alice".to_string()),
            recipient_role: Some("HOD".to_string()),
            action_type: Some("approve".to_string()),
            signature_data: None,
        }
    }

    const SEARCH: &str = "https://search.example";

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    #[tokio::test]
    async fn test_record_action_persists_one_entry() {
        let log = Arc::new(FakeLog::default());
        let store = MemoryAuditStore::new();
        let recorder = AuditRecorder::new(log.clone(), Arc::new(store.clone()), SEARCH)
            .with_clock(fixed_clock);

        let outcome = recorder.record_action(request()).await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.log_entry_id, "entry-0");

        let entries = store.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.timestamp, "2024-03-01T09:30:00.000Z");
        assert_eq!(entry.action_type, ActionType::Approve);
        assert_eq!(entry.verification_url, "https://search.example/?logIndex=0");
        assert!(entry.verify_hash());

        // The hash submitted is the hash stored
        assert_eq!(log.submitted.lock().unwrap().as_slice(), &[entry.content_hash.clone()]);
    }

    #[tokio::test]
    async fn test_validation_failure_skips_log() {
        let log = Arc::new(FakeLog::default());
        let store = MemoryAuditStore::new();
        let recorder = AuditRecorder::new(log.clone(), Arc::new(store.clone()), SEARCH);

        let mut bad = request();
        bad.recipient_id = None;
        let result = recorder.record_action(bad).await;

        assert!(matches!(result, Err(AuditError::ValidationError(_))));
        assert!(log.submitted.lock().unwrap().is_empty());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_log_failure_persists_nothing() {
        let log = Arc::new(FakeLog {
            fail_with: Some(503),
            ..Default::default()
        });
        let store = MemoryAuditStore::new();
        let recorder = AuditRecorder::new(log.clone(), Arc::new(store.clone()), SEARCH);

        let result = recorder.record_action(request()).await;
        assert!(matches!(
            result,
            Err(AuditError::LogSubmissionError { status: Some(503), .. })
        ));
        // One attempt only
        assert_eq!(log.submitted.lock().unwrap().len(), 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_persistence_error() {
        let log = Arc::new(FakeLog::default());
        let recorder = AuditRecorder::new(log.clone(), Arc::new(BrokenStore), SEARCH);

        let err = recorder.record_action(request()).await.unwrap_err();
        assert!(matches!(err, AuditError::PersistenceError(_)));
        assert!(err.is_divergence());
        assert_eq!(log.submitted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_null_signature_verifies_after_reload() {
        let temp_dir = tempfile::tempdir().unwrap();
        let logger = AuditLogger::open(temp_dir.path().join("audit.jsonl")).unwrap();
        let recorder = AuditRecorder::new(
            Arc::new(FakeLog::default()),
            Arc::new(logger.clone()),
            SEARCH,
        );

        let mut record = request().validate().unwrap();
        record.signature_data = Some(serde_json::Value::Null);
        recorder.record(record).await.unwrap();

        let reopened = AuditLogger::open(temp_dir.path().join("audit.jsonl")).unwrap();
        let entries = reopened.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].signature_data, None);
        assert!(verify_entries(&entries, SEARCH).is_valid());
    }

    #[tokio::test]
    async fn test_repeated_calls_are_not_deduplicated() {
        let log = Arc::new(FakeLog::default());
        let store = MemoryAuditStore::new();
        let recorder = AuditRecorder::new(log.clone(), Arc::new(store.clone()), SEARCH)
            .with_clock(fixed_clock);

        recorder.record_action(request()).await.unwrap();
        recorder.record_action(request()).await.unwrap();

        let entries = store.list().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_ne!(entries[0].log_entry_id, entries[1].log_entry_id);
        // Same content and timestamp, same commitment
        assert_eq!(entries[0].content_hash, entries[1].content_hash);
    }
}
