#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use iaoms_audit::audit::{ActionRequest, AuditRecorder, MemoryAuditStore};
use iaoms_audit::rekor::RekorClient;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use wiremock::MockServer;

pub const SEARCH_URL: &str = "https://search.sigstore.dev";
pub const ENTRIES_PATH: &str = "/api/v1/log/entries";

/// Approval payload used by the scenario tests
pub fn approve_request() -> ActionRequest {
    ActionRequest {
        document_id: Some("doc-1".to_string()),
        recipient_id: Some("r-1".to_string()),
        recipient_name: Some("Alice".to_string()),
        recipient_role: Some("HOD".to_string()),
        action_type: Some("approve".to_string()),
        signature_data: None,
    }
}

/// Rekor creation response for a single entry
pub fn rekor_response(uuid: &str, log_index: u64) -> Value {
    json!({
        uuid: {
            "body": "eyJhcGlWZXJzaW9uIjoiMC4wLjEifQ==",
            "integratedTime": 1700000000,
            "logID": "c0d23d6ad406973f9559f3ba2d1ca01f84147d8ffc5b8445c224f98b9591801d",
            "logIndex": log_index,
            "verification": {}
        }
    })
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
}

/// Clock that advances one second per reading, starting at `base_time()`
pub fn ticking_clock() -> impl Fn() -> DateTime<Utc> + Send + Sync + 'static {
    let ticks = Arc::new(AtomicI64::new(0));
    move || base_time() + Duration::seconds(ticks.fetch_add(1, Ordering::SeqCst))
}

/// Recorder wired to a mock Rekor server and an in-memory store
pub fn recorder_for(server: &MockServer) -> (AuditRecorder, MemoryAuditStore) {
    let store = MemoryAuditStore::new();
    let client = RekorClient::new(server.uri(), std::time::Duration::from_secs(5))
        .expect("Failed to create Rekor client");
    let recorder = AuditRecorder::new(Arc::new(client), Arc::new(store.clone()), SEARCH_URL)
        .with_clock(ticking_clock());
    (recorder, store)
}
