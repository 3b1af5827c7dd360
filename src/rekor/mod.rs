//! Rekor Transparency Log Integration
//!
//! Submits content-hash commitments to a Sigstore Rekor instance so that
//! every recorded action has a publicly verifiable log receipt.

pub mod client;

pub use client::{LogReceipt, RekorClient, TransparencyLogClient};

/// Human-facing URL for inspecting a log entry by index.
pub fn verification_url(search_url: &str, log_index: u64) -> String {
    format!("{}/?logIndex={}", search_url.trim_end_matches('/'), log_index)
}
