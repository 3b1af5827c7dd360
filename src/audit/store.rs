//! Audit Entry Storage
//!
//! Append-only persistence for audit entries. Implementations must preserve
//! insertion order and must never lose an entry under concurrent appends.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::audit::entry::AuditEntry;
use crate::audit::logger::AuditLogger;
use crate::config::{StoreBackend, StoreConfig};
use crate::database::Database;
use crate::error::AuditResult;

#[async_trait]
pub trait AuditEntryStore: Send + Sync {
    /// Append one entry. There is no update or delete.
    async fn append(&self, entry: AuditEntry) -> AuditResult<()>;

    /// Snapshot of all entries, earliest append first.
    async fn list(&self) -> AuditResult<Vec<AuditEntry>>;
}

/// Process-lifetime store backed by a vector.
#[derive(Clone, Default)]
pub struct MemoryAuditStore {
    entries: Arc<RwLock<Vec<AuditEntry>>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl AuditEntryStore for MemoryAuditStore {
    async fn append(&self, entry: AuditEntry) -> AuditResult<()> {
        debug!("Appended audit entry: {}", entry.summary());
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn list(&self) -> AuditResult<Vec<AuditEntry>> {
        Ok(self.entries.read().await.clone())
    }
}

/// Open the store selected by configuration.
pub async fn open_store(config: &StoreConfig) -> AuditResult<Arc<dyn AuditEntryStore>> {
    match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory audit store");
            Ok(Arc::new(MemoryAuditStore::new()))
        }
        StoreBackend::Jsonl => Ok(Arc::new(AuditLogger::open(&config.jsonl_path)?)),
        StoreBackend::Sqlite => {
            let database = Database::new(&config.database_url).await?;
            database.run_migrations().await?;
            Ok(Arc::new(database))
        }
    }
}
