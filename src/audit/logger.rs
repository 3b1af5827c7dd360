//! Audit Logger
//!
//! Append-only JSON-lines file holding one audit entry per line.

use async_trait::async_trait;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::audit::entry::AuditEntry;
use crate::audit::store::AuditEntryStore;
use crate::error::{AuditError, AuditResult};

/// Audit logger managing an append-only JSONL file
#[derive(Clone)]
pub struct AuditLogger {
    log_path: PathBuf,
    file: Arc<Mutex<File>>,
}

impl AuditLogger {
    /// Open (or create) the log file, validating any existing entries
    pub fn open(log_path: impl AsRef<Path>) -> AuditResult<Self> {
        let log_path = log_path.as_ref().to_path_buf();

        if let Some(parent) = log_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AuditError::PersistenceError(format!("Failed to create log directory: {}", e))
                })?;
            }
        }

        let existing = if log_path.exists() {
            read_entries(&log_path)?.len()
        } else {
            0
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(|e| {
                AuditError::PersistenceError(format!("Failed to open audit log file: {}", e))
            })?;

        info!("Opened audit log {:?} with {} existing entries", log_path, existing);

        Ok(Self {
            log_path,
            file: Arc::new(Mutex::new(file)),
        })
    }
}

#[async_trait]
impl AuditEntryStore for AuditLogger {
    async fn append(&self, entry: AuditEntry) -> AuditResult<()> {
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        // One write per entry, under the lock, so lines never interleave.
        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).map_err(|e| {
            AuditError::PersistenceError(format!("Failed to write to audit log: {}", e))
        })?;
        file.flush().and_then(|_| file.sync_data()).map_err(|e| {
            AuditError::PersistenceError(format!("Failed to flush audit log: {}", e))
        })?;

        debug!("Appended audit entry: {}", entry.summary());
        Ok(())
    }

    async fn list(&self) -> AuditResult<Vec<AuditEntry>> {
        // Hold the writer lock so a half-written line is never observed.
        let _guard = self.file.lock().await;
        read_entries(&self.log_path)
    }
}

/// Read every entry from a JSONL audit file
pub fn read_entries(path: &Path) -> AuditResult<Vec<AuditEntry>> {
    let file = File::open(path).map_err(|e| {
        AuditError::PersistenceError(format!("Failed to open audit log {:?}: {}", path, e))
    })?;

    let reader = BufReader::new(file);
    let mut entries = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let entry: AuditEntry = serde_json::from_str(&line).map_err(|e| {
            AuditError::PersistenceError(format!(
                "Failed to parse audit entry on line {}: {}",
                line_no + 1,
                e
            ))
        })?;
        entries.push(entry);
    }

    Ok(entries)
}
