//! SQLite-backed audit entry storage.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, info};

use crate::audit::action::ActionType;
use crate::audit::entry::AuditEntry;
use crate::audit::store::AuditEntryStore;
use crate::error::{AuditError, AuditResult};

pub const AUDIT_ENTRIES_SCHEMA: &str = include_str!("../../migrations/001_audit_entries.sql");

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> AuditResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        info!("Connected to audit database {}", database_url);
        Ok(Database { pool })
    }

    /// Open an existing database read-only. Never creates files or directories.
    pub async fn open_existing(database_url: &str) -> AuditResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(false)
            .read_only(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        info!("Opened audit database {} read-only", database_url);
        Ok(Database { pool })
    }

    /// Single-connection in-memory database; every pooled connection would
    /// otherwise see its own empty database.
    pub async fn new_in_memory() -> AuditResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let database = Database { pool };
        database.run_migrations().await?;
        Ok(database)
    }

    pub async fn run_migrations(&self) -> AuditResult<()> {
        sqlx::query(AUDIT_ENTRIES_SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn count_entries(&self) -> AuditResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_entries")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl AuditEntryStore for Database {
    async fn append(&self, entry: AuditEntry) -> AuditResult<()> {
        let log_index = i64::try_from(entry.log_index).map_err(|_| {
            AuditError::PersistenceError(format!("logIndex {} out of range", entry.log_index))
        })?;
        let signature_data = entry
            .signature_data
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO audit_entries (
                document_id, recipient_id, recipient_name, recipient_role, action_type,
                timestamp, content_hash, log_entry_id, log_index, verification_url, signature_data
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.document_id)
        .bind(&entry.recipient_id)
        .bind(&entry.recipient_name)
        .bind(&entry.recipient_role)
        .bind(entry.action_type.as_str())
        .bind(&entry.timestamp)
        .bind(&entry.content_hash)
        .bind(&entry.log_entry_id)
        .bind(log_index)
        .bind(&entry.verification_url)
        .bind(signature_data)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        debug!("Appended audit entry: {}", entry.summary());
        Ok(())
    }

    async fn list(&self) -> AuditResult<Vec<AuditEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT document_id, recipient_id, recipient_name, recipient_role, action_type,
                   timestamp, content_hash, log_entry_id, log_index, verification_url,
                   signature_data
            FROM audit_entries
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(entry_from_row).collect()
    }
}

fn entry_from_row(row: &SqliteRow) -> AuditResult<AuditEntry> {
    let action_type: String = row.try_get("action_type")?;
    let log_index: i64 = row.try_get("log_index")?;
    let signature_data: Option<String> = row.try_get("signature_data")?;

    Ok(AuditEntry {
        document_id: row.try_get("document_id")?,
        recipient_id: row.try_get("recipient_id")?,
        recipient_name: row.try_get("recipient_name")?,
        recipient_role: row.try_get("recipient_role")?,
        action_type: ActionType::parse(&action_type)
            .map_err(|e| AuditError::PersistenceError(format!("Stored entry invalid: {}", e)))?,
        timestamp: row.try_get("timestamp")?,
        content_hash: row.try_get("content_hash")?,
        log_entry_id: row.try_get("log_entry_id")?,
        log_index: u64::try_from(log_index).map_err(|_| {
            AuditError::PersistenceError(format!("Stored logIndex {} is negative", log_index))
        })?,
        verification_url: row.try_get("verification_url")?,
        signature_data: signature_data
            .map(|s| serde_json::from_str(&s))
            .transpose()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::store::tests::entry;
    use serde_json::json;

    #[tokio::test]
    async fn test_append_and_list_in_order() {
        let db = Database::new_in_memory().await.unwrap();
        for n in [10, 2, 6] {
            db.append(entry(n)).await.unwrap();
        }

        let entries = db.list().await.unwrap();
        let indices: Vec<u64> = entries.iter().map(|e| e.log_index).collect();
        assert_eq!(indices, vec![10, 2, 6]);
        assert_eq!(entries[0], entry(10));
        assert_eq!(db.count_entries().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_signature_data_round_trips() {
        let db = Database::new_in_memory().await.unwrap();
        let mut e = entry(1);
        e.signature_data = Some(json!({"type": "drawn", "points": [[0, 1], [2, 3]]}));
        db.append(e.clone()).await.unwrap();

        assert_eq!(db.list().await.unwrap(), vec![e]);
    }

    #[tokio::test]
    async fn test_empty_log_entry_id_rejected() {
        let db = Database::new_in_memory().await.unwrap();
        let mut e = entry(1);
        e.log_entry_id = String::new();

        assert!(matches!(
            db.append(e).await,
            Err(AuditError::PersistenceError(_))
        ));
        assert_eq!(db.count_entries().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_file_database() {
        let temp_dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", temp_dir.path().join("audit.db").display());

        let db = Database::new(&url).await.unwrap();
        db.run_migrations().await.unwrap();
        db.append(entry(4)).await.unwrap();

        let reopened = Database::new(&url).await.unwrap();
        reopened.run_migrations().await.unwrap();
        assert_eq!(reopened.list().await.unwrap(), vec![entry(4)]);

        let read_only = Database::open_existing(&url).await.unwrap();
        assert_eq!(read_only.list().await.unwrap(), vec![entry(4)]);
        assert!(matches!(
            read_only.append(entry(5)).await,
            Err(AuditError::PersistenceError(_))
        ));
    }

    #[tokio::test]
    async fn test_open_existing_does_not_create_missing_database() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("nested");
        let url = format!("sqlite://{}", nested.join("missing.db").display());

        assert!(Database::open_existing(&url).await.is_err());
        assert!(!nested.join("missing.db").exists());
        assert!(!nested.exists());
    }
}
