pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AuditError, AuditResult};

pub const DEFAULT_CONFIG_FILE: &str = "iaoms-audit.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub rekor: RekorConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RekorConfig {
    /// Base URL of the Rekor server
    pub url: String,
    /// Base URL used to build human-facing verification links
    pub search_url: String,
    pub timeout_secs: u64,
}

impl Default for RekorConfig {
    fn default() -> Self {
        Self {
            url: "https://rekor.sigstore.dev".to_string(),
            search_url: "https://search.sigstore.dev".to_string(),
            timeout_secs: 30,
        }
    }
}

impl RekorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Jsonl,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub jsonl_path: String,
    pub database_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Jsonl,
            jsonl_path: "data/audit-log.jsonl".to_string(),
            database_url: "sqlite://data/audit.db".to_string(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> AuditResult<()> {
        for (name, url) in [
            ("rekor.url", &self.rekor.url),
            ("rekor.search_url", &self.rekor.search_url),
        ] {
            reqwest::Url::parse(url).map_err(|e| {
                AuditError::ConfigError(format!("Invalid {} {:?}: {}", name, url, e))
            })?;
        }

        if self.rekor.timeout_secs == 0 {
            return Err(AuditError::ConfigError(
                "rekor.timeout_secs must be greater than zero".to_string(),
            ));
        }

        match self.store.backend {
            StoreBackend::Jsonl if self.store.jsonl_path.trim().is_empty() => Err(
                AuditError::ConfigError("store.jsonl_path must not be empty".to_string()),
            ),
            StoreBackend::Sqlite if self.store.database_url.trim().is_empty() => Err(
                AuditError::ConfigError("store.database_url must not be empty".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.store.backend, StoreBackend::Jsonl);
        assert_eq!(config.rekor.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = AppConfig::default();
        config.rekor.url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(AuditError::ConfigError(_))));

        let mut config = AppConfig::default();
        config.rekor.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.store.backend = StoreBackend::Sqlite;
        config.store.database_url = " ".to_string();
        assert!(config.validate().is_err());
    }
}
