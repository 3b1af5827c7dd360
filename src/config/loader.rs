//! Configuration loader
//! Layers an optional config file under `IAOMS__`-prefixed environment variables

use config::{Config, Environment, File};
use std::path::Path;
use tracing::info;

use crate::config::AppConfig;
use crate::error::AuditResult;

pub const ENV_PREFIX: &str = "IAOMS";

impl AppConfig {
    /// Load configuration from `path` (if it exists) and the environment.
    pub fn load(path: Option<&Path>) -> AuditResult<Self> {
        let path = path.unwrap_or_else(|| Path::new(super::DEFAULT_CONFIG_FILE));
        info!("Loading configuration from {:?} and environment", path);

        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
