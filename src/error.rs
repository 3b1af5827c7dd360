use thiserror::Error;

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        Self::PersistenceError(format!("JSON serialization error: {}", err))
    }
}

impl From<sqlx::Error> for AuditError {
    fn from(err: sqlx::Error) -> Self {
        Self::PersistenceError(format!("Database error: {}", err))
    }
}

impl From<std::io::Error> for AuditError {
    fn from(err: std::io::Error) -> Self {
        Self::PersistenceError(format!("I/O error: {}", err))
    }
}

impl From<config::ConfigError> for AuditError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Transparency log submission failed{}: {message}", upstream_status(.status))]
    LogSubmissionError {
        status: Option<u16>,
        message: String,
    },

    #[error("Malformed transparency log response: {0}")]
    MalformedResponse(String),

    #[error("Audit persistence error: {0}")]
    PersistenceError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

fn upstream_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {})", code),
        None => String::new(),
    }
}

pub type AuditResult<T> = Result<T, AuditError>;

impl AuditError {
    pub fn missing_field(field: &str) -> Self {
        Self::ValidationError(format!("Missing required field: {}", field))
    }

    pub fn invalid_action_type(value: &str) -> Self {
        Self::ValidationError(format!(
            "Invalid actionType: {:?}. Must be \"approve\" or \"reject\"",
            value
        ))
    }

    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ValidationError(_) => "ValidationError",
            Self::LogSubmissionError { .. } => "LogSubmissionError",
            Self::MalformedResponse(_) => "MalformedResponse",
            Self::PersistenceError(_) => "PersistenceError",
            Self::ConfigError(_) => "ConfigError",
        }
    }

    /// True when the external log may hold a commitment that has no local entry.
    pub fn is_divergence(&self) -> bool {
        matches!(self, Self::MalformedResponse(_) | Self::PersistenceError(_))
    }
}
