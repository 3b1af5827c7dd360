pub mod api;
pub mod audit;
pub mod config;
pub mod database;
pub mod error;
pub mod rekor;

pub use error::{AuditError, AuditResult};
