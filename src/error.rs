//! Error types for the audit library
//!
//! Library entry points return [`AuditResult`]; the CLI layer wraps these in
//! `anyhow` with additional context.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can surface from the audit library
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Project path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("Project path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to read config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {message}")]
    ConfigFormat { path: PathBuf, message: String },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AuditResult<T> = Result<T, AuditError>;
