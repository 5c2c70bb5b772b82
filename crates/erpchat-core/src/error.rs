//! Error types for ERP Chat Core

use thiserror::Error;

/// Result type alias using the crate Error
pub type Result<T> = std::result::Result<T, Error>;

/// ERP Chat error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Tool invocation failures
///
/// These cover the call shape only: a tool that reaches its query logic
/// converts data-layer failures to text itself and never surfaces them here.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

/// Failures from the record-store query backend
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Unknown doctype: {0}")]
    UnknownDoctype(String),

    #[error("Record not found: {doctype} {name}")]
    NotFound { doctype: String, name: String },

    #[error("Bad filter: {0}")]
    BadFilter(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),
}
