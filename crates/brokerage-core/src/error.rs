use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrokerageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Projection error: {0}")]
    Projection(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Event decoding error: {0}")]
    EventDecode(String),

    #[error("Currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    #[error("Lock acquisition timed out after {timeout_ms}ms")]
    LockTimeout { timeout_ms: u64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for BrokerageError {
    fn from(err: serde_json::Error) -> Self {
        BrokerageError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BrokerageError>;

// Store backends map their driver errors into `Query` (reads) or
// `Projection` (writes) with the driver message, e.g.
//
//     conn.execute(sql, params)
//         .map_err(|e| BrokerageError::Projection(e.to_string()))?;
//
// Callers that need their own error type can wrap `BrokerageError` with
// `#[error(transparent)]` and convert back through `Other`.
