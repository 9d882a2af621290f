use crate::core::record::RecordId;
use thiserror::Error;

/// Errors surfaced by the store, the engines and the CLI.
#[derive(Debug, Error)]
pub enum SettlementError {
    /// A required argument was missing or empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A mandatory value could not be parsed.
    #[error("malformed {field}: {value:?}")]
    MalformedInput { field: &'static str, value: String },

    #[error("purchase record {0} not found")]
    NotFound(RecordId),

    #[error("store failure: {0}")]
    Store(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SettlementError>;
