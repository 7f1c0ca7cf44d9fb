//! Error types for MCP operations

use thiserror::Error;

/// Errors that end a transport session
#[derive(Error, Debug)]
pub enum McpError {
    /// Reading from or writing to the transport failed
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
