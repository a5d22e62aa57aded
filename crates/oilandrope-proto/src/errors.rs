//! Protocol error types.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding or decoding frames.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame is not valid JSON or does not match the expected shape.
    #[error("invalid JSON frame: {0}")]
    Json(#[from] serde_json::Error),

    /// A frame announced a type but carried no `content`.
    #[error("frame of type {kind:?} has no content")]
    MissingContent {
        /// The `type` field of the offending frame.
        kind: String,
    },

    /// A session path contained no usable identifier.
    #[error("no session id in path {path:?}")]
    InvalidSessionPath {
        /// The path that was inspected.
        path: String,
    },
}
