//! Client error types.

use thiserror::Error;

/// Errors returned by [`crate::Client::handle`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// No socket is open.
    #[error("not connected to the chat server")]
    NotConnected,

    /// The session (and with it the chat id) has not been resolved yet.
    #[error("chat not loaded yet")]
    ChatNotResolved,
}
