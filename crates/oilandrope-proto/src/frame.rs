//! JSON frames exchanged over the chat socket.
//!
//! Client frames are tagged by a `type` field naming the consumer handler on
//! the backend. Server frames are less regular: chat messages arrive as
//! `{"type": "send_message", "content": {...}}`, failures as
//! `{"status": "error", "content": "..."}`, and the consumer answers frames it
//! cannot dispatch with `{"error": "..."}`. [`ServerFrame::decode`] folds all
//! of these into one enum.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    errors::{ProtocolError, Result},
    model::{ChatId, ChatMessage},
};

const SEND_MESSAGE: &str = "send_message";
const STATUS_ERROR: &str = "error";

/// Frames sent from the client to the chat consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Join the chat's channel layer group. Must precede chat traffic.
    SetupChannelLayer {
        /// Auth token of the current user.
        token: String,
        /// Chat to join.
        chat: ChatId,
    },

    /// Post a message to the chat.
    SendMessage {
        /// Body text.
        message: String,
        /// Target chat.
        chat: ChatId,
    },
}

impl ClientFrame {
    /// Serialize to the JSON text sent on the socket.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Frames received from the chat consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerFrame {
    /// A message was posted to the chat.
    Message(ChatMessage),

    /// The server reported a failure.
    Error {
        /// Human-readable description.
        content: String,
    },

    /// A well-formed frame this client has no use for.
    Other {
        /// The frame's `type`, if it had one.
        kind: Option<String>,
    },
}

#[derive(Deserialize)]
struct RawServerFrame {
    #[serde(rename = "type")]
    kind: Option<String>,
    status: Option<String>,
    content: Option<Value>,
    error: Option<Value>,
}

impl ServerFrame {
    /// Parse and classify a text frame.
    ///
    /// An error status takes precedence over the frame type, so an error that
    /// happens to carry `"type": "send_message"` never reaches the message
    /// list.
    pub fn decode(text: &str) -> Result<Self> {
        let raw: RawServerFrame = serde_json::from_str(text)?;

        if raw.status.as_deref() == Some(STATUS_ERROR) {
            let content = raw.content.or(raw.error).map_or_else(String::new, value_text);
            return Ok(Self::Error { content });
        }

        if let Some(error) = raw.error {
            return Ok(Self::Error { content: value_text(error) });
        }

        match raw.kind.as_deref() {
            Some(SEND_MESSAGE) => {
                let content = raw
                    .content
                    .ok_or_else(|| ProtocolError::MissingContent { kind: SEND_MESSAGE.into() })?;
                Ok(Self::Message(serde_json::from_value(content)?))
            },
            _ => Ok(Self::Other { kind: raw.kind }),
        }
    }
}

fn value_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
