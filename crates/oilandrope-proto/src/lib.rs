//! Oil & Rope chat protocol
//!
//! Data model and wire frames shared by the chat client and the application
//! layer. The backend speaks JSON over a WebSocket (Django Channels) and over
//! REST, so every type here is a plain serde structure.
//!
//! # Components
//!
//! - [`Session`], [`Chat`], [`ChatMessage`], [`Author`]: REST and socket data
//! - [`CurrentUser`]: the locally configured identity
//! - [`ClientFrame`]: frames the client sends
//! - [`ServerFrame`]: frames the server sends, already classified

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod errors;
mod frame;
mod model;

pub use errors::{ProtocolError, Result};
pub use frame::{ClientFrame, ServerFrame};
pub use model::{
    Author, Chat, ChatId, ChatMessage, CurrentUser, Session, SessionId, TIMESTAMP_FORMAT, UserId,
};
