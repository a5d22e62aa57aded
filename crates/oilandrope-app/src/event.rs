//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from two distinct sources:
//! - User interactions (Keyboard, Resize) and system ticks.
//! - Chat notifications translated from the underlying client.

use std::time::Duration;

use oilandrope_proto::{ChatId, ChatMessage};

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// The session was fetched.
    SessionLoaded {
        /// Session name.
        name: String,
        /// The session's chat.
        chat: ChatId,
        /// Chat messages at load time, oldest first.
        messages: Vec<ChatMessage>,
    },

    /// The chat socket opened.
    Connected,

    /// The channel-layer handshake was sent.
    Joined {
        /// Chat joined.
        chat: ChatId,
    },

    /// A message arrived on the socket.
    MessageReceived(ChatMessage),

    /// The composer text was handed to the socket.
    MessageSent,

    /// The chat socket closed.
    Disconnected {
        /// WebSocket close code, if any.
        code: Option<u16>,
        /// Delay until the next attempt. `None` if the socket stays closed.
        retry_in: Option<Duration>,
    },

    /// A scheduled reconnect is due.
    ReconnectDue {
        /// 1-based consecutive attempt number.
        attempt: u32,
    },

    /// Transient message for the user.
    Notification {
        /// Notification text.
        message: String,
    },

    /// Error occurred.
    Error {
        /// Error description.
        message: String,
    },
}
