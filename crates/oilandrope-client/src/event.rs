//! Client events and actions.

use std::time::Duration;

use oilandrope_proto::{ChatId, ChatMessage, ClientFrame, Session};

/// Close code the backend uses for an internal server error.
pub const CLOSE_INTERNAL_ERROR: u16 = 1011;

/// Events the caller feeds into the client.
///
/// The caller is responsible for:
/// - Fetching the session and reporting it once
/// - Reporting socket lifecycle and incoming text frames
/// - Driving time forward via ticks
/// - Forwarding the user's intent to send a message
///
/// Generic over `I` (Instant type) to support both production
/// (`std::time::Instant`) and manual-clock environments.
#[derive(Debug, Clone)]
pub enum ClientEvent<I = std::time::Instant> {
    /// Session details were fetched.
    SessionResolved(Session),

    /// A new socket finished its opening handshake.
    SocketOpened,

    /// The current socket closed.
    SocketClosed {
        /// WebSocket close code, if the peer sent one.
        code: Option<u16>,
    },

    /// The current socket reported an error.
    SocketError {
        /// Error description.
        reason: String,
    },

    /// Text frame received from the server.
    FrameReceived(String),

    /// The user submitted composer text.
    SendMessage {
        /// Raw composer text.
        text: String,
    },

    /// Time tick for reconnect scheduling.
    Tick {
        /// Current time from the environment.
        now: I,
    },
}

/// Socket lifecycle as reported by a transport.
///
/// One value per socket event, in the order they happened. Transports emit
/// exactly one `Opened` first and at most one `Closed` last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// Socket is open.
    Opened,
    /// Text frame received.
    Text(String),
    /// Socket closed.
    Closed {
        /// WebSocket close code, if the peer sent one.
        code: Option<u16>,
    },
    /// Socket error (always followed by `Closed`).
    Error {
        /// Error description.
        reason: String,
    },
}

impl<I> From<SocketEvent> for ClientEvent<I> {
    fn from(event: SocketEvent) -> Self {
        match event {
            SocketEvent::Opened => Self::SocketOpened,
            SocketEvent::Text(text) => Self::FrameReceived(text),
            SocketEvent::Closed { code } => Self::SocketClosed { code },
            SocketEvent::Error { reason } => Self::SocketError { reason },
        }
    }
}

/// Actions the client produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Send a frame on the current socket.
    Send(ClientFrame),

    /// Replace the message list with the chat's load-time snapshot.
    SeedMessages {
        /// Chat the snapshot belongs to.
        chat: ChatId,
        /// Messages, oldest first.
        messages: Vec<ChatMessage>,
    },

    /// Append a message received from the server.
    DeliverMessage(ChatMessage),

    /// The channel-layer handshake was sent on the current socket.
    Joined {
        /// Chat joined.
        chat: ChatId,
    },

    /// Show a transient notification to the user.
    Notify {
        /// Notification text.
        message: String,
    },

    /// The socket closed.
    ConnectionLost {
        /// WebSocket close code, if any.
        code: Option<u16>,
        /// Delay until the next reconnect attempt. `None` if none is scheduled.
        retry_in: Option<Duration>,
    },

    /// Open a new socket now, replacing the closed one.
    Reconnect {
        /// 1-based consecutive attempt number.
        attempt: u32,
    },
}
