//! Client state machine.
//!
//! The `Client` tracks the two things the channel-layer handshake depends on
//! (the resolved chat and an open socket) and sends the handshake exactly once
//! per socket as soon as both are known, whichever arrives first. It also owns
//! the reconnect schedule for closed sockets.

use std::time::Duration;

use oilandrope_proto::{ChatId, ClientFrame, CurrentUser, ServerFrame, Session};

use crate::{
    env::Environment,
    error::ClientError,
    event::{CLOSE_INTERNAL_ERROR, ClientAction, ClientEvent},
    reconnect::ReconnectPolicy,
};

/// Notification raised when the server closes the socket with an internal
/// error and a reconnect is scheduled.
const INTERNAL_ERROR_NOTICE: &str = "An error occurred. Reconnecting to chat";

/// Lifecycle of the current socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SocketState {
    /// No socket is open.
    Closed,
    /// A socket is open. `joined` is set once the handshake went out on it.
    Open { joined: bool },
}

/// Reconnect waiting for its delay to elapse.
#[derive(Debug, Clone, Copy)]
struct PendingReconnect<I> {
    closed_at: I,
    delay: Duration,
    attempt: u32,
}

/// Chat client for a single session.
pub struct Client<E: Environment> {
    /// Environment for timing.
    env: E,

    /// Locally configured user.
    user: CurrentUser,

    /// Reconnect behavior for closed sockets.
    policy: ReconnectPolicy,

    /// Chat id, once the session is resolved.
    chat: Option<ChatId>,

    socket: SocketState,

    /// Consecutive reconnect attempts since the last successful open.
    attempts: u32,

    pending_reconnect: Option<PendingReconnect<E::Instant>>,
}

impl<E: Environment> Client<E> {
    /// Create a client for `user` with no session and no socket.
    pub fn new(env: E, user: CurrentUser, policy: ReconnectPolicy) -> Self {
        Self {
            env,
            user,
            policy,
            chat: None,
            socket: SocketState::Closed,
            attempts: 0,
            pending_reconnect: None,
        }
    }

    /// Chat id. `None` until the session is resolved.
    pub fn chat_id(&self) -> Option<ChatId> {
        self.chat
    }

    /// Whether a socket is currently open.
    pub fn is_open(&self) -> bool {
        matches!(self.socket, SocketState::Open { .. })
    }

    /// Whether the handshake went out on the current socket.
    pub fn is_joined(&self) -> bool {
        self.socket == SocketState::Open { joined: true }
    }

    /// Consecutive reconnect attempts since the last successful open.
    pub fn reconnect_attempts(&self) -> u32 {
        self.attempts
    }

    /// Whether a reconnect is waiting for its delay to elapse.
    pub fn reconnect_pending(&self) -> bool {
        self.pending_reconnect.is_some()
    }

    /// Process an event and return the actions to execute, in order.
    ///
    /// # Errors
    ///
    /// Only [`ClientEvent::SendMessage`] fails: with
    /// [`ClientError::ChatNotResolved`] before the session is known and with
    /// [`ClientError::NotConnected`] while no socket is open. All other events
    /// are infallible; malformed server frames are logged and dropped.
    pub fn handle(
        &mut self,
        event: ClientEvent<E::Instant>,
    ) -> Result<Vec<ClientAction>, ClientError> {
        match event {
            ClientEvent::SessionResolved(session) => Ok(self.handle_session_resolved(session)),
            ClientEvent::SocketOpened => Ok(self.handle_socket_opened()),
            ClientEvent::SocketClosed { code } => Ok(self.handle_socket_closed(code)),
            ClientEvent::SocketError { reason } => {
                tracing::warn!(%reason, "chat socket error");
                Ok(Vec::new())
            },
            ClientEvent::FrameReceived(text) => Ok(self.handle_frame(&text)),
            ClientEvent::SendMessage { text } => self.handle_send_message(text),
            ClientEvent::Tick { now } => Ok(self.handle_tick(now)),
        }
    }

    fn handle_session_resolved(&mut self, session: Session) -> Vec<ClientAction> {
        if let Some(chat) = self.chat {
            tracing::debug!(chat, session = %session.id, "session already resolved, ignoring");
            return Vec::new();
        }

        let chat = session.chat.id;
        self.chat = Some(chat);
        tracing::info!(
            chat,
            session = %session.id,
            messages = session.chat.chat_message_set.len(),
            "session resolved"
        );

        let mut actions =
            vec![ClientAction::SeedMessages { chat, messages: session.chat.chat_message_set }];
        actions.extend(self.try_join());
        actions
    }

    fn handle_socket_opened(&mut self) -> Vec<ClientAction> {
        self.socket = SocketState::Open { joined: false };
        self.attempts = 0;
        self.pending_reconnect = None;
        tracing::info!("chat socket open");

        self.try_join()
    }

    /// Send the handshake if the chat is known and the open socket has not
    /// been joined yet.
    fn try_join(&mut self) -> Vec<ClientAction> {
        let (SocketState::Open { joined: false }, Some(chat)) = (self.socket, self.chat) else {
            return Vec::new();
        };

        self.socket = SocketState::Open { joined: true };
        tracing::debug!(chat, "sending channel layer setup");

        vec![
            ClientAction::Send(ClientFrame::SetupChannelLayer {
                token: self.user.token.clone(),
                chat,
            }),
            ClientAction::Joined { chat },
        ]
    }

    fn handle_socket_closed(&mut self, code: Option<u16>) -> Vec<ClientAction> {
        if self.socket == SocketState::Closed && self.pending_reconnect.is_some() {
            tracing::debug!(?code, "socket already closed, reconnect pending");
            return Vec::new();
        }
        self.socket = SocketState::Closed;

        let attempt = self.attempts.saturating_add(1);
        let mut actions = Vec::new();

        let retry_in = if self.policy.allows(attempt) {
            let delay = self.policy.delay_for(attempt);
            self.attempts = attempt;
            self.pending_reconnect =
                Some(PendingReconnect { closed_at: self.env.now(), delay, attempt });

            if code == Some(CLOSE_INTERNAL_ERROR) {
                actions.push(ClientAction::Notify { message: INTERNAL_ERROR_NOTICE.to_string() });
            }
            tracing::info!(
                ?code,
                attempt,
                delay_ms = delay.as_millis(),
                "chat socket closed, reconnecting"
            );
            Some(delay)
        } else {
            tracing::warn!(?code, attempts = self.attempts, "chat socket closed, not reconnecting");
            None
        };

        actions.push(ClientAction::ConnectionLost { code, retry_in });
        actions
    }

    fn handle_frame(&mut self, text: &str) -> Vec<ClientAction> {
        match ServerFrame::decode(text) {
            Ok(ServerFrame::Message(message)) => vec![ClientAction::DeliverMessage(message)],
            Ok(ServerFrame::Error { content }) => {
                tracing::warn!(%content, "server reported an error");
                vec![ClientAction::Notify { message: content }]
            },
            Ok(ServerFrame::Other { kind }) => {
                tracing::debug!(?kind, "ignoring frame");
                Vec::new()
            },
            Err(error) => {
                tracing::warn!(%error, "dropping malformed frame");
                Vec::new()
            },
        }
    }

    fn handle_send_message(&mut self, text: String) -> Result<Vec<ClientAction>, ClientError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let chat = self.chat.ok_or(ClientError::ChatNotResolved)?;
        if !self.is_open() {
            return Err(ClientError::NotConnected);
        }

        Ok(vec![ClientAction::Send(ClientFrame::SendMessage { message: text, chat })])
    }

    fn handle_tick(&mut self, now: E::Instant) -> Vec<ClientAction> {
        let Some(pending) = self.pending_reconnect else {
            return Vec::new();
        };

        if now < pending.closed_at || now - pending.closed_at < pending.delay {
            return Vec::new();
        }

        self.pending_reconnect = None;
        vec![ClientAction::Reconnect { attempt: pending.attempt }]
    }
}
