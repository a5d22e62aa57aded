//! Protocol-to-Application translation layer.
//!
//! The [`Bridge`] wraps the low-level [`oilandrope_client::Client`] and adapts
//! it to the high-level application lifecycle.
//!
//! # Responsibilities
//!
//! - Converts high-level [`crate::AppAction`] into client events.
//! - Accumulates outgoing [`oilandrope_proto::ClientFrame`] to be sent by the
//!   driver in the next I/O cycle.
//! - Interprets results from the client and converts them back into
//!   [`crate::AppEvent`]s to update the UI.
//! - Manages time ticks generically to support both real time and a manual
//!   clock.

use oilandrope_client::{
    Client, ClientAction, ClientError, ClientEvent, Environment, ReconnectPolicy, SocketEvent,
};
use oilandrope_proto::{ClientFrame, CurrentUser, Session};

use crate::{AppAction, AppEvent};

/// Bridge between App and Client protocol logic.
///
/// Generic over Environment to support both production and tests.
/// The Instant type is determined by the Environment's associated type.
pub struct Bridge<E: Environment> {
    client: Client<E>,
    outgoing: Vec<ClientFrame>,
    /// Session name, kept for the `SessionLoaded` event.
    session_name: String,
}

impl<E: Environment> Bridge<E> {
    /// Create a new Bridge for `user`.
    pub fn new(env: E, user: CurrentUser, policy: ReconnectPolicy) -> Self {
        let client = Client::new(env, user, policy);
        Self { client, outgoing: Vec::new(), session_name: String::new() }
    }

    /// Process an App action and return resulting App events.
    pub fn process_app_action(&mut self, action: AppAction) -> Vec<AppEvent> {
        match action {
            AppAction::SendMessage { text } => {
                let result = self.client.handle(ClientEvent::SendMessage { text });
                let mut events = self.handle_client_result(result);

                if !events.iter().any(|e| matches!(e, AppEvent::Error { .. })) {
                    events.push(AppEvent::MessageSent);
                }
                events
            },
            AppAction::Render | AppAction::Quit | AppAction::Connect { .. } => vec![],
        }
    }

    /// Handle the fetched session.
    pub fn handle_session(&mut self, session: Session) -> Vec<AppEvent> {
        self.session_name.clone_from(&session.name);
        let result = self.client.handle(ClientEvent::SessionResolved(session));
        self.handle_client_result(result)
    }

    /// Handle a socket lifecycle event or text frame.
    pub fn handle_socket_event(&mut self, event: SocketEvent) -> Vec<AppEvent> {
        let opened = event == SocketEvent::Opened;
        let result = self.client.handle(event.into());
        let events = self.handle_client_result(result);

        if opened { std::iter::once(AppEvent::Connected).chain(events).collect() } else { events }
    }

    /// Process a time tick.
    pub fn handle_tick(&mut self, now: E::Instant) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::Tick { now });
        self.handle_client_result(result)
    }

    /// Take pending outgoing frames.
    pub fn take_outgoing(&mut self) -> Vec<ClientFrame> {
        std::mem::take(&mut self.outgoing)
    }

    fn handle_client_result(
        &mut self,
        result: Result<Vec<ClientAction>, ClientError>,
    ) -> Vec<AppEvent> {
        match result {
            Ok(actions) => self.process_client_actions(actions),
            Err(e) => vec![AppEvent::Error { message: e.to_string() }],
        }
    }

    fn process_client_actions(&mut self, actions: Vec<ClientAction>) -> Vec<AppEvent> {
        let mut events = Vec::new();

        for action in actions {
            match action {
                ClientAction::Send(frame) => {
                    self.outgoing.push(frame);
                },
                ClientAction::SeedMessages { chat, messages } => {
                    events.push(AppEvent::SessionLoaded {
                        name: self.session_name.clone(),
                        chat,
                        messages,
                    });
                },
                ClientAction::DeliverMessage(message) => {
                    events.push(AppEvent::MessageReceived(message));
                },
                ClientAction::Joined { chat } => {
                    events.push(AppEvent::Joined { chat });
                },
                ClientAction::Notify { message } => {
                    events.push(AppEvent::Notification { message });
                },
                ClientAction::ConnectionLost { code, retry_in } => {
                    events.push(AppEvent::Disconnected { code, retry_in });
                },
                ClientAction::Reconnect { attempt } => {
                    events.push(AppEvent::ReconnectDue { attempt });
                },
            }
        }

        events
    }
}
