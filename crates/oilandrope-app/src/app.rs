//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the interactive
//! state of the chat completely decoupled from I/O and protocol mechanics.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Owns the composer and submits its text on Enter.
//! - Owns the message list and its scroll position.
//! - Tracks high-level connection state and transient notifications for UI
//!   feedback.

use oilandrope_proto::{ChatId, CurrentUser};

use crate::{
    AppAction, AppEvent, Composer, ConnectionState, KeyInput, MessageList, Notification,
};

/// Rows taken by the input box and status line.
const CHROME_ROWS: u16 = 4;

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies, fully testable.
#[derive(Debug, Clone)]
pub struct App {
    /// Connection state.
    state: ConnectionState,
    /// WebSocket URL of the chat consumer.
    socket_url: String,
    /// Session name, once loaded.
    session_name: Option<String>,
    /// Chat id, once loaded.
    chat: Option<ChatId>,
    messages: MessageList,
    composer: Composer,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
    /// Transient notification. `None` if nothing to show.
    notification: Option<Notification>,
    /// Sticky error message. `None` if no error.
    status_message: Option<String>,
    /// Why the socket is down. Cleared when it reopens.
    connection_notice: Option<String>,
}

impl App {
    /// Create a new App for `user`, chatting over `socket_url`.
    pub fn new(user: &CurrentUser, socket_url: String) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            socket_url,
            messages: MessageList::new(user.id),
            session_name: None,
            chat: None,
            composer: Composer::new(),
            terminal_size: (80, 24),
            notification: None,
            status_message: None,
            connection_notice: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => {
                let expired = self.notification.as_mut().is_some_and(Notification::tick);
                if expired {
                    self.notification = None;
                    vec![AppAction::Render]
                } else {
                    vec![]
                }
            },
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![AppAction::Render]
            },
            AppEvent::SessionLoaded { name, chat, messages } => {
                self.session_name = Some(name);
                self.chat = Some(chat);
                self.messages.seed(messages);
                vec![AppAction::Render]
            },
            AppEvent::Connected => {
                self.state = ConnectionState::Open;
                self.connection_notice = None;
                vec![AppAction::Render]
            },
            AppEvent::Joined { chat } => {
                self.state = ConnectionState::Joined { chat };
                vec![AppAction::Render]
            },
            AppEvent::MessageReceived(message) => {
                self.messages.push(message);
                vec![AppAction::Render]
            },
            AppEvent::MessageSent => {
                self.composer.clear();
                self.status_message = None;
                vec![AppAction::Render]
            },
            AppEvent::Disconnected { code, retry_in } => {
                self.state = ConnectionState::Disconnected;
                let code = code.map_or_else(String::new, |c| format!(" ({c})"));
                self.connection_notice = Some(match retry_in {
                    Some(delay) => {
                        format!("Connection lost{code}, retrying in {:.1}s", delay.as_secs_f64())
                    },
                    None => format!("Connection lost{code}"),
                });
                vec![AppAction::Render]
            },
            AppEvent::ReconnectDue { attempt } => {
                self.state = ConnectionState::Reconnecting { attempt };
                vec![AppAction::Connect { url: self.socket_url.clone() }, AppAction::Render]
            },
            AppEvent::Notification { message } => {
                self.notification = Some(Notification::new(message));
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.status_message = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match key {
            KeyInput::Esc => return self.quit(),
            KeyInput::Enter => return self.submit(),
            KeyInput::Char(c) => self.composer.insert(c),
            KeyInput::Backspace => self.composer.backspace(),
            KeyInput::Delete => self.composer.delete(),
            KeyInput::Left => self.composer.move_left(),
            KeyInput::Right => self.composer.move_right(),
            KeyInput::Home => self.composer.home(),
            KeyInput::End => self.composer.end(),
            KeyInput::Up => self.messages.scroll_up(1),
            KeyInput::Down => self.messages.scroll_down(1),
            KeyInput::PageUp => self.messages.scroll_up(self.page_size()),
            KeyInput::PageDown => self.messages.scroll_down(self.page_size()),
        }
        vec![AppAction::Render]
    }

    /// Submit the composer text.
    ///
    /// Blank input produces nothing. The composer is cleared only once the
    /// message is handed to the socket ([`AppEvent::MessageSent`]), so a
    /// refused send keeps the text for another try.
    pub fn submit(&mut self) -> Vec<AppAction> {
        if self.composer.is_blank() {
            return vec![];
        }
        vec![AppAction::SendMessage { text: self.composer.text().to_string() }]
    }

    /// Initiate the first connection to the chat socket.
    pub fn connect(&mut self) -> Vec<AppAction> {
        self.state = ConnectionState::Connecting;
        vec![AppAction::Connect { url: self.socket_url.clone() }, AppAction::Render]
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    fn page_size(&self) -> usize {
        usize::from(self.terminal_size.1.saturating_sub(CHROME_ROWS).max(1))
    }

    /// Current connection state.
    pub fn connection_state(&self) -> &ConnectionState {
        &self.state
    }

    /// Session name. `None` until the session is loaded.
    pub fn session_name(&self) -> Option<&str> {
        self.session_name.as_deref()
    }

    /// Chat id. `None` until the session is loaded.
    pub fn chat(&self) -> Option<ChatId> {
        self.chat
    }

    /// The message list.
    pub fn messages(&self) -> &MessageList {
        &self.messages
    }

    /// The composer.
    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    /// Visible notification text. `None` if nothing to show.
    pub fn notification(&self) -> Option<&str> {
        self.notification.as_ref().map(|n| n.message.as_str())
    }

    /// Status line message: the last error, else why the socket is down.
    /// `None` if nothing to report.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref().or(self.connection_notice.as_deref())
    }
}
