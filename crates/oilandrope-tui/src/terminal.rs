//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. The chat socket uses
//! tokio-tungstenite and connects in the background, so keys stay live while
//! a handshake is pending. The session fetch goes through the REST API client.

use std::{
    io::{self, Stdout, stdout},
    time::{Duration, Instant},
};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use oilandrope_app::{App, AppAction, AppEvent, Driver, KeyInput};
use oilandrope_client::{
    Environment, SocketEvent, SystemEnv,
    api::{ApiClient, ApiError},
    transport::{self, ConnectedSocket, TransportConfig, TransportError},
};
use oilandrope_proto::{ClientFrame, Session, SessionId};
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;

use crate::ui;

/// How long to wait for input before emitting a tick.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// REST API error.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// No socket to send on.
    #[error("not connected")]
    NotConnected,
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Handles terminal I/O (crossterm), rendering (ratatui), the chat socket
/// (tokio-tungstenite) and the REST API (reqwest).
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    socket: Option<ConnectedSocket>,
    api: ApiClient,
    transport: TransportConfig,
    env: SystemEnv,
}

impl TerminalDriver {
    /// Take over the terminal and create a driver.
    pub fn new(api: ApiClient, transport: TransportConfig) -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;
        let event_stream = EventStream::new();

        Ok(Self { terminal, event_stream, socket: None, api, transport, env: SystemEnv::new() })
    }

    /// Convert a crossterm key event to `KeyInput`.
    fn convert_key(key: KeyEvent) -> Option<KeyInput> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(KeyInput::Esc);
        }

        match key.code {
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Delete => Some(KeyInput::Delete),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Left => Some(KeyInput::Left),
            KeyCode::Right => Some(KeyInput::Right),
            KeyCode::Up => Some(KeyInput::Up),
            KeyCode::Down => Some(KeyInput::Down),
            KeyCode::PageUp => Some(KeyInput::PageUp),
            KeyCode::PageDown => Some(KeyInput::PageDown),
            KeyCode::Home => Some(KeyInput::Home),
            KeyCode::End => Some(KeyInput::End),
            _ => None,
        }
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;
    type Instant = Instant;

    async fn poll_event(&mut self, app: &mut App) -> Result<Vec<AppAction>, Self::Error> {
        tokio::select! {
            biased;

            // Terminal events
            maybe_event = self.event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) if key_event.kind == KeyEventKind::Press => {
                        match Self::convert_key(key_event) {
                            Some(key_input) => Ok(app.handle(AppEvent::Key(key_input))),
                            None => Ok(vec![]),
                        }
                    },
                    Some(Ok(Event::Resize(cols, rows))) => {
                        Ok(app.handle(AppEvent::Resize(cols, rows)))
                    },
                    Some(Err(e)) => Err(TerminalError::Io(e)),
                    _ => Ok(vec![]),
                }
            }

            // Tick timeout
            () = self.env.sleep(TICK_INTERVAL) => {
                Ok(app.handle(AppEvent::Tick))
            }
        }
    }

    async fn send_frame(&mut self, frame: ClientFrame) -> Result<(), Self::Error> {
        let socket = self.socket.as_ref().ok_or(TerminalError::NotConnected)?;
        socket.send(&frame).await?;
        Ok(())
    }

    async fn recv_socket_event(&mut self) -> Option<SocketEvent> {
        self.socket.as_mut().and_then(|socket| socket.from_server.try_recv().ok())
    }

    async fn connect(&mut self, url: &str) -> Result<(), Self::Error> {
        // Replacing the old handle aborts its task. The handshake runs in the
        // background and its outcome arrives as socket events.
        self.socket = Some(transport::spawn_connect(url, self.transport.clone()));
        Ok(())
    }

    async fn fetch_session(&mut self, session: &SessionId) -> Result<Session, Self::Error> {
        Ok(self.api.fetch_session(session).await?)
    }

    async fn check_health(&mut self) -> Result<String, Self::Error> {
        Ok(self.api.check_health().await?)
    }

    fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    fn now(&self) -> Self::Instant {
        self.env.now()
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| {
            ui::render(frame, app);
        })?;
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(ref socket) = self.socket {
            socket.stop();
        }
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_c_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(TerminalDriver::convert_key(key), Some(KeyInput::Esc));
    }

    #[test]
    fn page_keys_map_to_scrolling() {
        let key = KeyEvent::new(KeyCode::PageUp, KeyModifiers::NONE);
        assert_eq!(TerminalDriver::convert_key(key), Some(KeyInput::PageUp));

        let key = KeyEvent::new(KeyCode::F(5), KeyModifiers::NONE);
        assert_eq!(TerminalDriver::convert_key(key), None);
    }
}
