//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`Bridge`]: Protocol bridge to Client
//! - [`Driver`]: Platform-specific I/O
//!
//! It is also the connection manager: it opens the first socket, reopens it
//! when the client schedules a reconnect, and fetches the session once.

use oilandrope_client::{Environment, ReconnectPolicy, SocketEvent};
use oilandrope_proto::{CurrentUser, SessionId};

use crate::{App, AppAction, AppEvent, Bridge, Driver};

/// What the runtime connects to and as whom.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Session whose chat is shown.
    pub session: SessionId,
    /// WebSocket URL of the chat consumer.
    pub socket_url: String,
    /// The locally configured user.
    pub user: CurrentUser,
    /// Reconnect behavior for closed sockets.
    pub reconnect: ReconnectPolicy,
}

/// Generic runtime that orchestrates App, Bridge, and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `E`: Environment for timing
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    app: App,
    bridge: Bridge<E>,
    session: SessionId,
}

impl<D, E> Runtime<D, E>
where
    D: Driver<Instant = E::Instant>,
    E: Environment,
{
    /// Create a new runtime with the given driver and environment.
    pub fn new(driver: D, env: E, config: RuntimeConfig) -> Self {
        let app = App::new(&config.user, config.socket_url);
        let bridge = Bridge::new(env, config.user, config.reconnect);
        Self { driver, app, bridge, session: config.session }
    }

    /// Run the main event loop.
    ///
    /// Opens the socket and fetches the session, then loops:
    /// 1. Polls for input events from the driver
    /// 2. Drains ready socket events
    /// 3. Ticks the client so due reconnects happen
    ///
    /// Network failures are reported in the UI and never end the loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to poll input or render.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;
        self.check_health().await;

        let actions = self.app.connect();
        if self.process_actions(actions).await? {
            self.driver.stop();
            return Ok(());
        }

        if !self.load_session().await? {
            loop {
                let should_quit = self.process_cycle().await?;
                if should_quit {
                    break;
                }
            }
        }

        self.driver.stop();
        Ok(())
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    async fn process_cycle(&mut self) -> Result<bool, D::Error> {
        let actions = self.driver.poll_event(&mut self.app).await?;
        if !actions.is_empty() && self.process_actions(actions).await? {
            return Ok(true);
        }

        while self.driver.is_connected()
            && let Some(event) = self.driver.recv_socket_event().await
        {
            let events = self.bridge.handle_socket_event(event);
            self.send_outgoing_frames().await;
            if self.process_bridge_events(events).await? {
                return Ok(true);
            }
        }

        let now = self.driver.now();
        let events = self.bridge.handle_tick(now);
        if self.process_bridge_events(events).await? {
            return Ok(true);
        }

        Ok(false)
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.driver.render(&self.app)?,
                    AppAction::Quit => return Ok(true),
                    AppAction::Connect { url } => {
                        let events = self.open_socket(&url).await;
                        for event in events {
                            pending_actions.extend(self.app.handle(event));
                        }
                    },
                    AppAction::SendMessage { .. } => {
                        let events = self.bridge.process_app_action(action);
                        self.send_outgoing_frames().await;
                        for event in events {
                            pending_actions.extend(self.app.handle(event));
                        }
                    },
                }
            }
        }
        Ok(false)
    }

    /// Open a socket. A failed attempt counts as a close so the client can
    /// schedule the next one.
    async fn open_socket(&mut self, url: &str) -> Vec<AppEvent> {
        match self.driver.connect(url).await {
            Ok(()) => {
                tracing::debug!(url, "socket connecting");
                Vec::new()
            },
            Err(e) => {
                tracing::warn!(url, error = %e, "failed to open chat socket");
                let reason = e.to_string();
                let mut events = self.bridge.handle_socket_event(SocketEvent::Error { reason });
                events.extend(self.bridge.handle_socket_event(SocketEvent::Closed { code: None }));
                events
            },
        }
    }

    /// Fetch the session once. Failure leaves the chat unjoined.
    ///
    /// Returns `true` if should quit.
    async fn load_session(&mut self) -> Result<bool, D::Error> {
        match self.driver.fetch_session(&self.session).await {
            Ok(session) => {
                let events = self.bridge.handle_session(session);
                self.send_outgoing_frames().await;
                self.process_bridge_events(events).await
            },
            Err(e) => {
                tracing::warn!(session = %self.session, error = %e, "failed to load session");
                let message = format!("failed to load chat: {e}");
                let actions = self.app.handle(AppEvent::Error { message });
                self.process_actions(actions).await
            },
        }
    }

    /// Log the backend's health. Never fatal.
    async fn check_health(&mut self) {
        match self.driver.check_health().await {
            Ok(version) => tracing::info!(%version, "backend reachable"),
            Err(e) => tracing::warn!(error = %e, "backend health check failed"),
        }
    }

    /// Process events from Bridge back to App.
    async fn process_bridge_events(&mut self, events: Vec<AppEvent>) -> Result<bool, D::Error> {
        for event in events {
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Send all pending outgoing frames to the server.
    ///
    /// A failed send is logged; the socket's close event follows and drives
    /// reconnection.
    async fn send_outgoing_frames(&mut self) {
        let frames = self.bridge.take_outgoing();
        for frame in frames {
            if let Err(e) = self.driver.send_frame(frame).await {
                tracing::warn!(error = %e, "failed to send frame");
            }
        }
    }
}
