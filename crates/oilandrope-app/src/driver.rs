//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::{future::Future, ops::Sub, time::Duration};

use oilandrope_client::SocketEvent;
use oilandrope_proto::{ClientFrame, Session, SessionId};

use crate::{App, AppAction};

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in the terminal and under test.
///
/// # Implementations
///
/// - **TUI**: crossterm for terminal events, tokio-tungstenite for the chat
///   socket, reqwest for the REST API
/// - **Tests**: scripted input and an in-memory socket on a manual clock
///
/// # Associated Types
///
/// - [`Error`](Driver::Error): Platform-specific error type
/// - [`Instant`](Driver::Instant): Time representation (real or manual)
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables a manual clock under test.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// Poll for the next input event and feed it to `app`.
    ///
    /// Returns the actions `app` produced, or an empty list if no input
    /// arrived within one tick.
    fn poll_event(
        &mut self,
        app: &mut App,
    ) -> impl Future<Output = Result<Vec<AppAction>, Self::Error>> + Send;

    /// Send a frame on the current socket.
    ///
    /// # Errors
    ///
    /// Returns an error if no socket is open or the send fails.
    fn send_frame(
        &mut self,
        frame: ClientFrame,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Next event of the current socket, if one is ready.
    ///
    /// Returns `None` without waiting when nothing is pending.
    fn recv_socket_event(&mut self) -> impl Future<Output = Option<SocketEvent>> + Send;

    /// Open a socket to `url`, replacing the current one.
    ///
    /// The new socket reports [`SocketEvent::Opened`] through
    /// [`recv_socket_event`](Driver::recv_socket_event). Drivers may return
    /// before the handshake finishes and report a failed one as
    /// [`SocketEvent::Error`] then [`SocketEvent::Closed`].
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be started.
    fn connect(&mut self, url: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Fetch a session with its chat snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn fetch_session(
        &mut self,
        session: &SessionId,
    ) -> impl Future<Output = Result<Session, Self::Error>> + Send;

    /// Check that the backend API is reachable and supported.
    ///
    /// Returns the backend's reported API version.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unsupported.
    fn check_health(&mut self) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Check if a socket is held.
    fn is_connected(&self) -> bool;

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Stop the socket and clean up resources.
    fn stop(&mut self);
}
