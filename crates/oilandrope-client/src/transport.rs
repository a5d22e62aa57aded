//! WebSocket transport for the client.
//!
//! Provides [`ConnectedSocket`] which pumps one chat WebSocket. This is a thin
//! layer that only moves text frames and lifecycle events; protocol logic
//! remains in the Sans-IO [`Client`](crate::Client).

use std::{future::Future, time::Duration};

use futures_util::{SinkExt, StreamExt};
use oilandrope_proto::{ClientFrame, ProtocolError};
use thiserror::Error;
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use crate::event::SocketEvent;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Connection did not complete in time.
    #[error("connection timed out after {0:?}")]
    Timeout(Duration),

    /// The socket task is gone.
    #[error("stream error: {0}")]
    Stream(String),

    /// Frame could not be encoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Transport tuning.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Upper bound on the opening handshake.
    pub connect_timeout: Duration,
    /// Capacity of the inbound and outbound channels.
    pub channel_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self { connect_timeout: Duration::from_secs(5), channel_capacity: 64 }
    }
}

/// Handle to one open chat socket.
///
/// Events arrive on `from_server`, starting with [`SocketEvent::Opened`] and
/// ending with [`SocketEvent::Closed`]. Dropping the handle aborts the socket
/// task, so replacing the handle on reconnect detaches the old socket.
pub struct ConnectedSocket {
    /// Send text frames to the server.
    pub to_server: mpsc::Sender<String>,
    /// Receive socket events.
    pub from_server: mpsc::Receiver<SocketEvent>,
    /// Abort handle to stop the socket task.
    abort_handle: tokio::task::AbortHandle,
}

impl ConnectedSocket {
    /// Create the channels and run `task` on their socket-side ends.
    fn spawn<F, Fut>(capacity: usize, task: F) -> Self
    where
        F: FnOnce(mpsc::Receiver<String>, mpsc::Sender<SocketEvent>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let capacity = capacity.max(1);
        let (to_server_tx, to_server_rx) = mpsc::channel::<String>(capacity);
        let (from_server_tx, from_server_rx) = mpsc::channel::<SocketEvent>(capacity);

        let handle = tokio::spawn(task(to_server_rx, from_server_tx));

        Self {
            to_server: to_server_tx,
            from_server: from_server_rx,
            abort_handle: handle.abort_handle(),
        }
    }

    /// Encode and queue a frame for sending.
    ///
    /// # Errors
    ///
    /// [`TransportError::Protocol`] if the frame cannot be encoded and
    /// [`TransportError::Stream`] if the socket task has already stopped.
    pub async fn send(&self, frame: &ClientFrame) -> Result<(), TransportError> {
        let text = frame.encode()?;
        self.to_server
            .send(text)
            .await
            .map_err(|_| TransportError::Stream("socket task stopped".to_string()))
    }

    /// Stop the socket.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

impl Drop for ConnectedSocket {
    fn drop(&mut self) {
        self.abort_handle.abort();
    }
}

/// Open a chat WebSocket with default settings.
///
/// # Errors
///
/// See [`connect_with_config`].
pub async fn connect(url: &str) -> Result<ConnectedSocket, TransportError> {
    connect_with_config(url, TransportConfig::default()).await
}

/// Open a chat WebSocket.
///
/// # Errors
///
/// [`TransportError::Timeout`] if the opening handshake exceeds
/// `connect_timeout`, [`TransportError::Connection`] if it fails.
pub async fn connect_with_config(
    url: &str,
    config: TransportConfig,
) -> Result<ConnectedSocket, TransportError> {
    let socket = open(url, config.connect_timeout).await?;

    Ok(ConnectedSocket::spawn(config.channel_capacity, |to_server, from_server| {
        run_socket(socket, to_server, from_server)
    }))
}

/// Open a chat WebSocket in the background.
///
/// Returns at once. The opening handshake runs on the socket task; success
/// is reported as [`SocketEvent::Opened`], failure as [`SocketEvent::Error`]
/// followed by `Closed` without a code. Frames queued before the socket opens
/// are sent once it does.
pub fn spawn_connect(url: &str, config: TransportConfig) -> ConnectedSocket {
    let url = url.to_string();

    ConnectedSocket::spawn(config.channel_capacity, move |to_server, from_server| async move {
        match open(&url, config.connect_timeout).await {
            Ok(socket) => run_socket(socket, to_server, from_server).await,
            Err(e) => {
                tracing::debug!(url, error = %e, "websocket connect failed");
                let reason = e.to_string();
                if from_server.send(SocketEvent::Error { reason }).await.is_ok() {
                    let _ = from_server.send(SocketEvent::Closed { code: None }).await;
                }
            },
        }
    })
}

/// Run the opening handshake, bounded by `connect_timeout`.
async fn open(url: &str, connect_timeout: Duration) -> Result<Socket, TransportError> {
    let (socket, _response) = tokio::time::timeout(connect_timeout, connect_async(url))
        .await
        .map_err(|_| TransportError::Timeout(connect_timeout))?
        .map_err(|e| TransportError::Connection(e.to_string()))?;

    tracing::debug!(url, "websocket connected");
    Ok(socket)
}

/// Pump the socket, bridging between channels and the WebSocket.
async fn run_socket(
    socket: Socket,
    mut to_server: mpsc::Receiver<String>,
    from_server: mpsc::Sender<SocketEvent>,
) {
    let (mut write, mut read) = socket.split();

    if from_server.send(SocketEvent::Opened).await.is_err() {
        return;
    }

    let closed = loop {
        tokio::select! {
            outgoing = to_server.recv() => {
                let Some(text) = outgoing else {
                    let _ = write.send(Message::Close(None)).await;
                    return;
                };
                if let Err(e) = write.send(Message::Text(text)).await {
                    let _ = from_server.send(SocketEvent::Error { reason: e.to_string() }).await;
                    break SocketEvent::Closed { code: None };
                }
            },
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if from_server.send(SocketEvent::Text(text)).await.is_err() {
                        return;
                    }
                },
                Some(Ok(Message::Close(frame))) => {
                    let code = frame.map(|f| u16::from(f.code));
                    tracing::debug!(?code, "websocket close frame");
                    break SocketEvent::Closed { code };
                },
                Some(Ok(other)) => {
                    tracing::trace!(?other, "ignoring non-text websocket message");
                },
                Some(Err(e)) => {
                    let _ = from_server.send(SocketEvent::Error { reason: e.to_string() }).await;
                    break SocketEvent::Closed { code: None };
                },
                None => break SocketEvent::Closed { code: None },
            },
        }
    };

    let _ = from_server.send(closed).await;
}
