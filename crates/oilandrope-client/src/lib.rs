//! Client
//!
//! Action-based client state machine for the Oil & Rope session chat. Joins
//! the chat's channel layer once the session is known and a socket is open,
//! classifies server frames and schedules reconnects.
//!
//! # Architecture
//!
//! The client is Sans-IO. It receives events ([`ClientEvent`]), processes them
//! through pure state machine logic, and returns actions ([`ClientAction`]) for
//! the caller to execute. Time comes from an [`Environment`], so tests drive
//! reconnect backoff with [`env::ManualEnv`] instead of real sleeps.
//!
//! # Components
//!
//! - [`Client`]: State machine for one session chat
//! - [`ReconnectPolicy`]: Whether and when a closed socket is reopened
//! - [`ClientEvent`]: Events fed into the client
//! - [`ClientAction`]: Actions produced by the client
//! - [`SocketEvent`]: Socket lifecycle as reported by a transport
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::connect`]: Open the chat WebSocket
//! - [`api::ApiClient`]: Fetch sessions over the REST API

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
pub mod env;
mod error;
mod event;
mod reconnect;

#[cfg(feature = "transport")]
pub mod api;
#[cfg(feature = "transport")]
pub mod transport;

pub use client::Client;
pub use env::{Environment, SystemEnv};
pub use error::ClientError;
pub use event::{CLOSE_INTERNAL_ERROR, ClientAction, ClientEvent, SocketEvent};
pub use reconnect::ReconnectPolicy;
