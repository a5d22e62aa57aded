//! Command-line and environment configuration.
//!
//! [`Args`] is what clap parses; [`Args::validate`] turns it into a
//! [`ChatConfig`] with checked URLs and a parsed session id.

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use oilandrope_app::RuntimeConfig;
use oilandrope_client::ReconnectPolicy;
use oilandrope_proto::{CurrentUser, ProtocolError, SessionId, UserId};
use thiserror::Error;

/// Path of the chat consumer on the WebSocket origin.
const SOCKET_PATH: &str = "ws/chat/connect/";

/// Accepted URL schemes and how to describe them.
type Schemes = (&'static [&'static str], &'static str);

const HTTP_SCHEMES: Schemes = (&["http://", "https://"], "http:// or https://");
const WS_SCHEMES: Schemes = (&["ws://", "wss://"], "ws:// or wss://");

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A URL flag has the wrong scheme or no host.
    #[error("invalid {flag} {url:?}: expected {expected}")]
    InvalidUrl {
        /// Flag name.
        flag: &'static str,
        /// Value given.
        url: String,
        /// Accepted schemes.
        expected: &'static str,
    },

    /// The session flag names no session.
    #[error("invalid session: {0}")]
    InvalidSession(#[from] ProtocolError),

    /// The auth token is empty.
    #[error("auth token must not be empty")]
    EmptyToken,
}

/// Oil & Rope terminal chat client
#[derive(Parser, Debug, Clone)]
#[command(name = "oilandrope-chat")]
#[command(about = "Terminal chat for Oil & Rope role-playing sessions")]
#[command(version)]
pub struct Args {
    /// API origin
    #[arg(long, env = "OILANDROPE_API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,

    /// WebSocket origin. Derived from the API origin when omitted.
    #[arg(long, env = "OILANDROPE_WS_URL")]
    pub ws_url: Option<String>,

    /// Session URL or path (`.../session/<id>/`), or a bare session id
    #[arg(long, env = "OILANDROPE_SESSION")]
    pub session: String,

    /// Current user id
    #[arg(long, env = "OILANDROPE_USER_ID")]
    pub user_id: UserId,

    /// Current user display name
    #[arg(long, env = "OILANDROPE_USERNAME", default_value = "")]
    pub username: String,

    /// API auth token
    #[arg(long, env = "OILANDROPE_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Disable automatic reconnection
    #[arg(long)]
    pub no_reconnect: bool,

    /// Consecutive reconnect attempts before giving up
    #[arg(long, default_value_t = 5)]
    pub max_reconnect_attempts: u32,

    /// WebSocket connect timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub connect_timeout_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Log file
    #[arg(long, default_value = "oilandrope-chat.log")]
    pub log_file: PathBuf,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// API origin without a trailing slash.
    pub api_origin: String,
    /// Full WebSocket URL of the chat consumer.
    pub socket_url: String,
    /// Session to show.
    pub session: SessionId,
    /// The current user.
    pub user: CurrentUser,
    /// Reconnect behavior.
    pub reconnect: ReconnectPolicy,
    /// WebSocket connect timeout.
    pub connect_timeout: Duration,
}

impl ChatConfig {
    /// Runtime settings derived from this configuration.
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            session: self.session.clone(),
            socket_url: self.socket_url.clone(),
            user: self.user.clone(),
            reconnect: self.reconnect.clone(),
        }
    }
}

impl Args {
    /// Check the arguments and build a [`ChatConfig`].
    pub fn validate(&self) -> Result<ChatConfig, ConfigError> {
        let api_origin = checked_origin("--api-url", &self.api_url, HTTP_SCHEMES)?;

        let ws_origin = match &self.ws_url {
            Some(url) => checked_origin("--ws-url", url, WS_SCHEMES)?,
            None => websocket_origin(&api_origin),
        };

        let session = SessionId::from_path(&self.session)?;

        if self.token.trim().is_empty() {
            return Err(ConfigError::EmptyToken);
        }

        let reconnect = if self.no_reconnect {
            ReconnectPolicy::disabled()
        } else {
            let max_attempts = self.max_reconnect_attempts;
            ReconnectPolicy { max_attempts, ..ReconnectPolicy::default() }
        };

        Ok(ChatConfig {
            api_origin,
            socket_url: format!("{ws_origin}/{SOCKET_PATH}"),
            session,
            user: CurrentUser::new(self.user_id, self.username.clone(), self.token.trim()),
            reconnect,
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
        })
    }
}

/// Check the scheme and host of `url` and strip trailing slashes.
fn checked_origin(
    flag: &'static str,
    url: &str,
    (schemes, expected): Schemes,
) -> Result<String, ConfigError> {
    let trimmed = url.trim().trim_end_matches('/');
    let has_host = schemes
        .iter()
        .find_map(|scheme| trimmed.strip_prefix(scheme))
        .is_some_and(|rest| !rest.is_empty() && !rest.starts_with('/'));

    if has_host {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidUrl { flag, url: url.to_string(), expected })
    }
}

/// WebSocket origin serving the same host as an HTTP origin.
fn websocket_origin(http_origin: &str) -> String {
    if let Some(rest) = http_origin.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = http_origin.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        http_origin.to_string()
    }
}
