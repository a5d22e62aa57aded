//! Observable application state types.
//!
//! These structures serve as the "View Model" for the application: the subset
//! of client state needed to render the status line.

use oilandrope_proto::ChatId;

/// Ticks a notification stays visible.
pub const NOTIFICATION_TICKS: u32 = 50;

/// Connection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// No socket is open.
    Disconnected,
    /// First connection in progress.
    Connecting,
    /// Socket open, handshake not sent yet.
    Open,
    /// Handshake sent, chat traffic flows.
    Joined {
        /// Chat joined.
        chat: ChatId,
    },
    /// Reconnect in progress.
    Reconnecting {
        /// 1-based consecutive attempt number.
        attempt: u32,
    },
}

impl ConnectionState {
    /// Short label for the status line.
    pub fn label(&self) -> String {
        match self {
            Self::Disconnected => "disconnected".to_string(),
            Self::Connecting => "connecting".to_string(),
            Self::Open => "connected".to_string(),
            Self::Joined { chat } => format!("joined chat {chat}"),
            Self::Reconnecting { attempt } => format!("reconnecting (attempt {attempt})"),
        }
    }
}

/// A transient notification.
///
/// Shown until its tick budget runs out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Notification text.
    pub message: String,
    remaining_ticks: u32,
}

impl Notification {
    /// Create a notification visible for [`NOTIFICATION_TICKS`] ticks.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), remaining_ticks: NOTIFICATION_TICKS }
    }

    /// Count down one tick. Returns `true` once the notification expired.
    pub fn tick(&mut self) -> bool {
        self.remaining_ticks = self.remaining_ticks.saturating_sub(1);
        self.remaining_ticks == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_expires_after_budget() {
        let mut notification = Notification::new("hi");

        for _ in 1..NOTIFICATION_TICKS {
            assert!(!notification.tick());
        }
        assert!(notification.tick());
    }
}
