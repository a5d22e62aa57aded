//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Open (or reopen) the chat socket.
    Connect {
        /// WebSocket URL.
        url: String,
    },

    /// Send the composer text to the chat.
    SendMessage {
        /// Text as typed.
        text: String,
    },
}
