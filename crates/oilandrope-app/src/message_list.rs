//! Chat message list.
//!
//! Holds the messages shown in the chat pane in arrival order and tracks how
//! far the user has scrolled back. Every append jumps back to the newest
//! message.

use oilandrope_proto::{ChatMessage, UserId};

/// Where a message is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Written by the current user: right-aligned.
    Own,
    /// Written by someone else: left-aligned.
    Other,
}

/// Append-only list of chat messages with a scroll position.
#[derive(Debug, Clone)]
pub struct MessageList {
    /// Current user, for placement.
    user: UserId,
    messages: Vec<ChatMessage>,
    /// Messages hidden below the view. Zero means following the newest.
    scroll_back: usize,
}

impl MessageList {
    /// Create an empty list for `user`.
    pub fn new(user: UserId) -> Self {
        Self { user, messages: Vec::new(), scroll_back: 0 }
    }

    /// Replace the contents with a load-time snapshot.
    pub fn seed(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
        self.scroll_back = 0;
    }

    /// Append a message and scroll to it.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.scroll_back = 0;
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Placement of `message` relative to the current user.
    pub fn placement(&self, message: &ChatMessage) -> Placement {
        if message.is_authored_by(self.user) { Placement::Own } else { Placement::Other }
    }

    /// Scroll towards older messages.
    pub fn scroll_up(&mut self, by: usize) {
        let max = self.messages.len().saturating_sub(1);
        self.scroll_back = self.scroll_back.saturating_add(by).min(max);
    }

    /// Scroll towards newer messages.
    pub fn scroll_down(&mut self, by: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(by);
    }

    /// Whether the view shows the newest message.
    pub fn is_following(&self) -> bool {
        self.scroll_back == 0
    }

    /// Messages hidden below the view.
    pub fn scroll_back(&self) -> usize {
        self.scroll_back
    }

    /// Up to `count` messages ending at the scroll position, oldest first.
    pub fn visible(&self, count: usize) -> &[ChatMessage] {
        let end = self.messages.len().saturating_sub(self.scroll_back);
        let start = end.saturating_sub(count);
        &self.messages[start..end]
    }
}
