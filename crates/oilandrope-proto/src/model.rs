//! Session, chat and message data.
//!
//! Shapes follow the backend serializers: a session embeds its chat, and the
//! chat embeds the messages present when it was fetched (`chat_message_set`).
//! Messages arriving later over the socket use the same [`ChatMessage`] shape.

use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::errors::{ProtocolError, Result};

/// User primary key on the backend.
pub type UserId = u64;

/// Chat primary key on the backend.
pub type ChatId = u64;

/// Display format for message timestamps (`DD/MM/YYYY HH:mm:ss`).
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Opaque session identifier taken from a URL path.
///
/// The REST API sends it as a number, URLs carry it as text; both forms
/// deserialize into the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawSessionId", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Wrap an identifier verbatim.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Extract the session identifier from a session URL or path.
    ///
    /// The identifier is the last non-empty path segment, so both
    /// `/roleplay/session/42/` and `http://host/roleplay/session/42` yield `42`.
    /// Query strings and fragments are ignored.
    pub fn from_path(path: &str) -> Result<Self> {
        let without_query = path.split(['?', '#']).next().unwrap_or_default();

        without_query
            .split('/')
            .rev()
            .map(str::trim)
            .find(|segment| !segment.is_empty())
            .filter(|segment| !segment.contains(':'))
            .map(Self::new)
            .ok_or_else(|| ProtocolError::InvalidSessionPath { path: path.to_string() })
    }

    /// Identifier as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSessionId {
    Number(u64),
    Text(String),
}

impl From<RawSessionId> for SessionId {
    fn from(raw: RawSessionId) -> Self {
        match raw {
            RawSessionId::Number(n) => Self(n.to_string()),
            RawSessionId::Text(s) => Self(s),
        }
    }
}

/// Message author as embedded by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// User primary key.
    pub id: UserId,
    /// Display name.
    pub username: String,
}

/// A single chat message.
///
/// Immutable once received. The timestamp is kept as sent so that a value
/// the client cannot parse never causes the message to be dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Server primary key, when the serializer includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Who wrote the message.
    pub author: Author,
    /// Body text.
    pub message: String,
    /// Creation time as an ISO-8601 string.
    pub entry_created_at: String,
}

impl ChatMessage {
    /// Build a message without a server id.
    pub fn new(
        author: Author,
        message: impl Into<String>,
        entry_created_at: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            author,
            message: message.into(),
            entry_created_at: entry_created_at.into(),
        }
    }

    /// Whether `user` wrote this message.
    pub fn is_authored_by(&self, user: UserId) -> bool {
        self.author.id == user
    }

    /// Creation time in the local time zone, formatted with
    /// [`TIMESTAMP_FORMAT`].
    ///
    /// Accepts RFC 3339 and the `YYYY-MM-DD HH:MM:SS` form, which is taken as
    /// UTC; anything else is returned unchanged.
    pub fn display_timestamp(&self) -> String {
        let raw = self.entry_created_at.as_str();

        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return parsed.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string();
        }
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
            return parsed.and_utc().with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string();
        }
        raw.to_string()
    }
}

/// A chat and the messages it held when fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    /// Chat primary key.
    pub id: ChatId,
    /// Chat name, if the serializer includes it.
    #[serde(default)]
    pub name: String,
    /// Messages present at load time, oldest first.
    #[serde(default)]
    pub chat_message_set: Vec<ChatMessage>,
}

/// A role-playing session and its chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Session identifier.
    pub id: SessionId,
    /// Session name, if the serializer includes it.
    #[serde(default)]
    pub name: String,
    /// The session's chat.
    pub chat: Chat,
}

/// The locally configured user.
///
/// Supplied once at start-up and never refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// User primary key.
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// API auth token, sent with the channel-layer handshake.
    pub token: String,
}

impl CurrentUser {
    /// Create a user identity.
    pub fn new(id: UserId, username: impl Into<String>, token: impl Into<String>) -> Self {
        Self { id, username: username.into(), token: token.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_from_trailing_slash_path() {
        let id = SessionId::from_path("http://localhost:8000/roleplay/session/42/").unwrap();
        assert_eq!(id.as_str(), "42");
    }

    #[test]
    fn session_id_from_path_without_slash_and_query() {
        let id = SessionId::from_path("/roleplay/session/7?tab=chat#bottom").unwrap();
        assert_eq!(id.as_str(), "7");
    }

    #[test]
    fn session_id_from_bare_id() {
        assert_eq!(SessionId::from_path("abc123").unwrap().as_str(), "abc123");
    }

    #[test]
    fn session_id_rejects_empty_path() {
        assert!(SessionId::from_path("///").is_err());
        assert!(SessionId::from_path("http://").is_err());
    }

    #[test]
    fn session_id_accepts_number_or_string() {
        let from_num: SessionId = serde_json::from_str("5").unwrap();
        let from_str: SessionId = serde_json::from_str("\"5\"").unwrap();
        assert_eq!(from_num, from_str);
    }

    #[test]
    fn session_parses_backend_shape() {
        let json = r#"{
            "id": 3,
            "name": "Dungeon night",
            "players": [1, 2],
            "chat": {
                "id": 9,
                "name": "Dungeon night chat",
                "chat_message_set": [
                    {
                        "id": 1,
                        "chat": 9,
                        "author": {"id": 1, "username": "gm"},
                        "message": "Welcome",
                        "entry_created_at": "2021-01-01T10:00:00Z"
                    }
                ]
            }
        }"#;

        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.id.as_str(), "3");
        assert_eq!(session.chat.id, 9);
        assert_eq!(session.chat.chat_message_set.len(), 1);
        assert_eq!(session.chat.chat_message_set[0].author.username, "gm");
    }

    fn local(utc: &str) -> String {
        DateTime::parse_from_rfc3339(utc)
            .unwrap()
            .with_timezone(&Local)
            .format(TIMESTAMP_FORMAT)
            .to_string()
    }

    #[test]
    fn timestamp_formats_rfc3339_in_local_time() {
        let author = Author { id: 1, username: "a".into() };
        let msg = ChatMessage::new(author, "hi", "2021-03-04T05:06:07.123456+00:00");
        assert_eq!(msg.display_timestamp(), local("2021-03-04T05:06:07Z"));
    }

    #[test]
    fn timestamps_with_different_offsets_share_the_viewer_zone() {
        let author = Author { id: 1, username: "a".into() };
        let east = ChatMessage::new(author.clone(), "hi", "2021-03-04T05:06:07+02:00");
        let utc = ChatMessage::new(author, "hi", "2021-03-04T03:06:07Z");

        assert_eq!(east.display_timestamp(), utc.display_timestamp());
        assert_eq!(east.display_timestamp(), local("2021-03-04T03:06:07Z"));
    }

    #[test]
    fn timestamp_without_offset_is_utc() {
        let author = Author { id: 1, username: "a".into() };
        let msg = ChatMessage::new(author, "hi", "2021-01-01 00:00:00");
        assert_eq!(msg.display_timestamp(), local("2021-01-01T00:00:00Z"));
    }

    #[test]
    fn unparseable_timestamp_is_shown_verbatim() {
        let author = Author { id: 1, username: "a".into() };
        let msg = ChatMessage::new(author, "hi", "yesterday");
        assert_eq!(msg.display_timestamp(), "yesterday");
    }

    #[test]
    fn authorship_compares_ids() {
        let msg = ChatMessage::new(Author { id: 4, username: "x".into() }, "hi", "");
        assert!(msg.is_authored_by(4));
        assert!(!msg.is_authored_by(5));
    }
}
