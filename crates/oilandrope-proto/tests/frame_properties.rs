//! Property-based tests for frame encoding and classification
//!
//! Frames come off an untrusted socket, so decoding must never panic, and the
//! classification rules (error status first, then type) must hold for every
//! input, not just the handful of shapes the backend usually sends.

use oilandrope_proto::{Author, ChatMessage, ClientFrame, ServerFrame};
use proptest::prelude::*;
use serde_json::{Value, json};

/// Strategy for generating arbitrary messages
fn arbitrary_message() -> impl Strategy<Value = ChatMessage> {
    (any::<u64>(), "[a-z]{1,12}", ".{0,64}").prop_map(|(id, username, body)| {
        ChatMessage::new(Author { id, username }, body, "2021-01-01T00:00:00Z")
    })
}

proptest! {
    #[test]
    fn decode_never_panics(text in ".{0,256}") {
        let _ = ServerFrame::decode(&text);
    }

    #[test]
    fn send_message_frame_carries_text_and_chat(message in ".{0,128}", chat in any::<u64>()) {
        let encoded = ClientFrame::SendMessage { message: message.clone(), chat }.encode().unwrap();
        let value: Value = serde_json::from_str(&encoded).unwrap();

        prop_assert_eq!(value["type"].as_str(), Some("send_message"));
        prop_assert_eq!(value["message"].as_str(), Some(message.as_str()));
        prop_assert_eq!(value["chat"].as_u64(), Some(chat));
    }

    #[test]
    fn echoed_message_decodes_to_same_message(msg in arbitrary_message()) {
        let text = json!({ "type": "send_message", "content": msg }).to_string();

        prop_assert_eq!(ServerFrame::decode(&text).unwrap(), ServerFrame::Message(msg));
    }

    #[test]
    fn error_status_is_never_a_message(
        kind in prop::option::of("[a-z_]{1,16}"),
        content in ".{0,64}",
    ) {
        let text = json!({ "type": kind, "status": "error", "content": content }).to_string();

        prop_assert_eq!(ServerFrame::decode(&text).unwrap(), ServerFrame::Error { content });
    }
}
