//! Handshake ordering tests.
//!
//! The channel-layer handshake depends on two independent inputs: the session
//! fetch and the socket open. These tests feed them in every order, across
//! reconnects, and check that exactly one handshake goes out per open socket
//! and never before the chat id is known.

use std::time::Duration;

use oilandrope_client::{
    Client, ClientAction, ClientEvent, Environment, ReconnectPolicy, env::ManualEnv,
};
use oilandrope_proto::{Chat, ClientFrame, CurrentUser, Session, SessionId};

const CHAT_ID: u64 = 31;

fn session() -> Session {
    Session {
        id: SessionId::new("5"),
        name: String::new(),
        chat: Chat { id: CHAT_ID, name: String::new(), chat_message_set: Vec::new() },
    }
}

fn new_client(env: &ManualEnv) -> Client<ManualEnv> {
    Client::new(env.clone(), CurrentUser::new(1, "alice", "tok"), ReconnectPolicy::default())
}

/// Extract handshake frames from actions
fn handshakes(actions: &[ClientAction]) -> Vec<ClientFrame> {
    actions
        .iter()
        .filter_map(|a| match a {
            ClientAction::Send(frame @ ClientFrame::SetupChannelLayer { .. }) => {
                Some(frame.clone())
            },
            _ => None,
        })
        .collect()
}

#[test]
fn handshake_waits_for_both_inputs_in_either_order() {
    let orders: [[ClientEvent<Duration>; 2]; 2] = [
        [ClientEvent::SessionResolved(session()), ClientEvent::SocketOpened],
        [ClientEvent::SocketOpened, ClientEvent::SessionResolved(session())],
    ];

    for events in orders {
        let env = ManualEnv::new();
        let mut client = new_client(&env);
        let mut sent = Vec::new();

        for event in events {
            sent.extend(handshakes(&client.handle(event).unwrap()));
        }

        let handshake = ClientFrame::SetupChannelLayer { token: "tok".into(), chat: CHAT_ID };
        assert_eq!(sent, vec![handshake]);
    }
}

#[test]
fn repeated_inputs_do_not_repeat_handshake() {
    let env = ManualEnv::new();
    let mut client = new_client(&env);
    let mut count = 0;

    count += handshakes(&client.handle(ClientEvent::SocketOpened).unwrap()).len();
    count += handshakes(&client.handle(ClientEvent::SessionResolved(session())).unwrap()).len();
    count += handshakes(&client.handle(ClientEvent::SessionResolved(session())).unwrap()).len();
    count += handshakes(
        &client.handle(ClientEvent::FrameReceived(r#"{"type":"noop"}"#.into())).unwrap(),
    )
    .len();

    assert_eq!(count, 1);
}

#[test]
fn reconnect_rejoins_on_new_socket() {
    let env = ManualEnv::new();
    let mut client = new_client(&env);

    client.handle(ClientEvent::SessionResolved(session())).unwrap();
    assert_eq!(handshakes(&client.handle(ClientEvent::SocketOpened).unwrap()).len(), 1);

    let actions = client.handle(ClientEvent::SocketClosed { code: Some(1011) }).unwrap();
    let Some(ClientAction::ConnectionLost { retry_in: Some(delay), .. }) = actions.last() else {
        panic!("expected a scheduled reconnect: {actions:?}");
    };
    assert!(!client.is_joined());

    env.advance(*delay);
    let actions = client.handle(ClientEvent::Tick { now: env.now() }).unwrap();
    assert_eq!(actions, vec![ClientAction::Reconnect { attempt: 1 }]);

    let actions = client.handle(ClientEvent::SocketOpened).unwrap();
    assert_eq!(handshakes(&actions).len(), 1);
    assert!(client.is_joined());
}

#[test]
fn messages_sent_after_join_target_the_chat() {
    let env = ManualEnv::new();
    let mut client = new_client(&env);
    client.handle(ClientEvent::SocketOpened).unwrap();
    client.handle(ClientEvent::SessionResolved(session())).unwrap();

    let text = "roll for initiative".to_string();
    let actions = client.handle(ClientEvent::SendMessage { text }).unwrap();

    assert_eq!(actions, vec![ClientAction::Send(ClientFrame::SendMessage {
        message: "roll for initiative".into(),
        chat: CHAT_ID,
    })]);
}
