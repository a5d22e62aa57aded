//! Runtime tests against a scripted driver.
//!
//! The driver replays a fixed list of inputs and server frames on a manual
//! clock and records everything the runtime asks of it, so whole sessions
//! (connect, load, chat, drop, reconnect) run deterministically and without
//! sockets.

use std::{
    collections::VecDeque,
    io,
    sync::{Arc, Mutex},
    time::Duration,
};

use oilandrope_app::{
    App, AppAction, AppEvent, ConnectionState, Driver, KeyInput, Placement, Runtime, RuntimeConfig,
};
use oilandrope_client::{Environment, ReconnectPolicy, SocketEvent, env::ManualEnv};
use oilandrope_proto::{Author, Chat, ChatMessage, ClientFrame, CurrentUser, Session, SessionId};
use serde_json::json;

const SOCKET_URL: &str = "ws://localhost:8000/ws/chat/connect/";
const CHAT_ID: u64 = 4;

/// One scripted input, consumed per poll.
#[derive(Debug, Clone)]
enum Step {
    Key(KeyInput),
    Server(String),
    Close(Option<u16>),
    Wait(Duration),
}

/// Everything the runtime did, shared with the test after `run` returns.
#[derive(Debug, Default)]
struct Record {
    sent: Vec<ClientFrame>,
    connects: Vec<String>,
    last_render: Option<App>,
    stopped: bool,
}

struct ScriptedDriver {
    env: ManualEnv,
    script: VecDeque<Step>,
    /// Outcome of each connect in order; connects beyond the list succeed.
    connect_results: VecDeque<bool>,
    session: Option<Session>,
    socket: Option<VecDeque<SocketEvent>>,
    /// Echo sent messages back as this author.
    echo_as: Option<Author>,
    record: Arc<Mutex<Record>>,
}

impl ScriptedDriver {
    fn new(env: ManualEnv, script: Vec<Step>) -> (Self, Arc<Mutex<Record>>) {
        let record = Arc::new(Mutex::new(Record::default()));
        let driver = Self {
            env,
            script: script.into(),
            connect_results: VecDeque::new(),
            session: Some(session(vec![
                message(2, "bob", "the door creaks open"),
                message(3, "carol", "I light a torch"),
            ])),
            socket: None,
            echo_as: None,
            record: Arc::clone(&record),
        };
        (driver, record)
    }
}

impl Driver for ScriptedDriver {
    type Error = io::Error;
    type Instant = Duration;

    async fn poll_event(&mut self, app: &mut App) -> Result<Vec<AppAction>, Self::Error> {
        let Some(step) = self.script.pop_front() else {
            return Ok(app.handle(AppEvent::Key(KeyInput::Esc)));
        };

        match step {
            Step::Key(key) => Ok(app.handle(AppEvent::Key(key))),
            Step::Server(text) => {
                if let Some(socket) = self.socket.as_mut() {
                    socket.push_back(SocketEvent::Text(text));
                }
                Ok(vec![])
            },
            Step::Close(code) => {
                if let Some(socket) = self.socket.as_mut() {
                    socket.push_back(SocketEvent::Closed { code });
                }
                Ok(vec![])
            },
            Step::Wait(duration) => {
                self.env.advance(duration);
                Ok(app.handle(AppEvent::Tick))
            },
        }
    }

    async fn send_frame(&mut self, frame: ClientFrame) -> Result<(), Self::Error> {
        let Some(socket) = self.socket.as_mut() else {
            return Err(io::Error::other("no socket"));
        };

        if let (ClientFrame::SendMessage { message: body, .. }, Some(author)) =
            (&frame, &self.echo_as)
        {
            let echo = ChatMessage::new(author.clone(), body.clone(), "2021-05-01T20:00:00Z");
            socket.push_back(SocketEvent::Text(
                json!({ "type": "send_message", "content": echo }).to_string(),
            ));
        }

        self.record.lock().unwrap().sent.push(frame);
        Ok(())
    }

    async fn recv_socket_event(&mut self) -> Option<SocketEvent> {
        self.socket.as_mut()?.pop_front()
    }

    async fn connect(&mut self, url: &str) -> Result<(), Self::Error> {
        self.record.lock().unwrap().connects.push(url.to_string());

        if self.connect_results.pop_front().unwrap_or(true) {
            self.socket = Some(VecDeque::from([SocketEvent::Opened]));
            Ok(())
        } else {
            self.socket = None;
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
        }
    }

    async fn fetch_session(&mut self, _session: &SessionId) -> Result<Session, Self::Error> {
        self.session.clone().ok_or_else(|| io::Error::other("404 Not Found"))
    }

    async fn check_health(&mut self) -> Result<String, Self::Error> {
        Ok("3.12.4".to_string())
    }

    fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    fn now(&self) -> Self::Instant {
        self.env.now()
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.record.lock().unwrap().last_render = Some(app.clone());
        Ok(())
    }

    fn stop(&mut self) {
        self.record.lock().unwrap().stopped = true;
    }
}

fn alice() -> CurrentUser {
    CurrentUser::new(1, "alice", "alice-token")
}

fn message(author: u64, username: &str, body: &str) -> ChatMessage {
    ChatMessage::new(Author { id: author, username: username.into() }, body, "2021-05-01T19:00:00Z")
}

fn session(messages: Vec<ChatMessage>) -> Session {
    Session {
        id: SessionId::new("9"),
        name: "Barovia".into(),
        chat: Chat { id: CHAT_ID, name: String::new(), chat_message_set: messages },
    }
}

fn config(reconnect: ReconnectPolicy) -> RuntimeConfig {
    RuntimeConfig {
        session: SessionId::new("9"),
        socket_url: SOCKET_URL.to_string(),
        user: alice(),
        reconnect,
    }
}

fn typed(text: &str) -> Vec<Step> {
    text.chars().map(|c| Step::Key(KeyInput::Char(c))).chain([Step::Key(KeyInput::Enter)]).collect()
}

fn handshakes(record: &Record) -> usize {
    record.sent.iter().filter(|f| matches!(f, ClientFrame::SetupChannelLayer { .. })).count()
}

async fn run(driver: ScriptedDriver, env: ManualEnv, reconnect: ReconnectPolicy) {
    Runtime::new(driver, env, config(reconnect)).run().await.unwrap();
}

#[tokio::test]
async fn chat_end_to_end() {
    let env = ManualEnv::new();
    let (mut driver, record) = ScriptedDriver::new(env.clone(), typed("hello"));
    driver.echo_as = Some(Author { id: 1, username: "alice".into() });

    run(driver, env, ReconnectPolicy::default()).await;

    let record = record.lock().unwrap();
    assert_eq!(record.connects, vec![SOCKET_URL.to_string()]);
    assert_eq!(record.sent, vec![
        ClientFrame::SetupChannelLayer { token: "alice-token".into(), chat: CHAT_ID },
        ClientFrame::SendMessage { message: "hello".into(), chat: CHAT_ID },
    ]);
    assert!(record.stopped);

    let app = record.last_render.as_ref().unwrap();
    let messages = app.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages.messages()[2].message, "hello");
    assert_eq!(messages.placement(&messages.messages()[2]), Placement::Own);
    assert_eq!(app.composer().text(), "");
    assert_eq!(app.connection_state(), &ConnectionState::Joined { chat: CHAT_ID });
}

#[tokio::test]
async fn whitespace_submit_sends_nothing() {
    let env = ManualEnv::new();
    let (driver, record) = ScriptedDriver::new(env.clone(), typed("   "));

    run(driver, env, ReconnectPolicy::default()).await;

    let record = record.lock().unwrap();
    assert!(record.sent.iter().all(|f| !matches!(f, ClientFrame::SendMessage { .. })));
}

#[tokio::test]
async fn server_error_frame_shows_notification() {
    let env = ManualEnv::new();
    let script = vec![
        Step::Wait(Duration::ZERO),
        Step::Server(json!({ "status": "error", "content": "Chat is closed" }).to_string()),
        Step::Wait(Duration::ZERO),
    ];
    let (driver, record) = ScriptedDriver::new(env.clone(), script);

    run(driver, env, ReconnectPolicy::default()).await;

    let record = record.lock().unwrap();
    let app = record.last_render.as_ref().unwrap();
    assert_eq!(app.messages().len(), 2);
    assert_eq!(app.notification(), Some("Chat is closed"));
}

#[tokio::test]
async fn internal_error_close_reconnects_and_rejoins() {
    let env = ManualEnv::new();
    let script = vec![
        Step::Wait(Duration::ZERO),
        Step::Close(Some(1011)),
        Step::Wait(Duration::ZERO),
        Step::Wait(Duration::from_secs(1)),
        Step::Wait(Duration::ZERO),
    ];
    let (driver, record) = ScriptedDriver::new(env.clone(), script);

    run(driver, env, ReconnectPolicy::default()).await;

    let record = record.lock().unwrap();
    assert_eq!(record.connects.len(), 2);
    assert_eq!(handshakes(&record), 2);

    let app = record.last_render.as_ref().unwrap();
    assert_eq!(app.notification(), Some("An error occurred. Reconnecting to chat"));
    assert_eq!(app.connection_state(), &ConnectionState::Joined { chat: CHAT_ID });
}

#[tokio::test]
async fn failed_connects_stop_at_max_attempts() {
    let env = ManualEnv::new();
    let script = (0..10).map(|_| Step::Wait(Duration::from_secs(30))).collect();
    let (mut driver, record) = ScriptedDriver::new(env.clone(), script);
    driver.connect_results = VecDeque::from(vec![false; 10]);

    let policy = ReconnectPolicy { max_attempts: 2, ..ReconnectPolicy::default() };
    run(driver, env, policy).await;

    let record = record.lock().unwrap();
    assert_eq!(record.connects.len(), 3);
    assert_eq!(handshakes(&record), 0);

    let app = record.last_render.as_ref().unwrap();
    assert_eq!(app.connection_state(), &ConnectionState::Disconnected);
    assert_eq!(app.status_message(), Some("Connection lost"));
}

#[tokio::test]
async fn disabled_reconnect_stays_closed() {
    let env = ManualEnv::new();
    let script = vec![
        Step::Wait(Duration::ZERO),
        Step::Close(None),
        Step::Wait(Duration::ZERO),
        Step::Wait(Duration::from_secs(60)),
    ];
    let (driver, record) = ScriptedDriver::new(env.clone(), script);

    run(driver, env, ReconnectPolicy::disabled()).await;

    let record = record.lock().unwrap();
    assert_eq!(record.connects.len(), 1);
    assert_eq!(handshakes(&record), 1);
}

#[tokio::test]
async fn session_fetch_failure_leaves_chat_unjoined() {
    let env = ManualEnv::new();
    let mut script = vec![Step::Wait(Duration::ZERO)];
    script.extend(typed("hi"));
    let (mut driver, record) = ScriptedDriver::new(env.clone(), script);
    driver.session = None;

    run(driver, env, ReconnectPolicy::default()).await;

    let record = record.lock().unwrap();
    assert!(record.sent.is_empty());

    let app = record.last_render.as_ref().unwrap();
    assert!(app.messages().is_empty());
    assert_eq!(app.composer().text(), "hi");
    assert_eq!(app.connection_state(), &ConnectionState::Open);
    assert!(app.status_message().is_some_and(|s| s.starts_with("Error:")));
}
