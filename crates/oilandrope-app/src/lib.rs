//! Application layer for the Oil & Rope session chat
//!
//! Pure state machines and generic runtime for UI and connection
//! orchestration, so the same code that runs in the terminal also runs under
//! scripted tests with a manual clock.
//!
//! # Components
//!
//! - [`App`]: UI state machine (composer, message list, connection status)
//! - [`Bridge`]: Protocol bridge (translates App actions to Client events)
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod bridge;
mod composer;
mod driver;
mod event;
mod input;
mod message_list;
mod runtime;
mod state;

pub use action::AppAction;
pub use app::App;
pub use bridge::Bridge;
pub use composer::Composer;
pub use driver::Driver;
pub use event::AppEvent;
pub use input::KeyInput;
pub use message_list::{MessageList, Placement};
pub use runtime::{Runtime, RuntimeConfig};
pub use state::{ConnectionState, NOTIFICATION_TICKS, Notification};
