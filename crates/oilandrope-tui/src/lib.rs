//! Terminal UI for the Oil & Rope session chat
//!
//! A thin shell over [`oilandrope_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`oilandrope_app::Runtime`].
//!
//! This crate only handles configuration, terminal input and rendering.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod terminal;
pub mod ui;

pub use config::{Args, ChatConfig, ConfigError};
pub use oilandrope_app::{App, AppAction, AppEvent, Bridge, Driver, KeyInput, Runtime};
pub use terminal::{TerminalDriver, TerminalError};
