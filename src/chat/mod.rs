//! Chat application module for the custodian terminal.
//!
//! This module provides the interactive half of the program: a session that
//! sends each submitted line to the text-generation endpoint and streams the
//! reply onto the screen, plus the configuration that wires it up.
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Conversation state, the activity lock, and stream rendering

mod config;
mod session;

pub use config::{ChatArgs, ChatConfig};
pub use session::{CONNECTION_ERROR, ChatSession, PRIZE_MESSAGE, TurnOutcome};
