//! Core chat session management.
//!
//! This module provides the `ChatSession` struct, which owns the conversation
//! history and the activity lock and turns one submitted line into one
//! streamed reply on the screen.

use std::sync::Arc;

use futures::StreamExt;
use tokio::time::Instant;

use crate::client::ChatBackend;
use crate::client_logger::ChatLogger;
use crate::editor::write_prompt;
use crate::error::{Error, Result};
use crate::history::ConversationHistory;
use crate::lock::ActivityLock;
use crate::observability::{
    CHAT_REQUEST_ERRORS, CHAT_REQUESTS, CHAT_REQUESTS_REFUSED, STREAM_BYTES,
    STREAM_DISCARDED_BYTES, STREAM_DURATION, STREAM_PAYLOADS, STREAM_RAW_PAYLOADS,
    STREAM_SENTINELS, STREAM_TTFB,
};
use crate::render::{ANSI_BOLD_GREEN, ANSI_BOLD_RED, ANSI_RESET, Screen};
use crate::sse::{Payload, StreamState};
use crate::types::{ChatRequest, Message};

/// Line shown when a request fails for any reason.
pub const CONNECTION_ERROR: &str = "[Connection error]";

/// Shown beneath the access-granted line.
pub const PRIZE_MESSAGE: &str = "💥 Prize unlocked! 💥";

/// What happened during one call to [`ChatSession::send`].
#[derive(Debug, Default)]
pub struct TurnOutcome {
    /// Payloads processed, `[DONE]` included.
    pub payloads: usize,
    /// Whether the stream reached `[DONE]`.
    pub completed: bool,
    /// Whether the access-granted effect fired.
    pub access_granted: bool,
    /// The failure that ended the turn, if any.
    pub error: Option<Error>,
}

impl TurnOutcome {
    /// True when the turn ended without an error.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// A chat session that manages conversation state and API interactions.
///
/// The session owns the bounded history and the activity lock.  The lock is
/// handed out as a capability so the line editor can refuse input while a
/// reply is streaming; only the session ever takes it.
pub struct ChatSession<B: ChatBackend> {
    backend: B,
    history: ConversationHistory,
    lock: ActivityLock,
    logger: Option<Arc<dyn ChatLogger>>,
}

impl<B: ChatBackend> ChatSession<B> {
    /// Creates a new chat session over `backend`.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            history: ConversationHistory::new(),
            lock: ActivityLock::new(),
            logger: None,
        }
    }

    /// Replaces the history, e.g. to change its capacity.
    pub fn with_history(mut self, history: ConversationHistory) -> Self {
        self.history = history;
        self
    }

    /// Attaches a logger that sees every request and payload.
    pub fn with_logger(mut self, logger: Arc<dyn ChatLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// A handle on the activity lock, for the line editor.
    pub fn lock(&self) -> ActivityLock {
        self.lock.clone()
    }

    /// True while a request is in flight.
    pub fn is_busy(&self) -> bool {
        self.lock.is_held()
    }

    /// The conversation so far, oldest first.
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// The transport in use.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Sends a user line and streams the reply onto `screen`.
    ///
    /// This method:
    /// 1. Takes the activity lock
    /// 2. Adds the line to the bounded history
    /// 3. Sends the whole history as a streaming request
    /// 4. Renders payloads as they arrive
    /// 5. Writes a line break (or the connection error) and the prompt
    ///
    /// The lock is released on every exit path, including the returned
    /// future being dropped mid-stream.  Failures never propagate: they are
    /// reported on screen and recorded in the outcome.
    pub async fn send(&mut self, line: &str, screen: &mut dyn Screen) -> TurnOutcome {
        let Some(_guard) = self.lock.try_acquire() else {
            CHAT_REQUESTS_REFUSED.click();
            return TurnOutcome {
                error: Some(Error::validation("a request is already in flight", None)),
                ..TurnOutcome::default()
            };
        };
        CHAT_REQUESTS.click();

        self.history.push(Message::user(line));
        let request = ChatRequest::new(self.history.to_vec());
        if let Some(logger) = &self.logger {
            logger.log_request(&request);
        }

        let mut outcome = TurnOutcome::default();
        match self.stream_reply(&request, screen, &mut outcome).await {
            Ok(()) => {
                screen.writeln("");
            }
            Err(err) => {
                CHAT_REQUEST_ERRORS.click();
                if let Some(logger) = &self.logger {
                    logger.log_error(&err);
                }
                screen.writeln(&format!("{ANSI_BOLD_RED}{CONNECTION_ERROR}{ANSI_RESET}"));
                outcome.error = Some(err);
            }
        }
        write_prompt(screen);
        outcome
    }

    async fn stream_reply(
        &self,
        request: &ChatRequest,
        screen: &mut dyn Screen,
        outcome: &mut TurnOutcome,
    ) -> Result<()> {
        let start = Instant::now();
        let mut body = self.backend.open_stream(request).await?;
        let mut state = StreamState::new();
        let mut first_chunk = true;

        // Keep reading after [DONE] so the transport drains; the state stops
        // producing payloads on its own.
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            if first_chunk {
                STREAM_TTFB.add(start.elapsed().as_secs_f64());
                first_chunk = false;
            }
            STREAM_BYTES.count(chunk.len() as u64);
            for payload in state.feed(&chunk) {
                self.render(&payload, screen, outcome);
            }
            screen.flush();
        }

        STREAM_DISCARDED_BYTES.count(state.finish() as u64);
        STREAM_DURATION.add(start.elapsed().as_secs_f64());
        Ok(())
    }

    fn render(&self, payload: &Payload, screen: &mut dyn Screen, outcome: &mut TurnOutcome) {
        STREAM_PAYLOADS.click();
        outcome.payloads += 1;
        if let Some(logger) = &self.logger {
            logger.log_payload(payload);
        }
        match payload {
            Payload::Done => {
                outcome.completed = true;
            }
            Payload::AccessGranted(text) => {
                STREAM_SENTINELS.click();
                outcome.access_granted = true;
                screen.writeln("");
                screen.writeln(&format!("{ANSI_BOLD_GREEN}{text}{ANSI_RESET}"));
                screen.writeln(&format!("\n{PRIZE_MESSAGE}"));
            }
            Payload::Delta(text) => {
                screen.write(text);
            }
            Payload::Empty => {}
            Payload::Raw(text) => {
                STREAM_RAW_PAYLOADS.click();
                screen.write(text);
            }
        }
    }
}
