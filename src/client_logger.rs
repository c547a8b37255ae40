//! Logging hooks for chat traffic.
//!
//! The terminal is the user interface, so nothing is logged to it.  Instead a
//! [`ChatLogger`] can be attached to the session to capture each request, the
//! payloads streamed back, and failures.  [`JsonLinesLogger`] is the stock
//! implementation: one JSON object per line, appended to a file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::sync::Mutex;

use serde_json::{Value, json};

use crate::sse::Payload;
use crate::types::ChatRequest;
use crate::{Error, Result};

/// A trait for logging chat session traffic.
///
/// Implement this trait to capture and record everything the session sends
/// and receives.  Hooks must not fail; an implementation that cannot record
/// an entry drops it.
pub trait ChatLogger: Send + Sync {
    /// Log an outgoing request.
    ///
    /// Called once per submitted line, before the request is sent.
    fn log_request(&self, request: &ChatRequest);

    /// Log one classified payload from the response stream.
    ///
    /// Called in arrival order, up to and including `[DONE]`.
    fn log_payload(&self, payload: &Payload);

    /// Log a request that ended in a connection error.
    fn log_error(&self, error: &Error);
}

/// Appends one JSON object per event to a file.
pub struct JsonLinesLogger {
    client_id: Option<String>,
    file: Mutex<BufWriter<File>>,
}

impl JsonLinesLogger {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: &str) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| Error::io(format!("failed to open log file {path}"), err))?;
        Ok(Self {
            client_id: None,
            file: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Tag every entry with `client_id`.
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    fn record(&self, kind: &str, body: Value) {
        let entry = json!({
            "kind": kind,
            "client_id": self.client_id,
            "body": body,
        });
        if let Ok(mut file) = self.file.lock() {
            let _ = serde_json::to_writer(&mut *file, &entry);
            let _ = file.write_all(b"\n");
            let _ = file.flush();
        }
    }
}

impl ChatLogger for JsonLinesLogger {
    fn log_request(&self, request: &ChatRequest) {
        self.record("request", serde_json::to_value(request).unwrap_or(Value::Null));
    }

    fn log_payload(&self, payload: &Payload) {
        let body = match payload {
            Payload::Done => json!({"type": "done"}),
            Payload::AccessGranted(text) => json!({"type": "access_granted", "text": text}),
            Payload::Delta(text) => json!({"type": "delta", "text": text}),
            Payload::Empty => json!({"type": "empty"}),
            Payload::Raw(text) => json!({"type": "raw", "text": text}),
        };
        self.record("payload", body);
    }

    fn log_error(&self, error: &Error) {
        self.record(
            "error",
            json!({"message": error.to_string(), "status": error.status_code()}),
        );
    }
}
