use serde::{Deserialize, Serialize};

use crate::types::Message;

/// Body of a `POST /api/chat` request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    /// The bounded conversation history, oldest first.
    pub messages: Vec<Message>,

    /// Always true; the client only consumes streamed replies.
    pub stream: bool,
}

impl ChatRequest {
    /// Create a streaming request carrying `messages`.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            stream: true,
        }
    }
}
