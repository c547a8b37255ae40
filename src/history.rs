//! Bounded conversation history.

use std::collections::VecDeque;

use crate::types::Message;

/// Number of messages retained and sent with each request.
pub const MAX_HISTORY: usize = 10;

/// The most recent messages of a conversation, oldest first.
///
/// Appending past the capacity evicts from the front, so the history never
/// holds more than `capacity` entries.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    messages: VecDeque<Message>,
    capacity: usize,
}

impl ConversationHistory {
    /// An empty history holding at most [`MAX_HISTORY`] messages.
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }

    /// An empty history holding at most `capacity` messages.
    ///
    /// A capacity of zero is raised to one; the message being sent must fit.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            messages: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `message`, evicting the oldest entries to stay within capacity.
    pub fn push(&mut self, message: Message) {
        while self.messages.len() >= self.capacity {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    /// Number of retained messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when nothing has been retained.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Maximum number of retained messages.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Copy the retained messages out, oldest first.
    pub fn to_vec(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }

    /// Drop every retained message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new()
    }
}
