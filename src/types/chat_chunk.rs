use serde::{Deserialize, Serialize};

/// One streamed completion chunk, in the `choices[].delta.content` shape.
///
/// Only the fields the terminal renders are modelled; everything else in the
/// payload is ignored during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatChunk {
    /// Candidate deltas; the terminal only renders the first.
    pub choices: Vec<ChunkChoice>,
}

/// A single candidate inside a [`ChatChunk`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkChoice {
    /// The incremental content for this candidate.
    pub delta: ChunkDelta,
}

/// Incremental content carried by a [`ChunkChoice`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkDelta {
    /// Text to append, absent on role-only or terminal chunks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ChatChunk {
    /// Parse a payload, yielding `None` unless it has at least one choice.
    pub fn parse(payload: &str) -> Option<Self> {
        serde_json::from_str::<ChatChunk>(payload)
            .ok()
            .filter(|chunk| !chunk.choices.is_empty())
    }

    /// The content of the first choice's delta, if any.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
    }
}
