//! Server-Sent Events framing for chat responses.
//!
//! The endpoint streams blocks separated by a blank line.  Inside a block only
//! `data:` lines carry anything; each one becomes a [`Payload`].  The framer
//! owns the per-request [`StreamState`]: the decoder's partial bytes, the text
//! not yet terminated by a block separator, and whether `[DONE]` has been seen.

use crate::decoder::Utf8StreamDecoder;
use crate::types::ChatChunk;

/// Separator between two event blocks.
const BLOCK_SEPARATOR: &str = "\n\n";

/// Prefix that marks a meaningful line inside a block.
const DATA_PREFIX: &str = "data:";

/// Payload that marks the logical end of a stream.
pub const DONE_PAYLOAD: &str = "[DONE]";

/// Prefix of the payload that triggers the access-granted effect.
pub const ACCESS_GRANTED: &str = "ACCESS GRANTED";

/// A classified `data:` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// `[DONE]`: nothing after this is processed.
    Done,
    /// A payload beginning with [`ACCESS_GRANTED`]; carries the full payload.
    AccessGranted(String),
    /// A chunk whose first choice carries this content fragment.
    Delta(String),
    /// A chunk that parsed but carried no content.
    Empty,
    /// A payload that is not a recognizable chunk; rendered verbatim.
    Raw(String),
}

impl Payload {
    /// Classify the text following a `data:` prefix.
    pub fn classify(raw: &str) -> Self {
        if raw == DONE_PAYLOAD {
            return Payload::Done;
        }
        if raw.starts_with(ACCESS_GRANTED) {
            return Payload::AccessGranted(raw.to_string());
        }
        match ChatChunk::parse(raw) {
            Some(chunk) => match chunk.content() {
                Some(content) if !content.is_empty() => Payload::Delta(content.to_string()),
                _ => Payload::Empty,
            },
            None => Payload::Raw(raw.to_string()),
        }
    }
}

/// Per-request decoding state.
#[derive(Debug, Default)]
pub struct StreamState {
    decoder: Utf8StreamDecoder,
    buffer: String,
    done: bool,
}

impl StreamState {
    /// Fresh state for a new request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one transport chunk, returning every payload it completes.
    ///
    /// Once [`Payload::Done`] has been returned, later input is still decoded
    /// so the transport can drain, but no further payloads are produced.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Payload> {
        let text = self.decoder.decode(bytes);
        if self.done {
            return Vec::new();
        }
        self.buffer.push_str(&text);
        let mut payloads = Vec::new();
        while let Some(idx) = self.buffer.find(BLOCK_SEPARATOR) {
            let block: String = self.buffer.drain(..idx + BLOCK_SEPARATOR.len()).collect();
            for raw in data_lines(&block[..idx]) {
                let payload = Payload::classify(raw);
                let done = payload == Payload::Done;
                payloads.push(payload);
                if done {
                    self.done = true;
                    self.buffer.clear();
                    return payloads;
                }
            }
        }
        payloads
    }

    /// True once `[DONE]` has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Bytes of decoded text waiting for a block separator.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Discard whatever is left at end of stream, returning how much was lost.
    ///
    /// A trailing block without its separator is never rendered.
    pub fn finish(&mut self) -> usize {
        let lost = self.buffer.len() + self.decoder.pending();
        self.decoder.finish();
        self.buffer.clear();
        lost
    }
}

/// The payloads of every `data:` line in `block`, in order.
///
/// One optional space after the colon is part of the field syntax, not the
/// payload.
fn data_lines(block: &str) -> impl Iterator<Item = &str> {
    block.split('\n').filter_map(|line| {
        line.strip_prefix(DATA_PREFIX)
            .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
    })
}
