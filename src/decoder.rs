//! Incremental UTF-8 decoding for chunked response bodies.
//!
//! Transport chunks are not aligned with character boundaries, so a multi-byte
//! sequence may arrive split across two reads.  [`Utf8StreamDecoder`] holds the
//! incomplete tail of one chunk and prepends it to the next.

/// Stateful UTF-8 decoder that tolerates split multi-byte sequences.
///
/// Invalid byte sequences decode to U+FFFD rather than failing, so no part of
/// a response is ever lost to a decoding error.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    /// Creates a decoder with no buffered bytes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `bytes`, retaining any trailing incomplete sequence.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::with_capacity(self.pending.len());
        let mut start = 0;
        loop {
            match std::str::from_utf8(&self.pending[start..]) {
                Ok(text) => {
                    out.push_str(text);
                    start = self.pending.len();
                    break;
                }
                Err(err) => {
                    let valid = start + err.valid_up_to();
                    // The prefix up to valid_up_to() is known to be valid.
                    out.push_str(
                        std::str::from_utf8(&self.pending[start..valid]).unwrap_or_default(),
                    );
                    match err.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            start = valid + len;
                        }
                        None => {
                            start = valid;
                            break;
                        }
                    }
                }
            }
        }
        self.pending.drain(..start);
        out
    }

    /// Number of bytes held back waiting for the rest of a sequence.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Flush the decoder at end of stream.
    ///
    /// A dangling partial sequence becomes a single U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            char::REPLACEMENT_CHARACTER.to_string()
        }
    }
}
