//! Streaming markup tokenizer
//!
//! Splits a byte stream into visible-text and tag segments without building a
//! DOM. The tokenizer has two states: outside a tag it accumulates text with
//! whitespace runs collapsed to a single space; inside a tag it accumulates the
//! raw text between `<` and `>`.
//!
//! The state machine only reacts to ASCII bytes, which never occur inside a
//! multi-byte UTF-8 sequence, so chunks may be split anywhere and segments are
//! decoded only once they are complete.

/// A completed piece of markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Visible text between tags, whitespace-normalized
    Text(String),
    /// Raw content of a tag, without the angle brackets
    Tag(String),
}

/// Two-state tokenizer fed chunk by chunk
#[derive(Debug, Default)]
pub struct MarkupTokenizer {
    inside_tag: bool,
    previous_blank: bool,
    text: Vec<u8>,
    tag: Vec<u8>,
}

impl MarkupTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the next chunk of the stream
    ///
    /// # Returns
    ///
    /// The segments completed by this chunk, in stream order
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Segment> {
        let mut segments = Vec::new();

        for &byte in chunk {
            match byte {
                b'<' => {
                    if !self.text.is_empty() {
                        segments.push(Segment::Text(take_string(&mut self.text)));
                    }
                    self.inside_tag = true;
                }
                b'>' => {
                    // A stray '>' in visible text is dropped
                    if self.inside_tag {
                        segments.push(Segment::Tag(take_string(&mut self.tag)));
                        self.inside_tag = false;
                    }
                }
                _ if self.inside_tag => self.tag.push(byte),
                b' ' | b'\n' | b'\t' | b'\r' => {
                    if !self.previous_blank {
                        self.text.push(b' ');
                        self.previous_blank = true;
                    }
                }
                _ => {
                    self.previous_blank = false;
                    self.text.push(byte);
                }
            }
        }

        segments
    }

    /// Ends the stream
    ///
    /// Trailing text is flushed; an unterminated tag is discarded.
    pub fn finish(&mut self) -> Vec<Segment> {
        let mut segments = Vec::new();
        if !self.text.is_empty() {
            segments.push(Segment::Text(take_string(&mut self.text)));
        }
        if self.inside_tag {
            tracing::trace!("Discarding unterminated tag at end of stream");
        }
        *self = Self::default();
        segments
    }
}

fn take_string(buffer: &mut Vec<u8>) -> String {
    let bytes = std::mem::take(buffer);
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}
