//! Line framing for the generation stream.
//!
//! Network reads carry an arbitrary slice of the event stream: a read may end
//! in the middle of a line, or in the middle of a multi-byte character. The
//! parser keeps the unterminated tail of the previous read as raw bytes and
//! only decodes a line once its `\n` has arrived.

use std::error::Error as StdError;
use std::fmt;

use memchr::memchr;

use crate::api::FramePayload;

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";
const IGNORED_FIELDS: [&str; 3] = ["event:", "id:", "retry:"];

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Payload(FramePayload),
    /// `[DONE]` sentinel; the server has nothing more to send.
    Done,
}

/// A single line that could not be turned into a [`Frame`].
#[derive(Debug)]
pub enum FrameDecodeError {
    InvalidUtf8 {
        /// Lossy rendering of the offending bytes.
        line: String,
    },
    InvalidJson {
        line: String,
        source: serde_json::Error,
    },
}

impl FrameDecodeError {
    pub fn line(&self) -> &str {
        match self {
            FrameDecodeError::InvalidUtf8 { line } => line,
            FrameDecodeError::InvalidJson { line, .. } => line,
        }
    }
}

impl fmt::Display for FrameDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameDecodeError::InvalidUtf8 { .. } => write!(f, "frame is not valid UTF-8"),
            FrameDecodeError::InvalidJson { source, .. } => {
                write!(f, "frame payload is not valid JSON: {source}")
            }
        }
    }
}

impl StdError for FrameDecodeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            FrameDecodeError::InvalidUtf8 { .. } => None,
            FrameDecodeError::InvalidJson { source, .. } => Some(source),
        }
    }
}

pub type FrameResult = Result<Frame, FrameDecodeError>;

#[derive(Debug, Default)]
pub struct FrameParser {
    buffer: Vec<u8>,
}

impl FrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one network read and returns every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<FrameResult> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut start = 0;
        while let Some(offset) = memchr(b'\n', &self.buffer[start..]) {
            let end = start + offset;
            if let Some(frame) = decode_line(&self.buffer[start..end]) {
                frames.push(frame);
            }
            start = end + 1;
        }
        self.buffer.drain(..start);
        frames
    }

    /// Signals a clean end of stream. A final line that never received its
    /// terminator is still decoded.
    pub fn finish(&mut self) -> Option<FrameResult> {
        let rest = std::mem::take(&mut self.buffer);
        decode_line(&rest)
    }

    /// Bytes held back waiting for a line terminator.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }
}

fn extract_data_payload(line: &str) -> Option<&str> {
    line.strip_prefix(DATA_PREFIX).map(str::trim_start)
}

fn decode_line(raw: &[u8]) -> Option<FrameResult> {
    let line = match std::str::from_utf8(raw) {
        Ok(line) => line.trim(),
        Err(_) => {
            return Some(Err(FrameDecodeError::InvalidUtf8 {
                line: String::from_utf8_lossy(raw).trim().to_string(),
            }))
        }
    };

    if line.is_empty() || line.starts_with(':') {
        return None;
    }

    let payload = match extract_data_payload(line) {
        Some(payload) => payload,
        None if IGNORED_FIELDS.iter().any(|field| line.starts_with(field)) => return None,
        // Bare JSON lines are accepted as well.
        None => line,
    };

    if payload.is_empty() {
        return None;
    }
    if payload == DONE_SENTINEL {
        return Some(Ok(Frame::Done));
    }

    Some(
        serde_json::from_str::<FramePayload>(payload)
            .map(Frame::Payload)
            .map_err(|source| FrameDecodeError::InvalidJson {
                line: payload.to_string(),
                source,
            }),
    )
}
