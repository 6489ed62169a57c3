//! Incremental decoder for the plan stream
//!
//! The transport hands us raw byte chunks with no framing guarantees: one
//! frame may span several chunks and one chunk may carry several frames.
//! Bytes accumulate in a buffer and every complete frame (terminated by a
//! blank line) is decoded as soon as it is available.
//!
//! A frame is two lines:
//!
//! ```text
//! event: plan_chunk
//! data: "Day 1..."
//! ```
//!
//! Malformed frames are dropped and logged; they never end the stream.

use thiserror::Error;
use tracing::{debug, trace, warn};

use super::event::{EventKind, StreamEvent};

/// Frame separator after carriage returns have been stripped
const FRAME_DELIMITER: &[u8] = b"\n\n";

const EVENT_FIELD: &str = "event:";
const DATA_FIELD: &str = "data:";

/// Why a single frame was dropped
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("frame has no event line")]
    MissingEvent,

    #[error("frame has no data line")]
    MissingData,

    #[error("frame data is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Result of decoding one well-formed frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Recognized event, ready for dispatch
    Event(StreamEvent),

    /// Well-formed frame with an event name nobody handles
    Ignored(String),

    /// Comment-only frame (server keep-alive)
    KeepAlive,
}

/// Running counters for one stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Complete frames pulled out of the buffer
    pub frames: u64,

    /// Events handed to the caller
    pub emitted: u64,

    /// Frames dropped as malformed
    pub dropped: u64,

    /// Frames skipped on purpose (unknown event name, keep-alive)
    pub ignored: u64,

    /// Bytes of an incomplete trailing frame thrown away at end of stream
    pub discarded_bytes: u64,
}

/// Stateful SSE frame decoder
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: Vec<u8>,
    stats: DecoderStats,
    finished: bool,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and decode every frame it completes, in arrival order
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        trace!(len = chunk.len(), buffered = self.buffer.len(), "push: called");
        if self.finished {
            debug!(len = chunk.len(), "push: decoder already finished, ignoring chunk");
            return Vec::new();
        }

        // CRLF framing decodes the same as LF framing
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut events = Vec::new();
        while let Some(pos) = find_delimiter(&self.buffer) {
            let frame: Vec<u8> = self.buffer.drain(..pos + FRAME_DELIMITER.len()).take(pos).collect();
            self.stats.frames += 1;

            match decode_frame(&frame) {
                Ok(Frame::Event(event)) => {
                    debug!(kind = %event.kind, payload_len = event.payload.len(), "push: decoded event");
                    self.stats.emitted += 1;
                    events.push(event);
                }
                Ok(Frame::Ignored(name)) => {
                    debug!(%name, "push: ignoring unrecognized event");
                    self.stats.ignored += 1;
                }
                Ok(Frame::KeepAlive) => {
                    trace!("push: keep-alive frame");
                    self.stats.ignored += 1;
                }
                Err(e) => {
                    warn!(error = %e, frame_len = frame.len(), "push: dropping malformed frame");
                    self.stats.dropped += 1;
                }
            }
        }

        events
    }

    /// Signal end of stream; any partial trailing frame is discarded
    ///
    /// Returns the final counters. Further chunks are ignored.
    pub fn finish(&mut self) -> DecoderStats {
        debug!(buffered = self.buffer.len(), "finish: called");
        if !self.finished {
            self.finished = true;
            if !self.buffer.is_empty() {
                debug!(bytes = self.buffer.len(), "finish: discarding incomplete trailing frame");
                self.stats.discarded_bytes += self.buffer.len() as u64;
                self.buffer.clear();
            }
        }
        self.stats.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn stats(&self) -> &DecoderStats {
        &self.stats
    }

    /// Bytes waiting for a frame delimiter
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

fn find_delimiter(buffer: &[u8]) -> Option<usize> {
    buffer.windows(FRAME_DELIMITER.len()).position(|w| w == FRAME_DELIMITER)
}

/// Strip an SSE field prefix plus the single optional space after the colon
fn field_value<'a>(line: &'a str, field: &str) -> Option<&'a str> {
    line.strip_prefix(field).map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
}

/// Decode one complete frame (without its trailing blank line)
pub fn decode_frame(frame: &[u8]) -> Result<Frame, FrameError> {
    let text = std::str::from_utf8(frame)?;

    let mut saw_comment = false;
    let mut lines = text.lines().filter(|line| {
        if line.starts_with(':') {
            saw_comment = true;
            false
        } else {
            !line.is_empty()
        }
    });

    let event_line = lines.next();
    let data_line = lines.next();
    if lines.next().is_some() {
        trace!("decode_frame: ignoring extra lines");
    }

    let event_line = match event_line {
        Some(line) => line,
        None if saw_comment => return Ok(Frame::KeepAlive),
        None => return Err(FrameError::MissingEvent),
    };
    let name = field_value(event_line, EVENT_FIELD).ok_or(FrameError::MissingEvent)?;
    let data = data_line
        .and_then(|line| field_value(line, DATA_FIELD))
        .ok_or(FrameError::MissingData)?;

    let value: serde_json::Value = serde_json::from_str(data)?;

    let kind = EventKind::from_name(name.trim());
    if !kind.is_known() {
        return Ok(Frame::Ignored(kind.name().to_string()));
    }

    Ok(Frame::Event(StreamEvent::from_json(kind, value)))
}
