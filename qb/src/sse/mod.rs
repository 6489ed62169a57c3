//! Server-Sent Events decoding for the plan-generation stream
//!
//! [`StreamDecoder`] is the synchronous frame decoder; [`EventStream`] drives
//! it from an async response body.

mod decoder;
mod event;
mod stream;

pub use decoder::{DecoderStats, Frame, FrameError, StreamDecoder, decode_frame};
pub use event::{EventKind, StreamEvent};
pub use stream::EventStream;
