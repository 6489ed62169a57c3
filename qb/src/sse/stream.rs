//! Async adapter from a response body to decoded events

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::Stream;
use tracing::debug;

use super::decoder::{DecoderStats, StreamDecoder};
use super::event::StreamEvent;

/// Lazy, single-pass sequence of events decoded from a byte stream
///
/// Yields events in arrival order. The end of the sequence is the completion
/// signal: once the body ends (or fails) the stream returns `None` forever.
/// A transport failure is yielded once as `Err` before the end.
pub struct EventStream<S> {
    body: S,
    decoder: StreamDecoder,
    pending: VecDeque<StreamEvent>,
    done: bool,
}

impl<S> EventStream<S> {
    pub fn new(body: S) -> Self {
        debug!("EventStream::new: called");
        Self {
            body,
            decoder: StreamDecoder::new(),
            pending: VecDeque::new(),
            done: false,
        }
    }

    /// Counters so far; final once the stream has ended
    pub fn stats(&self) -> &DecoderStats {
        self.decoder.stats()
    }

    pub fn is_done(&self) -> bool {
        self.done && self.pending.is_empty()
    }
}

impl<S, B, E> Stream for EventStream<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
{
    type Item = Result<StreamEvent, E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        loop {
            if let Some(event) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(event)));
            }
            if this.done {
                return Poll::Ready(None);
            }

            match ready!(Pin::new(&mut this.body).poll_next(cx)) {
                Some(Ok(chunk)) => {
                    let events = this.decoder.push(chunk.as_ref());
                    this.pending.extend(events);
                }
                Some(Err(e)) => {
                    debug!("EventStream::poll_next: transport error, ending stream");
                    this.done = true;
                    this.decoder.finish();
                    return Poll::Ready(Some(Err(e)));
                }
                None => {
                    let stats = this.decoder.finish();
                    debug!(?stats, "EventStream::poll_next: body complete");
                    this.done = true;
                }
            }
        }
    }
}
