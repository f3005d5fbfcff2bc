//! Incremental JSON array encoding
//!
//! Turns a stream of serializable items into the byte chunks of one JSON
//! array: `[` as soon as the encoder is first polled, one chunk per item
//! (prefixed by `,` after the first), and `]` once the input ends.

use crate::error::{Error, Result};
use bytes::Bytes;
use futures::ready;
use futures::stream::Stream;
use pin_project_lite::pin_project;
use serde::Serialize;
use std::pin::Pin;
use std::task::{Context, Poll};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// `[` not yet written
    Open,
    /// Waiting for the first element
    First,
    /// At least one element written
    Rest,
    /// `]` written, or the input failed
    Done,
}

pin_project! {
    /// Stream adapter producing the chunks of a JSON array
    ///
    /// Single pass: the input is polled at most once per output chunk and
    /// nothing is buffered beyond the current element. An error from the
    /// input is yielded once and ends the array without a closing bracket.
    #[must_use = "streams do nothing unless polled"]
    pub struct JsonArrayEncoder<S> {
        #[pin]
        items: S,
        state: State,
        written: usize,
    }
}

impl<S> JsonArrayEncoder<S> {
    /// Wrap an item stream
    pub fn new(items: S) -> Self {
        Self {
            items,
            state: State::Open,
            written: 0,
        }
    }

    /// Number of elements encoded so far
    pub fn written(&self) -> usize {
        self.written
    }
}

/// Encode a stream of items as a streamed JSON array
pub fn encode_json_array<S>(items: S) -> JsonArrayEncoder<S> {
    JsonArrayEncoder::new(items)
}

impl<S, T> Stream for JsonArrayEncoder<S>
where
    S: Stream<Item = Result<T>>,
    T: Serialize,
{
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();

        match *this.state {
            State::Open => {
                *this.state = State::First;
                Poll::Ready(Some(Ok(Bytes::from_static(b"["))))
            }
            State::First | State::Rest => match ready!(this.items.poll_next(cx)) {
                Some(Ok(item)) => {
                    let mut chunk = Vec::with_capacity(256);
                    if *this.state == State::Rest {
                        chunk.push(b',');
                    }
                    if let Err(e) = serde_json::to_writer(&mut chunk, &item) {
                        *this.state = State::Done;
                        return Poll::Ready(Some(Err(Error::from(e))));
                    }
                    *this.state = State::Rest;
                    *this.written += 1;
                    Poll::Ready(Some(Ok(Bytes::from(chunk))))
                }
                Some(Err(e)) => {
                    *this.state = State::Done;
                    Poll::Ready(Some(Err(e)))
                }
                None => {
                    *this.state = State::Done;
                    Poll::Ready(Some(Ok(Bytes::from_static(b"]"))))
                }
            },
            State::Done => Poll::Ready(None),
        }
    }
}
