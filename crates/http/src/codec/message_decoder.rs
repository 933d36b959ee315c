//! Incremental HTTP/1.1 message parser.
//!
//! [`MessageDecoder`] turns bytes appended to a receive buffer into [`Message`] events. It is a
//! [`Decoder`], so the same state machine serves a `FramedRead` as well as a session that feeds
//! its own buffer.
//!
//! # States
//!
//! - `Header`: parse the start line and header block, pick the body framing
//! - `Body`: wait for (whole) or hand out (streaming) `Content-Length` bytes
//! - `ChunkedBody`: walk chunk frames, compacting payloads in place in whole mode
//! - `Final`: yield the completed message, consume it, go back to `Header`
//! - `Closed`: after an error or [`MessageDecoder::close`], nothing is produced
//!
//! Nothing is consumed from the buffer in whole mode until the message completes: the decoder
//! only keeps offsets relative to the front of the buffer, so the buffer may grow or relocate
//! between calls. Consuming `n` bytes rebases the window by `-n`.

use std::cmp;

use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::{debug, error, trace};

use crate::codec::body::{BodyLength, ChunkFrame, body_length, parse_chunk};
use crate::codec::header::{Head, HeadIndex};
use crate::protocol::{Delivery, Message, ParseError, Request, Response, Span};

pub type RequestDecoder = MessageDecoder<Request>;
pub type ResponseDecoder = MessageDecoder<Response>;

pub struct MessageDecoder<H> {
    state: State,
    delivery: Delivery,
    index: HeadIndex,
    window: Window,
    /// the head already handed out in streaming mode, returned again on completion
    head: Option<H>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Header,
    Body,
    ChunkedBody,
    Final,
    Closed,
}

/// Bookkeeping offsets of the message being parsed, relative to the front of the buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    /// logical size of the message prefix parsed so far
    pub size: usize,
    /// where the content lives, compacted chunk payloads included
    pub content: Span,
    /// where the next chunk size line starts
    pub chunk_begin: usize,
}

impl Window {
    pub fn new(begin: usize) -> Self {
        Self { size: begin, content: Span::new(begin, begin), chunk_begin: begin }
    }

    pub fn rebase(&mut self, delta: isize) {
        self.size = self.size.saturating_add_signed(delta);
        self.content.rebase(delta);
        self.chunk_begin = self.chunk_begin.saturating_add_signed(delta);
    }
}

/// the outcome of one state step
enum Step<H> {
    Pending,
    Continue,
    Yield(Message<H>),
}

impl<H: Head> MessageDecoder<H> {
    /// Creates a decoder armed for a new message.
    pub fn new(delivery: Delivery) -> Self {
        Self { state: State::Header, delivery, index: HeadIndex::new(), window: Window::default(), head: None }
    }

    /// Re-arms the decoder, dropping whatever was parsed before.
    pub fn open(&mut self, delivery: Delivery) {
        self.delivery = delivery;
        self.reset();
        self.state = State::Header;
    }

    /// Forces the decoder into the closed state. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.state != State::Closed {
            trace!(kind = H::KIND, "close message decoder");
            self.state = State::Closed;
            self.reset();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state == State::Closed
    }

    pub fn delivery(&self) -> Delivery {
        self.delivery
    }

    fn reset(&mut self) {
        self.index.clear();
        self.window = Window::default();
        self.head = None;
    }

    /// Splits `n` bytes off the front of `src` and rebases the window.
    ///
    /// The head index is not rebased: it is only held while the message starts at the front,
    /// and it is materialized from the returned bytes.
    fn consume(&mut self, src: &mut BytesMut, n: usize) -> Bytes {
        let bytes = src.split_to(n).freeze();
        self.window.rebase(-isize::try_from(n).unwrap_or(isize::MAX));
        bytes
    }

    fn read_header(&mut self, src: &mut BytesMut) -> Result<Step<H>, ParseError> {
        let Some(head_len) = H::parse_head(src, &mut self.index)? else {
            return Ok(Step::Pending);
        };

        let body = body_length(&self.index, src)?;
        debug!(kind = H::KIND, head_len, ?body, delivery = ?self.delivery, "parsed message head");

        self.window = Window::new(head_len);
        self.state = match body {
            BodyLength::Chunked => State::ChunkedBody,
            BodyLength::Length(length) => {
                self.window.size = head_len
                    .checked_add(length)
                    .ok_or_else(|| ParseError::invalid_content_length(format!("value {length} is too large")))?;
                State::Body
            }
        };

        if !self.delivery.is_streaming() {
            return Ok(Step::Continue);
        }

        let head_bytes = self.consume(src, head_len);
        let head = H::from_index(&self.index, &head_bytes);
        self.index.clear();
        self.head = Some(head.clone());
        Ok(Step::Yield(Message::Header(head)))
    }

    fn read_body(&mut self, src: &mut BytesMut) -> Step<H> {
        if self.delivery.is_streaming() {
            let available = cmp::min(self.window.size, src.len());
            if available > 0 {
                trace!(len = available, "read body bytes");
                return Step::Yield(Message::Chunk(self.consume(src, available)));
            }
            if self.window.size > 0 {
                return Step::Pending;
            }
        } else if src.len() < self.window.size {
            return Step::Pending;
        }

        self.window.content = Span::new(self.window.content.start(), self.window.size);
        self.state = State::Final;
        Step::Continue
    }

    fn read_chunked_body(&mut self, src: &mut BytesMut) -> Result<Step<H>, ParseError> {
        let Some(frame) = parse_chunk(src, self.window.chunk_begin)? else {
            return Ok(Step::Pending);
        };

        match frame {
            ChunkFrame::Last { frame_end } => {
                trace!("finished reading chunked data");
                self.window.chunk_begin = frame_end;
                self.window.size = frame_end;
                if self.delivery.is_streaming() {
                    self.consume(src, frame_end);
                }
                self.state = State::Final;
                Ok(Step::Continue)
            }
            ChunkFrame::Data { payload, frame_end } if self.delivery.is_streaming() => {
                self.window.chunk_begin = frame_end;
                self.window.size = frame_end;
                let frame = self.consume(src, frame_end);
                trace!(len = payload.len(), "read chunked bytes");
                Ok(Step::Yield(Message::Chunk(payload.slice_of(&frame))))
            }
            ChunkFrame::Data { payload, frame_end } => {
                // the payload never moves forward, its source may overlap the destination
                let content = self.window.content;
                src.copy_within(payload.range(), content.end());
                self.window.content = Span::new(content.start(), content.end() + payload.len());
                self.window.chunk_begin = frame_end;
                self.window.size = frame_end;
                trace!(len = payload.len(), content_len = self.window.content.len(), "compacted chunked bytes");
                Ok(Step::Continue)
            }
        }
    }

    fn read_final(&mut self, src: &mut BytesMut) -> Step<H> {
        let content = self.window.content;
        let message_bytes = self.consume(src, self.window.size);

        let message = match self.head.take() {
            Some(head) => head,
            None => {
                let mut head = H::from_index(&self.index, &message_bytes);
                head.set_content(content.slice_of(&message_bytes));
                head
            }
        };

        debug!(kind = H::KIND, size = message_bytes.len(), "message complete");
        self.reset();
        self.state = State::Header;
        Step::Yield(Message::Complete(message))
    }
}

impl<H: Head> Default for MessageDecoder<H> {
    /// A closed decoder, [`MessageDecoder::open`] arms it.
    fn default() -> Self {
        Self { state: State::Closed, delivery: Delivery::Whole, index: HeadIndex::new(), window: Window::default(), head: None }
    }
}

impl<H: Head> Decoder for MessageDecoder<H> {
    type Item = Message<H>;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let step = match self.state {
                State::Closed => return Ok(None),
                State::Header => self.read_header(src),
                State::Body => Ok(self.read_body(src)),
                State::ChunkedBody => self.read_chunked_body(src),
                State::Final => Ok(self.read_final(src)),
            };

            match step {
                Ok(Step::Pending) => return Ok(None),
                Ok(Step::Continue) => {}
                Ok(Step::Yield(message)) => return Ok(Some(message)),
                Err(e) => {
                    error!(kind = H::KIND, cause = %e, "failed to parse message");
                    self.close();
                    return Err(e);
                }
            }
        }
    }
}

impl<H> std::fmt::Debug for MessageDecoder<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageDecoder")
            .field("state", &self.state)
            .field("delivery", &self.delivery)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}
