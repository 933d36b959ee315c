use std::net::SocketAddr;

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, error, info, trace, warn};

use crate::codec::{RequestDecoder, ResponseEncoder};
use crate::protocol::{Delivery, Field, HttpError, Message, Request, Response, TransportError};
use crate::server::{DateCache, Handler};
use crate::transport::{LinkState, Outbox};

/// One accepted connection, answering any number of sequential requests.
#[derive(Debug)]
pub struct ServerSession {
    decoder: RequestDecoder,
    encoder: ResponseEncoder,
    link: LinkState,
    outbox: Outbox,
    date: DateCache,
    name: Option<Bytes>,
    peer: Option<SocketAddr>,
    responded: bool,
}

impl ServerSession {
    /// Creates an open session over an already connected transport.
    pub fn new(date: DateCache, name: Option<Bytes>, peer: Option<SocketAddr>) -> Self {
        Self {
            decoder: RequestDecoder::new(Delivery::Whole),
            encoder: ResponseEncoder,
            link: LinkState::Open,
            outbox: Outbox::new(),
            date,
            name,
            peer,
            responded: false,
        }
    }

    /// The remote address of the connection, if the transport has one.
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    pub fn is_open(&self) -> bool {
        self.link == LinkState::Open
    }

    pub fn is_closed(&self) -> bool {
        self.link.is_closed()
    }

    pub fn outbox_mut(&mut self) -> &mut Outbox {
        &mut self.outbox
    }

    /// Parses what has been received so far, handing each complete request to `handler`.
    pub fn on_data<H: Handler + ?Sized>(&mut self, src: &mut BytesMut, handler: &H) {
        while self.is_open() {
            match self.decoder.decode(src) {
                Ok(None) => break,
                Ok(Some(Message::Complete(request))) => self.dispatch(request, handler),
                Ok(Some(Message::Header(_) | Message::Chunk(_))) => {}
                Err(e) => {
                    self.close();
                    handler.on_error(e.into());
                }
            }
        }
    }

    fn dispatch<H: Handler + ?Sized>(&mut self, request: Request, handler: &H) {
        let close_requested = request.is_close_requested();
        debug!(
            peer = ?self.peer,
            method = %String::from_utf8_lossy(request.method()),
            path = %String::from_utf8_lossy(request.path()),
            "receive request"
        );

        self.responded = false;
        handler.on_request(self, request);

        if close_requested && self.responded {
            trace!("peer asked to close after the response");
            self.close();
        }
    }

    /// Answers the current request.
    ///
    /// The response carries the reason phrase for `status`, a `Server` field when the listener was
    /// named, the cached `Date` and `content_type` when given.
    pub fn respond(&mut self, status: u16, content_type: Option<&str>, content: impl Into<Bytes>) {
        self.respond_with_fields(status, content_type, content, []);
    }

    /// Same as [`ServerSession::respond`], with `fields` appended after the standard ones.
    pub fn respond_with_fields<I>(&mut self, status: u16, content_type: Option<&str>, content: impl Into<Bytes>, fields: I)
    where
        I: IntoIterator<Item = Field>,
    {
        if !self.is_open() {
            warn!(status, link = ?self.link, "drop response on a session that is not open");
            return;
        }

        let mut response = Response::new(status, content);
        if let Some(name) = &self.name {
            response.add_header_field("Server", name.clone());
        }
        response.add_header_field("Date", self.date.load());
        if let Some(content_type) = content_type {
            response.add_header_field("Content-Type", Bytes::copy_from_slice(content_type.as_bytes()));
        }
        response.fields_mut().extend(fields);

        let mut buf = BytesMut::new();
        match self.encoder.encode(&response, &mut buf) {
            Ok(()) => {
                info!(peer = ?self.peer, status, content_len = response.content().len(), "send response");
                self.outbox.write(buf.freeze());
                self.responded = true;
            }
            Err(e) => error!(cause = %e, "failed to encode response"),
        }
    }

    /// The peer ended its side of the stream.
    pub fn on_end(&mut self) {
        trace!(peer = ?self.peer, "server stream ended");
        self.close();
    }

    pub fn on_transport_error<H: Handler + ?Sized>(&mut self, error: TransportError, handler: &H) {
        let was_open = self.is_open();
        self.close();
        if was_open {
            handler.on_error(HttpError::from(error));
        }
    }

    pub fn on_transport_closed(&mut self) {
        self.link = LinkState::Closed;
        self.decoder.close();
        debug!(peer = ?self.peer, "server session closed");
    }

    /// Stops reading and asks the transport to shut down after queued writes.
    pub fn close(&mut self) {
        if self.is_open() {
            self.link = LinkState::Closing;
            self.decoder.close();
            self.outbox.close();
        }
    }
}
