use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, error, info, trace, warn};

use crate::codec::{RequestEncoder, ResponseDecoder};
use crate::ensure;
use crate::protocol::{Delivery, HttpError, Message, Observer, Request, Response, TransportError, UsageError, Url};
use crate::transport::{LinkState, Outbox};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Closed,
    Connecting,
    Connected,
    Closing,
}

/// What a client session tells its owner.
///
/// Every exchange ends with exactly one `Response` or `Error`, followed by `Close`.
#[derive(Debug)]
pub enum ClientEvent {
    Error(HttpError),
    /// streaming only, the response head
    Header(Response),
    /// streaming only, a piece of content
    Chunk(Bytes),
    /// the complete response, content included unless streaming
    Response(Response),
    Close,
}

/// A single request/response exchange over its own connection.
///
/// The session is a state machine driven from outside: [`ClientSession::open`] queues a connect
/// command, the driver answers with [`on_connect`](ClientSession::on_connect), feeds received
/// bytes to [`on_data`](ClientSession::on_data), and confirms shutdown with
/// [`on_transport_closed`](ClientSession::on_transport_closed).
#[derive(Debug)]
pub struct ClientSession<O> {
    state: ClientState,
    observer: O,
    url: Option<Url>,
    request: Request,
    decoder: ResponseDecoder,
    encoder: RequestEncoder,
    link: LinkState,
    outbox: Outbox,
}

impl<O: Observer<ClientEvent>> ClientSession<O> {
    pub fn new(observer: O) -> Self {
        Self {
            state: ClientState::Closed,
            observer,
            url: None,
            request: Request::default(),
            decoder: ResponseDecoder::default(),
            encoder: RequestEncoder,
            link: LinkState::Closed,
            outbox: Outbox::new(),
        }
    }

    /// Starts an exchange: `method url` carrying `content`, the response delivered per `delivery`.
    ///
    /// Fails without side effects if the session is not closed or the url is not
    /// `http://host[:service][/path]`.
    pub fn open(&mut self, method: &str, url: &str, content: impl Into<Bytes>, delivery: Delivery) -> Result<(), UsageError> {
        ensure!(self.state == ClientState::Closed, UsageError::NotClosed);
        let url = Url::parse(url)?;

        let mut request = Request::outbound(Bytes::copy_from_slice(method.as_bytes()), url.clone(), content);
        request.add_header_field("Connection", "close");
        if !request.content().is_empty() {
            request.add_header_field("Content-Length", request.content().len().to_string());
        }

        info!(method, host = url.host(), service = url.service(), path = url.path(), "open client session");
        self.decoder.open(delivery);
        self.outbox.connect(url.host(), url.service());
        self.link = LinkState::Opening;
        self.request = request;
        self.url = Some(url);
        self.state = ClientState::Connecting;
        Ok(())
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == ClientState::Closed
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    pub fn outbox_mut(&mut self) -> &mut Outbox {
        &mut self.outbox
    }

    /// The transport connected, the request is serialized and queued.
    pub fn on_connect(&mut self) {
        if self.state != ClientState::Connecting {
            warn!(state = ?self.state, "unexpected connect notification");
            return;
        }
        debug!("client session connected");
        self.link = LinkState::Open;
        self.state = ClientState::Connected;

        let mut buf = BytesMut::new();
        match self.encoder.encode(&self.request, &mut buf) {
            Ok(()) => self.outbox.write(buf.freeze()),
            Err(e) => self.fail(e.into()),
        }
    }

    /// Parses what has been received so far. Consumed bytes are split off `src`.
    pub fn on_data(&mut self, src: &mut BytesMut) {
        while self.state == ClientState::Connected {
            match self.decoder.decode(src) {
                Ok(None) => break,
                Ok(Some(Message::Header(response))) => self.observer.notify(ClientEvent::Header(response)),
                Ok(Some(Message::Chunk(chunk))) => self.observer.notify(ClientEvent::Chunk(chunk)),
                Ok(Some(Message::Complete(response))) => {
                    info!(status = response.status(), content_len = response.content().len(), "received response");
                    self.observer.notify(ClientEvent::Response(response));
                    self.close();
                }
                Err(e) => self.fail(e.into()),
            }
        }
    }

    /// The peer ended its side of the stream before the response completed.
    pub fn on_end(&mut self) {
        trace!(state = ?self.state, "client stream ended");
        self.fail(TransportError::UnexpectedEof.into());
    }

    pub fn on_transport_error(&mut self, error: TransportError) {
        self.fail(error.into());
    }

    /// The transport is shut down, answering a close command or on its own.
    pub fn on_transport_closed(&mut self) {
        self.link = LinkState::Closed;
        if matches!(self.state, ClientState::Connecting | ClientState::Connected) {
            self.fail(TransportError::UnexpectedEof.into());
        } else {
            self.close();
        }
    }

    /// Ends the exchange. Safe to call in any state, the owner is told `Close` exactly once.
    pub fn close(&mut self) {
        if self.state == ClientState::Closed {
            return;
        }

        if self.state != ClientState::Closing {
            debug!(state = ?self.state, "closing client session");
            self.state = ClientState::Closing;
            if !self.link.is_closed() {
                self.link = LinkState::Closing;
                self.outbox.close();
            }
            self.decoder.close();
        }

        if self.link.is_closed() && self.decoder.is_closed() {
            self.state = ClientState::Closed;
            self.url = None;
            self.request = Request::default();
            debug!("client session closed");
            self.observer.notify(ClientEvent::Close);
        }
    }

    fn fail(&mut self, error: HttpError) {
        if matches!(self.state, ClientState::Connecting | ClientState::Connected) {
            error!(cause = %error, "client session failed");
            self.observer.notify(ClientEvent::Error(error));
        }
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Command;

    fn open_session(delivery: Delivery) -> ClientSession<Vec<ClientEvent>> {
        let mut session = ClientSession::new(Vec::new());
        session.open("GET", "http://example.com:8080/index.html", Bytes::new(), delivery).unwrap();
        session
    }

    fn written(session: &mut ClientSession<Vec<ClientEvent>>) -> Vec<Command> {
        session.outbox_mut().drain().collect()
    }

    #[test]
    fn test_open_queues_connect() {
        let mut session = open_session(Delivery::Whole);
        assert_eq!(session.state(), ClientState::Connecting);
        assert_eq!(written(&mut session), vec![Command::Connect { host: "example.com".into(), service: "8080".into() }]);

        session.on_connect();
        assert_eq!(session.state(), ClientState::Connected);
        let expected = "GET /index.html HTTP/1.1\r\nHost: example.com:8080\r\nConnection: close\r\n\r\n";
        assert_eq!(written(&mut session), vec![Command::Write(Bytes::from(expected))]);
    }

    #[test]
    fn test_open_with_content() {
        let mut session = ClientSession::new(Vec::new());
        session.open("POST", "http://localhost/submit", "abc", Delivery::Whole).unwrap();
        written(&mut session);
        session.on_connect();

        let expected = "POST /submit HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Length: 3\r\n\r\nabc";
        assert_eq!(written(&mut session), vec![Command::Write(Bytes::from(expected))]);
    }

    #[test]
    fn test_open_while_not_closed() {
        let mut session = open_session(Delivery::Whole);
        written(&mut session);

        let result = session.open("GET", "http://other/", Bytes::new(), Delivery::Whole);
        assert_eq!(result, Err(UsageError::NotClosed));
        assert_eq!(session.state(), ClientState::Connecting);
        assert_eq!(session.url().unwrap().host(), "example.com");
        assert!(session.outbox_mut().is_empty());
        assert!(session.observer().is_empty());
    }

    #[test]
    fn test_open_invalid_url() {
        let mut session = ClientSession::new(Vec::new());
        assert!(matches!(session.open("GET", "ftp://example.com/", Bytes::new(), Delivery::Whole), Err(UsageError::InvalidUrl { .. })));
        assert!(session.is_closed());
        assert!(session.outbox_mut().is_empty());
    }

    #[test]
    fn test_response_split_anywhere() {
        let wire = b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nhi";
        for split in 0..=wire.len() {
            let mut session = open_session(Delivery::Whole);
            session.on_connect();
            written(&mut session);

            let mut src = BytesMut::from(&wire[..split]);
            session.on_data(&mut src);
            src.extend_from_slice(&wire[split..]);
            session.on_data(&mut src);

            assert_eq!(session.state(), ClientState::Closing, "split {split}");
            assert_eq!(written(&mut session), vec![Command::Close]);
            session.on_transport_closed();
            assert!(session.is_closed());
            assert!(session.url().is_none());

            let events = session.into_observer();
            assert_eq!(events.len(), 2, "split {split}");
            let ClientEvent::Response(response) = &events[0] else { panic!("expected a response") };
            assert_eq!(response.status(), 200);
            assert_eq!(response.content(), "hi");
            assert!(matches!(events[1], ClientEvent::Close));
        }
    }

    #[test]
    fn test_streaming_events() {
        let mut session = open_session(Delivery::Streaming);
        session.on_connect();
        written(&mut session);

        let mut src = BytesMut::from("HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n");
        session.on_data(&mut src);
        session.on_transport_closed();

        let events = session.into_observer();
        assert_eq!(events.len(), 4);
        assert!(matches!(&events[0], ClientEvent::Header(head) if head.status() == 200));
        assert!(matches!(&events[1], ClientEvent::Chunk(chunk) if chunk == "hello"));
        assert!(matches!(&events[2], ClientEvent::Response(response) if response.content().is_empty()));
        assert!(matches!(events[3], ClientEvent::Close));
    }

    #[test]
    fn test_parse_error_then_close() {
        let mut session = open_session(Delivery::Whole);
        session.on_connect();
        written(&mut session);

        let mut src = BytesMut::from("NOT HTTP\r\n\r\n");
        session.on_data(&mut src);
        assert_eq!(written(&mut session), vec![Command::Close]);
        session.on_transport_closed();

        let events = session.into_observer();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ClientEvent::Error(HttpError::ParseError { .. })));
        assert!(matches!(events[1], ClientEvent::Close));
    }

    #[test]
    fn test_connect_failure() {
        let mut session = open_session(Delivery::Whole);
        written(&mut session);

        let cause = std::io::Error::from(std::io::ErrorKind::ConnectionRefused);
        session.on_transport_error(TransportError::connect("example.com", "8080", cause));
        assert_eq!(session.state(), ClientState::Closing);
        assert_eq!(written(&mut session), vec![Command::Close]);

        session.on_transport_closed();
        let events = session.into_observer();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ClientEvent::Error(HttpError::TransportError { source: TransportError::Connect { .. } })));
        assert!(matches!(events[1], ClientEvent::Close));
    }

    #[test]
    fn test_end_of_stream_mid_response() {
        let mut session = open_session(Delivery::Whole);
        session.on_connect();
        written(&mut session);

        let mut src = BytesMut::from("HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nabc");
        session.on_data(&mut src);
        session.on_end();
        session.on_transport_closed();

        let events = session.into_observer();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ClientEvent::Error(HttpError::TransportError { source: TransportError::UnexpectedEof })));
        assert!(matches!(events[1], ClientEvent::Close));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut session = open_session(Delivery::Whole);
        session.close();
        session.close();
        session.on_end();
        assert_eq!(written(&mut session), vec![Command::Connect { host: "example.com".into(), service: "8080".into() }, Command::Close]);

        session.on_transport_closed();
        session.close();
        assert!(session.is_closed());

        let events = session.into_observer();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ClientEvent::Close));
    }

    #[test]
    fn test_reopen_after_close() {
        let mut session = open_session(Delivery::Whole);
        session.close();
        session.on_transport_closed();
        assert!(session.open("GET", "http://example.com/", Bytes::new(), Delivery::Whole).is_ok());
        assert_eq!(session.state(), ClientState::Connecting);
    }
}
