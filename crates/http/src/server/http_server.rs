use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, trace};

use crate::protocol::{HttpError, TransportError};
use crate::server::{Handler, Listener, ServerSession};
use crate::transport::{Command, LinkState};

const DEFAULT_NODE: &str = "0.0.0.0";
const DEFAULT_SERVICE: &str = "http";
const DEFAULT_DATE_INTERVAL: Duration = Duration::from_secs(1);

/// the capacity the receive buffer is topped up to before each read
const READ_BUFFER_SIZE: usize = 8 * 1024;

#[derive(Debug)]
pub struct ServerBuilder {
    node: Option<String>,
    service: Option<String>,
    name: Option<String>,
    date_interval: Duration,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { node: None, service: None, name: None, date_interval: DEFAULT_DATE_INTERVAL }
    }

    /// The address to listen on, `node` a host name or ip, `service` a port or `http`.
    pub fn address(mut self, node: impl Into<String>, service: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self.service = Some(service.into());
        self
    }

    /// Sent as the `Server` field of every response.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// How often the cached `Date` value is refreshed.
    pub fn date_interval(mut self, date_interval: Duration) -> Self {
        self.date_interval = date_interval;
        self
    }

    pub fn build(self) -> Result<HttpServer, ServerBuildError> {
        let node = self.node.unwrap_or_else(|| DEFAULT_NODE.to_owned());
        let service = self.service.unwrap_or_else(|| DEFAULT_SERVICE.to_owned());
        let port = if service.eq_ignore_ascii_case("http") {
            80
        } else {
            service.parse::<u16>().map_err(|_| ServerBuildError::InvalidService { service: service.clone() })?
        };

        if self.date_interval.is_zero() {
            return Err(ServerBuildError::ZeroDateInterval);
        }

        Ok(HttpServer { node, port, name: self.name.map(Bytes::from), date_interval: self.date_interval })
    }
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("invalid service: {service}, expect a port number or `http`")]
    InvalidService { service: String },
    #[error("date interval must not be zero")]
    ZeroDateInterval,
}

/// A configured server, not yet bound.
#[derive(Debug, Clone)]
pub struct HttpServer {
    node: String,
    port: u16,
    name: Option<Bytes>,
    date_interval: Duration,
}

impl HttpServer {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Binds the listening socket and opens the listener.
    pub async fn bind(self) -> Result<BoundServer, HttpError> {
        info!(node = %self.node, port = self.port, "start listening");
        let tcp_listener = TcpListener::bind((self.node.as_str(), self.port)).await.map_err(|e| {
            error!(cause = %e, "bind server error");
            TransportError::io(e)
        })?;

        let mut listener = Listener::new(self.name);
        listener.open()?;
        Ok(BoundServer { tcp_listener, listener, date_interval: self.date_interval })
    }

    /// Binds and serves until ctrl-c.
    pub async fn start<H>(self, handler: H) -> Result<(), HttpError>
    where
        H: Handler + Send + Sync + 'static,
    {
        let server = self.bind().await?;
        server
            .serve(Arc::new(handler), async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!(cause = %e, "failed to listen for ctrl-c");
                }
            })
            .await;
        Ok(())
    }
}

/// A bound server, ready to accept connections.
#[derive(Debug)]
pub struct BoundServer {
    tcp_listener: TcpListener,
    listener: Listener,
    date_interval: Duration,
}

impl BoundServer {
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.tcp_listener.local_addr()
    }

    /// Accepts connections until `shutdown` completes, one task per connection.
    ///
    /// Connections already accepted keep running after this returns.
    pub async fn serve<H, F>(self, handler: Arc<H>, shutdown: F)
    where
        H: Handler + Send + Sync + 'static,
        F: Future<Output = ()>,
    {
        let BoundServer { tcp_listener, mut listener, date_interval } = self;
        let mut acceptor = Some(tcp_listener);
        let mut ticker = tokio::time::interval_at(Instant::now() + date_interval, date_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            if listener.acceptor_state() == LinkState::Closing {
                drop(acceptor.take());
                listener.on_acceptor_closed(handler.as_ref());
            }
            if listener.timer_state() == LinkState::Closing {
                listener.on_timer_closed(handler.as_ref());
            }
            if listener.is_closed() {
                break;
            }
            let Some(tcp_listener) = acceptor.as_ref() else {
                listener.close(handler.as_ref());
                continue;
            };

            tokio::select! {
                () = &mut shutdown => {
                    info!("shutdown requested");
                    listener.close(handler.as_ref());
                }
                _ = ticker.tick() => listener.on_tick(),
                accepted = tcp_listener.accept() => match accepted {
                    Ok((tcp_stream, peer)) => spawn_session(&mut listener, tcp_stream, peer, &handler),
                    Err(e) => {
                        error!(cause = %e, "failed to accept");
                        listener.on_accept_error(TransportError::io(e), handler.as_ref());
                    }
                },
            }
        }
        info!("server stopped");
    }
}

fn spawn_session<H>(listener: &mut Listener, tcp_stream: TcpStream, peer: SocketAddr, handler: &Arc<H>)
where
    H: Handler + Send + Sync + 'static,
{
    if let Err(e) = tcp_stream.set_nodelay(true) {
        listener.on_accept_error(TransportError::io(e), handler.as_ref());
        return;
    }
    let Some(session) = listener.accept(peer, handler.as_ref()) else {
        return;
    };

    let handler = Arc::clone(handler);
    tokio::spawn(async move {
        run_session(tcp_stream, session, handler).await;
    });
}

/// Drives one [`ServerSession`] over its stream until the session is closed.
async fn run_session<H: Handler>(tcp_stream: TcpStream, mut session: ServerSession, handler: Arc<H>) {
    let (mut reader, mut writer) = tcp_stream.into_split();
    let mut read_buf = BytesMut::with_capacity(READ_BUFFER_SIZE);

    loop {
        while let Some(command) = session.outbox_mut().pop() {
            match command {
                Command::Write(bytes) => {
                    if let Err(e) = writer.write_all(&bytes).await {
                        session.on_transport_error(TransportError::io(e), handler.as_ref());
                    }
                }
                Command::Close => {
                    if let Err(e) = writer.shutdown().await {
                        debug!(cause = %e, "shutdown stream failed");
                    }
                    session.on_transport_closed();
                }
                Command::Connect { host, service } => {
                    error!(host = %host, service = %service, "server session can't connect");
                }
            }
        }
        if session.is_closed() {
            break;
        }

        if read_buf.capacity() - read_buf.len() < READ_BUFFER_SIZE / 4 {
            read_buf.reserve(READ_BUFFER_SIZE);
        }

        match reader.read_buf(&mut read_buf).await {
            Ok(0) => session.on_end(),
            Ok(n) => {
                trace!(read_bytes = n, "receive request bytes");
                session.on_data(&mut read_buf, handler.as_ref());
            }
            Err(e) => session.on_transport_error(TransportError::io(e), handler.as_ref()),
        }
    }
    debug!(peer = ?session.peer(), "finished process, connection shutdown");
}
