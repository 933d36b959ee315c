use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, trace, warn};

use crate::client::{ClientEvent, ClientSession};
use crate::protocol::{Observer, TransportError};
use crate::transport::Command;

/// the capacity the receive buffer is topped up to before each read
const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Drives a [`ClientSession`] over a tokio [`TcpStream`].
#[derive(Debug)]
pub struct ClientConnection<O> {
    session: ClientSession<O>,
    stream: Option<TcpStream>,
    read_buf: BytesMut,
}

impl<O: Observer<ClientEvent>> ClientConnection<O> {
    pub fn new(session: ClientSession<O>) -> Self {
        Self { session, stream: None, read_buf: BytesMut::with_capacity(READ_BUFFER_SIZE) }
    }

    pub fn session(&self) -> &ClientSession<O> {
        &self.session
    }

    /// Runs the opened session until it is closed and returns it.
    ///
    /// When `shutdown` completes first the exchange is cancelled through
    /// [`ClientSession::close`], so the owner still sees exactly one `Close`.
    pub async fn run<F>(mut self, shutdown: F) -> ClientSession<O>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut cancelled = false;

        loop {
            self.flush().await;
            if self.session.is_closed() {
                break;
            }

            let Some(stream) = self.stream.as_mut() else {
                warn!("client session is waiting without a transport, closing it");
                self.session.close();
                continue;
            };

            if self.read_buf.capacity() - self.read_buf.len() < READ_BUFFER_SIZE / 4 {
                self.read_buf.reserve(READ_BUFFER_SIZE);
            }

            tokio::select! {
                () = &mut shutdown, if !cancelled => {
                    debug!(state = ?self.session.state(), "client exchange cancelled");
                    cancelled = true;
                    self.session.close();
                }
                read = stream.read_buf(&mut self.read_buf) => match read {
                    Ok(0) => self.session.on_end(),
                    Ok(n) => {
                        trace!(read_bytes = n, "receive response bytes");
                        self.session.on_data(&mut self.read_buf);
                    }
                    Err(e) => self.session.on_transport_error(TransportError::io(e)),
                },
            }
        }
        self.session
    }

    /// Executes the commands the session queued, feeding the outcomes back to it.
    async fn flush(&mut self) {
        while let Some(command) = self.session.outbox_mut().pop() {
            match command {
                Command::Connect { host, service } => match connect(&host, &service).await {
                    Ok(stream) => {
                        debug!(host = %host, service = %service, "connected");
                        self.stream = Some(stream);
                        self.session.on_connect();
                    }
                    Err(e) => self.session.on_transport_error(e),
                },

                Command::Write(bytes) => {
                    let Some(stream) = self.stream.as_mut() else {
                        warn!(len = bytes.len(), "drop write without a transport");
                        continue;
                    };
                    if let Err(e) = stream.write_all(&bytes).await {
                        self.session.on_transport_error(TransportError::io(e));
                    }
                }

                Command::Close => {
                    if let Some(mut stream) = self.stream.take() {
                        if let Err(e) = stream.shutdown().await {
                            debug!(cause = %e, "shutdown stream failed");
                        }
                    }
                    self.read_buf.clear();
                    self.session.on_transport_closed();
                }
            }
        }
    }
}

async fn connect(host: &str, service: &str) -> Result<TcpStream, TransportError> {
    let port = service_port(service)?;
    let stream = TcpStream::connect((host, port)).await.map_err(|e| TransportError::connect(host, service, e))?;
    if let Err(e) = stream.set_nodelay(true) {
        debug!(cause = %e, "set nodelay failed");
    }
    Ok(stream)
}

fn service_port(service: &str) -> Result<u16, TransportError> {
    if service.eq_ignore_ascii_case("http") {
        return Ok(80);
    }
    service.parse().map_err(|_| TransportError::invalid_service(service))
}
