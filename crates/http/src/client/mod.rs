//! HTTP client: one request, one response, one connection.
//!
//! [`ClientSession`] is the transport independent state machine, [`ClientConnection`] drives it
//! over tokio TCP, and [`fetch`] wraps both for the common case.
//!
//! ```no_run
//! # async fn run() -> Result<(), reactor_http::protocol::HttpError> {
//! let response = reactor_http::client::fetch("GET", "http://127.0.0.1:8080/", "").await?;
//! println!("{} {}", response.status(), String::from_utf8_lossy(response.content()));
//! # Ok(())
//! # }
//! ```

mod connection;
mod session;

pub use connection::ClientConnection;
pub use session::ClientEvent;
pub use session::ClientSession;
pub use session::ClientState;

use bytes::Bytes;

use crate::protocol::{Delivery, HttpError, Response, TransportError};

/// Sends `method url` with `content` and waits for the whole response.
pub async fn fetch(method: &str, url: &str, content: impl Into<Bytes>) -> Result<Response, HttpError> {
    let mut session = ClientSession::new(Vec::new());
    session.open(method, url, content, Delivery::Whole)?;

    let session = ClientConnection::new(session).run(std::future::pending()).await;
    for event in session.into_observer() {
        match event {
            ClientEvent::Response(response) => return Ok(response),
            ClientEvent::Error(e) => return Err(e),
            ClientEvent::Header(_) | ClientEvent::Chunk(_) | ClientEvent::Close => {}
        }
    }
    Err(TransportError::UnexpectedEof.into())
}
