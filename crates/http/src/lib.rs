//! An event-driven HTTP/1.1 client and server engine
//!
//! This crate provides an incremental HTTP/1.1 parser and serializer, a single-exchange client
//! session and a multi-request server session, all written as state machines that never touch
//! a socket themselves. Thin tokio drivers run them over TCP.
//!
//! # Features
//!
//! - Incremental parsing of requests and responses, tolerant to any fragmentation
//! - Content-Length and chunked bodies, delivered whole or streamed
//! - Zero-copy messages: parsed parts are `Bytes` views of the receive buffer
//! - A cached `Date` field refreshed by a timer
//! - Sans-IO sessions that can be driven by any transport
//!
//! # Example
//!
//! ```no_run
//! use reactor_http::protocol::Request;
//! use reactor_http::server::{HttpServer, ServerSession, make_handler};
//! use tracing::{Level, error};
//! use tracing_subscriber::FmtSubscriber;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Initialize logging
//!     let subscriber = FmtSubscriber::builder()
//!         .with_max_level(Level::INFO)
//!         .finish();
//!     tracing::subscriber::set_global_default(subscriber)
//!         .expect("setting default subscriber failed");
//!
//!     let handler = make_handler(|session: &mut ServerSession, request: Request| {
//!         let path = String::from_utf8_lossy(request.path()).into_owned();
//!         session.respond(200, Some("text/plain"), format!("Hello {path}!\r\n"));
//!     });
//!
//!     let server = HttpServer::builder().address("127.0.0.1", "8080").name("reactor").build().expect("valid config");
//!     if let Err(e) = server.start(handler).await {
//!         error!(cause = %e, "server error");
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: message model, events, errors and the [`protocol::Observer`] seam
//! - [`codec`]: the incremental parser and the serializers
//! - [`transport`]: commands a session queues for its driver
//! - [`client`]: client session and its tokio driver
//! - [`server`]: listener, server session, handler trait and tokio driver
//!
//! # Limitations
//!
//! - HTTP/1.0 and HTTP/1.1 only, no TLS, `http://` urls only
//! - Maximum head size: 8KB
//! - At most 32 fields kept per message, heads with more than 128 lines are rejected

pub mod client;
pub mod codec;
pub mod protocol;
pub mod server;
pub mod transport;

mod utils;
pub(crate) use utils::ensure;
