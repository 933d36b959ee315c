//! HTTP server: a listener accepting connections and a session per connection.
//!
//! [`Listener`] and [`ServerSession`] are transport independent state machines, [`HttpServer`]
//! drives them over tokio TCP. Requests reach the application through the [`Handler`] trait.
//!
//! ```no_run
//! use reactor_http::protocol::Request;
//! use reactor_http::server::{HttpServer, ServerSession, make_handler};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let handler = make_handler(|session: &mut ServerSession, _request: Request| {
//!     session.respond(200, Some("text/plain"), "Hello World!\r\n");
//! });
//! HttpServer::builder().address("127.0.0.1", "8080").build()?.start(handler).await?;
//! # Ok(())
//! # }
//! ```

mod date;
mod handler;
mod http_server;
mod listener;
mod session;

pub use date::DateCache;
pub use handler::Handler;
pub use handler::HandlerFn;
pub use handler::make_handler;
pub use http_server::BoundServer;
pub use http_server::HttpServer;
pub use http_server::ServerBuildError;
pub use http_server::ServerBuilder;
pub use listener::Listener;
pub use listener::ListenerState;
pub use session::ServerSession;
