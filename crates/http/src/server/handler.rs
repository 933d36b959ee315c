use std::net::SocketAddr;

use tracing::{debug, warn};

use crate::protocol::{HttpError, Request};
use crate::server::ServerSession;

/// The owner of a listener and the sessions it accepts.
///
/// Callbacks run synchronously on the task driving the session or listener that produced them.
/// A request is answered by calling [`ServerSession::respond`] from [`Handler::on_request`].
pub trait Handler {
    fn on_request(&self, session: &mut ServerSession, request: Request);

    fn on_accept(&self, peer: SocketAddr) {
        debug!(%peer, "accepted connection");
    }

    fn on_error(&self, error: HttpError) {
        warn!(cause = %error, "http server error");
    }

    /// the listener and its resources are fully closed
    fn on_close(&self) {}
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&mut ServerSession, Request),
{
    fn on_request(&self, session: &mut ServerSession, request: Request) {
        (self.f)(session, request);
    }
}

/// Makes a [`Handler`] from a function, keeping the default notifications.
pub fn make_handler<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&mut ServerSession, Request),
{
    HandlerFn { f }
}
