use std::net::SocketAddr;

use bytes::Bytes;
use tracing::{debug, info, trace};

use crate::ensure;
use crate::protocol::{TransportError, UsageError};
use crate::server::{DateCache, Handler, ServerSession};
use crate::transport::LinkState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Closed,
    Listening,
    Closing,
}

/// The accept side of a server, independent of any socket.
///
/// A listener owns two resources managed by its driver: the acceptor and the timer refreshing
/// the [`DateCache`]. Closing marks both `Closing`; the driver releases them and confirms with
/// [`Listener::on_acceptor_closed`] and [`Listener::on_timer_closed`]. Sessions are not owned by
/// the listener and outlive it.
#[derive(Debug)]
pub struct Listener {
    state: ListenerState,
    acceptor: LinkState,
    timer: LinkState,
    date: DateCache,
    name: Option<Bytes>,
}

impl Listener {
    /// `name`, when set, is sent as the `Server` field of every response.
    pub fn new(name: Option<Bytes>) -> Self {
        Self { state: ListenerState::Closed, acceptor: LinkState::Closed, timer: LinkState::Closed, date: DateCache::new(), name }
    }

    pub fn open(&mut self) -> Result<(), UsageError> {
        ensure!(self.state == ListenerState::Closed, UsageError::AlreadyOpen);
        self.date.refresh();
        self.acceptor = LinkState::Open;
        self.timer = LinkState::Open;
        self.state = ListenerState::Listening;
        info!("listener open");
        Ok(())
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == ListenerState::Closed
    }

    pub fn acceptor_state(&self) -> LinkState {
        self.acceptor
    }

    pub fn timer_state(&self) -> LinkState {
        self.timer
    }

    pub fn date(&self) -> &DateCache {
        &self.date
    }

    /// The date timer fired.
    pub fn on_tick(&self) {
        if self.state == ListenerState::Listening {
            self.date.refresh();
            trace!("refreshed date");
        }
    }

    /// Creates the session for a connection accepted from `peer`.
    ///
    /// Returns `None` once the listener stopped listening, the connection is to be dropped.
    pub fn accept<H: Handler + ?Sized>(&mut self, peer: SocketAddr, handler: &H) -> Option<ServerSession> {
        if self.state != ListenerState::Listening {
            debug!(%peer, state = ?self.state, "drop connection accepted while not listening");
            return None;
        }
        let session = ServerSession::new(self.date.clone(), self.name.clone(), Some(peer));
        handler.on_accept(peer);
        Some(session)
    }

    /// Accepting a connection or setting up its session failed.
    pub fn on_accept_error<H: Handler + ?Sized>(&self, error: TransportError, handler: &H) {
        if self.state == ListenerState::Listening {
            handler.on_error(error.into());
        }
    }

    /// Stops listening. Safe to call in any state, the handler is told once everything is closed.
    pub fn close<H: Handler + ?Sized>(&mut self, handler: &H) {
        if self.state == ListenerState::Closed {
            return;
        }

        if self.state != ListenerState::Closing {
            info!("closing listener");
            self.state = ListenerState::Closing;
            if !self.acceptor.is_closed() {
                self.acceptor = LinkState::Closing;
            }
            if !self.timer.is_closed() {
                self.timer = LinkState::Closing;
            }
        }

        if self.acceptor.is_closed() && self.timer.is_closed() {
            self.state = ListenerState::Closed;
            info!("listener closed");
            handler.on_close();
        }
    }

    pub fn on_acceptor_closed<H: Handler + ?Sized>(&mut self, handler: &H) {
        self.acceptor = LinkState::Closed;
        self.close(handler);
    }

    pub fn on_timer_closed<H: Handler + ?Sized>(&mut self, handler: &H) {
        self.timer = LinkState::Closed;
        self.close(handler);
    }
}
