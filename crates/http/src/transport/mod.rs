//! The seam between the protocol state machines and the byte transport.
//!
//! Sessions never touch a socket. They queue [`Command`]s in an [`Outbox`] that a driver drains,
//! and the driver reports what the transport did through the session's `on_*` methods. The tokio
//! drivers in [`client`](crate::client) and [`server`](crate::server) are one such driver, tests
//! are another.

use std::collections::VecDeque;

use bytes::Bytes;

/// A request from a session to its transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// resolve `host` and connect to `service`, a port number or `http`
    Connect { host: String, service: String },
    Write(Bytes),
    /// shut the transport down, answered by `on_transport_closed`
    Close,
}

/// Commands queued by a session, drained in order by its driver.
#[derive(Debug, Default)]
pub struct Outbox {
    commands: VecDeque<Command>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, host: &str, service: &str) {
        self.commands.push_back(Command::Connect { host: host.to_owned(), service: service.to_owned() });
    }

    pub fn write(&mut self, bytes: Bytes) {
        self.commands.push_back(Command::Write(bytes));
    }

    pub fn close(&mut self) {
        self.commands.push_back(Command::Close);
    }

    pub fn pop(&mut self) -> Option<Command> {
        self.commands.pop_front()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Command> + '_ {
        self.commands.drain(..)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Lifecycle of a resource a state machine asked a driver to manage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkState {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

impl LinkState {
    #[inline]
    pub fn is_closed(self) -> bool {
        self == LinkState::Closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbox_keeps_order() {
        let mut outbox = Outbox::new();
        outbox.connect("localhost", "8080");
        outbox.write(Bytes::from_static(b"GET / HTTP/1.1\r\n\r\n"));
        outbox.close();
        assert_eq!(outbox.len(), 3);

        assert_eq!(outbox.pop(), Some(Command::Connect { host: "localhost".into(), service: "8080".into() }));
        let rest: Vec<_> = outbox.drain().collect();
        assert_eq!(rest, vec![Command::Write(Bytes::from_static(b"GET / HTTP/1.1\r\n\r\n")), Command::Close]);
        assert!(outbox.is_empty());
    }
}
