use std::io::{self, Read, Write};

/// Source of inbound connections, polled without blocking.
pub trait Listener {
    type Client: Client;

    /// Returns a newly arrived connection, or `None` when nobody is waiting.
    fn accept(&mut self) -> io::Result<Option<Self::Client>>;

    /// Whether the network link is up. While it is down the engine does not
    /// run at all.
    fn link_up(&self) -> bool {
        true
    }

    /// Stops accepting connections.
    fn close(&mut self) {}
}

/// One accepted connection.
///
/// No method may block. The engine only reads after [`Client::available`]
/// reported pending bytes, and never more than that. Output goes through
/// [`Write`]: writes are accepted into a buffer, and `flush` pushes out as
/// much of it as the peer takes right now.
pub trait Client: Read + Write {
    /// Number of bytes that can be read right now.
    fn available(&mut self) -> usize;

    /// Whether the peer is still connected.
    fn connected(&mut self) -> bool;

    /// Bytes accepted by `write` that have not reached the peer yet. The
    /// engine holds back further body chunks until this drops to zero.
    fn pending(&self) -> usize {
        0
    }

    /// Closes the connection without waiting for buffered output.
    fn stop(&mut self);
}
