//! [`Listener`] and [`Client`] over tokio sockets, driven without awaiting.
//!
//! The engine's tick is synchronous, so nothing here ever awaits. Accepts go
//! through `poll_accept` with a no-op waker and I/O through `try_read` and
//! `try_write`; readiness is refreshed by the runtime between ticks, so these
//! types must be created and used inside a tokio runtime.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr};
use std::task::{Context, Poll, Waker};

use bytes::{Buf, BytesMut};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::server::listener::{Client, Listener};

/// Most request bytes pulled off the socket per `available()` call.
const INBOUND_LEN: usize = 64;

/// Listening socket polled for new connections.
#[derive(Debug)]
pub struct TcpAcceptor {
    listener: Option<TcpListener>,
    local_addr: SocketAddr,
}

impl TcpAcceptor {
    pub async fn bind(addr: &str) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("Listening on {}", local_addr);

        Ok(Self {
            listener: Some(listener),
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl Listener for TcpAcceptor {
    type Client = TcpClient;

    fn accept(&mut self) -> io::Result<Option<TcpClient>> {
        let Some(listener) = &self.listener else {
            return Ok(None);
        };

        let mut cx = Context::from_waker(Waker::noop());
        match listener.poll_accept(&mut cx) {
            Poll::Ready(Ok((stream, peer))) => {
                info!("Accepted connection from {}", peer);
                TcpClient::new(stream, peer).map(Some)
            }
            Poll::Ready(Err(e)) => Err(e),
            Poll::Pending => Ok(None),
        }
    }

    fn close(&mut self) {
        if self.listener.take().is_some() {
            info!("Stopped listening on {}", self.local_addr);
        }
    }
}

/// Accepted TCP connection.
///
/// Request bytes are staged in `inbound` so `available()` can report them
/// before they are read. Writes land in `outbound` and are pushed out as far
/// as the socket takes them; [`Client::pending`] reports the rest.
#[derive(Debug)]
pub struct TcpClient {
    stream: Option<TcpStream>,
    peer: SocketAddr,
    inbound: BytesMut,
    outbound: BytesMut,
    connected: bool,
}

impl TcpClient {
    fn new(stream: TcpStream, peer: SocketAddr) -> io::Result<Self> {
        stream.set_nodelay(true)?;

        Ok(Self {
            stream: Some(stream),
            peer,
            inbound: BytesMut::with_capacity(INBOUND_LEN),
            outbound: BytesMut::with_capacity(4096),
            connected: true,
        })
    }

    /// Pulls whatever request bytes have arrived into `inbound`.
    fn fill(&mut self) {
        let Some(stream) = &self.stream else {
            return;
        };
        let room = INBOUND_LEN.saturating_sub(self.inbound.len());
        if room == 0 {
            return;
        }

        let mut chunk = [0u8; INBOUND_LEN];
        match stream.try_read(&mut chunk[..room]) {
            Ok(0) => self.connected = false,
            Ok(n) => self.inbound.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(e) => {
                debug!(peer = %self.peer, error = %e, "read failed");
                self.connected = false;
            }
        }
    }

    fn drain(&mut self) -> io::Result<()> {
        let Some(stream) = &self.stream else {
            return Err(io::ErrorKind::NotConnected.into());
        };

        while !self.outbound.is_empty() {
            match stream.try_write(&self.outbound) {
                Ok(0) => {
                    self.connected = false;
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "connection closed while writing",
                    ));
                }
                Ok(n) => self.outbound.advance(n),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.connected = false;
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}

impl Read for TcpClient {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.inbound.is_empty() {
            self.fill();
        }
        if self.inbound.is_empty() {
            return if self.connected {
                Err(io::ErrorKind::WouldBlock.into())
            } else {
                Ok(0)
            };
        }

        let n = buf.len().min(self.inbound.len());
        buf[..n].copy_from_slice(&self.inbound[..n]);
        self.inbound.advance(n);
        Ok(n)
    }
}

impl Write for TcpClient {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.outbound.extend_from_slice(buf);
        self.drain()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.drain()
    }
}

impl Client for TcpClient {
    fn available(&mut self) -> usize {
        self.fill();
        self.inbound.len()
    }

    fn connected(&mut self) -> bool {
        self.connected
    }

    fn pending(&self) -> usize {
        self.outbound.len()
    }

    fn stop(&mut self) {
        // One last try; whatever the socket refuses now is dropped.
        if !self.outbound.is_empty() {
            if let Err(e) = self.drain() {
                debug!(peer = %self.peer, error = %e, "final write failed");
            }
        }
        if !self.outbound.is_empty() {
            warn!(
                peer = %self.peer,
                dropped = self.outbound.len(),
                "Closing with unsent response bytes"
            );
            self.outbound.clear();
        }

        if let Some(stream) = self.stream.take() {
            // The peer may already be gone.
            if let Ok(stream) = stream.into_std() {
                let _ = stream.shutdown(Shutdown::Both);
            }
        }
        self.connected = false;
        debug!(peer = %self.peer, "Connection closed");
    }
}
