use std::io::{self, Read, Write};
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::config::ServerConfig;
use crate::http::response::{Rejection, StatusCode};
use crate::http::tokenizer::RequestTokenizer;
use crate::http::writer;
use crate::server::{Client, Listener, TimeSource};

/// Maximum number of request bytes read per tick.
pub const READ_CHUNK: usize = 25;

/// Produces the content of a successful response.
///
/// Implemented by the application; the engine only frames what it writes.
pub trait ContentWriter {
    /// Writes the content type header line(s) for `path`, each terminated by
    /// `\r\n`.
    fn write_content_type(&mut self, path: &str, out: &mut dyn Write) -> io::Result<()>;

    /// Writes the next piece of the body and returns whether more remain.
    ///
    /// `first` is true on the call right after the headers. Every call
    /// should write a bounded amount so a tick stays short.
    fn write_body_chunk(&mut self, first: bool, path: &str, out: &mut dyn Write)
    -> io::Result<bool>;
}

/// Idle limits applied to the single connection slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Outside `Idle`, a connection with no recorded activity for longer
    /// than this is abandoned.
    pub watchdog: Duration,
    /// Grace period between finishing a response and closing the socket.
    pub cooldown: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            watchdog: Duration::from_millis(1000),
            cooldown: Duration::from_millis(10),
        }
    }
}

impl From<&ServerConfig> for Timeouts {
    fn from(cfg: &ServerConfig) -> Self {
        Self {
            watchdog: Duration::from_millis(cfg.watchdog_ms),
            cooldown: Duration::from_millis(cfg.cooldown_ms),
        }
    }
}

/// Lifecycle of the connection slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Receiving,
    Error(Rejection),
    ResponseStart,
    ResponseBody,
    ResponseEnd,
    Cooldown,
}

/// Cooperative HTTP request engine serving one connection at a time.
///
/// Nothing here blocks. The owner calls [`HttpServer::tick`] repeatedly;
/// each call advances the state machine by at most one step (accepting a
/// connection also tokenizes its first bytes in the same tick). While the
/// client still holds unsent output the body and end states wait in place,
/// bounded by the watchdog.
pub struct HttpServer<L: Listener, W, T> {
    listener: L,
    content: W,
    clock: T,
    timeouts: Timeouts,
    client: Option<L::Client>,
    tokenizer: RequestTokenizer,
    state: ConnectionState,
    last_activity: u64,
    buffer: [u8; READ_CHUNK],
}

impl<L, W, T> HttpServer<L, W, T>
where
    L: Listener,
    W: ContentWriter,
    T: TimeSource,
{
    pub fn new(listener: L, content: W, clock: T, timeouts: Timeouts) -> Self {
        Self {
            listener,
            content,
            clock,
            timeouts,
            client: None,
            tokenizer: RequestTokenizer::new(),
            state: ConnectionState::Idle,
            last_activity: 0,
            buffer: [0; READ_CHUNK],
        }
    }

    /// Puts the engine in `Idle`, ready to accept.
    pub fn begin(&mut self) {
        self.close_client();
        self.state = ConnectionState::Idle;
        info!(
            watchdog_ms = self.timeouts.watchdog.as_millis() as u64,
            cooldown_ms = self.timeouts.cooldown.as_millis() as u64,
            "HTTP engine ready"
        );
    }

    /// Drops any connection in progress and stops the listener.
    pub fn end(&mut self) {
        self.close_client();
        self.state = ConnectionState::Idle;
        self.listener.close();
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn content(&self) -> &W {
        &self.content
    }

    /// Runs one scheduling step.
    pub fn tick(&mut self) {
        if !self.listener.link_up() {
            return;
        }

        let now = self.clock.millis();
        if self.state != ConnectionState::Idle
            && self.elapsed(now) > self.timeouts.watchdog.as_millis() as u64
        {
            warn!(state = ?self.state, "Connection stalled, abandoning it");
            // Activity time is left alone so the cooldown below is already over.
            self.state = ConnectionState::Cooldown;
        }

        match self.state {
            ConnectionState::Idle => {
                if self.accept(now) {
                    self.receive();
                }
            }
            ConnectionState::Receiving => self.receive(),
            ConnectionState::Error(rejection) => self.respond_error(rejection),
            ConnectionState::ResponseStart => self.begin_response(),
            ConnectionState::ResponseBody => self.continue_response(),
            ConnectionState::ResponseEnd => self.end_response(),
            ConnectionState::Cooldown => self.cooldown(now),
        }
    }

    fn elapsed(&self, now: u64) -> u64 {
        now.wrapping_sub(self.last_activity)
    }

    fn touch(&mut self) {
        self.last_activity = self.clock.millis();
    }

    fn accept(&mut self, now: u64) -> bool {
        match self.listener.accept() {
            Ok(Some(client)) => {
                self.client = Some(client);
                self.last_activity = now;
                self.tokenizer.reset();
                self.state = ConnectionState::Receiving;
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "accept failed");
                false
            }
        }
    }

    fn receive(&mut self) {
        let Some(client) = self.client.as_mut() else {
            self.state = ConnectionState::Idle;
            return;
        };
        if !client.connected() {
            return;
        }

        let available = client.available();
        if available == 0 {
            return;
        }

        let want = available.min(READ_CHUNK);
        let read = match client.read(&mut self.buffer[..want]) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return,
            Err(e) => {
                self.abandon(e);
                return;
            }
        };

        trace!(bytes = %String::from_utf8_lossy(&self.buffer[..read]), "request bytes");
        for &byte in &self.buffer[..read] {
            if !self.tokenizer.feed(byte) {
                break;
            }
        }

        match self.tokenizer.outcome() {
            Some(Ok(())) => {
                debug!(path = self.tokenizer.path(), "request parsed");
                self.state = ConnectionState::ResponseStart;
            }
            Some(Err(rejection)) => self.state = ConnectionState::Error(rejection),
            None => {}
        }
    }

    fn respond_error(&mut self, rejection: Rejection) {
        let Some(client) = self.client.as_mut() else {
            self.state = ConnectionState::Idle;
            return;
        };

        debug!(status = %rejection, "rejecting request");
        let result = writer::write_rejection(client, rejection.status())
            .and_then(|_| client.flush());
        if let Err(e) = result {
            self.abandon(e);
            return;
        }

        self.touch();
        self.state = ConnectionState::Cooldown;
    }

    fn begin_response(&mut self) {
        let Some(client) = self.client.as_mut() else {
            self.state = ConnectionState::Idle;
            return;
        };
        let path = self.tokenizer.path();

        debug!(path, "HTTP/1.1 200 OK");
        let result = write_head(&mut self.content, path, client);

        match result {
            Ok(true) => self.state = ConnectionState::ResponseBody,
            Ok(false) => self.state = ConnectionState::ResponseEnd,
            Err(e) => self.abandon(e),
        }
    }

    fn continue_response(&mut self) {
        let Some(client) = self.client.as_mut() else {
            self.state = ConnectionState::Idle;
            return;
        };
        match drained(client) {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => {
                self.abandon(e);
                return;
            }
        }

        match self
            .content
            .write_body_chunk(false, self.tokenizer.path(), client)
        {
            Ok(true) => {}
            Ok(false) => self.state = ConnectionState::ResponseEnd,
            Err(e) => self.abandon(e),
        }
    }

    fn end_response(&mut self) {
        if let Some(client) = self.client.as_mut() {
            match drained(client) {
                Ok(true) => {}
                Ok(false) => return,
                Err(e) => {
                    self.abandon(e);
                    return;
                }
            }
        }

        self.touch();
        self.state = ConnectionState::Cooldown;
    }

    fn cooldown(&mut self, now: u64) {
        if self.elapsed(now) > self.timeouts.cooldown.as_millis() as u64 {
            self.close_client();
            self.state = ConnectionState::Idle;
        }
    }

    /// Gives up on the current connection after an I/O failure.
    fn abandon(&mut self, error: io::Error) {
        warn!(state = ?self.state, error = %error, "I/O error, dropping connection");
        self.touch();
        self.state = ConnectionState::Cooldown;
    }

    fn close_client(&mut self) {
        if let Some(mut client) = self.client.take() {
            client.stop();
        }
    }
}

/// Flushes what the peer takes now and reports whether nothing is left.
fn drained<C: Client>(client: &mut C) -> io::Result<bool> {
    client.flush()?;
    Ok(client.pending() == 0)
}

/// Status line, headers and the first body chunk of a 200 response.
fn write_head<W, C>(content: &mut W, path: &str, client: &mut C) -> io::Result<bool>
where
    W: ContentWriter,
    C: Write,
{
    writer::write_status_line(client, StatusCode::Ok)?;
    content.write_content_type(path, client)?;
    writer::write_connection_close(client)?;
    writer::end_headers(client)?;
    content.write_body_chunk(true, path, client)
}
