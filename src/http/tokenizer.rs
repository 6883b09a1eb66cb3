use crate::http::response::Rejection;

/// Size of the path buffer. A path that fills it is answered with 404, so the
/// longest accepted path is one byte shorter.
pub const PATH_CAPACITY: usize = 15;

/// States of the request tokenizer.
///
/// The machine accepts exactly `GET <path> HTTP/1.1\r\n<headers>\r\n\r\n`.
/// Everything after the path on the request line, and every header line, is
/// skipped without being inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Start,
    G,
    E,
    T,
    Path,
    Version,
    HeaderLine,
    Cr,
    Lf,
    EndOfHeaders,
    /// Terminal error state.
    Rejected(Rejection),
    /// Terminal success state: the blank line after the headers was seen.
    Stop,
}

/// Byte-at-a-time tokenizer for one HTTP request.
#[derive(Debug, Clone)]
pub struct RequestTokenizer {
    token: Token,
    path: [u8; PATH_CAPACITY],
    path_len: usize,
}

impl RequestTokenizer {
    pub fn new() -> Self {
        Self {
            token: Token::Start,
            path: [0; PATH_CAPACITY],
            path_len: 0,
        }
    }

    /// Rewinds to [`Token::Start`] and forgets the previous path.
    pub fn reset(&mut self) {
        self.token = Token::Start;
        self.path_len = 0;
    }

    /// Feeds one byte and returns whether tokenizing should continue.
    ///
    /// Returns `false` once the request is complete or rejected. Feeding
    /// more bytes after that leaves the state untouched.
    pub fn feed(&mut self, byte: u8) -> bool {
        let token = self.token;
        self.token = match token {
            Token::Start => match byte {
                b'G' => Token::G,
                _ => Token::Rejected(Rejection::MethodNotAllowed),
            },
            Token::G => match byte {
                b'E' => Token::E,
                _ => Token::Rejected(Rejection::MethodNotAllowed),
            },
            Token::E => match byte {
                b'T' => Token::T,
                _ => Token::Rejected(Rejection::MethodNotAllowed),
            },
            Token::T => match byte {
                b' ' => Token::Path,
                _ => Token::Rejected(Rejection::MethodNotAllowed),
            },
            Token::Path => self.path_byte(byte),
            Token::Version | Token::HeaderLine => match byte {
                b'\r' => Token::Cr,
                _ => token,
            },
            Token::Cr => match byte {
                b'\n' => Token::Lf,
                _ => Token::Rejected(Rejection::BadRequest),
            },
            // A second CR right after a line break is the blank line.
            Token::Lf => match byte {
                b'\r' => Token::EndOfHeaders,
                _ => Token::HeaderLine,
            },
            Token::EndOfHeaders => match byte {
                b'\n' => Token::Stop,
                _ => Token::Rejected(Rejection::BadRequest),
            },
            terminal @ (Token::Rejected(_) | Token::Stop) => terminal,
        };

        self.is_running()
    }

    fn path_byte(&mut self, byte: u8) -> Token {
        if byte == b' ' {
            return match std::str::from_utf8(self.path_bytes()) {
                Ok(_) => Token::Version,
                Err(_) => Token::Rejected(Rejection::BadRequest),
            };
        }

        self.path[self.path_len] = byte;
        self.path_len += 1;
        if self.path_len >= PATH_CAPACITY {
            Token::Rejected(Rejection::NotFound)
        } else {
            Token::Path
        }
    }

    pub fn token(&self) -> Token {
        self.token
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.token, Token::Rejected(_) | Token::Stop)
    }

    /// `None` while the request is still incomplete.
    pub fn outcome(&self) -> Option<Result<(), Rejection>> {
        match self.token {
            Token::Stop => Some(Ok(())),
            Token::Rejected(rejection) => Some(Err(rejection)),
            _ => None,
        }
    }

    /// Path bytes accumulated so far.
    pub fn path_bytes(&self) -> &[u8] {
        &self.path[..self.path_len]
    }

    /// The request path. Empty until the path has been fully read.
    pub fn path(&self) -> &str {
        match self.token {
            Token::Start | Token::G | Token::E | Token::T | Token::Path => "",
            _ => std::str::from_utf8(self.path_bytes()).unwrap_or(""),
        }
    }
}

impl Default for RequestTokenizer {
    fn default() -> Self {
        Self::new()
    }
}
