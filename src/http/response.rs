use thiserror::Error;

/// HTTP status codes the server ever answers with.
///
/// - `Ok` (200): request parsed, body follows
/// - `BadRequest` (400): broken line terminators, or a path that is not UTF-8
/// - `NotFound` (404): path did not fit the path buffer
/// - `MethodNotAllowed` (405): anything but `GET`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad request
    BadRequest,
    /// 404 Not found
    NotFound,
    /// 405 Method not allowed
    MethodNotAllowed,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use dcf77_web::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
        }
    }

    /// Returns the reason phrase written on the status line.
    ///
    /// These are fixed strings and are sent verbatim, including their
    /// capitalization.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad request",
            StatusCode::NotFound => "Not found",
            StatusCode::MethodNotAllowed => "Method not allowed",
        }
    }
}

/// Terminal error classification produced by the request tokenizer.
///
/// None of these are retried: the connection gets the matching status line
/// and is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Line terminators out of place, or a path that is not UTF-8.
    #[error("400 Bad request")]
    BadRequest,
    /// The path overflowed the path buffer.
    #[error("404 Not found")]
    NotFound,
    /// The request did not start with `GET `.
    #[error("405 Method not allowed")]
    MethodNotAllowed,
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::BadRequest => StatusCode::BadRequest,
            Rejection::NotFound => StatusCode::NotFound,
            Rejection::MethodNotAllowed => StatusCode::MethodNotAllowed,
        }
    }
}
