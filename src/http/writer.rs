use std::io::{self, Write};

use crate::http::response::StatusCode;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Writes `HTTP/1.1 <code> <reason>\r\n`.
pub fn write_status_line<W: Write + ?Sized>(out: &mut W, status: StatusCode) -> io::Result<()> {
    write!(
        out,
        "{} {} {}\r\n",
        HTTP_VERSION,
        status.as_u16(),
        status.reason_phrase()
    )
}

pub fn write_header<W: Write + ?Sized>(out: &mut W, name: &str, value: &str) -> io::Result<()> {
    write!(out, "{}: {}\r\n", name, value)
}

/// Every response closes the connection; there is no keep-alive.
pub fn write_connection_close<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    write_header(out, "Connection", "close")
}

/// Header/body separator.
pub fn end_headers<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    out.write_all(b"\r\n")
}

/// Full response for a rejected request: status line, `Connection: close`,
/// blank line, no body.
pub fn write_rejection<W: Write + ?Sized>(out: &mut W, status: StatusCode) -> io::Result<()> {
    write_status_line(out, status)?;
    write_connection_close(out)?;
    end_headers(out)
}
