//! Minimal HTTP/1.1 client for the status endpoints
//!
//! Plain-HTTP GET with a streaming response body. Both endpoints speak
//! http://, so there is no TLS path, and neither needs custom headers.

use core::fmt::Write as FmtWrite;
use core::str;

use embassy_net::tcp::TcpSocket;
use embedded_io_async::Write;
use heapless::String;

/// HTTP client error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpError {
    /// Failed to connect to server
    Connect,
    /// Failed to write request
    Write,
    /// Failed to read response
    Read,
    /// Invalid URL format
    InvalidUrl,
    /// Response parsing error
    Parse,
    /// HTTP error status code
    Status(u16),
    /// Response too large
    TooLarge,
}

/// Parsed URL components
pub struct Url<'a> {
    pub host: &'a str,
    pub port: u16,
    pub path: &'a str,
}

impl<'a> Url<'a> {
    /// Parse a plain-HTTP URL into components
    /// Supports: http://host:port/path
    pub fn parse(url: &'a str) -> Result<Self, HttpError> {
        let rest = url.strip_prefix("http://").ok_or(HttpError::InvalidUrl)?;

        let (host_port, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, "/"),
        };

        let (host, port) = match host_port.find(':') {
            Some(idx) => {
                let port = host_port[idx + 1..]
                    .parse()
                    .map_err(|_| HttpError::InvalidUrl)?;
                (&host_port[..idx], port)
            }
            None => (host_port, 80),
        };

        Ok(Url { host, port, path })
    }
}

/// Perform an HTTP GET request and stream the response body
///
/// The `on_body_chunk` callback is called with each chunk of body data.
/// Returns the status code once the body is exhausted.
pub async fn get<'a, F>(
    socket: &mut TcpSocket<'a>,
    url: &Url<'_>,
    rx_buf: &mut [u8],
    mut on_body_chunk: F,
) -> Result<u16, HttpError>
where
    F: FnMut(&[u8]),
{
    let mut request: String<256> = String::new();
    write!(
        &mut request,
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        url.path, url.host
    )
    .map_err(|_| HttpError::TooLarge)?;

    socket
        .write_all(request.as_bytes())
        .await
        .map_err(|_| HttpError::Write)?;

    // Read until the header terminator is in the buffer
    let mut total_read = 0;
    let headers_end = loop {
        if total_read >= rx_buf.len() {
            return Err(HttpError::TooLarge);
        }

        let n = socket
            .read(&mut rx_buf[total_read..])
            .await
            .map_err(|_| HttpError::Read)?;
        if n == 0 {
            return Err(HttpError::Read);
        }
        total_read += n;

        if let Some(pos) = header_end(&rx_buf[..total_read]) {
            break pos;
        }
    };

    let head = str::from_utf8(&rx_buf[..headers_end]).map_err(|_| HttpError::Parse)?;
    let status = status_code(head)?;
    let content_length: Option<usize> =
        header_value(head, "content-length").and_then(|v| v.parse().ok());

    if status >= 400 {
        return Err(HttpError::Status(status));
    }

    // Body bytes that arrived together with the headers
    let body_start = headers_end + 4;
    let mut body_read = total_read - body_start;
    if total_read > body_start {
        on_body_chunk(&rx_buf[body_start..total_read]);
    }

    // Rest of the body, bounded by content-length when the server sent
    // one, by connection close otherwise
    loop {
        if let Some(len) = content_length {
            if body_read >= len {
                break;
            }
        }

        let n = socket.read(rx_buf).await.map_err(|_| HttpError::Read)?;
        if n == 0 {
            break;
        }
        on_body_chunk(&rx_buf[..n]);
        body_read += n;
    }

    Ok(status)
}

/// Find the position of \r\n\r\n in the buffer
fn header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|window| window == b"\r\n\r\n")
}

/// Parse the status code out of `HTTP/1.1 200 OK`
fn status_code(head: &str) -> Result<u16, HttpError> {
    head.lines()
        .next()
        .and_then(|line| line.split(' ').nth(1))
        .and_then(|code| code.parse().ok())
        .ok_or(HttpError::Parse)
}

/// Look up a header value (case-insensitive)
fn header_value<'h>(head: &'h str, name: &str) -> Option<&'h str> {
    head.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
    })
}
