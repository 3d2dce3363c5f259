use bytes::Bytes;

use crate::http::parser::{header_lines, split_header_line};

/// The first line of a request: method, request-target and protocol version.
///
/// Values are kept as sent. Unknown methods and versions are not rejected
/// here; the handler decides what to do with them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartLine {
    /// The request method (e.g. "GET")
    pub method: String,
    /// The request target (e.g. "/index.html?q=1")
    pub target: String,
    /// Protocol version (e.g. "HTTP/1.1")
    pub version: String,
}

/// A fully framed HTTP request.
///
/// `raw_headers` is the header block exactly as received, without the start
/// line and without the terminating blank line. `body` holds exactly
/// `Content-Length` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub start_line: StartLine,
    pub raw_headers: Bytes,
    pub body: Bytes,
}

impl Request {
    pub fn method(&self) -> &str {
        &self.start_line.method
    }

    pub fn target(&self) -> &str {
        &self.start_line.target
    }

    pub fn version(&self) -> &str {
        &self.start_line.version
    }

    /// Iterates the header block in wire order as trimmed `(name, value)`
    /// pairs.
    pub fn headers(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        header_lines(&self.raw_headers).filter_map(split_header_line)
    }

    /// Retrieves the first header value matching `name` case-insensitively.
    ///
    /// Returns `None` if the header is missing or its value is not UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers()
            .find(|(k, _)| k.eq_ignore_ascii_case(name.as_bytes()))
            .and_then(|(_, v)| std::str::from_utf8(v).ok())
    }
}
