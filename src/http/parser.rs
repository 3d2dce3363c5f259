use crate::http::request::StartLine;

const HTTP_10: &str = "HTTP/1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("start line does not have exactly 3 parts")]
    InvalidStartLine,
    #[error("header line has no name/value separator")]
    InvalidHeader,
}

/// What the framer needs to know from a header block.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSummary {
    /// Declared body length, 0 when absent or unparsable
    pub content_length: usize,
    /// A `Connection` header carried the `close` token
    pub connection_close: bool,
    /// A `Connection` header carried the `keep-alive` token
    pub connection_keep_alive: bool,
}

/// Splits a start line into method, target and version.
///
/// Splitting stops after the second space so the version receives the rest
/// of the line; a version that still contains a space means the line had
/// more than three fields.
pub fn parse_start_line(line: &[u8]) -> Result<StartLine, ParseError> {
    let line = std::str::from_utf8(line).map_err(|_| ParseError::InvalidStartLine)?;
    let mut parts = line.splitn(3, ' ');

    let (Some(method), Some(target), Some(version)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(ParseError::InvalidStartLine);
    };

    if method.is_empty() || target.is_empty() || version.is_empty() || version.contains(' ') {
        return Err(ParseError::InvalidStartLine);
    }

    Ok(StartLine {
        method: method.to_string(),
        target: target.to_string(),
        version: version.to_string(),
    })
}

/// Validates every line of a header block and extracts `Content-Length` and
/// `Connection`.
///
/// An unparsable `Content-Length` counts as 0 instead of failing the request.
/// A repeated `Content-Length` takes the last value.
pub fn parse_header_block(block: &[u8]) -> Result<HeaderSummary, ParseError> {
    let mut summary = HeaderSummary::default();

    for line in header_lines(block) {
        let (name, value) = split_header_line(line).ok_or(ParseError::InvalidHeader)?;

        if name.eq_ignore_ascii_case(b"content-length") {
            summary.content_length = std::str::from_utf8(value)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
        } else if name.eq_ignore_ascii_case(b"connection") {
            for token in value.split(|&b| b == b',').map(<[u8]>::trim_ascii) {
                if token.eq_ignore_ascii_case(b"close") {
                    summary.connection_close = true;
                } else if token.eq_ignore_ascii_case(b"keep-alive") {
                    summary.connection_keep_alive = true;
                }
            }
        }
    }

    Ok(summary)
}

/// Decides whether the connection closes after this request's response.
///
/// HTTP/1.0 closes by default and HTTP/1.1 keeps alive. `Connection: close`
/// always closes; `Connection: keep-alive` only matters for HTTP/1.0.
pub fn should_close(version: &str, headers: &HeaderSummary) -> bool {
    let is_http10 = version == HTTP_10;

    if headers.connection_close {
        return true;
    }

    is_http10 && !headers.connection_keep_alive
}

/// Position of the first `\r\n\r\n` at or after `from`.
pub fn find_headers_end(buf: &[u8], from: usize) -> Option<usize> {
    find(buf.get(from..)?, b"\r\n\r\n").map(|i| i + from)
}

pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Splits a header block on `\r\n`. An empty block yields no lines.
pub(crate) fn header_lines(block: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut rest = (!block.is_empty()).then_some(block);

    std::iter::from_fn(move || {
        let current = rest?;
        match find(current, b"\r\n") {
            Some(i) => {
                rest = Some(&current[i + 2..]);
                Some(&current[..i])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}

/// Splits on the first `:` and trims both sides. `None` when there is no
/// separator or the name is empty.
pub(crate) fn split_header_line(line: &[u8]) -> Option<(&[u8], &[u8])> {
    let colon = line.iter().position(|&b| b == b':')?;
    let name = line[..colon].trim_ascii();

    if name.is_empty() {
        return None;
    }

    Some((name, line[colon + 1..].trim_ascii()))
}
