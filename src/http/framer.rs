use std::ops::Range;

use crate::http::buffer::ByteAccumulator;
use crate::http::parser::{
    ParseError, find, find_headers_end, parse_header_block, parse_start_line, should_close,
};
use crate::http::request::{Request, StartLine};
use crate::http::response::StatusCode;

/// Default ceiling for the header block (start line included).
pub const DEFAULT_MAX_HEADER_SIZE: usize = 20 << 20;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("header block exceeds {limit} bytes")]
    HeaderTooLarge { limit: usize },
    #[error("malformed request: {0}")]
    Malformed(#[from] ParseError),
}

impl FrameError {
    /// The status answered before the connection is closed.
    pub fn status(&self) -> StatusCode {
        match self {
            FrameError::HeaderTooLarge { .. } => StatusCode::RequestHeaderFieldsTooLarge,
            FrameError::Malformed(_) => StatusCode::BadRequest,
        }
    }
}

/// One complete request and whether the connection closes after answering it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framed {
    pub request: Request,
    pub close: bool,
}

/// Headers are parsed; waiting for the body to arrive.
#[derive(Debug)]
struct Pending {
    start_line: StartLine,
    /// Header block position, relative to the start of the attempt
    block: Range<usize>,
    body_start: usize,
    content_length: usize,
    close: bool,
}

#[derive(Debug)]
enum FrameState {
    /// `scanned` bytes are known not to start the header terminator.
    AwaitingHeaders { scanned: usize },
    BodyPending(Pending),
}

impl Default for FrameState {
    fn default() -> Self {
        FrameState::AwaitingHeaders { scanned: 0 }
    }
}

/// Incremental request framer.
///
/// Call [`advance`](Framer::advance) after every append to the accumulator.
/// It never reads the transport itself, so the same bytes fed in any number
/// of pieces produce the same request.
#[derive(Debug)]
pub struct Framer {
    max_header_size: usize,
    state: FrameState,
}

impl Default for Framer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HEADER_SIZE)
    }
}

impl Framer {
    pub fn new(max_header_size: usize) -> Self {
        Self {
            max_header_size,
            state: FrameState::default(),
        }
    }

    /// Tries to frame one request from the front of `buf`.
    ///
    /// Returns `Ok(None)` when more bytes are needed. On success the request's
    /// bytes are removed from `buf` and anything after its body is left in
    /// place. Errors are terminal for the attempt.
    pub fn advance(&mut self, buf: &mut ByteAccumulator) -> Result<Option<Framed>, FrameError> {
        if let FrameState::AwaitingHeaders { scanned } = self.state {
            match self.on_awaiting_headers(buf.as_slice(), scanned) {
                Ok(next) => self.state = next,
                Err(e) => {
                    self.state = FrameState::default();
                    return Err(e);
                }
            }
        }

        Ok(self.on_body_pending(buf))
    }

    fn on_awaiting_headers(&self, data: &[u8], scanned: usize) -> Result<FrameState, FrameError> {
        let limit = self.max_header_size;

        let Some(headers_end) = find_headers_end(data, scanned) else {
            // The last 3 bytes may open a terminator that straddles two reads;
            // they are measured like `headers_end` once it arrives.
            let pending = data.len().saturating_sub(3);
            if pending > limit {
                return Err(FrameError::HeaderTooLarge { limit });
            }
            return Ok(FrameState::AwaitingHeaders { scanned: pending });
        };

        if headers_end > limit {
            return Err(FrameError::HeaderTooLarge { limit });
        }

        // Keep the CRLF closing the last line so the start line always has one.
        let head = &data[..headers_end + 2];
        let line_end = find(head, b"\r\n").unwrap_or(headers_end);
        let block = if line_end == headers_end {
            headers_end..headers_end
        } else {
            line_end + 2..headers_end
        };

        let start_line = parse_start_line(&data[..line_end])?;
        let headers = parse_header_block(&data[block.clone()])?;
        let close = should_close(&start_line.version, &headers);

        tracing::trace!(
            method = %start_line.method,
            target = %start_line.target,
            content_length = headers.content_length,
            close,
            "Headers parsed"
        );

        Ok(FrameState::BodyPending(Pending {
            start_line,
            block,
            body_start: headers_end + 4,
            content_length: headers.content_length,
            close,
        }))
    }

    fn on_body_pending(&mut self, buf: &mut ByteAccumulator) -> Option<Framed> {
        let FrameState::BodyPending(pending) = &self.state else {
            return None;
        };

        let available = buf.len().saturating_sub(pending.body_start);
        if available < pending.content_length {
            return None;
        }

        // Resets to AwaitingHeaders for the next attempt.
        let FrameState::BodyPending(pending) = std::mem::take(&mut self.state) else {
            return None;
        };

        let frame = buf.split_to(pending.body_start + pending.content_length);

        Some(Framed {
            request: Request {
                start_line: pending.start_line,
                raw_headers: frame.slice(pending.block),
                body: frame.slice(pending.body_start..),
            },
            close: pending.close,
        })
    }
}
