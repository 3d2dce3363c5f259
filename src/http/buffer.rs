use bytes::{Buf, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Spare capacity reserved before every transport read.
const READ_CHUNK: usize = 4096;

/// Bytes read from a connection that no completed request has claimed yet.
///
/// The session loop owns one accumulator per connection. Framed requests are
/// split off the front, so whatever remains is always the start of the next
/// request attempt (pipelined bytes included).
#[derive(Debug, Default)]
pub struct ByteAccumulator {
    buf: BytesMut,
}

impl ByteAccumulator {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(READ_CHUNK),
        }
    }

    /// Appends newly read bytes.
    pub fn append(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Drops the first `n` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `n` is larger than [`len`](Self::len).
    pub fn consume(&mut self, n: usize) {
        self.buf.advance(n);
    }

    /// Removes the first `n` bytes and hands them out as a frozen buffer.
    pub fn split_to(&mut self, n: usize) -> Bytes {
        self.buf.split_to(n).freeze()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Reads once from `reader` into the spare capacity, returning the byte
    /// count. Zero means end-of-stream.
    pub async fn read_from<R>(&mut self, reader: &mut R) -> std::io::Result<usize>
    where
        R: AsyncRead + Unpin,
    {
        // read_buf reports 0 when there is no spare capacity, which would look
        // like EOF.
        self.buf.reserve(READ_CHUNK);
        reader.read_buf(&mut self.buf).await
    }
}
