use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::Limits;
use crate::http::buffer::ByteAccumulator;
use crate::http::framer::{FrameError, Framed, Framer};
use crate::http::handler::Handler;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;

/// One accepted connection and everything it buffers between requests.
///
/// `S` is the transport; anything tokio can read and write works, which is
/// how tests drive it over an in-memory duplex pipe.
pub struct Connection<S> {
    stream: S,
    buffer: ByteAccumulator,
    framer: Framer,
    limits: Limits,
    handler: Arc<dyn Handler>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Framed),
    Writing(ResponseWriter, bool), // bool = close after writing?
    Closed,
}

enum ReadOutcome {
    Request(Framed),
    Rejected(FrameError),
    Eof,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, limits: Limits, handler: Arc<dyn Handler>) -> Self {
        Self {
            stream,
            buffer: ByteAccumulator::new(),
            framer: Framer::new(limits.max_header_size),
            limits,
            handler,
            state: ConnectionState::Reading,
        }
    }

    /// Serves requests until the peer goes away, a response closes the
    /// connection, or the transport fails. The transport is shut down in
    /// every case.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let result = self.serve().await;

        if let Err(e) = self.stream.shutdown().await {
            debug!(error = %e, "Transport shutdown failed");
        }

        result
    }

    async fn serve(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => match self.read_request().await? {
                    ReadOutcome::Request(framed) => {
                        self.state = ConnectionState::Processing(framed);
                    }
                    ReadOutcome::Rejected(err) => {
                        let response = Response::error(err.status());
                        warn!(
                            error = %err,
                            status = response.status.as_u16(),
                            "Rejecting request"
                        );
                        let writer = ResponseWriter::new(&response, true);
                        self.state = ConnectionState::Writing(writer, true);
                    }
                    ReadOutcome::Eof => {
                        self.state = ConnectionState::Closed;
                    }
                },

                ConnectionState::Processing(framed) => {
                    let response = self.handler.handle(&framed.request);
                    let close = framed.close;

                    debug!(
                        method = %framed.request.method(),
                        target = %framed.request.target(),
                        version = %framed.request.version(),
                        body_len = framed.request.body.len(),
                        status = response.status.as_u16(),
                        close,
                        "Request handled"
                    );

                    let writer = ResponseWriter::new(&response, close);
                    self.state = ConnectionState::Writing(writer, close);
                }

                ConnectionState::Writing(writer, close) => {
                    writer.write_to_stream(&mut self.stream).await?;

                    if *close {
                        self.state = ConnectionState::Closed;
                    } else {
                        self.state = ConnectionState::Reading; // go back for next request
                    }
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    async fn read_request(&mut self) -> anyhow::Result<ReadOutcome> {
        loop {
            // Leftover bytes from a previous request may already hold a full one.
            match self.framer.advance(&mut self.buffer) {
                Ok(Some(framed)) => return Ok(ReadOutcome::Request(framed)),
                Ok(None) => {}
                Err(e) => return Ok(ReadOutcome::Rejected(e)),
            }

            let n = self.read_more().await?;

            if n == 0 {
                if self.buffer.is_empty() {
                    debug!("Peer closed connection");
                } else {
                    debug!(buffered = self.buffer.len(), "Peer closed mid-request");
                }
                return Ok(ReadOutcome::Eof);
            }
        }
    }

    async fn read_more(&mut self) -> anyhow::Result<usize> {
        let read = self.buffer.read_from(&mut self.stream);

        let n = match self.limits.read_timeout {
            Some(deadline) => timeout(deadline, read).await.context("read timed out")??,
            None => read.await?,
        };

        Ok(n)
    }
}
