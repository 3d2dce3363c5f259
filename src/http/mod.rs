//! HTTP/1.1 request framing and connection lifecycle.
//!
//! # Architecture
//!
//! - **`buffer`**: bytes read from a connection and not yet claimed by a request
//! - **`parser`**: start line and header block parsing, keep-alive policy
//! - **`framer`**: incremental state machine cutting one request off the buffer
//! - **`request`**: the framed request handed to handlers
//! - **`response`**: status codes and response values
//! - **`writer`**: exact wire serialization of a response
//! - **`handler`**: the seam where requests become responses
//! - **`connection`**: the per-connection session loop
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Frame one request (leftover bytes first)
//!        └──────┬──────┘
//!               │ Request framed        (400 / 431 → Writing, close)
//!               ▼                       (EOF / read error → Closed)
//!        ┌──────────────────┐
//!        │   Processing     │ ← Handler builds the response
//!        └──────┬───────────┘
//!               │
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Write and flush
//!        └──────┬───────────┘
//!               ├─ Keep-Alive → Reading (same connection, same buffer)
//!               └─ Close → Closed
//! ```
//!
//! # Request Framer
//!
//! ```text
//!   AwaitingHeaders ──"\r\n\r\n" found──▶ BodyPending ──body complete──▶ Framed
//!         │                                   (resets to AwaitingHeaders)
//!         ├─ over the header ceiling ─▶ HeaderTooLarge (431)
//!         └─ bad start line / header ─▶ Malformed (400)
//! ```
//!
//! Chunked request bodies are not supported. Without `Content-Length` the
//! body is empty and the chunk data is framed as the next request, which
//! fails as a malformed start line.

pub mod buffer;
pub mod connection;
pub mod framer;
pub mod handler;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
