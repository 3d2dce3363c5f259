//! MeServer - incremental HTTP/1.1 request framing
//!
//! Core library: request framing, keep-alive policy and the per-connection
//! session loop, plus a small TCP accept loop to run them.

pub mod config;
pub mod http;
pub mod server;
