//! Accept loop handing each connection to its own session task.

pub mod listener;
