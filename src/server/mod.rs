//! Listener/acceptor loop and per-connection handling.

pub mod listener;

pub use listener::{HttpServer, RequestEvent};
