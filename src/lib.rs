//! httpd - Minimal HTTP/1.x server on raw TCP streams
//!
//! Accepts connections, parses one request per connection line-by-line,
//! dispatches it to an ordered hook of asynchronous subscribers, and
//! serializes the response back onto the wire.

pub mod config;
pub mod event;
pub mod http;
pub mod server;
