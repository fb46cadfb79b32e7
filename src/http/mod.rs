//! HTTP/1.x protocol engine.
//!
//! Implements a single request/response exchange per connection, parsed
//! line-by-line off the raw socket without an HTTP library.
//!
//! # Architecture
//!
//! - **`line`**: the CRLF line read/write primitive shared by parsing and
//!   serialization
//! - **`parser`**: reads the start line and header block, decomposes the URL
//!   and query string, and builds the request
//! - **`request`**: immutable request representation plus the unread body
//!   stream handle
//! - **`response`**: mutable response with default headers and attachable
//!   content payloads
//! - **`writer`**: serializes a response onto the output stream
//! - **`connection`**: per-exchange owner of the socket-derived streams and
//!   the request/response pair
//! - **`error`**: the typed protocol error, each variant carrying a suggested
//!   status code
//!
//! # Exchange lifecycle
//!
//! ```text
//!   accept
//!     │
//!     ▼
//!   Connection::new ── socket split into input/output streams
//!     │
//!     ▼
//!   parse ── start line → headers → URL/query → Request (body unread)
//!     │
//!     ▼
//!   dispatch hook ── subscribers fill in the Response
//!     │
//!     ▼
//!   send ── status line, headers, blank line, content bytes
//!     │
//!     ▼
//!   close ── connection: close, no reuse
//! ```

pub mod connection;
pub mod error;
pub mod line;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
