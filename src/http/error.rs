use thiserror::Error;

use crate::http::response::StatusCode;

/// Protocol-level failure raised while reading or parsing a request.
///
/// Every variant maps to a suggested HTTP status via [`ProtocolError::status`],
/// so the connection handler can turn any parse failure into an error response
/// without inspecting the variant itself.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The peer closed (or sent a blank line) before any start line arrived.
    #[error("HTTP start line missing")]
    MissingStartLine,

    /// The start line did not split into exactly method, target and version.
    #[error("HTTP start line is not well formed: {0:?}")]
    MalformedStartLine(String),

    /// The method token is outside the supported set.
    #[error("HTTP method is not supported: {0}")]
    UnsupportedMethod(String),

    /// The version token is outside the supported set.
    #[error("HTTP version is not supported: {0}")]
    UnsupportedVersion(String),

    /// A header line carried no `:` separator.
    #[error("HTTP header line is not well formed: {0:?}")]
    MalformedHeader(String),

    /// Host and target could not be combined into a valid URL.
    #[error("HTTP request target is not well formed: {0}")]
    InvalidTarget(String),

    /// A line feed arrived without a preceding carriage return.
    #[error("unexpected bare line feed in request line")]
    BareLineFeed,

    /// A byte outside the 7-bit ASCII range arrived while reading a line.
    #[error("byte 0x{0:02x} is not US-ASCII")]
    NonAscii(u8),

    /// The connection's input stream was already consumed by a prior parse.
    #[error("connection input stream already consumed")]
    StreamConsumed,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// Suggested status code for the error response.
    pub fn status(&self) -> StatusCode {
        match self {
            ProtocolError::MissingStartLine
            | ProtocolError::MalformedStartLine(_)
            | ProtocolError::MalformedHeader(_)
            | ProtocolError::InvalidTarget(_)
            | ProtocolError::BareLineFeed => StatusCode::BadRequest,
            ProtocolError::UnsupportedMethod(_) => StatusCode::MethodNotAllowed,
            ProtocolError::UnsupportedVersion(_) => StatusCode::HttpVersionNotSupported,
            ProtocolError::NonAscii(_)
            | ProtocolError::StreamConsumed
            | ProtocolError::Io(_) => StatusCode::InternalServerError,
        }
    }
}
