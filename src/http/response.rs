use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;
use tokio::io::AsyncRead;

use crate::http::request::Version;

/// Server identity advertised in the default `server` header.
pub const SERVER_IDENTITY: &str = concat!("httpd/", env!("CARGO_PKG_VERSION"));

/// HTTP status codes used by the engine and its handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 201 Created
    Created,
    /// 204 No Content
    NoContent,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 500 Internal Server Error
    InternalServerError,
    /// 501 Not Implemented
    NotImplemented,
    /// 505 HTTP Version Not Supported
    HttpVersionNotSupported,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::NoContent => 204,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::InternalServerError => 500,
            StatusCode::NotImplemented => 501,
            StatusCode::HttpVersionNotSupported => 505,
        }
    }

    /// Returns the standard reason phrase, used in diagnostic bodies.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::NoContent => "No Content",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::HttpVersionNotSupported => "HTTP Version Not Supported",
        }
    }
}

/// Payload attached to a response.
///
/// `Stream` carries an arbitrary byte producer and an optional known length;
/// with no length the body is delimited by connection close.
pub enum Content {
    Empty,
    Text(String),
    Bytes(Bytes),
    Stream {
        reader: Box<dyn AsyncRead + Send + Unpin>,
        len: Option<u64>,
    },
}

impl Content {
    pub fn is_empty(&self) -> bool {
        matches!(self, Content::Empty)
    }

    /// Descriptive headers folded into the response when content is attached.
    fn headers(&self) -> Vec<(&'static str, String)> {
        match self {
            Content::Empty => Vec::new(),
            Content::Text(s) => vec![
                ("content-length", s.len().to_string()),
                ("content-type", "text/plain; charset=utf-8".to_string()),
            ],
            Content::Bytes(b) => vec![("content-length", b.len().to_string())],
            Content::Stream { len, .. } => len
                .map(|n| ("content-length", n.to_string()))
                .into_iter()
                .collect(),
        }
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Empty => f.write_str("Empty"),
            Content::Text(s) => write!(f, "Text({} bytes)", s.len()),
            Content::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            Content::Stream { len, .. } => write!(f, "Stream(len: {len:?})"),
        }
    }
}

/// An outgoing HTTP response.
///
/// Created with status 200 and the default `server`, `date` and
/// `connection: close` headers; mutated by the dispatch hook or by the
/// listener's error handling; serialized exactly once by
/// [`write_response`](crate::http::writer::write_response).
///
/// Mutators return `&mut Self` so handlers can chain them:
///
/// ```
/// # use httpd::http::response::{Response, StatusCode};
/// let mut response = Response::new();
/// response
///     .with_status(StatusCode::Ok)
///     .with_header("x-request-id", "42")
///     .with_text("hello");
/// ```
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    version: Version,
    headers: HashMap<String, String>,
    content: Content,
}

impl Response {
    pub fn new() -> Self {
        let mut headers = HashMap::new();
        headers.insert("server".to_string(), SERVER_IDENTITY.to_string());
        headers.insert("date".to_string(), chrono::Utc::now().to_rfc2822());
        headers.insert("connection".to_string(), "close".to_string());

        Self {
            status: StatusCode::Ok,
            version: Version::Http11,
            headers,
            content: Content::Empty,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The version written on the status line. Mirrors the request's version
    /// once one was parsed; HTTP/1.1 otherwise.
    pub fn version(&self) -> Version {
        self.version
    }

    pub(crate) fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    /// Header map; names are stored lowercased.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Looks up a header value by name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_str())
    }

    /// Sets a header, replacing any prior value under the same
    /// case-insensitive name.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Attaches a payload, folding its descriptive headers (length, type)
    /// into the header map. Identical keys are overwritten.
    pub fn set_content(&mut self, content: Content) {
        for (name, value) in content.headers() {
            self.set_header(name, value);
        }
        self.content = content;
    }

    pub(crate) fn take_content(&mut self) -> Content {
        std::mem::replace(&mut self.content, Content::Empty)
    }

    pub fn with_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    pub fn with_header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.set_header(name, value);
        self
    }

    pub fn with_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.set_content(Content::Text(text.into()));
        self
    }

    pub fn with_bytes(&mut self, bytes: impl Into<Bytes>) -> &mut Self {
        self.set_content(Content::Bytes(bytes.into()));
        self
    }

    pub fn with_stream(
        &mut self,
        reader: impl AsyncRead + Send + Unpin + 'static,
        len: Option<u64>,
    ) -> &mut Self {
        self.set_content(Content::Stream {
            reader: Box::new(reader),
            len,
        });
        self
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_headers_present() {
        let response = Response::new();
        assert_eq!(response.header("server"), Some(SERVER_IDENTITY));
        assert_eq!(response.header("connection"), Some("close"));
        assert!(response.header("date").is_some());
    }

    #[test]
    fn text_content_folds_headers() {
        let mut response = Response::new();
        response.with_text("hello");
        assert_eq!(response.header("content-length"), Some("5"));
        assert_eq!(
            response.header("content-type"),
            Some("text/plain; charset=utf-8")
        );
    }
}
