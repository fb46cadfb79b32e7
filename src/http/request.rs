use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

/// HTTP request methods accepted by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    OPTIONS,
    PATCH,
}

impl Method {
    /// Parses a method token, case-insensitively.
    ///
    /// # Example
    ///
    /// ```
    /// # use httpd::http::request::Method;
    /// assert_eq!(Method::parse("get"), Some(Method::GET));
    /// assert_eq!(Method::parse("TRACE"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Some(Method::GET),
            "HEAD" => Some(Method::HEAD),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            "OPTIONS" => Some(Method::OPTIONS),
            "PATCH" => Some(Method::PATCH),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
        }
    }
}

/// Supported HTTP protocol versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Http10,
    Http11,
}

impl Version {
    /// Parses a version token, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("HTTP/1.0") {
            Some(Version::Http10)
        } else if s.eq_ignore_ascii_case("HTTP/1.1") {
            Some(Version::Http11)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Http10 => "HTTP/1.0",
            Version::Http11 => "HTTP/1.1",
        }
    }
}

/// Handle to the connection's remaining input bytes.
///
/// The parser stops at the blank line ending the header block; whatever the
/// peer sent after that is readable here. The body is never buffered ahead of
/// the handler.
pub struct Body(Box<dyn AsyncRead + Send + Unpin>);

impl Body {
    pub(crate) fn new(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self(Box::new(reader))
    }
}

impl AsyncRead for Body {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.0).poll_read(cx, buf)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Body(..)")
    }
}

/// A parsed HTTP request.
///
/// Constructed only by successful completion of
/// [`parse_request`](crate::http::parser::parse_request); read-only afterwards
/// except for the body stream.
#[derive(Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) version: Version,
    pub(crate) raw_url: String,
    pub(crate) local_path: String,
    pub(crate) raw_query: String,
    pub(crate) query: HashMap<String, String>,
    pub(crate) headers: HashMap<String, String>,
    pub(crate) body: Body,
}

impl Request {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// The request target exactly as it appeared on the start line.
    pub fn raw_url(&self) -> &str {
        &self.raw_url
    }

    /// The percent-decoded path component of the request URL.
    pub fn local_path(&self) -> &str {
        &self.local_path
    }

    /// The query string without its leading `?`, undecoded.
    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    /// Parsed query parameters. A later duplicate key overwrites the earlier.
    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(|v| v.as_str())
    }

    /// Header map; names are stored lowercased, last occurrence wins.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Looks up a header value by name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_str())
    }

    /// The `content-length` header parsed as a number.
    ///
    /// Returns 0 when the header is missing or not a valid number.
    pub fn content_length(&self) -> u64 {
        self.header("content-length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// The still-open input stream holding any unread body bytes.
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}
