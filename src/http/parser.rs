use std::collections::HashMap;

use percent_encoding::percent_decode_str;
use tokio::io::AsyncRead;
use url::Url;

use crate::http::error::ProtocolError;
use crate::http::line::read_line;
use crate::http::request::{Body, Method, Request, Version};

/// Base authority assumed when the request carries no `host` header.
pub const DEFAULT_BASE_URL: &str = "http://localhost:2323";

/// Parses one HTTP request off the stream: start line, header block, URL and
/// query decomposition. Performed once per connection.
///
/// The reader is consumed into the returned [`Request`] as its body handle, so
/// any bytes after the blank line stay unread until the handler wants them.
pub async fn parse_request<R>(mut reader: R) -> Result<Request, ProtocolError>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    let start = read_line(&mut reader).await?;

    if start.is_empty() {
        return Err(ProtocolError::MissingStartLine);
    }

    let tokens: Vec<&str> = start.split(' ').filter(|t| !t.is_empty()).collect();

    if tokens.len() != 3 {
        return Err(ProtocolError::MalformedStartLine(start));
    }

    let method =
        Method::parse(tokens[0]).ok_or_else(|| ProtocolError::UnsupportedMethod(tokens[0].into()))?;

    let raw_url = tokens[1].to_string();

    let version = Version::parse(tokens[2])
        .ok_or_else(|| ProtocolError::UnsupportedVersion(tokens[2].into()))?;

    let headers = parse_headers(&mut reader).await?;

    let base = match headers.get("host") {
        Some(host) => Url::parse(&format!("http://{host}"))
            .map_err(|_| ProtocolError::InvalidTarget(host.clone()))?,
        None => Url::parse(DEFAULT_BASE_URL)
            .map_err(|_| ProtocolError::InvalidTarget(DEFAULT_BASE_URL.into()))?,
    };

    let url = base
        .join(&raw_url)
        .map_err(|_| ProtocolError::InvalidTarget(raw_url.clone()))?;

    let local_path = percent_decode_str(url.path()).decode_utf8_lossy().into_owned();
    let raw_query = url.query().unwrap_or("").to_string();
    let query = parse_query(&raw_query);

    Ok(Request {
        method,
        version,
        raw_url,
        local_path,
        raw_query,
        query,
        headers,
        body: Body::new(reader),
    })
}

/// Reads header lines until the blank line ending the block.
///
/// Names are lowercased for storage, values trimmed; the last occurrence of a
/// repeated name wins.
async fn parse_headers<R>(reader: &mut R) -> Result<HashMap<String, String>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut headers = HashMap::new();

    loop {
        let line = read_line(reader).await?;

        if line.is_empty() {
            break;
        }

        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| ProtocolError::MalformedHeader(line.clone()))?;

        headers.insert(
            name.trim().to_ascii_lowercase(),
            value.trim().to_string(),
        );
    }

    Ok(headers)
}

/// Splits a raw query string on `&`, each segment on the first `=`.
///
/// A segment without `=` maps its whole text to an empty value. Later
/// duplicate keys overwrite earlier ones.
fn parse_query(raw: &str) -> HashMap<String, String> {
    let mut query = HashMap::new();

    if raw.is_empty() {
        return query;
    }

    for segment in raw.split('&') {
        match segment.split_once('=') {
            Some((key, value)) => query.insert(key.to_string(), value.to_string()),
            None => query.insert(segment.to_string(), String::new()),
        };
    }

    query
}
