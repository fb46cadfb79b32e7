use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use crate::http::error::ProtocolError;
use crate::http::parser::parse_request;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::write_response;

/// Per-exchange owner of one accepted socket.
///
/// The socket is split into a buffered input stream and an output stream at
/// construction time, alongside a default [`Response`]. [`parse`] runs once
/// and moves the input stream into the returned [`Request`] as its body;
/// [`send`] serializes exactly one response; [`close`] consumes the context,
/// so teardown cannot run twice and the socket is released on every exit path.
///
/// [`parse`]: Connection::parse
/// [`send`]: Connection::send
/// [`close`]: Connection::close
pub struct Connection {
    reader: Option<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
    response: Option<Response>,
}

impl Connection {
    pub fn new(socket: TcpStream) -> Self {
        let (read_half, write_half) = socket.into_split();

        Self {
            reader: Some(BufReader::new(read_half)),
            writer: write_half,
            response: Some(Response::new()),
        }
    }

    /// Parses the request off the connection's input stream.
    ///
    /// On success the response version is set to mirror the request's. Any
    /// failure carries a suggested status so the caller can answer with an
    /// error response without inspecting the variant.
    pub async fn parse(&mut self) -> Result<Request, ProtocolError> {
        let reader = self.reader.take().ok_or(ProtocolError::StreamConsumed)?;

        let request = parse_request(reader).await?;

        if let Some(response) = self.response.as_mut() {
            response.set_version(request.version());
        }

        Ok(request)
    }

    /// Takes ownership of the response for the dispatch payload.
    pub fn take_response(&mut self) -> Response {
        self.response.take().unwrap_or_default()
    }

    /// Serializes the response onto the connection's output stream.
    pub async fn send(&mut self, response: &mut Response) -> std::io::Result<()> {
        write_response(response, &mut self.writer).await
    }

    /// Tears the exchange down: flushes and shuts the write half, then drops
    /// both stream halves, closing the socket.
    pub async fn close(mut self) -> std::io::Result<()> {
        self.writer.shutdown().await
    }
}
