use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::line::write_line;
use crate::http::response::{Content, Response};

/// Serializes a response onto the output stream.
///
/// Writes the status line (`VERSION SP CODE`), one line per header, a blank
/// line, then the content bytes. Stream content is copied through without
/// buffering. The content is taken out of the response, so a response is
/// written at most once; callers close the connection afterwards.
pub async fn write_response<W>(response: &mut Response, writer: &mut W) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let status_line = format!(
        "{} {}",
        response.version().as_str(),
        response.status().as_u16()
    );
    write_line(writer, &status_line).await?;

    for (name, value) in response.headers() {
        write_line(writer, &format!("{name}: {value}")).await?;
    }

    write_line(writer, "").await?;

    match response.take_content() {
        Content::Empty => {}
        Content::Text(text) => writer.write_all(text.as_bytes()).await?,
        Content::Bytes(bytes) => writer.write_all(&bytes).await?,
        Content::Stream { mut reader, .. } => {
            tokio::io::copy(&mut reader, writer).await?;
        }
    }

    writer.flush().await
}
