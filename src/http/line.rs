//! CRLF line primitive shared by request parsing and response serialization.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::error::ProtocolError;

/// Reads one CRLF-terminated ASCII line, one byte at a time.
///
/// The terminator is not included in the returned string. A `\n` without an
/// immediately preceding `\r` is rejected as a malformed line; any byte outside
/// the 7-bit ASCII range is rejected as invalid data. A stray `\r` that is not
/// followed by `\n` is dropped from the accumulated content. End of stream
/// before a terminator yields whatever was accumulated so far, which callers
/// use to detect the end of the header block.
pub async fn read_line<R>(reader: &mut R) -> Result<String, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut line = String::new();
    let mut last = 0u8;
    let mut byte = [0u8; 1];

    loop {
        if reader.read(&mut byte).await? == 0 {
            break; // EOF
        }

        let b = byte[0];

        if !b.is_ascii() {
            return Err(ProtocolError::NonAscii(b));
        }

        if b == b'\n' {
            if last != b'\r' {
                return Err(ProtocolError::BareLineFeed);
            }
            break;
        }

        last = b;

        if b != b'\r' {
            line.push(b as char);
        }
    }

    Ok(line)
}

/// Writes `line` followed by a CRLF pair.
///
/// An empty `line` writes a bare terminator, marking the end of a header block.
pub async fn write_line<W>(writer: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\r\n").await
}
