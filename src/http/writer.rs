use chrono::{DateTime, Utc};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::{Response, SERVER_NAME, SERVER_VERSION};

const HTTP_VERSION: &str = "HTTP/1.1";

/// Formats a timestamp as an RFC 1123 date, e.g.
/// `Sun, 06 Nov 1994 08:49:37 GMT`. Always 29 bytes.
pub fn http_date(t: DateTime<Utc>) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Serializes the status line and headers, including the blank line that
/// ends them.
pub fn serialize_head(resp: &Response, now: DateTime<Utc>) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    buf.extend_from_slice(format!("Date: {}\r\n", http_date(now)).as_bytes());
    buf.extend_from_slice(format!("Server: {SERVER_NAME}/{SERVER_VERSION}\r\n").as_bytes());

    if let Some(content_type) = &resp.content_type {
        buf.extend_from_slice(format!("Content-type: {content_type}\r\n").as_bytes());
    }
    // absent when the body runs until the connection closes
    if let Some(len) = resp.content_length {
        buf.extend_from_slice(format!("Content-length: {len}\r\n").as_bytes());
    }

    for (k, v) in &resp.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}

/// A serialized reply waiting to be written.
#[derive(Debug)]
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    /// Head and in-memory body.
    pub fn new(response: &Response) -> Self {
        let mut buffer = serialize_head(response, Utc::now());
        buffer.extend_from_slice(&response.body);
        Self { buffer, written: 0 }
    }

    /// Head only, for HEAD requests and for bodies streamed afterwards.
    pub fn head(response: &Response) -> Self {
        Self {
            buffer: serialize_head(response, Utc::now()),
            written: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(std::io::ErrorKind::WriteZero.into());
            }

            self.written += n;
        }

        Ok(())
    }
}

/// Writes a complete in-memory reply.
pub async fn send<W>(stream: &mut W, response: &Response) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    ResponseWriter::new(response).write_to_stream(stream).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn date_is_fixed_width_rfc1123() {
        let t = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();
        assert_eq!(http_date(t), "Sun, 06 Nov 1994 08:49:37 GMT");

        let t = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(http_date(t).len(), 29);
    }
}
