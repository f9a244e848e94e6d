use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::Config;
use crate::dispatch::{self, ServeError};
use crate::http::parser::{ParseError, RawMessage, find_message_end, parse_message};
use crate::http::request::Message;
use crate::http::response::{Response, StatusCode};
use crate::http::writer;
use crate::visit_log::VisitLog;

const READ_CHUNK: usize = 4096;

/// One client connection: a byte source, a byte sink and the shared
/// configuration.
pub struct Connection<R, W> {
    reader: R,
    writer: W,
    buffer: BytesMut,
    state: ConnectionState,
    config: Arc<Config>,
    visits: VisitLog,
}

#[derive(Debug)]
pub enum ConnectionState {
    Reading,
    Tracing(RawMessage),
    Processing(Message),
    Closed,
}

impl<R, W> Connection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, config: Arc<Config>) -> Self {
        let visits = VisitLog::new(&config.visit_log);
        Self {
            reader,
            writer,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            state: ConnectionState::Reading,
            config,
            visits,
        }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }

    /// Serves requests until the client goes away or a reply forces the
    /// connection closed.
    pub async fn run(&mut self) -> Result<(), ServeError> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    self.state = match self.read_message().await {
                        Ok(Some(raw)) if raw.is_trace() => ConnectionState::Tracing(raw),
                        Ok(Some(raw)) => match parse_message(&raw) {
                            Ok(message) => ConnectionState::Processing(message),
                            Err(e) => {
                                self.reject(StatusCode::BAD_REQUEST, &e).await?;
                                ConnectionState::Closed
                            }
                        },
                        Ok(None) => ConnectionState::Closed,
                        Err(ParseError::Io(e)) => return Err(e.into()),
                        Err(e @ ParseError::TooLarge { .. }) => {
                            self.reject(StatusCode::PAYLOAD_TOO_LARGE, &e).await?;
                            ConnectionState::Closed
                        }
                        Err(e) => {
                            self.reject(StatusCode::BAD_REQUEST, &e).await?;
                            ConnectionState::Closed
                        }
                    };
                }

                ConnectionState::Tracing(raw) => {
                    // TRACE never reaches the parser or the dispatcher
                    writer::send(&mut self.writer, &Response::trace(raw.as_bytes())).await?;
                    self.writer.flush().await?;
                    self.state = ConnectionState::Reading;
                }

                ConnectionState::Processing(message) => {
                    let result =
                        dispatch::dispatch(&mut self.writer, &self.config, &self.visits, &message).await;
                    self.writer.flush().await?;

                    let determinate = result?;
                    self.state = if determinate && message.version.is_persistent() {
                        ConnectionState::Reading // go back for next request
                    } else {
                        ConnectionState::Closed
                    };
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads until the buffer holds a complete message.
    ///
    /// `Ok(None)` means the client closed the connection between messages.
    pub async fn read_message(&mut self) -> Result<Option<RawMessage>, ParseError> {
        loop {
            if let Some(end) = find_message_end(&self.buffer) {
                let raw = RawMessage::new(self.buffer.split_to(end).freeze());
                tracing::debug!(
                    request = %String::from_utf8_lossy(raw.as_bytes()),
                    "Request received"
                );
                return Ok(Some(raw));
            }

            if self.buffer.len() > self.config.max_request_bytes {
                self.buffer.clear();
                return Err(ParseError::TooLarge {
                    limit: self.config.max_request_bytes,
                });
            }

            self.buffer.reserve(READ_CHUNK);
            let n = self.reader.read_buf(&mut self.buffer).await?;

            if n == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                self.buffer.clear();
                return Err(ParseError::Incomplete);
            }
        }
    }

    async fn reject(&mut self, status: StatusCode, error: &ParseError) -> std::io::Result<()> {
        dispatch::client_error(&mut self.writer, status, &error.to_string()).await?;
        self.writer.flush().await
    }
}
