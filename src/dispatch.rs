//! Request dispatch: resolve the path, log the visit, then act on the
//! method and the resource's capability.

use chrono::Utc;
use thiserror::Error;
use tokio::io::AsyncWrite;

use crate::config::Config;
use crate::http::path::canonicalize;
use crate::http::request::{Message, Method};
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::http::writer::{self, ResponseWriter, serialize_head};
use crate::resource::program::{self, ExecError, Invocation, Outcome};
use crate::resource::{Capability, Length, Resource, file, resolve_path};
use crate::visit_log::VisitLog;

#[derive(Debug, Error)]
pub enum ServeError {
    /// Internal inconsistency; the process must not go on serving
    #[error("server aborted: {0}")]
    Aborted(String),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Answers one parsed request.
///
/// Returns whether the reply had a determinate length. A reply without one
/// ends when the connection closes, so the caller must not reuse it.
pub async fn dispatch<W>(
    out: &mut W,
    config: &Config,
    visits: &VisitLog,
    message: &Message,
) -> Result<bool, ServeError>
where
    W: AsyncWrite + Unpin,
{
    let path = canonicalize(&message.uri);

    let Some(resource) = config.resources.resolve(&path) else {
        not_found(out, &path).await?;
        return Ok(true);
    };

    visits.record(&path).await;

    tracing::info!(
        method = %message.method_name,
        path = %path,
        query = message.query.as_deref().unwrap_or(""),
        "Serving resource"
    );

    match message.method {
        Method::GET => get(out, config, message, resource, &path).await,
        Method::HEAD => head(out, config, resource, &path).await,
        Method::TRACE => abort(out, "TRACE reached the dispatcher").await,
        Method::POST | Method::PUT | Method::DELETE | Method::OPTIONS | Method::CONNECT => {
            let msg = format!("{} not implemented", message.method.as_str());
            server_error(out, StatusCode::NOT_IMPLEMENTED, &msg).await?;
            Ok(true)
        }
        Method::UNKNOWN => {
            let msg = format!("Unknown method {}", message.method_name);
            client_error(out, StatusCode::BAD_REQUEST, &msg).await?;
            Ok(true)
        }
    }
}

fn ok_response(resource: &Resource, length: Length) -> Response {
    let builder = ResponseBuilder::new(StatusCode::OK).content_type(&resource.content_type);
    let builder = match length {
        Length::Known(len) => builder.content_length(len),
        Length::Unknown | Length::NotFound => builder,
    };
    builder.build()
}

async fn head<W>(out: &mut W, config: &Config, resource: &Resource, path: &str) -> Result<bool, ServeError>
where
    W: AsyncWrite + Unpin,
{
    let length = resource.content_length(&config.root).await;
    if length == Length::NotFound {
        not_found(out, path).await?;
        return Ok(true);
    }

    ResponseWriter::head(&ok_response(resource, length))
        .write_to_stream(out)
        .await?;
    Ok(true)
}

async fn get<W>(
    out: &mut W,
    config: &Config,
    message: &Message,
    resource: &Resource,
    path: &str,
) -> Result<bool, ServeError>
where
    W: AsyncWrite + Unpin,
{
    if resource.content_length(&config.root).await == Length::NotFound {
        not_found(out, path).await?;
        return Ok(true);
    }

    match &resource.capability {
        Capability::File { path: file_path } => {
            let full = resolve_path(&config.root, file_path);
            // the file can still vanish between the length query and here
            let (body, len) = match file::open(&full).await {
                Ok(opened) => opened,
                Err(e) => {
                    tracing::debug!(file = %full.display(), error = %e, "File disappeared");
                    not_found(out, path).await?;
                    return Ok(true);
                }
            };

            ResponseWriter::head(&ok_response(resource, Length::Known(len)))
                .write_to_stream(out)
                .await?;
            let sent = file::stream(body, len, out).await?;
            if sent < len {
                tracing::warn!(file = %full.display(), sent, expected = len, "File shrank while sending");
                return Ok(false);
            }
            Ok(true)
        }
        Capability::Program { path: program_path, arg } => {
            let invocation = Invocation::new(
                program_path,
                arg.as_deref(),
                &config.root,
                message.query.as_deref(),
            );

            let running = match program::spawn(&invocation, &config.environment) {
                Ok(running) => running,
                Err(e) => {
                    tracing::error!(error = %e, "Program failed to start");
                    server_error(out, StatusCode::INTERNAL_SERVER_ERROR, "cannot run program").await?;
                    return Ok(true);
                }
            };

            let head = serialize_head(&ok_response(resource, Length::Unknown), Utc::now());
            match running.stream(&head, out, config.program_timeout()).await? {
                Outcome::Exited(status) => {
                    if !status.success() {
                        tracing::warn!(path = %path, status = %status, "Program exited unsuccessfully");
                    }
                }
                Outcome::TimedOut { head_sent: false } => {
                    server_error(out, StatusCode::GATEWAY_TIMEOUT, "program timed out").await?;
                    return Ok(true);
                }
                Outcome::TimedOut { head_sent: true } => {
                    tracing::warn!(
                        path = %path,
                        status = StatusCode::GATEWAY_TIMEOUT.as_u16(),
                        "Program timed out mid-body, closing connection"
                    );
                }
            }
            Ok(false)
        }
    }
}

async fn not_found<W>(out: &mut W, path: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    // echoes the client's path back, as sent after canonicalization
    client_error(out, StatusCode::NOT_FOUND, &format!("{path} not found")).await
}

pub async fn client_error<W>(out: &mut W, status: StatusCode, msg: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    tracing::warn!(status = status.as_u16(), "Client error: {}", msg);
    writer::send(out, &Response::client_error(status, msg)).await
}

pub async fn server_error<W>(out: &mut W, status: StatusCode, msg: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    tracing::error!(status = status.as_u16(), "Server error: {}", msg);
    writer::send(out, &Response::server_error(status, msg)).await
}

/// Sends the abort page and fails with [`ServeError::Aborted`].
pub async fn abort<W>(out: &mut W, msg: &str) -> Result<bool, ServeError>
where
    W: AsyncWrite + Unpin,
{
    tracing::error!("Server abort: {}", msg);
    writer::send(out, &Response::aborted(msg)).await?;
    Err(ServeError::Aborted(msg.to_string()))
}
