//! Connection sources: the supervisor-provided stdin/stdout pair, or a
//! standalone accept loop.

pub mod listener;

use std::sync::Arc;

use crate::config::Config;
use crate::dispatch::ServeError;
use crate::http::connection::Connection;

/// Serves the single connection handed over on stdin/stdout.
pub async fn serve_stdio(config: Arc<Config>) -> Result<(), ServeError> {
    tracing::info!("Client connected on stdio");

    let mut conn = Connection::new(tokio::io::stdin(), tokio::io::stdout(), config);
    conn.run().await
}
