use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::dispatch::ServeError;
use crate::http::connection::Connection;

/// Accepts connections forever, one task per connection.
pub async fn run(cfg: Arc<Config>, listen_addr: &str) -> anyhow::Result<()> {
    let listener = TcpListener::bind(listen_addr).await?;
    info!("Listening on {}", listen_addr);

    loop {
        let (socket, peer) = listener.accept().await?;
        info!("Accepted connection from {}", peer);

        let config = Arc::clone(&cfg);
        tokio::spawn(async move {
            let (reader, writer) = socket.into_split();
            let mut conn = Connection::new(reader, writer, config);
            match conn.run().await {
                Ok(()) => info!("Connection from {} done", peer),
                Err(ServeError::Aborted(msg)) => {
                    tracing::error!("Aborting on connection from {}: {}", peer, msg);
                    std::process::exit(1);
                }
                Err(e) => tracing::error!("Connection error from {}: {}", peer, e),
            }
        });
    }
}
