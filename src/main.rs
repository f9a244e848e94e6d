use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};

use pinhole::config::Config;
use pinhole::http::response::{SERVER_NAME, SERVER_VERSION};
use pinhole::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::load()?;
    init_logging(cfg.log_file.as_deref());

    tracing::info!(server = SERVER_NAME, version = SERVER_VERSION, "Start");
    let cfg = Arc::new(cfg);

    let result = match cfg.listen_addr.clone() {
        Some(addr) => {
            tokio::select! {
                res = server::listener::run(Arc::clone(&cfg), &addr) => res,

                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received");
                    Ok(())
                }
            }
        }
        None => server::serve_stdio(Arc::clone(&cfg)).await.map_err(anyhow::Error::from),
    };

    tracing::info!("Done");
    result
}

/// Sends diagnostics to the configured log file. Several responders may
/// append to it at once without coordination, so lines can interleave.
///
/// Never stdout: in supervisor mode that is the client connection.
fn init_logging(path: Option<&Path>) {
    let builder = tracing_subscriber::fmt().with_target(false).with_level(true);

    match path.map(|p| OpenOptions::new().create(true).append(true).open(p)) {
        Some(Ok(file)) => builder.with_ansi(false).with_writer(Mutex::new(file)).init(),
        Some(Err(e)) => {
            builder.with_writer(std::io::stderr).init();
            tracing::warn!(error = %e, "Cannot open log file, logging to stderr");
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
}
