//! hello-async: asynchronous Hello, World! HTTP server.
//!
//! Answers every connection with one fixed plaintext response as soon as
//! the request's end-of-headers delimiter arrives, then closes. Runs until
//! externally interrupted.

use hello_http::config::Config;
use hello_http::server::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LISTEN: &str = "127.0.0.1:8000";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load(DEFAULT_LISTEN)?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(listen = %config.listen, "Starting hello-async server");

    let server = Server::bind(&config.listen).await?;
    server.run().await?;

    Ok(())
}
