//! hello-gateway: synchronous Hello, World! gateway server.
//!
//! Registers the hello application with the blocking request-dispatch
//! gateway and serves one request at a time until externally interrupted.

use hello_http::config::Config;
use hello_http::gateway::{hello_app, GatewayServer};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LISTEN: &str = "0.0.0.0:8000";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load(DEFAULT_LISTEN)?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(listen = %config.listen, "Starting hello-gateway server");

    let server = GatewayServer::bind(&config.listen, hello_app)?;
    server.serve_forever()?;

    Ok(())
}
