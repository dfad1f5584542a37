//! dlink resolver CLI
//!
//! Run with: `cargo run -p dlink-server -- --help`

use clap::Parser;
use dlink_server::{DlinkServer, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "invalid configuration");
        return Err(e.into());
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.listen_addr,
        fqdn = %config.fqdn,
        storage = config.storage_type_str(),
        toolkit = %config.toolkit_command,
        linktype_fallback = config.linktype_fallback,
        cors = config.cors_enabled,
        "Starting dlink resolver"
    );

    let server = DlinkServer::new(config)?;
    server.run().await.map_err(Into::into)
}
