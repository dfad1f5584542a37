//! dlink HTTP server
//!
//! The HTTP surface of the GS1 Digital Link resolver: a public Resolver
//! read path and a bearer-token protected Data-Entry write path over a
//! shared document store.
//!
//! # Example
//!
//! ```ignore
//! use dlink_server::{DlinkServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig::default();
//!     let server = DlinkServer::new(config).unwrap();
//!     server.run().await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod resolve;
pub mod routes;
pub mod state;

pub use config::{ServerConfig, StorageType};
pub use error::{Result, ServerError};
pub use state::AppState;

use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// GS1 Digital Link resolver HTTP server
pub struct DlinkServer {
    /// Application state
    state: Arc<AppState>,
    /// Configured router
    router: Router,
}

impl DlinkServer {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> Result<Self> {
        let state = Arc::new(AppState::new(config)?);
        let router = routes::build_router(state.clone());
        Ok(Self { state, router })
    }

    /// Create a server around pre-built state (tests plug in a memory
    /// store and a fake toolkit this way)
    pub fn from_state(state: Arc<AppState>) -> Self {
        let router = routes::build_router(state.clone());
        Self { state, router }
    }

    /// Get a reference to the application state
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Get the router for testing
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let addr = self.state.config.listen_addr;
        let listener = TcpListener::bind(addr).await?;

        info!(
            addr = %addr,
            fqdn = %self.state.config.fqdn,
            storage = %self.state.config.storage_type_str(),
            "dlink resolver starting"
        );

        axum::serve(listener, self.router).await
    }
}
