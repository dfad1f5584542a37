//! Application state shared across request handlers
//!
//! Collaborators are passed explicitly through `Arc<AppState>` via axum's
//! `State` extractor; there is no ambient service location.

use crate::config::{ServerConfig, StorageType};
use crate::error::ServerError;
use dlink_store::{DocumentStore, FileStore, MemoryStore};
use dlink_toolkit::{SubprocessToolkit, Toolkit};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across all request handlers
#[derive(Debug)]
pub struct AppState {
    /// Shared document store
    pub store: Arc<dyn DocumentStore>,

    /// GS1 syntax/compression toolkit
    pub toolkit: Arc<dyn Toolkit>,

    /// Server configuration
    pub config: ServerConfig,

    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state from config
    ///
    /// Chooses the storage backend and wires the subprocess toolkit.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        config
            .validate()
            .map_err(|e| ServerError::bad_request(format!("invalid configuration: {e}")))?;

        let store: Arc<dyn DocumentStore> = match config.storage_type {
            StorageType::Memory => Arc::new(MemoryStore::new()),
            StorageType::File => {
                let path = config
                    .storage_path
                    .clone()
                    .unwrap_or_else(|| std::env::temp_dir().join("dlink-resolver-data"));
                Arc::new(FileStore::open(path)?)
            }
        };

        let toolkit = Arc::new(
            SubprocessToolkit::new(config.toolkit_command.clone())
                .with_timeout(config.toolkit_timeout()),
        );

        Ok(Self::with_components(config, store, toolkit))
    }

    /// Assemble state from pre-built collaborators (used by tests to plug
    /// in a memory store and a fake toolkit)
    pub fn with_components(
        config: ServerConfig,
        store: Arc<dyn DocumentStore>,
        toolkit: Arc<dyn Toolkit>,
    ) -> Self {
        Self {
            store,
            toolkit,
            config,
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
