//! Server configuration

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Document store backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StorageType {
    /// One JSON document per id under `--storage-path`
    #[default]
    File,
    /// In-memory store; documents vanish on shutdown
    Memory,
}

/// GS1 Digital Link resolver server configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "dlink-server", about = "GS1 Digital Link resolver", version)]
pub struct ServerConfig {
    /// Address the HTTP server listens on
    #[arg(long, default_value = "127.0.0.1:8080", env = "DLINK_LISTEN_ADDR")]
    pub listen_addr: SocketAddr,

    /// Fully-qualified domain name used in Link headers and linkset bodies
    #[arg(long, default_value = "localhost:8080", env = "DLINK_FQDN")]
    pub fqdn: String,

    /// Document store backend
    #[arg(long, value_enum, default_value = "file")]
    pub storage_type: StorageType,

    /// Root directory for file storage (defaults to a temp directory)
    #[arg(long, env = "DLINK_STORAGE_PATH")]
    pub storage_path: Option<PathBuf>,

    /// Command invoked for GS1 syntax/compression toolkit calls
    #[arg(long, default_value = "gs1-dl-toolkit", env = "DLINK_TOOLKIT_COMMAND")]
    pub toolkit_command: String,

    /// Per-call toolkit timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub toolkit_timeout_secs: u64,

    /// Bearer token accepted on the Data-Entry API (repeatable)
    #[arg(long = "api-token", env = "DLINK_API_TOKEN")]
    pub api_tokens: Vec<String>,

    /// DANGEROUS: serve the Data-Entry API without authentication.
    /// Only for development/testing.
    #[arg(long)]
    pub api_auth_disabled: bool,

    /// Keep the legacy linktype fallback pass (unnormalized retry with
    /// substring and endsWith matching)
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub linktype_fallback: bool,

    /// Enable permissive CORS on the read path
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        // Parse with no CLI arguments so clap defaults apply
        ServerConfig::parse_from::<_, &str>([])
    }
}

impl ServerConfig {
    /// Validate configuration at startup
    pub fn validate(&self) -> Result<(), String> {
        if self.fqdn.trim().is_empty() {
            return Err("--fqdn must not be empty".to_string());
        }
        if self.api_tokens.is_empty() && !self.api_auth_disabled {
            return Err(
                "Data-Entry API requires --api-token (or the --api-auth-disabled dev flag)"
                    .to_string(),
            );
        }
        if self.toolkit_timeout_secs == 0 {
            return Err("--toolkit-timeout-secs must be positive".to_string());
        }
        Ok(())
    }

    /// Toolkit timeout as a [`Duration`]
    pub fn toolkit_timeout(&self) -> Duration {
        Duration::from_secs(self.toolkit_timeout_secs)
    }

    /// Storage backend name for startup logging
    pub fn storage_type_str(&self) -> &'static str {
        match self.storage_type {
            StorageType::File => "file",
            StorageType::Memory => "memory",
        }
    }

    /// Whether a presented token is accepted on the Data-Entry API
    pub fn is_api_token_valid(&self, token: &str) -> bool {
        self.api_tokens.iter().any(|t| t == token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ServerConfig {
        let mut config = ServerConfig::default();
        config.api_tokens = vec!["secret".to_string()];
        config
    }

    #[test]
    fn default_config_without_tokens_fails_validation() {
        let config = ServerConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn tokens_or_dev_flag_satisfy_validation() {
        assert!(base().validate().is_ok());

        let mut config = ServerConfig::default();
        config.api_auth_disabled = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_fqdn_is_rejected() {
        let mut config = base();
        config.fqdn = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn token_check() {
        let config = base();
        assert!(config.is_api_token_valid("secret"));
        assert!(!config.is_api_token_valid("other"));
    }
}
