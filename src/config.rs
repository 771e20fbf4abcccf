//! Configuration management for the RAX Gopher Server
//!
//! All values are fixed at process start and immutable for the lifetime of
//! the server. They are loaded from an optional `config.toml` and may be
//! overridden through `GOPHER_*` environment variables.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Address family of the listening socket.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    Inet,
    /// Accepted by the parser so the error is explicit, refused at bind time.
    Inet6,
}

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    // ═══ NETWORK ═══
    pub address_family: AddressFamily,

    /// IP address the listening socket is bound to
    pub bind_address: String,

    /// Port the listening socket is bound to
    pub port: u16,

    /// Number of connection slots (concurrent clients)
    pub max_connections: usize,

    /// Receive timeout for accept and selector reads, in seconds
    pub recv_timeout_secs: u64,

    /// Kernel backlog of the listening socket
    pub listen_backlog: u32,

    // ═══ MENU DEFAULTS ═══
    /// Hostname written into menu items that don't name one
    pub default_hostname: String,

    /// Port written into menu items that don't name one
    pub default_port: u16,

    // ═══ CONTENT ═══
    /// Directory tree exposed to clients
    pub document_root: String,

    /// Longest selector accepted from a client, in bytes
    pub max_selector_length: usize,

    /// Chunk size used when piping files to a client
    pub transfer_chunk_size: usize,

    /// Size of the buffer a single menu line must fit in (terminator included)
    pub max_line_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address_family: AddressFamily::Inet,
            bind_address: "0.0.0.0".to_string(),
            port: 70,
            max_connections: 10,
            recv_timeout_secs: 3,
            listen_backlog: 5,
            default_hostname: "localhost".to_string(),
            default_port: 70,
            document_root: ".".to_string(),
            max_selector_length: 255,
            transfer_chunk_size: 256,
            max_line_length: 256,
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("GOPHER").try_parsing(true))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.max_connections == 0 {
            return Err(config::ConfigError::Message(
                "max_connections must be greater than 0".into(),
            ));
        }

        if self.recv_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "recv_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.max_selector_length == 0 {
            return Err(config::ConfigError::Message(
                "max_selector_length must be greater than 0".into(),
            ));
        }

        if self.transfer_chunk_size == 0 {
            return Err(config::ConfigError::Message(
                "transfer_chunk_size must be greater than 0".into(),
            ));
        }

        // Smallest possible item: type, three tabs, a one digit port and CRLF.
        if self.max_line_length < 8 {
            return Err(config::ConfigError::Message(
                "max_line_length is too small to hold any menu item".into(),
            ));
        }

        if self.document_root.is_empty() {
            return Err(config::ConfigError::Message(
                "document_root cannot be empty".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as a socket address string
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Get document root as PathBuf
    pub fn document_root_path(&self) -> PathBuf {
        PathBuf::from(&self.document_root)
    }

    /// Get receive timeout as Duration
    pub fn recv_timeout(&self) -> Duration {
        Duration::from_secs(self.recv_timeout_secs)
    }
}
