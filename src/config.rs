// MIT License - Copyright (c) 2026 Peter Wright
// Receiver configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::account::AlarmAccount;
use crate::constants::{DEFAULT_HOST, DEFAULT_IDLE_TIMEOUT, DEFAULT_PORT, MAX_LINE_LEN};
use crate::error::{ReceiverError, Result};

/// Listener settings for the connection server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind (default: all interfaces)
    pub host: String,
    /// TCP port (default: 5000, 0 = OS-assigned)
    pub port: u16,
    /// Inactivity period after which a connection is closed (default: 60s)
    pub idle_timeout: Duration,
    /// Longest line kept from a panel (default: 4096 bytes)
    pub max_line_len: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            max_line_len: MAX_LINE_LEN,
        }
    }
}

impl ServerConfig {
    /// Create a new config builder starting from defaults.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builder for ServerConfig.
#[derive(Debug, Clone, Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    pub fn max_line_len(mut self, len: usize) -> Self {
        self.config.max_line_len = len;
        self
    }

    pub fn build(self) -> ServerConfig {
        self.config
    }
}

/// Contents of the TOML configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReceiverConfig {
    #[serde(default)]
    pub server: ServerToml,
    #[serde(default)]
    pub store: StoreToml,
    #[serde(default)]
    pub accounts: Vec<AlarmAccount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerToml {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

impl Default for ServerToml {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_idle_timeout_secs() -> u64 {
    DEFAULT_IDLE_TIMEOUT.as_secs()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreToml {
    /// JSON-lines file for alerts; alerts stay in memory when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl ReceiverConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ReceiverError::Config {
            details: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ReceiverError::Config {
            details: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.server.idle_timeout_secs == 0 {
            return Err(ReceiverError::Config {
                details: "server.idle_timeout_secs must be greater than 0".to_string(),
            });
        }
        if let Some(account) = self.accounts.iter().find(|a| a.account_code.is_empty()) {
            return Err(ReceiverError::Config {
                details: format!("account \"{}\" has an empty account_code", account.name),
            });
        }
        Ok(())
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig::builder()
            .host(&self.server.host)
            .port(self.server.port)
            .idle_timeout(Duration::from_secs(self.server.idle_timeout_secs))
            .build()
    }
}
