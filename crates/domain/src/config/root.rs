use serde::{Deserialize, Serialize};

use super::client::ClientConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use crate::DnsTransportType;

const DEFAULT_CONFIG_FILE: &str = "dnscore.toml";

/// Main configuration structure for DnsCore
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Client configuration (server endpoint, transport, timeout)
    #[serde(default)]
    pub client: ClientConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. dnscore.toml in current directory
    /// 3. Default configuration
    ///
    /// Command-line overrides are applied last.
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new(DEFAULT_CONFIG_FILE).exists() {
            Self::from_file(DEFAULT_CONFIG_FILE)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(server) = overrides.server {
            self.client.server = server;
        }
        if let Some(port) = overrides.port {
            self.client.port = port;
        }
        if let Some(transport) = overrides.transport {
            self.client.transport = transport;
        }
        if let Some(timeout) = overrides.request_timeout_ms {
            self.client.request_timeout_ms = timeout;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.client.validate()
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub server: Option<String>,
    pub port: Option<u16>,
    pub transport: Option<DnsTransportType>,
    pub request_timeout_ms: Option<u64>,
    pub log_level: Option<String>,
}
