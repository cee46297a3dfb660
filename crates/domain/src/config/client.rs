use crate::{DnsTransportType, DNS_PORT};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use super::errors::ConfigError;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Server IP address
    #[serde(default = "default_server")]
    pub server: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub transport: DnsTransportType,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ClientConfig {
    pub fn server_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.server.parse().map_err(|_| {
            ConfigError::Validation(format!("Invalid server address '{}'", self.server))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Request timeout must be greater than 0".to_string(),
            ));
        }
        if self.transport == DnsTransportType::All {
            return Err(ConfigError::Validation(
                "Client transport must be 'udp' or 'tcp'".to_string(),
            ));
        }
        self.server_addr()?;
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            port: default_port(),
            transport: DnsTransportType::default(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_server() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DNS_PORT
}

fn default_request_timeout_ms() -> u64 {
    5000
}
