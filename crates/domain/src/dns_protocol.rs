use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Standard DNS port.
pub const DNS_PORT: u16 = 53;

/// Size of the fixed message header.
pub const HEADER_LEN: usize = 12;

/// Safe UDP response size without EDNS(0) (RFC 1035 §4.2.1).
pub const DEFAULT_UDP_MESSAGE_SIZE: u16 = 512;

/// Largest UDP message this implementation sends or receives.
pub const MAX_UDP_MESSAGE_SIZE: u16 = 4096;

/// Largest message a 16-bit TCP length prefix can describe.
pub const MAX_TCP_MESSAGE_SIZE: u16 = u16::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DnsTransportType {
    #[default]
    Udp,
    Tcp,
    /// Both UDP and TCP; only meaningful for a server listening on both.
    All,
}

impl DnsTransportType {
    pub fn protocol_name(&self) -> &'static str {
        match self {
            DnsTransportType::Udp => "UDP",
            DnsTransportType::Tcp => "TCP",
            DnsTransportType::All => "ALL",
        }
    }

    pub fn default_message_size(&self) -> u16 {
        match self {
            DnsTransportType::Udp => DEFAULT_UDP_MESSAGE_SIZE,
            DnsTransportType::Tcp | DnsTransportType::All => MAX_TCP_MESSAGE_SIZE,
        }
    }

    pub fn max_message_size(&self) -> u16 {
        match self {
            DnsTransportType::Udp => MAX_UDP_MESSAGE_SIZE,
            DnsTransportType::Tcp | DnsTransportType::All => MAX_TCP_MESSAGE_SIZE,
        }
    }
}

impl fmt::Display for DnsTransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.protocol_name())
    }
}

impl FromStr for DnsTransportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "udp" => Ok(DnsTransportType::Udp),
            "tcp" => Ok(DnsTransportType::Tcp),
            "all" => Ok(DnsTransportType::All),
            _ => Err(format!(
                "Invalid transport '{}'. Expected 'udp', 'tcp' or 'all'",
                s
            )),
        }
    }
}
