pub(crate) mod framing;
pub mod tcp;
pub mod udp;

use super::transport_message::TransportMessage;
use async_trait::async_trait;
use dnscore_domain::{DnsTransportType, DomainError};
use std::net::SocketAddr;

/// Client side of a DNS transport.
///
/// `send` and `receive` are independent: a reply can arrive on `receive` in
/// any order relative to the sends, and the caller correlates by message id.
/// Both futures can be dropped at any await point to abandon the operation.
#[async_trait]
pub trait DnsClientTransport: Send + Sync {
    async fn send(&self, message: &TransportMessage) -> Result<(), DomainError>;

    /// Waits for the next inbound message. Returns `TransportClosed` once the
    /// transport has been closed.
    async fn receive(&self) -> Result<TransportMessage, DomainError>;

    fn transport_type(&self) -> DnsTransportType;

    async fn close(&self);
}

pub enum Transport {
    Udp(udp::UdpTransport),
    Tcp(tcp::TcpTransport),
}

impl Transport {
    pub async fn send(&self, message: &TransportMessage) -> Result<(), DomainError> {
        match self {
            Self::Udp(t) => DnsClientTransport::send(t, message).await,
            Self::Tcp(t) => DnsClientTransport::send(t, message).await,
        }
    }

    pub async fn receive(&self) -> Result<TransportMessage, DomainError> {
        match self {
            Self::Udp(t) => DnsClientTransport::receive(t).await,
            Self::Tcp(t) => DnsClientTransport::receive(t).await,
        }
    }

    pub async fn close(&self) {
        match self {
            Self::Udp(t) => DnsClientTransport::close(t).await,
            Self::Tcp(t) => DnsClientTransport::close(t).await,
        }
    }

    pub fn transport_type(&self) -> DnsTransportType {
        match self {
            Self::Udp(_) => DnsTransportType::Udp,
            Self::Tcp(_) => DnsTransportType::Tcp,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        self.transport_type().protocol_name()
    }

    /// Largest message this transport carries; send buffers are sized to it.
    pub fn max_message_size(&self) -> usize {
        self.transport_type().max_message_size() as usize
    }
}

pub fn create_transport(
    transport_type: DnsTransportType,
    server: SocketAddr,
) -> Result<Transport, DomainError> {
    match transport_type {
        DnsTransportType::Udp => Ok(Transport::Udp(udp::UdpTransport::new(server))),
        DnsTransportType::Tcp => Ok(Transport::Tcp(tcp::TcpTransport::new(server))),
        DnsTransportType::All => Err(DomainError::UnsupportedTransport(format!(
            "a client needs a single transport, got {} for {}",
            transport_type, server
        ))),
    }
}
