//! Server side of the transports: one connection per exchange with a client.

pub mod tcp;
pub mod udp;

use super::transport_message::TransportMessage;
use async_trait::async_trait;
use dnscore_domain::{DnsTransportType, DomainError};
use std::net::SocketAddr;

pub use tcp::{TcpServerConnection, TcpServerTransport};
pub use udp::{UdpServerConnection, UdpServerTransport};

/// One client as seen by a server.
///
/// `receive` yields the client's requests until there are no more (`None`),
/// and `send` writes a reply back to the same client.
#[async_trait]
pub trait ServerTransportConnection: Send {
    fn transport_type(&self) -> DnsTransportType;

    /// Size of response the client can be assumed to accept without negotiation.
    fn default_message_size(&self) -> usize {
        self.transport_type().default_message_size() as usize
    }

    fn max_message_size(&self) -> usize {
        self.transport_type().max_message_size() as usize
    }

    fn remote_addr(&self) -> SocketAddr;

    async fn receive(&mut self) -> Result<Option<TransportMessage>, DomainError>;

    async fn send(&mut self, message: &TransportMessage) -> Result<(), DomainError>;
}

/// A bound listener handing out client connections.
#[async_trait]
pub trait DnsServerTransport: Send + Sync {
    type Connection: ServerTransportConnection;

    fn local_addr(&self) -> SocketAddr;

    async fn accept(&self) -> Result<Self::Connection, DomainError>;
}
