//! DnsCore Infrastructure Layer
pub mod dns;

pub use dns::{
    BufferPool, ClientOptions, DnsClient, DnsClientTransport, DnsServerTransport,
    ServerTransportConnection, TcpServerTransport, TransportMessage, UdpServerTransport,
};
