pub mod buffer_pool;
pub mod client;
pub mod codec;
pub mod server;
pub mod transport;
pub mod transport_message;

pub use buffer_pool::{BufferPool, PoolStats, PooledBuffer};
pub use client::{ClientOptions, DnsClient};
pub use server::{
    DnsServerTransport, ServerTransportConnection, TcpServerConnection, TcpServerTransport,
    UdpServerConnection, UdpServerTransport,
};
pub use transport::{create_transport, DnsClientTransport, Transport};
pub use transport_message::TransportMessage;
