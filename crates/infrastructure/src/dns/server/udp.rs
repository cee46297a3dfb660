use super::{DnsServerTransport, ServerTransportConnection};
use crate::dns::buffer_pool::BufferPool;
use crate::dns::transport_message::TransportMessage;
use async_trait::async_trait;
use dnscore_domain::{DnsTransportType, DomainError, MAX_UDP_MESSAGE_SIZE};
use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::{debug, info};

/// UDP listener. Each received datagram becomes its own connection.
pub struct UdpServerTransport {
    socket: Arc<UdpSocket>,
    local_addr: SocketAddr,
}

impl UdpServerTransport {
    pub async fn bind(addr: SocketAddr) -> Result<Self, DomainError> {
        let socket = create_udp_socket(addr).map_err(|e| DomainError::TransportConnect {
            server: addr.to_string(),
            reason: format!("failed to bind UDP listener: {}", e),
        })?;
        let local_addr = socket
            .local_addr()
            .map_err(|e| DomainError::TransportConnect {
                server: addr.to_string(),
                reason: e.to_string(),
            })?;

        info!(bind_address = %local_addr, "UDP DNS listener bound");
        Ok(Self {
            socket: Arc::new(socket),
            local_addr,
        })
    }
}

fn create_udp_socket(addr: SocketAddr) -> Result<UdpSocket, std::io::Error> {
    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))?;
    if addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.set_recv_buffer_size(512 * 1024)?;
    socket.bind(&addr.into())?;
    socket.set_nonblocking(true)?;

    let std_socket: std::net::UdpSocket = socket.into();
    UdpSocket::from_std(std_socket)
}

#[async_trait]
impl DnsServerTransport for UdpServerTransport {
    type Connection = UdpServerConnection;

    fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    async fn accept(&self) -> Result<UdpServerConnection, DomainError> {
        let mut buffer = BufferPool::shared().rent(MAX_UDP_MESSAGE_SIZE as usize);
        let (len, remote_addr) =
            self.socket
                .recv_from(&mut buffer[..])
                .await
                .map_err(|e| DomainError::TransportReceive {
                    server: self.local_addr.to_string(),
                    reason: e.to_string(),
                })?;

        debug!(client = %remote_addr, bytes_received = len, "UDP request received");
        Ok(UdpServerConnection::new(
            self.socket.clone(),
            remote_addr,
            TransportMessage::new(buffer, len)?,
        ))
    }
}

/// A single UDP exchange: the request that arrived and the address to reply to.
pub struct UdpServerConnection {
    socket: Arc<UdpSocket>,
    remote_addr: SocketAddr,
    request: Option<TransportMessage>,
}

impl UdpServerConnection {
    pub fn new(socket: Arc<UdpSocket>, remote_addr: SocketAddr, request: TransportMessage) -> Self {
        Self {
            socket,
            remote_addr,
            request: Some(request),
        }
    }
}

#[async_trait]
impl ServerTransportConnection for UdpServerConnection {
    fn transport_type(&self) -> DnsTransportType {
        DnsTransportType::Udp
    }

    fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// The captured datagram on the first call, `None` afterwards.
    async fn receive(&mut self) -> Result<Option<TransportMessage>, DomainError> {
        Ok(self.request.take())
    }

    async fn send(&mut self, message: &TransportMessage) -> Result<(), DomainError> {
        let bytes_sent = self
            .socket
            .send_to(message.as_bytes(), self.remote_addr)
            .await
            .map_err(|e| DomainError::TransportSend {
                server: self.remote_addr.to_string(),
                reason: e.to_string(),
            })?;

        debug!(client = %self.remote_addr, bytes_sent, "UDP response sent");
        Ok(())
    }
}
