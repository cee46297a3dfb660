//! UDP transport for DNS queries (RFC 1035 §4.2.1).
//!
//! Messages are sent as-is, one per datagram. The socket is created and
//! connected to the server on first use and then shared by every request the
//! client has in flight; replies are matched by the client, not here.

use super::DnsClientTransport;
use crate::dns::buffer_pool::BufferPool;
use crate::dns::transport_message::TransportMessage;
use async_trait::async_trait;
use dnscore_domain::{DnsTransportType, DomainError, MAX_UDP_MESSAGE_SIZE};
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub struct UdpTransport {
    server_addr: SocketAddr,
    socket: OnceCell<UdpSocket>,
    closed: CancellationToken,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self {
            server_addr,
            socket: OnceCell::new(),
            closed: CancellationToken::new(),
        }
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    pub fn is_connected(&self) -> bool {
        self.socket.initialized()
    }

    fn connect_error(&self, e: std::io::Error) -> DomainError {
        DomainError::TransportConnect {
            server: self.server_addr.to_string(),
            reason: e.to_string(),
        }
    }

    /// The connected socket, creating it on the first call.
    ///
    /// Concurrent first callers wait on the same initialisation, so the socket
    /// is bound and connected exactly once.
    async fn socket(&self) -> Result<&UdpSocket, DomainError> {
        if self.closed.is_cancelled() {
            return Err(DomainError::TransportClosed);
        }
        self.socket
            .get_or_try_init(|| async {
                let socket = self.bind_ephemeral().map_err(|e| self.connect_error(e))?;
                socket
                    .connect(self.server_addr)
                    .await
                    .map_err(|e| self.connect_error(e))?;

                info!(
                    server = %self.server_addr,
                    local = ?socket.local_addr().ok(),
                    "UDP transport connected"
                );
                Ok::<_, DomainError>(socket)
            })
            .await
    }

    fn bind_ephemeral(&self) -> Result<UdpSocket, std::io::Error> {
        let (domain, bind_addr): (Domain, SocketAddr) = if self.server_addr.is_ipv4() {
            (Domain::IPV4, (Ipv4Addr::UNSPECIFIED, 0).into())
        } else {
            (Domain::IPV6, (Ipv6Addr::UNSPECIFIED, 0).into())
        };

        let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_recv_buffer_size(256 * 1024)?;
        socket.bind(&bind_addr.into())?;
        socket.set_nonblocking(true)?;

        let std_socket: std::net::UdpSocket = socket.into();
        UdpSocket::from_std(std_socket)
    }
}

#[async_trait]
impl DnsClientTransport for UdpTransport {
    async fn send(&self, message: &TransportMessage) -> Result<(), DomainError> {
        let socket = self.socket().await?;

        let bytes_sent = socket
            .send(message.as_bytes())
            .await
            .map_err(|e| DomainError::TransportSend {
                server: self.server_addr.to_string(),
                reason: e.to_string(),
            })?;

        debug!(
            server = %self.server_addr,
            bytes_sent = bytes_sent,
            "UDP query sent"
        );
        Ok(())
    }

    async fn receive(&self) -> Result<TransportMessage, DomainError> {
        let socket = self.socket().await?;
        let mut buffer = BufferPool::shared().rent(MAX_UDP_MESSAGE_SIZE as usize);

        let bytes_received = tokio::select! {
            _ = self.closed.cancelled() => return Err(DomainError::TransportClosed),
            result = socket.recv(&mut buffer[..]) => {
                result.map_err(|e| DomainError::TransportReceive {
                    server: self.server_addr.to_string(),
                    reason: e.to_string(),
                })?
            }
        };

        debug!(
            server = %self.server_addr,
            bytes_received = bytes_received,
            "UDP response received"
        );
        TransportMessage::new(buffer, bytes_received)
    }

    fn transport_type(&self) -> DnsTransportType {
        DnsTransportType::Udp
    }

    async fn close(&self) {
        if !self.closed.is_cancelled() {
            self.closed.cancel();
            debug!(server = %self.server_addr, "UDP transport closed");
        }
    }
}
