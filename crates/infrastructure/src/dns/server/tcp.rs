use super::{DnsServerTransport, ServerTransportConnection};
use crate::dns::transport::framing::{read_frame, write_frame};
use crate::dns::transport_message::TransportMessage;
use async_trait::async_trait;
use dnscore_domain::{DnsTransportType, DomainError};
use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info};

const LISTEN_BACKLOG: i32 = 1024;

pub struct TcpServerTransport {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpServerTransport {
    pub async fn bind(addr: SocketAddr) -> Result<Self, DomainError> {
        let listener = create_tcp_listener(addr).map_err(|e| DomainError::TransportConnect {
            server: addr.to_string(),
            reason: format!("failed to bind TCP listener: {}", e),
        })?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| DomainError::TransportConnect {
                server: addr.to_string(),
                reason: e.to_string(),
            })?;

        info!(bind_address = %local_addr, "TCP DNS listener bound");
        Ok(Self {
            listener,
            local_addr,
        })
    }
}

fn create_tcp_listener(addr: SocketAddr) -> Result<TcpListener, std::io::Error> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    if addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;
    socket.set_nonblocking(true)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}

#[async_trait]
impl DnsServerTransport for TcpServerTransport {
    type Connection = TcpServerConnection;

    fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    async fn accept(&self) -> Result<TcpServerConnection, DomainError> {
        let (stream, remote_addr) =
            self.listener
                .accept()
                .await
                .map_err(|e| DomainError::TransportReceive {
                    server: self.local_addr.to_string(),
                    reason: e.to_string(),
                })?;

        if let Err(e) = stream.set_nodelay(true) {
            debug!(client = %remote_addr, error = %e, "Failed to set TCP_NODELAY");
        }
        debug!(client = %remote_addr, "TCP connection accepted");
        Ok(TcpServerConnection::new(stream, remote_addr))
    }
}

/// An accepted TCP client. Carries any number of framed requests.
pub struct TcpServerConnection {
    stream: TcpStream,
    remote_addr: SocketAddr,
    peer: String,
}

impl TcpServerConnection {
    pub fn new(stream: TcpStream, remote_addr: SocketAddr) -> Self {
        Self {
            stream,
            remote_addr,
            peer: remote_addr.to_string(),
        }
    }
}

#[async_trait]
impl ServerTransportConnection for TcpServerConnection {
    fn transport_type(&self) -> DnsTransportType {
        DnsTransportType::Tcp
    }

    fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Next framed request, or `None` once the client has closed its side.
    async fn receive(&mut self) -> Result<Option<TransportMessage>, DomainError> {
        let request = read_frame(&mut self.stream, &self.peer).await?;
        match &request {
            Some(message) => debug!(
                client = %self.remote_addr,
                bytes_received = message.len(),
                "TCP request received"
            ),
            None => debug!(client = %self.remote_addr, "TCP client closed connection"),
        }
        Ok(request)
    }

    async fn send(&mut self, message: &TransportMessage) -> Result<(), DomainError> {
        write_frame(&mut self.stream, message.as_bytes(), &self.peer).await?;
        debug!(client = %self.remote_addr, bytes_sent = message.len(), "TCP response sent");
        Ok(())
    }
}
