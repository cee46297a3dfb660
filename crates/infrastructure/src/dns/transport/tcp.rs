//! TCP transport for DNS queries (RFC 1035 §4.2.2).
//!
//! Every send opens its own connection, writes one framed query and reads one
//! framed reply. Replies are queued in arrival order for `receive`.

use super::framing::{read_frame, write_frame};
use super::DnsClientTransport;
use crate::dns::transport_message::TransportMessage;
use async_trait::async_trait;
use dnscore_domain::{DnsTransportType, DomainError};
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub struct TcpTransport {
    server_addr: SocketAddr,
    replies_tx: mpsc::UnboundedSender<TransportMessage>,
    replies_rx: Mutex<mpsc::UnboundedReceiver<TransportMessage>>,
    closed: CancellationToken,
}

impl TcpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        let (replies_tx, replies_rx) = mpsc::unbounded_channel();
        Self {
            server_addr,
            replies_tx,
            replies_rx: Mutex::new(replies_rx),
            closed: CancellationToken::new(),
        }
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    async fn connect(&self) -> Result<TcpStream, DomainError> {
        let stream = TcpStream::connect(self.server_addr).await.map_err(|e| {
            DomainError::TransportConnect {
                server: self.server_addr.to_string(),
                reason: e.to_string(),
            }
        })?;

        stream
            .set_nodelay(true)
            .map_err(|e| DomainError::TransportConnect {
                server: self.server_addr.to_string(),
                reason: format!("failed to set TCP_NODELAY: {}", e),
            })?;

        Ok(stream)
    }
}

#[async_trait]
impl DnsClientTransport for TcpTransport {
    async fn send(&self, message: &TransportMessage) -> Result<(), DomainError> {
        if self.closed.is_cancelled() {
            return Err(DomainError::TransportClosed);
        }

        let peer = self.server_addr.to_string();
        let mut stream = self.connect().await?;

        write_frame(&mut stream, message.as_bytes(), &peer).await?;
        debug!(
            server = %self.server_addr,
            message_len = message.len(),
            "TCP query sent"
        );

        let reply = read_frame(&mut stream, &peer)
            .await?
            .ok_or_else(|| DomainError::TransportConnectionReset {
                server: peer.clone(),
            })?;

        debug!(
            server = %self.server_addr,
            response_len = reply.len(),
            "TCP response received"
        );

        self.replies_tx
            .send(reply)
            .map_err(|_| DomainError::TransportClosed)
    }

    async fn receive(&self) -> Result<TransportMessage, DomainError> {
        let mut replies = self.replies_rx.lock().await;
        tokio::select! {
            _ = self.closed.cancelled() => Err(DomainError::TransportClosed),
            reply = replies.recv() => reply.ok_or(DomainError::TransportClosed),
        }
    }

    fn transport_type(&self) -> DnsTransportType {
        DnsTransportType::Tcp
    }

    async fn close(&self) {
        if !self.closed.is_cancelled() {
            self.closed.cancel();
            debug!(server = %self.server_addr, "TCP transport closed");
        }
    }
}
