//! Request engine: sends queries over one shared transport and matches replies
//! to callers by transaction ID.

mod pending;

use crate::dns::transport::{create_transport, Transport};
use crate::dns::transport_message::TransportMessage;
use dnscore_domain::{
    ClientConfig, DnsName, DnsRequest, DnsResponse, DnsTransportType, DomainError, RecordType,
    DNS_PORT,
};
use pending::PendingRequests;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Pause before retrying after the transport could not even be set up.
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub server: SocketAddr,
    pub transport: DnsTransportType,
    pub request_timeout: Duration,
}

impl ClientOptions {
    /// UDP to `ip` on the standard port with the default timeout.
    pub fn new(ip: IpAddr) -> Self {
        Self {
            server: SocketAddr::new(ip, DNS_PORT),
            transport: DnsTransportType::Udp,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, DomainError> {
        config
            .validate()
            .map_err(|e| DomainError::ConfigError(e.to_string()))?;
        let server = config
            .server_addr()
            .map_err(|e| DomainError::ConfigError(e.to_string()))?;

        Ok(Self {
            server,
            transport: config.transport,
            request_timeout: config.request_timeout(),
        })
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.server.set_port(port);
        self
    }

    pub fn with_transport(mut self, transport: DnsTransportType) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

struct ClientInner {
    transport: Transport,
    pending: PendingRequests,
    server: SocketAddr,
}

/// Asynchronous DNS client over a single UDP or TCP transport.
///
/// Any number of queries may be in flight at once; a background task reads
/// replies off the transport and hands each one to the query with the same ID.
pub struct DnsClient {
    inner: Arc<ClientInner>,
    request_timeout: Duration,
    shutdown: CancellationToken,
    receive_task: Option<JoinHandle<()>>,
}

impl DnsClient {
    /// Creates the transport and starts the receive loop. Must be called from
    /// within a tokio runtime.
    pub fn new(options: ClientOptions) -> Result<Self, DomainError> {
        let transport = create_transport(options.transport, options.server)?;
        let inner = Arc::new(ClientInner {
            transport,
            pending: PendingRequests::new(),
            server: options.server,
        });

        let shutdown = CancellationToken::new();
        let receive_task = tokio::spawn(receive_loop(inner.clone(), shutdown.clone()));

        info!(
            server = %options.server,
            transport = %options.transport,
            timeout_ms = options.request_timeout.as_millis() as u64,
            "DNS client started"
        );

        Ok(Self {
            inner,
            request_timeout: options.request_timeout,
            shutdown,
            receive_task: Some(receive_task),
        })
    }

    pub fn server(&self) -> SocketAddr {
        self.inner.server
    }

    pub fn transport_type(&self) -> DnsTransportType {
        self.inner.transport.transport_type()
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Number of queries currently waiting for a reply.
    pub fn pending_requests(&self) -> usize {
        self.inner.pending.len()
    }

    pub async fn query(&self, request: &DnsRequest) -> Result<DnsResponse, DomainError> {
        self.query_with_cancellation(request, &CancellationToken::new())
            .await
    }

    /// Builds a recursive query with a random ID and sends it.
    pub async fn query_name(
        &self,
        name: DnsName,
        record_type: RecordType,
    ) -> Result<DnsResponse, DomainError> {
        self.query(&DnsRequest::new(name, record_type)).await
    }

    pub async fn query_name_with_cancellation(
        &self,
        name: DnsName,
        record_type: RecordType,
        cancel: &CancellationToken,
    ) -> Result<DnsResponse, DomainError> {
        self.query_with_cancellation(&DnsRequest::new(name, record_type), cancel)
            .await
    }

    /// Sends `request` and waits for the reply with the same ID.
    ///
    /// Ends with `QueryCancelled` if `cancel` fires first and `QueryTimeout` if
    /// the request timeout elapses first. Cancellation is checked before the
    /// timer, so a request that is both cancelled and expired reports
    /// cancellation. The registration is removed on every exit path.
    pub async fn query_with_cancellation(
        &self,
        request: &DnsRequest,
        cancel: &CancellationToken,
    ) -> Result<DnsResponse, DomainError> {
        let (_guard, reply_rx) = self.inner.pending.register(request.id);

        let exchange = async {
            let message =
                TransportMessage::from_request(request, self.inner.transport.max_message_size())?;
            self.inner.transport.send(&message).await?;
            drop(message);

            debug!(
                id = request.id,
                question = %request.question,
                "DNS query sent, awaiting reply"
            );

            // the sender only disappears if the receive loop is gone
            reply_rx.await.map_err(|_| DomainError::TransportClosed)
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(id = request.id, "DNS query cancelled");
                Err(DomainError::QueryCancelled)
            }
            _ = tokio::time::sleep(self.request_timeout) => {
                debug!(
                    id = request.id,
                    server = %self.inner.server,
                    timeout_ms = self.request_timeout.as_millis() as u64,
                    "DNS query timed out"
                );
                Err(DomainError::QueryTimeout)
            }
            result = exchange => result,
        }
    }

    /// Stops the receive loop, waits for it to finish and closes the transport.
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.receive_task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "DNS client receive loop ended abnormally");
            }
        }
        self.inner.transport.close().await;
        info!(server = %self.inner.server, "DNS client stopped");
    }
}

impl Drop for DnsClient {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn receive_loop(inner: Arc<ClientInner>, shutdown: CancellationToken) {
    debug!(server = %inner.server, "DNS client receive loop started");

    loop {
        let message = tokio::select! {
            _ = shutdown.cancelled() => break,
            result = inner.transport.receive() => result,
        };

        let message = match message {
            Ok(message) => message,
            Err(DomainError::TransportClosed) => break,
            Err(e @ DomainError::TransportConnect { .. }) => {
                warn!(server = %inner.server, error = %e, "DNS transport unavailable");
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(CONNECT_RETRY_DELAY) => continue,
                }
            }
            Err(e) => {
                warn!(server = %inner.server, error = %e, "DNS receive failed");
                continue;
            }
        };

        let response = match message.decode_response() {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    server = %inner.server,
                    bytes = message.len(),
                    error = %e,
                    "Dropping undecodable DNS response"
                );
                continue;
            }
        };
        drop(message);

        let id = response.id;
        if !inner.pending.complete(response) {
            debug!(id, server = %inner.server, "Discarded unmatched DNS response");
        }
    }

    debug!(server = %inner.server, "DNS client receive loop stopped");
}
