#![allow(dead_code)]
use dnscore_domain::{
    DnsName, DnsRecord, DnsRequest, DnsResponse, DnsTransportType, RecordType, ResponseStatus,
};
use dnscore_infrastructure::dns::{
    DnsServerTransport, ServerTransportConnection, TcpServerTransport, TransportMessage,
    UdpServerTransport,
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const TEST_DOMAIN: &str = "test.com";
pub const TEST_ADDRESS: Ipv4Addr = Ipv4Addr::new(4, 3, 2, 1);
pub const TEST_TTL: Duration = Duration::from_secs(42);

#[derive(Debug, Clone, Default)]
pub struct TestServerConfig {
    /// Read requests but never answer.
    pub silent: bool,
    /// Wait this long before each answer.
    pub delay: Option<Duration>,
    /// UDP only: collect this many requests, then answer them newest first.
    pub reverse_batch: usize,
    /// UDP only: send a reply with an ID nobody asked for before the real one.
    pub send_orphan: bool,
    /// UDP only: send an undecodable datagram before the real reply.
    pub send_garbage: bool,
}

impl TestServerConfig {
    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Self::default()
        }
    }

    pub fn delayed(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn reversed(batch: usize) -> Self {
        Self {
            reverse_batch: batch,
            ..Self::default()
        }
    }
}

/// Canned answers: `test.com A` resolves, everything else is NXDOMAIN.
pub fn answer(request: &DnsRequest) -> DnsResponse {
    let question = &request.question;
    let known = DnsName::parse(TEST_DOMAIN).unwrap();

    if question.name == known && question.record_type == RecordType::A {
        request.reply(vec![DnsRecord::address(
            question.name.clone(),
            IpAddr::V4(TEST_ADDRESS),
            TEST_TTL,
        )])
    } else {
        request.reply_with_status(ResponseStatus::NameError)
    }
}

/// DNS server on loopback listening on both UDP and TCP (separate ports).
pub struct TestDnsServer {
    udp_addr: SocketAddr,
    tcp_addr: SocketAddr,
    requests_seen: Arc<AtomicUsize>,
    shutdown: CancellationToken,
}

impl TestDnsServer {
    pub async fn start() -> Self {
        Self::start_with(TestServerConfig::default()).await
    }

    pub async fn start_with(config: TestServerConfig) -> Self {
        let loopback: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let udp = UdpServerTransport::bind(loopback).await.unwrap();
        let tcp = TcpServerTransport::bind(loopback).await.unwrap();

        let server = Self {
            udp_addr: udp.local_addr(),
            tcp_addr: tcp.local_addr(),
            requests_seen: Arc::new(AtomicUsize::new(0)),
            shutdown: CancellationToken::new(),
        };

        let config = Arc::new(config);
        tokio::spawn(serve_udp(
            udp,
            config.clone(),
            server.requests_seen.clone(),
            server.shutdown.clone(),
        ));
        tokio::spawn(serve_tcp(
            tcp,
            config,
            server.requests_seen.clone(),
            server.shutdown.clone(),
        ));

        server
    }

    pub fn udp_addr(&self) -> SocketAddr {
        self.udp_addr
    }

    pub fn tcp_addr(&self) -> SocketAddr {
        self.tcp_addr
    }

    pub fn requests_seen(&self) -> usize {
        self.requests_seen.load(Ordering::SeqCst)
    }
}

impl Drop for TestDnsServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn serve_udp(
    listener: UdpServerTransport,
    config: Arc<TestServerConfig>,
    seen: Arc<AtomicUsize>,
    shutdown: CancellationToken,
) {
    let mut held = Vec::new();
    loop {
        let connection = tokio::select! {
            _ = shutdown.cancelled() => break,
            result = listener.accept() => match result {
                Ok(connection) => connection,
                Err(_) => continue,
            },
        };

        if config.reverse_batch > 1 {
            held.push(connection);
            if held.len() >= config.reverse_batch {
                while let Some(connection) = held.pop() {
                    handle(connection, &config, &seen).await;
                }
            }
            continue;
        }

        let config = config.clone();
        let seen = seen.clone();
        tokio::spawn(async move { handle(connection, &config, &seen).await });
    }
}

async fn serve_tcp(
    listener: TcpServerTransport,
    config: Arc<TestServerConfig>,
    seen: Arc<AtomicUsize>,
    shutdown: CancellationToken,
) {
    loop {
        let connection = tokio::select! {
            _ = shutdown.cancelled() => break,
            result = listener.accept() => match result {
                Ok(connection) => connection,
                Err(_) => continue,
            },
        };

        let config = config.clone();
        let seen = seen.clone();
        tokio::spawn(async move { handle(connection, &config, &seen).await });
    }
}

async fn handle<C: ServerTransportConnection>(
    mut connection: C,
    config: &TestServerConfig,
    seen: &AtomicUsize,
) {
    let is_udp = connection.transport_type() == DnsTransportType::Udp;

    while let Ok(Some(message)) = connection.receive().await {
        seen.fetch_add(1, Ordering::SeqCst);
        if config.silent {
            continue;
        }
        if let Some(delay) = config.delay {
            tokio::time::sleep(delay).await;
        }

        let Ok(request) = message.decode_request() else {
            continue;
        };
        drop(message);

        if is_udp && config.send_garbage {
            let garbage = TransportMessage::copy_from_slice(&[0xDE, 0xAD, 0xBE]);
            let _ = connection.send(&garbage).await;
        }
        if is_udp && config.send_orphan {
            let orphan = answer(&request.clone().with_id(request.id.wrapping_add(1)));
            let orphan =
                TransportMessage::from_response(&orphan, connection.max_message_size()).unwrap();
            let _ = connection.send(&orphan).await;
        }

        let response =
            TransportMessage::from_response(&answer(&request), connection.max_message_size())
                .unwrap();
        if connection.send(&response).await.is_err() {
            break;
        }
    }
}
