#![allow(dead_code)]
use dnscore_domain::{DnsName, DnsRequest, DnsTransportType, RecordType};
use dnscore_infrastructure::dns::{ClientOptions, DnsClient};
use std::net::SocketAddr;
use std::time::Duration;

pub struct ClientBuilder {
    options: ClientOptions,
}

impl ClientBuilder {
    pub fn udp(server: SocketAddr) -> Self {
        Self {
            options: ClientOptions::new(server.ip())
                .with_port(server.port())
                .with_request_timeout(Duration::from_secs(2)),
        }
    }

    pub fn tcp(server: SocketAddr) -> Self {
        let mut builder = Self::udp(server);
        builder.options.transport = DnsTransportType::Tcp;
        builder
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.options.request_timeout = Duration::from_millis(ms);
        self
    }

    pub fn options(&self) -> ClientOptions {
        self.options.clone()
    }

    pub fn build(self) -> DnsClient {
        DnsClient::new(self.options).unwrap()
    }
}

pub struct RequestBuilder;

impl RequestBuilder {
    pub fn a(name: &str) -> DnsRequest {
        DnsRequest::new(DnsName::parse(name).unwrap(), RecordType::A)
    }

    pub fn a_with_id(name: &str, id: u16) -> DnsRequest {
        Self::a(name).with_id(id)
    }
}
