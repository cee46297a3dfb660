#![allow(dead_code)]
use dnscore_domain::{DnsName, DnsRecord, RecordClass, RecordData, RecordType};
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

pub struct DnsRecordBuilder {
    name: DnsName,
    record_type: RecordType,
    class: RecordClass,
    ttl: Duration,
    data: RecordData,
}

impl DnsRecordBuilder {
    pub fn new() -> Self {
        Self {
            name: DnsName::parse("example.com").unwrap(),
            record_type: RecordType::A,
            class: RecordClass::IN,
            ttl: Duration::from_secs(300),
            data: RecordData::Address(IpAddr::from_str("192.0.2.1").unwrap()),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = DnsName::parse(name).unwrap();
        self
    }

    pub fn record_type(mut self, record_type: RecordType) -> Self {
        self.record_type = record_type;
        self
    }

    pub fn ttl_secs(mut self, secs: u64) -> Self {
        self.ttl = Duration::from_secs(secs);
        self
    }

    pub fn address(mut self, address: &str) -> Self {
        self.data = RecordData::Address(IpAddr::from_str(address).unwrap());
        self
    }

    pub fn data(mut self, data: RecordData) -> Self {
        self.data = data;
        self
    }

    pub fn build(self) -> DnsRecord {
        DnsRecord::new(self.name, self.record_type, self.class, self.ttl, self.data).unwrap()
    }
}

impl Default for DnsRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}
