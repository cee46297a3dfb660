use super::{RecordClass, RecordType};
use crate::{DnsName, DomainError};
use bytes::Bytes;
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

/// Type-specific payload of a resource record.
///
/// Only the shapes the codec needs to understand (addresses and embedded names,
/// which take part in compression) are structured; everything else is carried
/// as opaque bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    Address(IpAddr),

    Name(DnsName),

    Mx { preference: u16, exchange: DnsName },

    Raw(Bytes),
}

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordData::Address(ip) => write!(f, "{}", ip),
            RecordData::Name(name) => write!(f, "{}", name),
            RecordData::Mx {
                preference,
                exchange,
            } => write!(f, "{} {}", preference, exchange),
            RecordData::Raw(bytes) => write!(f, "\\# {}", bytes.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    pub name: DnsName,

    pub record_type: RecordType,

    pub class: RecordClass,

    pub ttl: Duration,

    pub data: RecordData,
}

impl DnsRecord {
    /// Builds a record, checking that structured data matches the record type.
    pub fn new(
        name: DnsName,
        record_type: RecordType,
        class: RecordClass,
        ttl: Duration,
        data: RecordData,
    ) -> Result<Self, DomainError> {
        check_data(record_type, &data)?;

        Ok(Self {
            name,
            record_type,
            class,
            ttl,
            data,
        })
    }

    /// Re-checks `data` against `record_type`. The fields are public, so the
    /// encoder calls this before writing.
    pub fn validate(&self) -> Result<(), DomainError> {
        check_data(self.record_type, &self.data)
    }

    /// A or AAAA record in class IN, depending on the address family.
    pub fn address(name: DnsName, address: IpAddr, ttl: Duration) -> Self {
        let record_type = match address {
            IpAddr::V4(_) => RecordType::A,
            IpAddr::V6(_) => RecordType::AAAA,
        };
        Self {
            name,
            record_type,
            class: RecordClass::IN,
            ttl,
            data: RecordData::Address(address),
        }
    }

    /// TTL as carried on the wire: whole seconds, saturating at `u32::MAX`.
    pub fn ttl_secs(&self) -> u32 {
        u32::try_from(self.ttl.as_secs()).unwrap_or(u32::MAX)
    }
}

fn check_data(record_type: RecordType, data: &RecordData) -> Result<(), DomainError> {
    let consistent = match (data, record_type) {
        (RecordData::Address(IpAddr::V4(_)), RecordType::A) => true,
        (RecordData::Address(IpAddr::V6(_)), RecordType::AAAA) => true,
        (RecordData::Address(_), _) => false,
        (RecordData::Name(_), t) => t.has_name_data(),
        (RecordData::Mx { .. }, t) => t == RecordType::MX,
        (RecordData::Raw(_), t) => !t.has_structured_data(),
    };
    if !consistent {
        return Err(DomainError::InvalidRecordData(format!(
            "{} data cannot be carried by a {} record",
            data, record_type
        )));
    }
    Ok(())
}

impl fmt::Display for DnsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.name,
            self.ttl.as_secs(),
            self.class,
            self.record_type,
            self.data
        )
    }
}
