//! DnsCore Domain Layer
pub mod config;
pub mod dns_header;
pub mod dns_name;
pub mod dns_protocol;
pub mod dns_question;
pub mod dns_record;
pub mod dns_request;
pub mod dns_response;
pub mod errors;

pub use config::{CliOverrides, ClientConfig, Config, ConfigError, LoggingConfig};
pub use dns_header::{DnsFlags, ResponseStatus};
pub use dns_name::{DnsName, MAX_LABEL_LEN, MAX_NAME_LEN};
pub use dns_protocol::{
    DnsTransportType, DEFAULT_UDP_MESSAGE_SIZE, DNS_PORT, HEADER_LEN, MAX_TCP_MESSAGE_SIZE,
    MAX_UDP_MESSAGE_SIZE,
};
pub use dns_question::DnsQuestion;
pub use dns_record::{DnsRecord, RecordClass, RecordData, RecordType};
pub use dns_request::DnsRequest;
pub use dns_response::DnsResponse;
pub use errors::DomainError;
