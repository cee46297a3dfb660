use super::{DnsName, RecordClass, RecordType};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DnsQuestion {
    pub name: DnsName,
    pub record_type: RecordType,
    pub class: RecordClass,
}

impl DnsQuestion {
    pub fn new(name: DnsName, record_type: RecordType) -> Self {
        Self {
            name,
            record_type,
            class: RecordClass::IN,
        }
    }
}

impl fmt::Display for DnsQuestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.class, self.record_type)
    }
}
