use super::{DnsFlags, DnsName, DnsQuestion, DnsRecord, DnsResponse, RecordType, ResponseStatus};
use std::fmt;

/// A query message. Always carries exactly one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRequest {
    pub id: u16,
    pub flags: DnsFlags,
    pub question: DnsQuestion,
}

impl DnsRequest {
    /// Recursive query for `name`/`record_type` with a random transaction ID.
    pub fn new(name: DnsName, record_type: RecordType) -> Self {
        Self {
            id: fastrand::u16(..),
            flags: DnsFlags::query(),
            question: DnsQuestion::new(name, record_type),
        }
    }

    pub fn with_id(mut self, id: u16) -> Self {
        self.id = id;
        self
    }

    /// Successful response to this request carrying `answers`.
    pub fn reply(&self, answers: Vec<DnsRecord>) -> DnsResponse {
        let mut response = self.reply_with_status(ResponseStatus::Ok);
        response.answers = answers;
        response
    }

    /// Empty response to this request with the given status.
    pub fn reply_with_status(&self, status: ResponseStatus) -> DnsResponse {
        DnsResponse {
            id: self.id,
            flags: DnsFlags {
                opcode: self.flags.opcode,
                recursion_desired: self.flags.recursion_desired,
                ..DnsFlags::default()
            },
            status,
            questions: vec![self.question.clone()],
            answers: Vec::new(),
            authorities: Vec::new(),
            additionals: Vec::new(),
        }
    }
}

impl fmt::Display for DnsRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ";; id: {}, rd: {}", self.id, self.flags.recursion_desired)?;
        writeln!(f, ";; QUESTION")?;
        write!(f, "{}", self.question)
    }
}
