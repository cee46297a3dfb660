use super::{DnsFlags, DnsQuestion, DnsRecord, ResponseStatus};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsResponse {
    pub id: u16,
    pub flags: DnsFlags,
    pub status: ResponseStatus,
    pub questions: Vec<DnsQuestion>,
    pub answers: Vec<DnsRecord>,
    pub authorities: Vec<DnsRecord>,
    pub additionals: Vec<DnsRecord>,
}

impl DnsResponse {
    pub fn is_name_error(&self) -> bool {
        self.status == ResponseStatus::NameError
    }

    pub fn is_truncated(&self) -> bool {
        self.flags.truncated
    }
}

impl fmt::Display for DnsResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ";; id: {}, status: {}", self.id, self.status)?;

        writeln!(f, ";; QUESTION")?;
        for question in &self.questions {
            writeln!(f, "{}", question)?;
        }

        let sections = [
            ("ANSWER", &self.answers),
            ("AUTHORITY", &self.authorities),
            ("ADDITIONAL", &self.additionals),
        ];
        for (title, records) in sections {
            if records.is_empty() {
                continue;
            }
            writeln!(f, ";; {}", title)?;
            for record in records {
                writeln!(f, "{}", record)?;
            }
        }
        Ok(())
    }
}
