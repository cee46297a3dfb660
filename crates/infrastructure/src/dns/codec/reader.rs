use dnscore_domain::{DnsName, DomainError, MAX_NAME_LEN};
use smallvec::SmallVec;

fn truncated(offset: usize) -> DomainError {
    DomainError::MalformedMessage(format!("message truncated at offset {}", offset))
}

/// Bounds-checked big-endian reader over a received message.
pub(crate) struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DomainError> {
        let end = self.pos + len;
        let bytes = self.buf.get(self.pos..end).ok_or_else(|| truncated(self.pos))?;
        self.pos = end;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, DomainError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, DomainError> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, DomainError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads a possibly compressed name.
    ///
    /// Every pointer must land strictly before the previous bound: the first
    /// pointer's own offset, then each earlier target. Forward references and
    /// loops are rejected instead of followed.
    pub fn read_name(&mut self) -> Result<DnsName, DomainError> {
        let mut labels: SmallVec<[&'a [u8]; 8]> = SmallVec::new();
        let mut cursor = self.pos;
        let mut resume_at: Option<usize> = None;
        let mut bound = usize::MAX;
        let mut wire_len = 1;

        loop {
            let len = *self.buf.get(cursor).ok_or_else(|| truncated(cursor))? as usize;

            match len & 0xC0 {
                0x00 if len == 0 => {
                    cursor += 1;
                    break;
                }
                0x00 => {
                    let start = cursor + 1;
                    let label = self
                        .buf
                        .get(start..start + len)
                        .ok_or_else(|| truncated(start))?;

                    wire_len += 1 + len;
                    if wire_len > MAX_NAME_LEN {
                        return Err(DomainError::MalformedMessage(format!(
                            "name at offset {} exceeds {} bytes",
                            self.pos, MAX_NAME_LEN
                        )));
                    }

                    labels.push(label);
                    cursor = start + len;
                }
                0xC0 => {
                    let low = *self.buf.get(cursor + 1).ok_or_else(|| truncated(cursor + 1))?;
                    let target = ((len & 0x3F) << 8) | low as usize;

                    if resume_at.is_none() {
                        bound = cursor;
                        resume_at = Some(cursor + 2);
                    }
                    if target >= bound {
                        return Err(DomainError::MalformedMessage(format!(
                            "compression pointer at offset {} to {} does not point backwards",
                            cursor, target
                        )));
                    }

                    bound = target;
                    cursor = target;
                }
                kind => {
                    return Err(DomainError::MalformedMessage(format!(
                        "unsupported label type 0x{:02x} at offset {}",
                        kind, cursor
                    )));
                }
            }
        }

        self.pos = resume_at.unwrap_or(cursor);
        DnsName::from_labels(labels).map_err(|e| DomainError::MalformedMessage(e.to_string()))
    }
}
