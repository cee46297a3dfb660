use dnscore_domain::{DnsName, DomainError};
use rustc_hash::FxHashMap;

/// Largest offset a compression pointer can carry (14 bits).
const MAX_POINTER_OFFSET: usize = 0x3FFF;

/// Big-endian writer over a caller-provided buffer.
///
/// Tracks where every name suffix was written so later occurrences can be
/// replaced by a two-byte pointer. The table lives only as long as one encode.
pub(crate) struct WireWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
    name_offsets: FxHashMap<Vec<u8>, u16>,
}

impl<'a> WireWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            name_offsets: FxHashMap::default(),
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn advance(&mut self, len: usize) -> Result<&mut [u8], DomainError> {
        let start = self.pos;
        let end = start + len;
        if end > self.buf.len() {
            return Err(DomainError::BufferTooSmall {
                needed: end,
                capacity: self.buf.len(),
            });
        }
        self.pos = end;
        Ok(&mut self.buf[start..end])
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), DomainError> {
        self.advance(1)?[0] = value;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), DomainError> {
        self.advance(2)?.copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), DomainError> {
        self.advance(4)?.copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), DomainError> {
        self.advance(bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    /// Overwrites a 16-bit field that was written earlier (RDLENGTH).
    pub fn patch_u16(&mut self, at: usize, value: u16) {
        self.buf[at..at + 2].copy_from_slice(&value.to_be_bytes());
    }

    /// Writes `name`, compressing against every name suffix already in the message.
    ///
    /// Labels are written one at a time. Before each one, the remaining suffix is
    /// looked up; on a hit a pointer replaces the rest of the name. Otherwise the
    /// suffix is recorded at the current offset (if a pointer could reach it) and
    /// its first label is written literally.
    pub fn write_name(&mut self, name: &DnsName) -> Result<(), DomainError> {
        for (index, label) in name.labels().enumerate() {
            let key = name.suffix_key(index);
            if let Some(&offset) = self.name_offsets.get(&key) {
                return self.write_u16(0xC000 | offset);
            }

            let offset = self.pos;
            let out = self.advance(1 + label.len())?;
            out[0] = label.len() as u8;
            out[1..].copy_from_slice(label);

            if offset <= MAX_POINTER_OFFSET {
                self.name_offsets.insert(key, offset as u16);
            }
        }
        self.write_u8(0)
    }
}
