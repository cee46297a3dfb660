use super::buffer_pool::{BufferPool, PooledBuffer};
use super::codec;
use dnscore_domain::{DnsRequest, DnsResponse, DomainError};
use std::fmt;

/// One wire-format DNS message in flight: a pooled buffer plus the number of
/// valid bytes in it.
///
/// The message has a single owner at a time. Dropping it hands the buffer back
/// to the pool, so every exit path releases it exactly once.
pub struct TransportMessage {
    buffer: PooledBuffer,
    len: usize,
}

impl TransportMessage {
    pub fn new(buffer: PooledBuffer, len: usize) -> Result<Self, DomainError> {
        if len > buffer.capacity() {
            return Err(DomainError::BufferTooSmall {
                needed: len,
                capacity: buffer.capacity(),
            });
        }
        Ok(Self { buffer, len })
    }

    /// Copies `bytes` into a freshly rented buffer.
    pub fn copy_from_slice(bytes: &[u8]) -> Self {
        let mut buffer = BufferPool::shared().rent(bytes.len());
        buffer[..bytes.len()].copy_from_slice(bytes);
        Self {
            buffer,
            len: bytes.len(),
        }
    }

    /// Encodes `request` into a buffer sized for `max_size` byte messages.
    pub fn from_request(request: &DnsRequest, max_size: usize) -> Result<Self, DomainError> {
        let mut buffer = BufferPool::shared().rent(max_size);
        let len = codec::encode_request(request, &mut buffer[..max_size])?;
        Ok(Self { buffer, len })
    }

    pub fn from_response(response: &DnsResponse, max_size: usize) -> Result<Self, DomainError> {
        let mut buffer = BufferPool::shared().rent(max_size);
        let len = codec::encode_response(response, &mut buffer[..max_size])?;
        Ok(Self { buffer, len })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Transaction ID from the header, if the message is long enough to have one.
    pub fn id(&self) -> Option<u16> {
        codec::read_message_id(self.as_bytes())
    }

    pub fn decode_request(&self) -> Result<DnsRequest, DomainError> {
        codec::decode_request(self.as_bytes())
    }

    pub fn decode_response(&self) -> Result<DnsResponse, DomainError> {
        codec::decode_response(self.as_bytes())
    }
}

impl fmt::Debug for TransportMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportMessage")
            .field("len", &self.len)
            .field("capacity", &self.buffer.capacity())
            .finish()
    }
}
