//! Two-byte length prefixed framing for DNS over TCP (RFC 1035 §4.2.2).

use crate::dns::buffer_pool::BufferPool;
use crate::dns::transport_message::TransportMessage;
use dnscore_domain::DomainError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Writes `message` as one frame and flushes the stream.
pub(crate) async fn write_frame<S>(
    stream: &mut S,
    message: &[u8],
    peer: &str,
) -> Result<(), DomainError>
where
    S: AsyncWrite + Unpin,
{
    let length = u16::try_from(message.len()).map_err(|_| DomainError::TransportSend {
        server: peer.to_string(),
        reason: format!("message of {} bytes does not fit a TCP frame", message.len()),
    })?;

    let send_error = |e: std::io::Error| DomainError::TransportSend {
        server: peer.to_string(),
        reason: e.to_string(),
    };

    stream.write_all(&length.to_be_bytes()).await.map_err(send_error)?;
    stream.write_all(message).await.map_err(send_error)?;
    stream.flush().await.map_err(send_error)?;

    Ok(())
}

/// Reads one frame into a pooled buffer.
///
/// Returns `Ok(None)` when the peer closes the stream cleanly before the first
/// byte of a frame. A close anywhere inside a frame is a connection reset, and a
/// declared length of zero is rejected.
pub(crate) async fn read_frame<S>(
    stream: &mut S,
    peer: &str,
) -> Result<Option<TransportMessage>, DomainError>
where
    S: AsyncRead + Unpin,
{
    let mut prefix = [0u8; 2];
    let read = fill(stream, &mut prefix, peer).await?;
    if read == 0 {
        return Ok(None);
    }
    if read < prefix.len() {
        return Err(DomainError::TransportConnectionReset {
            server: peer.to_string(),
        });
    }

    let length = u16::from_be_bytes(prefix) as usize;
    if length == 0 {
        return Err(DomainError::EmptyFrame {
            server: peer.to_string(),
        });
    }

    let mut buffer = BufferPool::shared().rent(length);
    if fill(stream, &mut buffer[..length], peer).await? < length {
        return Err(DomainError::TransportConnectionReset {
            server: peer.to_string(),
        });
    }

    TransportMessage::new(buffer, length).map(Some)
}

/// Reads until `buf` is full or the peer stops sending; returns how much was read.
async fn fill<S>(stream: &mut S, buf: &mut [u8], peer: &str) -> Result<usize, DomainError>
where
    S: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = stream
            .read(&mut buf[filled..])
            .await
            .map_err(|e| DomainError::TransportReceive {
                server: peer.to_string(),
                reason: e.to_string(),
            })?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
