//! Hook Handler Wire Protocol
//!
//! Newline-delimited JSON over TCP. Every message from the runner gets exactly
//! one reply with the same `uuid`.

pub mod message;

pub use message::{HookEvent, HookPayload, HookReply, RawHookMessage};

use {
    crate::error::{HookError, HookResult},
    tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt},
};

/// Terminates every message in both directions.
pub const MESSAGE_DELIMITER: u8 = b'\n';

/// Read one message into `buf`, delimiter stripped.
///
/// Returns `Ok(false)` once the peer closed the stream between messages.
/// At most `max_message_size` bytes plus a `\r\n` terminator are buffered;
/// a longer message is rejected before the rest of it is read.
pub async fn read_frame<R>(
    reader: &mut R,
    max_message_size: usize,
    buf: &mut Vec<u8>,
) -> HookResult<bool>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let limit = max_message_size.saturating_add(2) as u64;
    let read = (&mut *reader)
        .take(limit)
        .read_until(MESSAGE_DELIMITER, buf)
        .await?;

    if read == 0 {
        return Ok(false);
    }

    if buf.last() == Some(&MESSAGE_DELIMITER) {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        if buf.len() > max_message_size {
            return Err(HookError::MessageTooLarge(buf.len(), max_message_size));
        }
        return Ok(true);
    }

    if buf.len() > max_message_size {
        return Err(HookError::MessageTooLarge(buf.len(), max_message_size));
    }

    // Stream ended without a delimiter
    if buf.iter().all(u8::is_ascii_whitespace) {
        Ok(false)
    } else {
        Err(HookError::UnexpectedEof)
    }
}

/// Write one message followed by the delimiter.
pub async fn write_frame<W>(writer: &mut W, message: &[u8]) -> HookResult<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(message).await?;
    writer.write_all(&[MESSAGE_DELIMITER]).await?;
    writer.flush().await?;
    Ok(())
}
