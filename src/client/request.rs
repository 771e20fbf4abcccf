//! Request reading
//!
//! A Gopher request is a single selector line. Reading stops at the first
//! tab, CR or LF; anything after it is ignored.

use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::{Instant, timeout_at};

use crate::error::RequestError;

/// Position of the first request terminator (tab, CR or LF), if any.
pub fn find_terminator(buf: &[u8]) -> Option<usize> {
    buf.iter().position(|b| matches!(b, b'\t' | b'\r' | b'\n'))
}

/// Reads the selector of a request.
///
/// At most `max_len` bytes are read, all within `recv_timeout` of the call.
/// Filling the buffer without seeing a terminator is an error; end of
/// stream after some bytes ends the selector.
pub async fn read_selector<R>(
    reader: &mut R,
    max_len: usize,
    recv_timeout: Duration,
) -> Result<String, RequestError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; max_len];
    let mut filled = 0;
    let deadline = Instant::now() + recv_timeout;

    loop {
        let n = match timeout_at(deadline, reader.read(&mut buf[filled..])).await {
            Ok(result) => result?,
            Err(_) => return Err(RequestError::Timeout),
        };
        if n == 0 {
            break;
        }
        filled += n;

        if let Some(end) = find_terminator(&buf[..filled]) {
            return Ok(String::from_utf8_lossy(&buf[..end]).to_string());
        }
        if filled == max_len {
            return Err(RequestError::SelectorTooLong(max_len));
        }
    }

    if filled == 0 {
        return Err(RequestError::EmptyRequest);
    }
    Ok(String::from_utf8_lossy(&buf[..filled]).to_string())
}
