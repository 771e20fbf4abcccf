//! Module `file_ops`
//!
//! Pipes the raw bytes of a file to a client. Files are sent in fixed-size
//! chunks so the memory held per connection stays bounded.

use log::{error, info};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWrite};

use crate::client::Session;
use crate::error::TransferError;

/// Sends the contents of `path` to the client.
///
/// No menu framing is added. Bytes already sent when a failure happens are
/// not rolled back; the protocol has no way to resume.
pub async fn send_file<W>(session: &mut Session<W>, path: &Path) -> Result<(), TransferError>
where
    W: AsyncWrite + Unpin,
{
    let mut file = match File::open(path).await {
        Ok(file) => file,
        Err(e) => {
            error!(
                "Failed to open file {} for request selector '{}': {}",
                path.display(),
                session.selector(),
                e
            );
            return Err(TransferError::FileOpenFailed(path.to_path_buf(), e));
        }
    };

    let mut buffer = vec![0u8; session.config().transfer_chunk_size];
    let mut total_bytes_sent = 0u64;

    loop {
        let n = match file.read(&mut buffer).await {
            Ok(0) => break, // EOF
            Ok(n) => n,
            Err(e) => {
                error!("Read error on {}: {}", path.display(), e);
                return Err(TransferError::FileReadFailed(path.to_path_buf(), e));
            }
        };

        if let Err(e) = session.send(&buffer[..n]).await {
            error!("Failed to pipe contents of {} to socket: {}", path.display(), e);
            return Err(e);
        }

        total_bytes_sent += n as u64;
    }

    session.flush().await?;

    info!(
        "File transfer completed: {} ({} bytes)",
        path.display(),
        total_bytes_sent
    );

    Ok(())
}
