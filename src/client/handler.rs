use log::{info, warn};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::client::Session;
use crate::client::request::read_selector;
use crate::config::ServerConfig;
use crate::error::handlers::client_message;
use crate::error::{GopherServerError, TransferError};
use crate::gophermap::GophermapInterpreter;
use crate::protocol::responses::MSG_NOT_FOUND;
use crate::storage::filesystem::{directory_exists, file_exists};
use crate::storage::{gophermap_path, resolve, sanitize};
use crate::transfer::{send_dir, send_error, send_file, send_terminator};

/// Serves a single Gopher request on `stream`.
///
/// - Reads and sanitizes the selector, then resolves it under the document root.
/// - Directories are answered with their gophermap, or a listing if there is
///   none; files are sent raw; anything else gets a "not found" error item.
/// - The stream is closed on every return path.
pub async fn handle_client<S>(
    mut stream: S,
    client_addr: SocketAddr,
    config: Arc<ServerConfig>,
) -> Result<(), GopherServerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut selector = match read_selector(
        &mut stream,
        config.max_selector_length,
        config.recv_timeout(),
    )
    .await
    {
        Ok(selector) => selector,
        Err(e) => {
            let err = GopherServerError::from(e);
            warn!("Closing connection from {}: {}", client_addr, err);
            let mut session = Session::new(&mut stream, "", Arc::clone(&config));
            let _ = send_error(&mut session, &client_message(&err)).await;
            let _ = stream.shutdown().await;
            return Err(err);
        }
    };

    if sanitize(&mut selector) {
        warn!("Sanitized selector from {} to '{}'", client_addr, selector);
    }
    info!("Client {} requested selector '{}'", client_addr, selector);

    let path = resolve(&config.document_root_path(), &selector);
    let mut session = Session::new(stream, selector, config);
    let result = dispatch(&mut session, &path).await;

    let mut stream = session.into_inner();
    let _ = stream.shutdown().await;

    info!("Client {} disconnected", client_addr);
    result.map_err(GopherServerError::from)
}

/// Answers the request for `path`.
async fn dispatch<W>(session: &mut Session<W>, path: &Path) -> Result<(), TransferError>
where
    W: AsyncWrite + Unpin,
{
    if directory_exists(path).await {
        let map = gophermap_path(path);
        let rendered = if file_exists(&map).await {
            GophermapInterpreter::new(&map).run(session).await
        } else {
            send_dir(session, path, true).await
        };

        // The menu is closed even if some of its lines failed.
        let closed = send_terminator(session).await;
        rendered.and(closed)
    } else if file_exists(path).await {
        send_file(session, path).await
    } else {
        let sent = send_error(session, MSG_NOT_FOUND).await;
        let closed = send_terminator(session).await;
        sent.and(closed)
    }
}
