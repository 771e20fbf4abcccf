//! Client session
//!
//! The per-connection context handed to every renderer: the outbound half of
//! the socket, the selector being served and the server configuration.

use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::config::ServerConfig;
use crate::error::TransferError;

/// Response context for one request
pub struct Session<W> {
    writer: W,
    selector: String,
    config: Arc<ServerConfig>,
}

impl<W: AsyncWrite + Unpin> Session<W> {
    pub fn new(writer: W, selector: impl Into<String>, config: Arc<ServerConfig>) -> Self {
        Self {
            writer,
            selector: selector.into(),
            config,
        }
    }

    /// The sanitized selector this session is answering.
    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Writes raw bytes to the client, in order, without buffering.
    pub async fn send(&mut self, bytes: &[u8]) -> Result<(), TransferError> {
        self.writer
            .write_all(bytes)
            .await
            .map_err(TransferError::SendFailed)
    }

    pub async fn flush(&mut self) -> Result<(), TransferError> {
        self.writer.flush().await.map_err(TransferError::SendFailed)
    }

    /// Gives back the writer, e.g. to shut the socket down.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
