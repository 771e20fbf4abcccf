//! Error types
//!
//! Defines domain-specific error types for each module of the Gopher server.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Menu item errors
#[derive(Debug)]
pub enum ItemError {
    /// The line lacks the name/selector pair every item needs.
    MissingField(String),
    /// The serialized item does not fit the line buffer.
    LineTooLong { name: String, max: usize },
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemError::MissingField(line) => write!(f, "Missing name or selector in line: {}", line),
            ItemError::LineTooLong { name, max } => {
                write!(f, "Entry line too long (>{} chars) for item '{}'", max, name)
            }
        }
    }
}

impl std::error::Error for ItemError {}

/// Request (selector reading) errors
#[derive(Debug)]
pub enum RequestError {
    EmptyRequest,
    SelectorTooLong(usize),
    Timeout,
    IoError(io::Error),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::EmptyRequest => write!(f, "Client sent no selector"),
            RequestError::SelectorTooLong(max) => {
                write!(f, "Selector string longer than {} characters", max)
            }
            RequestError::Timeout => write!(f, "Timed out waiting for selector"),
            RequestError::IoError(e) => write!(f, "Failed to receive selector: {}", e),
        }
    }
}

impl std::error::Error for RequestError {}

impl From<io::Error> for RequestError {
    fn from(error: io::Error) -> Self {
        RequestError::IoError(error)
    }
}

/// Response rendering errors
#[derive(Debug)]
pub enum TransferError {
    FileOpenFailed(PathBuf, io::Error),
    FileReadFailed(PathBuf, io::Error),
    DirectoryReadFailed(PathBuf, io::Error),
    SendFailed(io::Error),
    Item(ItemError),
    /// The response was sent, but `failed` of its lines could not be.
    Incomplete { failed: usize },
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::FileOpenFailed(p, e) => {
                write!(f, "Failed to open {}: {}", p.display(), e)
            }
            TransferError::FileReadFailed(p, e) => {
                write!(f, "Failed to read {}: {}", p.display(), e)
            }
            TransferError::DirectoryReadFailed(p, e) => {
                write!(f, "Failed to open directory {} for listing: {}", p.display(), e)
            }
            TransferError::SendFailed(e) => write!(f, "Failed to send to client: {}", e),
            TransferError::Item(e) => write!(f, "Item error: {}", e),
            TransferError::Incomplete { failed } => {
                write!(f, "Response incomplete: {} line(s) failed", failed)
            }
        }
    }
}

impl std::error::Error for TransferError {}

impl From<ItemError> for TransferError {
    fn from(error: ItemError) -> Self {
        TransferError::Item(error)
    }
}

/// General Gopher server error that encompasses all error types
#[derive(Debug)]
pub enum GopherServerError {
    AlreadyRunning,
    UnsupportedAddressFamily(String),
    BindFailed(String, io::Error),
    ConfigError(String),
    Request(RequestError),
    Transfer(TransferError),
    IoError(io::Error),
}

impl fmt::Display for GopherServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GopherServerError::AlreadyRunning => {
                write!(f, "Tried to start a server while already running")
            }
            GopherServerError::UnsupportedAddressFamily(family) => {
                write!(f, "Address family {} not yet implemented", family)
            }
            GopherServerError::BindFailed(addr, e) => write!(f, "Failed to bind to {}: {}", addr, e),
            GopherServerError::ConfigError(e) => write!(f, "Configuration error: {}", e),
            GopherServerError::Request(e) => write!(f, "Request error: {}", e),
            GopherServerError::Transfer(e) => write!(f, "Transfer error: {}", e),
            GopherServerError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for GopherServerError {}

impl From<RequestError> for GopherServerError {
    fn from(error: RequestError) -> Self {
        GopherServerError::Request(error)
    }
}

impl From<TransferError> for GopherServerError {
    fn from(error: TransferError) -> Self {
        GopherServerError::Transfer(error)
    }
}

impl From<config::ConfigError> for GopherServerError {
    fn from(error: config::ConfigError) -> Self {
        GopherServerError::ConfigError(error.to_string())
    }
}

impl From<io::Error> for GopherServerError {
    fn from(error: io::Error) -> Self {
        GopherServerError::IoError(error)
    }
}
