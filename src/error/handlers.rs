//! Error handlers
//!
//! Provides error logging and the client-facing wording of errors.

use crate::error::types::{GopherServerError, RequestError, TransferError};
use log::{error, warn};

/// Handle a Gopher server error
pub fn handle_error(err: &GopherServerError) {
    match err {
        // A client hanging up or stalling is routine, not a server fault.
        GopherServerError::Request(RequestError::EmptyRequest)
        | GopherServerError::Request(RequestError::Timeout) => {
            warn!("Gopher Server: {}", err)
        }
        _ => error!("Gopher Server Error: {}", err),
    }
}

/// Convert an error to the text of the type `3` item sent to the client
pub fn client_message(err: &GopherServerError) -> String {
    match err {
        GopherServerError::Request(e @ RequestError::SelectorTooLong(_)) => e.to_string(),
        GopherServerError::Request(_) => "Failed to read selector".to_string(),
        GopherServerError::Transfer(TransferError::FileOpenFailed(..))
        | GopherServerError::Transfer(TransferError::DirectoryReadFailed(..)) => {
            "Selector could not be read".to_string()
        }
        _ => "Internal server error".to_string(),
    }
}
