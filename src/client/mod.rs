//! Client connection handling
//!
//! Reads a client's request, resolves it and drives the response.

pub mod handler;
pub mod request;
pub mod session;

pub use handler::handle_client;
pub use session::Session;
