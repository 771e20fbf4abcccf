//! RAX Gopher Server
//!
//! A small concurrent Gopher (RFC 1436) server: directory listings,
//! gophermap-driven menus and raw file transfers from a document root.

pub mod client;
pub mod config;
pub mod error;
pub mod gophermap;
pub mod protocol;
pub mod server;
pub mod storage;
pub mod transfer;

pub use crate::config::ServerConfig;
pub use server::Server;
