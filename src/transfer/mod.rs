//! Transfer module for the Gopher server
//!
//! Produces the byte stream of a response: raw file contents, or menu lines
//! for items, status messages and directory listings.

pub mod file_ops;
pub mod menu;

pub use file_ops::send_file;
pub use menu::{send_dir, send_error, send_info, send_item, send_terminator};
