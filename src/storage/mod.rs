//! File system storage access
//!
//! Handles selector sanitization, path resolution and read-only directory
//! queries under the document root.

pub mod filesystem;
pub mod validation;

pub use filesystem::{GOPHERMAP_NAME, ListedEntry, gophermap_path, list_directory};
pub use validation::{join, resolve, sanitize};
