//! Gopher response constants
//!
//! Item types and the fixed strings used to frame menu responses.

/// Item types used by the server (RFC 1436 plus `i`)
pub const TYPE_FILE: char = '0';
pub const TYPE_DIRECTORY: char = '1';
pub const TYPE_ERROR: char = '3';
pub const TYPE_INFO: char = 'i';

/// Host and port written into items that must never resolve
pub const INVALID_HOST: &str = "null.host";
pub const INVALID_PORT: u16 = 0;

/// Line closing every menu response
pub const MENU_TERMINATOR: &[u8] = b".\r\n";

/// Longest display name produced for directory listing entries
pub const MAX_LISTING_NAME: usize = 70;

/// Messages sent as error items
pub const MSG_NOT_FOUND: &str = "Selector not found.";
pub const MSG_MAP_PARSE_FAILED: &str = "Failed to parse this line of gophermap";

/// Format a single menu line
pub fn format_item_line(
    item_type: char,
    name: &str,
    selector: &str,
    hostname: &str,
    port: u16,
) -> String {
    format!("{}{}\t{}\t{}\t{}\r\n", item_type, name, selector, hostname, port)
}
