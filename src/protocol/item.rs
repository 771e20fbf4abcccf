//! Module `item`
//!
//! Defines the `GopherItem` menu entry together with parsing from gophermap
//! lines and serialization into wire lines.

use crate::error::ItemError;
use crate::protocol::responses::{INVALID_HOST, INVALID_PORT, TYPE_ERROR, TYPE_INFO, format_item_line};
use crate::storage::validation::{SELECTOR_SEPARATOR, join};

/// One entry of a Gopher menu.
///
/// Items are built for a single line of output and dropped once serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GopherItem {
    pub item_type: char,
    pub name: String,
    pub selector: String,
    pub hostname: String,
    pub port: u16,
}

impl GopherItem {
    pub fn new(
        item_type: char,
        name: impl Into<String>,
        selector: impl Into<String>,
        hostname: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            item_type,
            name: name.into(),
            selector: selector.into(),
            hostname: hostname.into(),
            port,
        }
    }

    /// An informational item (info, error) pointing at the null host.
    pub fn simple(item_type: char, text: impl Into<String>) -> Self {
        Self::new(item_type, text, "", INVALID_HOST, INVALID_PORT)
    }

    /// Info and error items carry text only and are never followed.
    pub fn is_informational(&self) -> bool {
        matches!(self.item_type, TYPE_INFO | TYPE_ERROR)
    }

    /// Returns true if the item points somewhere a client could dial.
    pub fn is_link(&self) -> bool {
        !self.selector.is_empty() && self.hostname != INVALID_HOST && self.port != INVALID_PORT
    }

    /// Parses a gophermap item line: `<type><name>\t<selector>[\t<host>][\t<port>]`.
    ///
    /// Missing or empty host and port fields fall back to the given defaults.
    /// A port that isn't a number becomes `0`.
    pub fn parse(line: &str, default_hostname: &str, default_port: u16) -> Result<Self, ItemError> {
        let mut chars = line.chars();
        let item_type = chars
            .next()
            .ok_or_else(|| ItemError::MissingField(line.to_string()))?;

        let mut fields = chars.as_str().splitn(4, '\t');
        let name = fields.next().unwrap_or_default();
        let selector = fields
            .next()
            .ok_or_else(|| ItemError::MissingField(line.to_string()))?;

        let hostname = match fields.next() {
            Some(host) if !host.is_empty() => host,
            _ => default_hostname,
        };

        let port = match fields.next() {
            Some(port) if !port.is_empty() => parse_port(port),
            _ => default_port,
        };

        Ok(Self::new(item_type, name, selector, hostname, port))
    }

    /// Serializes the item as a wire line for a client that requested
    /// `requester_selector`.
    ///
    /// Relative item selectors are joined onto a non-empty requester
    /// selector. Fails if the line would not fit in `max_line_length` bytes
    /// (the buffer holds the line plus one reserved byte).
    pub fn serialize(&self, requester_selector: &str, max_line_length: usize) -> Result<String, ItemError> {
        let selector = if !requester_selector.is_empty()
            && !self.selector.is_empty()
            && !self.selector.starts_with(SELECTOR_SEPARATOR)
        {
            join(requester_selector, &self.selector)
        } else {
            self.selector.clone()
        };

        let line = format_item_line(self.item_type, &self.name, &selector, &self.hostname, self.port);
        if line.len() >= max_line_length {
            return Err(ItemError::LineTooLong {
                name: self.name.clone(),
                max: max_line_length,
            });
        }

        Ok(line)
    }
}

/// Reads the leading decimal digits of `raw`, after any leading whitespace;
/// anything else yields `0`.
fn parse_port(raw: &str) -> u16 {
    let raw = raw.trim_start();
    let digits: &str = match raw.find(|c: char| !c.is_ascii_digit()) {
        Some(end) => &raw[..end],
        None => raw,
    };
    digits.parse().unwrap_or(INVALID_PORT)
}
