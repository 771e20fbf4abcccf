//! Gopher protocol implementation
//!
//! Menu items, their wire format, and the constants framing a response.

pub mod item;
pub mod responses;

pub use item::GopherItem;
