//! Server core functionality
//!
//! This module contains the accept loop, the connection slot table and the
//! server's shutdown handling.

pub mod core;
pub mod slots;

pub use self::core::{Server, bind_listener};
pub use self::slots::{SlotLease, SlotState, SlotTable};
