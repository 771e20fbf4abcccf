//! Gophermap support
//!
//! Renders directory menus from per-directory `gophermap` files.

pub mod interpreter;

pub use interpreter::{Directive, GophermapInterpreter, MapState, classify_line};
