//! Event handling for Agromate.
//!
//! Terminal input is read from crossterm's async event stream and mapped
//! to [`crate::state::Action`]s according to the configured key bindings
//! and the current input mode.

mod handler;
mod input;

pub use handler::{EventHandler, KeyMap};
pub use input::{InputEvent, Key, Modifiers};
