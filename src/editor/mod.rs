//! Editable markdown buffer and the commands that act on it.
//!
//! Provides a rope-backed text buffer with cursor and selection management,
//! the markdown editing commands, and the input capability those commands
//! use to ask the user for values.

mod buffer;
mod commands;
mod input;

pub use buffer::{Cursor, Direction, EditorBuffer, Position, Selection, UNDO_DEPTH};
pub use commands::{
    DEFAULT_FENCE_LANGUAGE, DEFAULT_LINK_URL, EditCommand, MAX_HEADING_LEVEL, promote_heading_line,
};
pub use input::{InputProvider, Reply, ScriptedInput};
