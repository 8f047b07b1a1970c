// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. session::SessionToast)
    clippy::module_name_repetitions
)]

//! # Livemark
//!
//! A markdown editor with a live HTML preview.
//!
//! Livemark keeps a text buffer and a rendered view in step:
//! - Every edit re-renders the preview, at most once per change
//! - Code blocks are syntax highlighted and get a copy control
//! - Content is autosaved two seconds after the last change
//! - Documents can be opened, saved as markdown and exported as HTML
//!
//! ## Architecture
//!
//! The editing core is frontend-agnostic. A [`session::Session`] owns the
//! buffer, render pipeline, autosave scheduler and storage, and is driven
//! with an explicit millisecond clock. The terminal frontend in [`app`]
//! uses The Elm Architecture (TEA) pattern on top of it:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`editor`]: Text buffer and markdown editing commands
//! - [`document`]: Markdown to HTML transformation
//! - [`highlight`]: Syntax highlighting
//! - [`render`]: Render pipeline and code block copy controls
//! - [`stats`]: Word and character counts
//! - [`autosave`]: Debounced autosave
//! - [`session`]: The editor instance: files, export, notifications
//! - [`storage`]: Persistent key-value storage
//! - [`keymap`]: Commands and keyboard shortcuts
//! - [`config`]: Saved defaults and flag parsing
//! - [`app`]: Terminal event loop and state
//! - [`ui`]: Terminal UI components

pub mod app;
pub mod autosave;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod highlight;
pub mod keymap;
pub mod render;
pub mod session;
pub mod stats;
pub mod storage;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::document::{MarkdownTransformer, Transformer};
    pub use crate::editor::{EditCommand, EditorBuffer, InputProvider};
    pub use crate::highlight::Theme;
    pub use crate::keymap::Command;
    pub use crate::render::RenderPipeline;
    pub use crate::session::Session;
}
