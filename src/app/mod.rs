//! Interactive terminal frontend.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete frontend state, wrapping the [`Session`]
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering and side effects

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use effects::{Osc52Clipboard, TerminalInput};
pub use model::{Focus, Model};
pub use update::{Message, update};

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::document::{MarkdownTransformer, TransformOptions};
use crate::highlight::Theme;
use crate::session::{DirectorySink, IncomingFile, Session};
use crate::storage::FileStorage;

/// How long startup waits for a file named on the command line.
const INITIAL_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Main application struct that owns the settings for a run.
pub struct App {
    storage_path: PathBuf,
    download_dir: PathBuf,
    theme: Option<Theme>,
    transform_options: TransformOptions,
    initial_file: Option<PathBuf>,
}

impl App {
    /// Create an application persisting to `storage_path`.
    pub fn new(storage_path: PathBuf) -> Self {
        Self {
            storage_path,
            download_dir: PathBuf::from("."),
            theme: None,
            transform_options: TransformOptions::default(),
            initial_file: None,
        }
    }

    /// Directory receiving saved and exported files.
    #[must_use]
    pub fn with_download_dir(mut self, dir: PathBuf) -> Self {
        self.download_dir = dir;
        self
    }

    /// Theme for this run, overriding the stored preference.
    #[must_use]
    pub const fn with_theme(mut self, theme: Option<Theme>) -> Self {
        self.theme = theme;
        self
    }

    #[must_use]
    pub fn with_transform_options(mut self, options: TransformOptions) -> Self {
        self.transform_options = options;
        self
    }

    /// Open this file once the stored session is restored.
    #[must_use]
    pub fn with_initial_file(mut self, path: Option<PathBuf>) -> Self {
        self.initial_file = path;
        self
    }

    fn build_session(&self) -> Result<Session> {
        let storage = FileStorage::open(&self.storage_path)?;
        let transformer = MarkdownTransformer::new().with_options(self.transform_options.clone());
        let mut session = Session::new(storage, DirectorySink::new(&self.download_dir))
            .with_transformer(transformer)
            .with_clipboard(Osc52Clipboard);
        session.restore();
        if let Some(theme) = self.theme {
            session.set_theme(theme);
        }
        if let Some(path) = &self.initial_file {
            session
                .open(IncomingFile::from_path(path.clone()), 0)
                .with_context(|| format!("Cannot open {}", path.display()))?;
            session.wait_for_open(INITIAL_READ_TIMEOUT, 0);
        }
        Ok(session)
    }
}
