//! The editor instance.
//!
//! [`Session`] owns the buffer, the preview, the autosave scheduler and the
//! document identity, and talks to storage, downloads and the clipboard
//! through traits. Frontends call into it with explicit timestamps; nothing
//! here reads the clock or the terminal.

mod document;
mod export;
mod files;
mod toast;

use std::time::Duration;

use crate::autosave::{AutosaveScheduler, SaveStatus};
use crate::document::{MarkdownTransformer, Transformer};
use crate::editor::{EditCommand, EditorBuffer, InputProvider};
use crate::error::Error;
use crate::highlight::Theme;
use crate::keymap::Command;
use crate::render::{Clipboard, MemoryClipboard, RenderPipeline, RenderSnapshot};
use crate::stats::{Stats, compute_stats};
use crate::storage::{CONTENT_KEY, FILENAME_KEY, MemoryStorage, Storage, THEME_KEY};

pub use document::{DocumentSession, UNTITLED};
pub use export::{
    DEFAULT_TITLE, export_document, export_file_name, export_title, strip_markdown_extension,
};
pub use files::{
    ACCEPTED_EXTENSIONS, DirectorySink, Download, DownloadSink, EXPORT_CONTENT_TYPE, FileRead,
    FileReader, IncomingFile, MARKDOWN_MEDIA_TYPE, MemorySink, SAVE_CONTENT_TYPE,
};
pub use toast::{TOAST_DURATION_MS, Toast, ToastLevel};

/// A single editing session.
pub struct Session {
    buffer: EditorBuffer,
    document: DocumentSession,
    pipeline: RenderPipeline,
    stats: Stats,
    autosave: AutosaveScheduler,
    storage: Box<dyn Storage>,
    downloads: Box<dyn DownloadSink>,
    clipboard: Box<dyn Clipboard>,
    reader: FileReader,
    theme: Theme,
    toast: Option<Toast>,
}

impl Session {
    /// An empty session using the default transformer and an in-memory
    /// clipboard.
    pub fn new(storage: impl Storage + 'static, downloads: impl DownloadSink + 'static) -> Self {
        Self {
            buffer: EditorBuffer::empty(),
            document: DocumentSession::default(),
            pipeline: RenderPipeline::new(MarkdownTransformer::new()),
            stats: Stats::default(),
            autosave: AutosaveScheduler::default(),
            storage: Box::new(storage),
            downloads: Box::new(downloads),
            clipboard: Box::new(MemoryClipboard::new()),
            reader: FileReader::new(),
            theme: Theme::default(),
            toast: None,
        }
    }

    #[must_use]
    pub fn with_transformer(mut self, transformer: impl Transformer + Send + 'static) -> Self {
        self.pipeline = RenderPipeline::new(transformer);
        self.refresh();
        self
    }

    #[must_use]
    pub fn with_clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.clipboard = Box::new(clipboard);
        self
    }

    // --- Accessors ---

    pub const fn buffer(&self) -> &EditorBuffer {
        &self.buffer
    }

    /// Direct buffer access for keystrokes. Follow up with
    /// [`Session::after_edit`].
    pub const fn buffer_mut(&mut self) -> &mut EditorBuffer {
        &mut self.buffer
    }

    pub const fn document(&self) -> &DocumentSession {
        &self.document
    }

    pub const fn snapshot(&self) -> &RenderSnapshot {
        self.pipeline.snapshot()
    }

    pub const fn stats(&self) -> Stats {
        self.stats
    }

    pub const fn save_status(&self) -> Option<SaveStatus> {
        self.autosave.status()
    }

    pub const fn autosave(&self) -> &AutosaveScheduler {
        &self.autosave
    }

    pub const fn theme(&self) -> Theme {
        self.theme
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    pub const fn is_reading(&self) -> bool {
        self.reader.is_busy()
    }

    // --- Lifecycle ---

    /// Load theme, content and name from storage.
    ///
    /// Storage failures are logged and leave the session empty.
    pub fn restore(&mut self) {
        self.theme = Theme::from_stored(self.stored(THEME_KEY).as_deref());
        if let Some(content) = self.stored(CONTENT_KEY).filter(|c| !c.is_empty()) {
            self.buffer = EditorBuffer::from_text(&content);
            self.document = DocumentSession {
                name: Some(self.stored(FILENAME_KEY).unwrap_or_else(|| UNTITLED.to_string())),
                dirty: false,
            };
            tracing::info!(name = self.document.display_name(), "restored document");
        }
        self.refresh();
    }

    /// Use `theme` for this run without persisting it.
    pub const fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// React to buffer mutations since the last call: mark dirty, re-render,
    /// recount and reschedule the autosave.
    ///
    /// Returns false if the buffer had not changed.
    pub fn after_edit(&mut self, now_ms: u64) -> bool {
        if !self.buffer.take_change() {
            return false;
        }
        self.document.dirty = true;
        self.refresh();
        self.autosave.on_change(now_ms);
        true
    }

    /// Advance timers: due autosave, finished file reads, copy labels and
    /// toast expiry. Returns true if anything visible changed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let mut changed = false;
        if let Some(token) = self.autosave.take_due(now_ms) {
            self.persist_autosave(token, now_ms);
            changed = true;
        }
        if let Some(read) = self.reader.poll() {
            self.apply_read(read, now_ms);
            changed = true;
        }
        changed |= self.pipeline.tick(now_ms);
        changed |= self.expire_toast(now_ms);
        changed
    }

    /// Persist a pending autosave right away (used on quit).
    pub fn flush_autosave(&mut self, now_ms: u64) {
        if let Some(token) = self.autosave.flush() {
            self.persist_autosave(token, now_ms);
        }
    }

    /// Block up to `timeout` for a pending file read and apply it.
    pub fn wait_for_open(&mut self, timeout: Duration, now_ms: u64) -> bool {
        match self.reader.wait(timeout) {
            Some(read) => {
                self.apply_read(read, now_ms);
                true
            }
            None => false,
        }
    }

    // --- Commands ---

    /// Run `command`, asking `input` for anything it needs.
    pub fn dispatch(&mut self, command: Command, input: &mut dyn InputProvider, now_ms: u64) {
        tracing::debug!(?command, "dispatch");
        match command {
            Command::NewDocument => {
                self.new_document(input, now_ms);
            }
            Command::Open => {
                if let Some(path) = input
                    .prompt("Open file", None)
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                {
                    let _ = self.open(IncomingFile::from_path(path), now_ms);
                }
            }
            Command::Save => self.save(now_ms),
            Command::Export => self.export(now_ms),
            Command::ToggleTheme => self.toggle_theme(),
            Command::Undo => {
                self.buffer.undo();
                self.after_edit(now_ms);
            }
            Command::Redo => {
                self.buffer.redo();
                self.after_edit(now_ms);
            }
            Command::Edit(edit) => self.edit(edit, input, now_ms),
            Command::CopyCodeBlock(index) => self.copy_code_block(index, now_ms),
        }
    }

    /// Apply an editing command, surfacing failures as toasts.
    pub fn edit(&mut self, command: EditCommand, input: &mut dyn InputProvider, now_ms: u64) {
        match command.apply(&mut self.buffer, input) {
            Ok(()) => {
                self.after_edit(now_ms);
            }
            Err(err) => self.report(&err, now_ms),
        }
    }

    /// Clear the buffer and forget the name, confirming first if there is
    /// anything to lose. Returns false if the user declined.
    pub fn new_document(&mut self, input: &mut dyn InputProvider, now_ms: u64) -> bool {
        if !self.buffer.text().trim().is_empty()
            && !input.confirm("The current document is not saved. Start a new one?")
        {
            return false;
        }
        self.buffer.set_text("");
        self.document.name = None;
        self.after_edit(now_ms);
        self.document.dirty = false;
        self.show_toast(ToastLevel::Success, "New document created", now_ms);
        true
    }

    /// Start reading a picked or dropped file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFileType`] (also shown as a warning) when
    /// the file is not markdown or plain text; the buffer is untouched.
    pub fn open(&mut self, file: IncomingFile, now_ms: u64) -> crate::error::Result<()> {
        if !file.is_accepted() {
            tracing::warn!(name = %file.name, "rejected file");
            let err = Error::UnsupportedFileType { name: file.name };
            self.report(&err, now_ms);
            return Err(err);
        }
        tracing::info!(path = %file.path.display(), "opening file");
        self.reader.start(file);
        Ok(())
    }

    /// Deliver the buffer as a markdown download and persist it.
    pub fn save(&mut self, now_ms: u64) {
        let download = Download {
            file_name: self.document.display_name().to_string(),
            content_type: SAVE_CONTENT_TYPE,
            contents: self.buffer.text(),
        };
        match self.downloads.deliver(&download) {
            Ok(path) => {
                tracing::info!(path = %path.display(), "saved document");
                self.document.name = Some(download.file_name);
                if let Err(err) = self.persist() {
                    tracing::error!(error = %err, "failed to persist after save");
                }
                self.autosave.mark_saved();
                self.document.dirty = false;
                self.show_toast(ToastLevel::Success, "File saved", now_ms);
            }
            Err(err) => {
                tracing::error!(error = %err, "save failed");
                self.show_toast(ToastLevel::Error, format!("Save failed: {err:#}"), now_ms);
            }
        }
    }

    /// Deliver the rendered buffer as a standalone HTML page.
    pub fn export(&mut self, now_ms: u64) {
        let name = self.document.name.as_deref();
        let body = self.pipeline.transformer().transform(&self.buffer.text()).html;
        let download = Download {
            file_name: export_file_name(name),
            content_type: EXPORT_CONTENT_TYPE,
            contents: export_document(&body, &export_title(name), self.theme),
        };
        match self.downloads.deliver(&download) {
            Ok(path) => {
                tracing::info!(path = %path.display(), "exported html");
                self.show_toast(ToastLevel::Success, "HTML exported", now_ms);
            }
            Err(err) => {
                tracing::error!(error = %err, "export failed");
                self.show_toast(ToastLevel::Error, format!("Export failed: {err:#}"), now_ms);
            }
        }
    }

    /// Flip light/dark and remember the choice.
    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        if let Err(err) = self.storage.set(THEME_KEY, self.theme.as_str()) {
            tracing::error!(error = %err, "failed to persist theme");
        }
    }

    /// Copy code block `index` of the preview to the clipboard.
    pub fn copy_code_block(&mut self, index: usize, now_ms: u64) {
        match self
            .pipeline
            .copy_code_block(index, self.clipboard.as_mut(), now_ms)
        {
            Ok(true) => {}
            Ok(false) => self.show_toast(
                ToastLevel::Info,
                format!("No code block {}", index + 1),
                now_ms,
            ),
            Err(err) => {
                tracing::warn!(error = %err, "clipboard write failed");
                self.show_toast(ToastLevel::Error, format!("Copy failed: {err}"), now_ms);
            }
        }
    }

    pub fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>, now_ms: u64) {
        self.toast = Some(Toast::new(level, message, now_ms));
    }

    // --- Internals ---

    fn refresh(&mut self) {
        let text = self.buffer.text();
        self.pipeline.render(&text);
        self.stats = compute_stats(&text);
    }

    fn report(&mut self, err: &Error, now_ms: u64) {
        if err.is_silent() {
            tracing::debug!(%err, "command abandoned");
            return;
        }
        if let Some(level) = err.toast_level() {
            self.show_toast(level, err.to_string(), now_ms);
        } else {
            tracing::warn!(%err, "unreported failure");
        }
    }

    fn stored(&self, key: &str) -> Option<String> {
        self.storage.get(key).unwrap_or_else(|err| {
            tracing::warn!(key, error = %err, "storage read failed");
            None
        })
    }

    fn persist(&mut self) -> anyhow::Result<()> {
        self.storage.set(CONTENT_KEY, &self.buffer.text())?;
        self.storage
            .set(FILENAME_KEY, self.document.display_name())?;
        Ok(())
    }

    fn persist_autosave(&mut self, token: crate::autosave::TimerToken, now_ms: u64) {
        match self.persist() {
            Ok(()) => {
                tracing::debug!(name = self.document.display_name(), "autosaved");
                self.autosave.complete(token);
                self.document.dirty = false;
            }
            Err(err) => {
                tracing::error!(error = %err, "autosave failed");
                self.show_toast(ToastLevel::Error, format!("Autosave failed: {err:#}"), now_ms);
            }
        }
    }

    fn apply_read(&mut self, read: FileRead, now_ms: u64) {
        match read.result {
            Ok(text) => {
                self.buffer.set_text(&text);
                self.document.name = Some(read.file.name.clone());
                self.after_edit(now_ms);
                self.document.dirty = false;
                tracing::info!(name = %read.file.name, bytes = text.len(), "opened file");
                self.show_toast(
                    ToastLevel::Success,
                    format!("Opened: {}", read.file.name),
                    now_ms,
                );
            }
            Err(err) => {
                tracing::error!(path = %read.file.path.display(), error = %err, "read failed");
                self.show_toast(
                    ToastLevel::Error,
                    format!("Could not read {}: {err}", read.file.name),
                    now_ms,
                );
            }
        }
    }

    fn expire_toast(&mut self, now_ms: u64) -> bool {
        if self.toast.as_ref().is_some_and(|toast| toast.is_expired(now_ms)) {
            self.toast = None;
            return true;
        }
        false
    }
}

/// A scratch session that keeps everything in memory.
impl Default for Session {
    fn default() -> Self {
        Self::new(MemoryStorage::new(), MemorySink::new())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("buffer", &self.buffer)
            .field("document", &self.document)
            .field("stats", &self.stats)
            .field("autosave", &self.autosave)
            .field("theme", &self.theme)
            .field("toast", &self.toast)
            .finish_non_exhaustive()
    }
}
