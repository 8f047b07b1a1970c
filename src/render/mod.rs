//! Buffer content to preview.
//!
//! Every render fully replaces the previous snapshot. Blank input never
//! reaches the transformer and produces the placeholder instead.

mod enhance;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use crate::document::{MarkdownTransformer, Transformer};

pub use enhance::{
    COPIED_LABEL, COPY_CONFIRM_MS, COPY_LABEL, CodeBlockView, CopyControl, enhance_code_blocks,
};

/// Text shown when the buffer is blank.
pub const PLACEHOLDER: &str = "Start writing markdown; the preview will appear here.";

/// Destination for copied text.
pub trait Clipboard {
    /// # Errors
    ///
    /// Returns an error if the text could not be handed to the clipboard.
    fn copy_text(&mut self, text: &str) -> std::io::Result<()>;
}

/// Clipboard that keeps every copy in memory. Clones share the history.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    copies: Rc<RefCell<Vec<String>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently copied text.
    pub fn contents(&self) -> Option<String> {
        self.copies.borrow().last().cloned()
    }

    pub fn copies(&self) -> usize {
        self.copies.borrow().len()
    }
}

impl Clipboard for MemoryClipboard {
    fn copy_text(&mut self, text: &str) -> std::io::Result<()> {
        self.copies.borrow_mut().push(text.to_string());
        Ok(())
    }
}

/// HTML produced from a non-blank buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedView {
    pub html: String,
    pub code_blocks: Vec<CodeBlockView>,
}

/// What the preview currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RenderSnapshot {
    #[default]
    Placeholder,
    Rendered(RenderedView),
}

impl RenderSnapshot {
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }

    /// HTML of the rendered view, or `None` for the placeholder.
    pub fn html(&self) -> Option<&str> {
        match self {
            Self::Placeholder => None,
            Self::Rendered(view) => Some(&view.html),
        }
    }

    pub fn code_blocks(&self) -> &[CodeBlockView] {
        match self {
            Self::Placeholder => &[],
            Self::Rendered(view) => &view.code_blocks,
        }
    }
}

/// Drives the transformer and owns the single current snapshot.
pub struct RenderPipeline {
    transformer: Box<dyn Transformer + Send>,
    snapshot: RenderSnapshot,
    transforms: u64,
}

impl RenderPipeline {
    pub fn new(transformer: impl Transformer + Send + 'static) -> Self {
        Self {
            transformer: Box::new(transformer),
            snapshot: RenderSnapshot::Placeholder,
            transforms: 0,
        }
    }

    pub const fn snapshot(&self) -> &RenderSnapshot {
        &self.snapshot
    }

    /// The transformer, for one-off conversions outside the preview.
    pub fn transformer(&self) -> &dyn Transformer {
        self.transformer.as_ref()
    }

    /// Number of times the transformer has run.
    pub const fn transform_count(&self) -> u64 {
        self.transforms
    }

    /// Replace the snapshot with the rendering of `content`.
    pub fn render(&mut self, content: &str) {
        if content.trim().is_empty() {
            self.snapshot = RenderSnapshot::Placeholder;
            return;
        }

        let started = Instant::now();
        let transformed = self.transformer.transform(content);
        self.transforms += 1;

        let mut view = RenderedView {
            html: transformed.html,
            code_blocks: transformed
                .code_blocks
                .into_iter()
                .map(CodeBlockView::from)
                .collect(),
        };
        enhance_code_blocks(&mut view.html, &mut view.code_blocks);
        tracing::debug!(
            bytes = content.len(),
            code_blocks = view.code_blocks.len(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "rendered preview"
        );
        self.snapshot = RenderSnapshot::Rendered(view);
    }

    /// Copy code block `index` verbatim and show the confirmation.
    ///
    /// Returns `Ok(false)` when there is no such enhanced block.
    ///
    /// # Errors
    ///
    /// Returns the clipboard's error; the label is left unchanged.
    pub fn copy_code_block(
        &mut self,
        index: usize,
        clipboard: &mut dyn Clipboard,
        now_ms: u64,
    ) -> std::io::Result<bool> {
        let RenderSnapshot::Rendered(view) = &mut self.snapshot else {
            return Ok(false);
        };
        let Some(block) = view.code_blocks.get_mut(index) else {
            return Ok(false);
        };
        let Some(control) = block.copy.as_mut() else {
            return Ok(false);
        };
        clipboard.copy_text(&block.text)?;
        control.confirm(now_ms);
        Ok(true)
    }

    /// Revert expired copy confirmations. Returns true if any changed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let RenderSnapshot::Rendered(view) = &mut self.snapshot else {
            return false;
        };
        let mut changed = false;
        for control in view.code_blocks.iter_mut().filter_map(|b| b.copy.as_mut()) {
            changed |= control.tick(now_ms);
        }
        changed
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new(MarkdownTransformer::new())
    }
}

impl std::fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("snapshot", &self.snapshot)
            .field("transforms", &self.transforms)
            .finish_non_exhaustive()
    }
}
