use crate::session::{Session, ToastLevel};

/// Pane receiving navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Editor,
    Preview,
}

/// The complete frontend state.
///
/// Document state lives in the [`Session`]; the model adds what only the
/// terminal view needs.
#[derive(Debug, Default)]
pub struct Model {
    pub session: Session,
    pub focus: Focus,
    /// First visible buffer line in the editor pane.
    pub editor_scroll: usize,
    /// First visible line in the preview pane.
    pub preview_scroll: usize,
    /// Terminal size (width, height).
    pub size: (u16, u16),
    pub help_visible: bool,
    pub should_quit: bool,
}

impl Model {
    pub fn new(session: Session, size: (u16, u16)) -> Self {
        Self {
            session,
            size,
            ..Self::default()
        }
    }

    /// Rows available to the editor and preview panes.
    pub const fn pane_height(&self) -> usize {
        // Borders top and bottom, status row.
        self.size.1.saturating_sub(3) as usize
    }

    /// Scroll the editor so the cursor line is on screen.
    pub fn ensure_cursor_visible(&mut self) {
        let cursor_line = self.session.buffer().cursor().line;
        let height = self.pane_height();
        if height == 0 {
            self.editor_scroll = cursor_line;
        } else if cursor_line < self.editor_scroll {
            self.editor_scroll = cursor_line;
        } else if cursor_line >= self.editor_scroll + height {
            self.editor_scroll = cursor_line + 1 - height;
        }
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.session.active_toast()
    }
}
