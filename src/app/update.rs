use std::path::PathBuf;

use crate::app::model::{Focus, Model};
use crate::editor::Direction;
use crate::keymap::Command;

/// All possible events and actions in the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Editing
    /// Insert a character at the cursor (replacing the selection)
    InsertChar(char),
    /// Insert pasted text
    Paste(String),
    /// Split line at cursor (Enter)
    SplitLine,
    /// Delete before the cursor (Backspace)
    DeleteBack,
    /// Delete at the cursor (Delete)
    DeleteForward,

    // Cursor
    MoveCursor(Direction),
    /// Move the cursor while extending the selection
    ExtendSelection(Direction),
    MoveHome,
    MoveEnd,
    MoveWordLeft,
    MoveWordRight,
    MoveToStart,
    MoveToEnd,
    PageUp,
    PageDown,
    SelectAll,

    // View
    ScrollEditor(isize),
    ScrollPreview(isize),
    SwitchFocus,
    ToggleHelp,
    HideHelp,
    Resize(u16, u16),

    // Session
    /// Run a session command; handled as a side effect
    Run(Command),
    /// A file was dropped onto the terminal; handled as a side effect
    DropFile(PathBuf),

    Quit,
}

/// Pure state transition.
///
/// Buffer edits land in the session's buffer; the caller follows up with
/// `Session::after_edit` to re-render. [`Message::Run`] and
/// [`Message::DropFile`] need user input or the clock and are left to the
/// event loop.
pub fn update(mut model: Model, msg: Message) -> Model {
    let page = model.pane_height().max(1);
    let buffer = model.session.buffer_mut();
    match msg {
        Message::InsertChar(ch) => {
            if buffer.selection().is_some() {
                buffer.replace_selection(&ch.to_string());
            } else {
                buffer.insert_char(ch);
            }
        }
        Message::Paste(text) => {
            buffer.replace_selection(&text.replace("\r\n", "\n").replace('\r', "\n"));
        }
        Message::SplitLine => {
            if buffer.selection().is_some() {
                buffer.replace_selection("\n");
            } else {
                buffer.split_line();
            }
        }
        Message::DeleteBack => {
            if buffer.selection().is_some() {
                buffer.replace_selection("");
            } else {
                buffer.delete_back();
            }
        }
        Message::DeleteForward => {
            if buffer.selection().is_some() {
                buffer.replace_selection("");
            } else {
                buffer.delete_forward();
            }
        }
        Message::MoveCursor(dir) => buffer.move_cursor(dir),
        Message::ExtendSelection(dir) => buffer.extend_selection(dir),
        Message::MoveHome => buffer.move_home(),
        Message::MoveEnd => buffer.move_end(),
        Message::MoveWordLeft => buffer.move_word_left(),
        Message::MoveWordRight => buffer.move_word_right(),
        Message::MoveToStart => buffer.move_to_start(),
        Message::MoveToEnd => buffer.move_to_end(),
        Message::PageUp => {
            let cursor = buffer.cursor();
            buffer.move_to(cursor.line.saturating_sub(page), cursor.col);
        }
        Message::PageDown => {
            let cursor = buffer.cursor();
            buffer.move_to(cursor.line + page, cursor.col);
        }
        Message::SelectAll => buffer.select_all(),
        Message::ScrollEditor(delta) => {
            let max = model.session.buffer().line_count().saturating_sub(1);
            model.editor_scroll = model.editor_scroll.saturating_add_signed(delta).min(max);
            return model;
        }
        Message::ScrollPreview(delta) => {
            model.preview_scroll = model.preview_scroll.saturating_add_signed(delta);
            return model;
        }
        Message::SwitchFocus => {
            model.focus = match model.focus {
                Focus::Editor => Focus::Preview,
                Focus::Preview => Focus::Editor,
            };
            return model;
        }
        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
            return model;
        }
        Message::HideHelp => {
            model.help_visible = false;
            return model;
        }
        Message::Resize(width, height) => {
            model.size = (width, height);
        }
        Message::Run(_) | Message::DropFile(_) => return model,
        Message::Quit => {
            model.should_quit = true;
            return model;
        }
    }
    model.ensure_cursor_visible();
    model
}
