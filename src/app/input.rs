use std::path::PathBuf;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::model::{Focus, Model};
use crate::app::{App, Message};
use crate::editor::Direction;
use crate::keymap::{Modifier, command_for};

const WHEEL_LINES: isize = 3;

impl App {
    pub(super) fn handle_event(event: &Event, model: &Model) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Paste(text) => Some(
                dropped_path(text).map_or_else(|| Message::Paste(text.clone()), Message::DropFile),
            ),
            Event::Resize(w, h) => Some(Message::Resize(*w, *h)),
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        if ctrl && matches!(key.code, KeyCode::Char('q' | 'c')) {
            return Some(Message::Quit);
        }

        if model.help_visible {
            return Some(Message::HideHelp);
        }

        match key.code {
            KeyCode::F(1) => return Some(Message::ToggleHelp),
            KeyCode::F(2) | KeyCode::BackTab => return Some(Message::SwitchFocus),
            KeyCode::Char('a') if ctrl => return Some(Message::SelectAll),
            KeyCode::Char(c) if ctrl || alt => {
                let modifier = if ctrl { Modifier::Ctrl } else { Modifier::Alt };
                return command_for(modifier, c).map(Message::Run);
            }
            _ => {}
        }

        if model.focus == Focus::Preview {
            let page = isize::try_from(model.pane_height()).unwrap_or(isize::MAX);
            return match key.code {
                KeyCode::Down | KeyCode::Char('j') => Some(Message::ScrollPreview(1)),
                KeyCode::Up | KeyCode::Char('k') => Some(Message::ScrollPreview(-1)),
                KeyCode::PageDown | KeyCode::Char(' ') => Some(Message::ScrollPreview(page)),
                KeyCode::PageUp => Some(Message::ScrollPreview(-page)),
                KeyCode::Home => Some(Message::ScrollPreview(isize::MIN)),
                KeyCode::Esc | KeyCode::Tab => Some(Message::SwitchFocus),
                _ => None,
            };
        }

        let arrow = match key.code {
            KeyCode::Up => Some(Direction::Up),
            KeyCode::Down => Some(Direction::Down),
            KeyCode::Left => Some(Direction::Left),
            KeyCode::Right => Some(Direction::Right),
            _ => None,
        };
        if let Some(dir) = arrow {
            return Some(match (dir, ctrl, shift) {
                (Direction::Left, true, _) => Message::MoveWordLeft,
                (Direction::Right, true, _) => Message::MoveWordRight,
                (_, _, true) => Message::ExtendSelection(dir),
                _ => Message::MoveCursor(dir),
            });
        }

        match key.code {
            KeyCode::Char(c) => Some(Message::InsertChar(c)),
            KeyCode::Enter => Some(Message::SplitLine),
            KeyCode::Tab => Some(Message::Paste("    ".to_string())),
            KeyCode::Backspace => Some(Message::DeleteBack),
            KeyCode::Delete => Some(Message::DeleteForward),
            KeyCode::Home if ctrl => Some(Message::MoveToStart),
            KeyCode::End if ctrl => Some(Message::MoveToEnd),
            KeyCode::Home => Some(Message::MoveHome),
            KeyCode::End => Some(Message::MoveEnd),
            KeyCode::PageUp => Some(Message::PageUp),
            KeyCode::PageDown => Some(Message::PageDown),
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        let delta = match mouse.kind {
            MouseEventKind::ScrollDown => WHEEL_LINES,
            MouseEventKind::ScrollUp => -WHEEL_LINES,
            _ => return None,
        };
        let area = Rect::new(0, 0, model.size.0, model.size.1);
        let layout = crate::ui::split_panes(area);
        if layout.preview.contains((mouse.column, mouse.row).into()) {
            Some(Message::ScrollPreview(delta))
        } else {
            Some(Message::ScrollEditor(delta))
        }
    }
}

/// A paste that is exactly one existing file path, as terminals produce
/// when a file is dragged onto them.
pub(super) fn dropped_path(text: &str) -> Option<PathBuf> {
    let text = text.trim();
    if text.is_empty() || text.contains('\n') {
        return None;
    }
    let unquoted = ['\'', '"']
        .iter()
        .find_map(|q| text.strip_prefix(*q).and_then(|t| t.strip_suffix(*q)))
        .unwrap_or(text);
    let unprefixed = unquoted.strip_prefix("file://").unwrap_or(unquoted);
    let candidates = [unprefixed.to_string(), unprefixed.replace("\\ ", " ")];
    candidates
        .into_iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
}
