use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};
use unicode_width::UnicodeWidthStr;

use super::overlays::centered_popup_rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Confirm,
    Text,
}

/// How a modal prompt was closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Confirm(bool),
    Submit(String),
    Cancel,
}

/// State of the modal question shown while a command waits for input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptState {
    pub kind: PromptKind,
    pub title: String,
    /// Editable answer, prefilled with the default.
    pub input: String,
}

impl PromptState {
    pub fn confirm(title: impl Into<String>) -> Self {
        Self {
            kind: PromptKind::Confirm,
            title: title.into(),
            input: String::new(),
        }
    }

    pub fn text(title: impl Into<String>, default: Option<&str>) -> Self {
        Self {
            kind: PromptKind::Text,
            title: title.into(),
            input: default.unwrap_or_default().to_string(),
        }
    }

    /// Feed a key press. Returns the outcome once the prompt closes.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PromptOutcome> {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Some(PromptOutcome::Cancel);
        }
        match self.kind {
            PromptKind::Confirm => match key.code {
                KeyCode::Enter | KeyCode::Char('y' | 'Y') => Some(PromptOutcome::Confirm(true)),
                KeyCode::Char('n' | 'N') => Some(PromptOutcome::Confirm(false)),
                _ => None,
            },
            PromptKind::Text => {
                match key.code {
                    KeyCode::Enter => return Some(PromptOutcome::Submit(self.input.clone())),
                    KeyCode::Backspace => {
                        self.input.pop();
                    }
                    KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        self.input.clear();
                    }
                    KeyCode::Char(c)
                        if !key
                            .modifiers
                            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                    {
                        self.input.push(c);
                    }
                    _ => {}
                }
                None
            }
        }
    }

    /// Append pasted text, keeping the answer on one line.
    pub fn paste(&mut self, text: &str) {
        if self.kind == PromptKind::Text {
            self.input
                .extend(text.chars().filter(|c| *c != '\n' && *c != '\r'));
        }
    }
}

pub fn render_prompt(frame: &mut Frame, state: &PromptState) {
    let area = frame.area();
    let popup = centered_popup_rect(area.width.saturating_sub(16).max(40), 7, area);

    let hint = match state.kind {
        PromptKind::Confirm => "y/Enter: yes · n: no · Esc: cancel",
        PromptKind::Text => "Enter: accept · Esc: cancel · Ctrl-u: clear",
    };
    let answer = match state.kind {
        PromptKind::Confirm => Line::raw(""),
        PromptKind::Text => Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Yellow)),
            Span::raw(state.input.clone()),
        ]),
    };
    let lines = vec![
        answer,
        Line::raw(""),
        Line::styled(hint, Style::default().fg(Color::Indexed(245))),
    ];

    let block = Block::default()
        .title(state.title.clone())
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);

    if state.kind == PromptKind::Text {
        // Border + padding + "> "
        #[allow(clippy::cast_possible_truncation)]
        let width = state.input.width() as u16;
        let x = (popup.x + 4 + width).min(popup.right().saturating_sub(2));
        frame.set_cursor_position(Position::new(x, popup.y + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_text_prompt_starts_with_default() {
        let mut state = PromptState::text("Link URL", Some("https://"));
        state.handle_key(key(KeyCode::Char('a')));
        assert_eq!(
            state.handle_key(key(KeyCode::Enter)),
            Some(PromptOutcome::Submit("https://a".to_string()))
        );
    }

    #[test]
    fn test_text_prompt_editing() {
        let mut state = PromptState::text("Language", None);
        for c in "rustx".chars() {
            state.handle_key(key(KeyCode::Char(c)));
        }
        state.handle_key(key(KeyCode::Backspace));
        assert_eq!(state.input, "rust");
        state.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(state.input, "");
    }

    #[test]
    fn test_escape_cancels() {
        let mut state = PromptState::text("Image URL", None);
        assert_eq!(state.handle_key(key(KeyCode::Esc)), Some(PromptOutcome::Cancel));
        let mut state = PromptState::confirm("Discard?");
        assert_eq!(state.handle_key(key(KeyCode::Esc)), Some(PromptOutcome::Cancel));
    }

    #[test]
    fn test_confirm_keys() {
        let mut state = PromptState::confirm("Discard?");
        assert_eq!(state.handle_key(key(KeyCode::Char('x'))), None);
        assert_eq!(
            state.handle_key(key(KeyCode::Char('n'))),
            Some(PromptOutcome::Confirm(false))
        );
        assert_eq!(
            state.handle_key(key(KeyCode::Enter)),
            Some(PromptOutcome::Confirm(true))
        );
    }

    #[test]
    fn test_paste_stays_on_one_line() {
        let mut state = PromptState::text("Open file", None);
        state.paste("/tmp/a.md\r\n");
        assert_eq!(state.input, "/tmp/a.md");
    }
}
