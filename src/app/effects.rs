use std::io::{self, Write, stdout};

use anyhow::Result;
use base64::Engine;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use ratatui::buffer::Buffer;

use crate::app::{App, Message, Model};
use crate::editor::InputProvider;
use crate::render::Clipboard;
use crate::session::IncomingFile;
use crate::ui::{PromptOutcome, PromptState};

/// System clipboard through the OSC 52 terminal escape.
#[derive(Debug, Default, Clone, Copy)]
pub struct Osc52Clipboard;

impl Clipboard for Osc52Clipboard {
    fn copy_text(&mut self, text: &str) -> io::Result<()> {
        let mut out = stdout();
        out.write_all(osc52_sequence(text).as_bytes())?;
        out.flush()
    }
}

fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x07")
}

/// Answers command prompts with a modal popup drawn over the last frame.
pub struct TerminalInput<'a> {
    terminal: &'a mut DefaultTerminal,
    background: Buffer,
}

impl<'a> TerminalInput<'a> {
    pub const fn new(terminal: &'a mut DefaultTerminal, background: Buffer) -> Self {
        Self {
            terminal,
            background,
        }
    }

    fn run(&mut self, mut state: PromptState) -> PromptOutcome {
        match self.run_inner(&mut state) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(error = %err, title = %state.title, "prompt failed");
                PromptOutcome::Cancel
            }
        }
    }

    fn run_inner(&mut self, state: &mut PromptState) -> io::Result<PromptOutcome> {
        let Self {
            terminal,
            background,
        } = self;
        loop {
            terminal.draw(|frame| {
                let area = frame.area().intersection(background.area);
                let buf = frame.buffer_mut();
                for y in area.top()..area.bottom() {
                    for x in area.left()..area.right() {
                        if let (Some(cell), Some(old)) = (buf.cell_mut((x, y)), background.cell((x, y))) {
                            *cell = old.clone();
                        }
                    }
                }
                crate::ui::render_prompt(frame, state);
            })?;
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    if let Some(outcome) = state.handle_key(key) {
                        return Ok(outcome);
                    }
                }
                Event::Paste(text) => state.paste(&text),
                _ => {}
            }
        }
    }
}

impl InputProvider for TerminalInput<'_> {
    fn confirm(&mut self, message: &str) -> bool {
        matches!(
            self.run(PromptState::confirm(message)),
            PromptOutcome::Confirm(true)
        )
    }

    fn prompt(&mut self, message: &str, default: Option<&str>) -> Option<String> {
        match self.run(PromptState::text(message, default)) {
            PromptOutcome::Submit(text) => Some(text),
            PromptOutcome::Confirm(_) | PromptOutcome::Cancel => None,
        }
    }
}

impl App {
    /// Carry out messages the pure update leaves alone.
    pub(super) fn handle_message_side_effects(
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        msg: &Message,
        now_ms: u64,
    ) -> Result<()> {
        match msg {
            Message::Run(command) => {
                let background = terminal.draw(|frame| crate::ui::render(model, frame))?.buffer.clone();
                let mut input = TerminalInput::new(terminal, background);
                model.session.dispatch(*command, &mut input, now_ms);
                model.ensure_cursor_visible();
            }
            Message::DropFile(path) => {
                // Rejections are reported by the session.
                let _ = model
                    .session
                    .open(IncomingFile::from_path(path.clone()), now_ms);
            }
            _ => {}
        }
        Ok(())
    }
}
