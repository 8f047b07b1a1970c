use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, update};

/// Poll interval while timers (autosave, toasts, copy labels, file reads)
/// may need servicing.
const TICK_MS: u64 = 100;

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

impl App {
    /// Run the interactive editor until the user quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage file cannot be opened, the terminal
    /// cannot be initialized, or the event loop hits an I/O failure.
    pub fn run(&mut self) -> Result<()> {
        let session = self.build_session()?;

        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal; livemark requires an interactive terminal")?;
        let size = terminal.size()?;
        execute!(stdout(), EnableBracketedPaste, EnableMouseCapture)?;

        let mut model = Model::new(session, (size.width, size.height));
        let start = Instant::now();
        let result = Self::event_loop(&mut terminal, &mut model, start);

        let _ = execute!(stdout(), DisableMouseCapture, DisableBracketedPaste);
        ratatui::restore();
        Self::finish(&mut model, result, elapsed_ms(start))
    }

    /// Write any debounced edit, however the loop ended, then report the
    /// loop's outcome.
    pub(super) fn finish(model: &mut Model, result: Result<()>, now_ms: u64) -> Result<()> {
        model.session.flush_autosave(now_ms);
        if let Err(err) = &result {
            tracing::error!(error = %err, "event loop failed");
        }
        result
    }

    fn event_loop(terminal: &mut DefaultTerminal, model: &mut Model, start: Instant) -> Result<()> {
        let now = || elapsed_ms(start);
        let mut needs_render = true;

        loop {
            if model.session.tick(now()) {
                needs_render = true;
            }

            if needs_render {
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(TICK_MS))? {
                // Coalesce key repeat and paste bursts into a single render.
                loop {
                    let now_ms = now();
                    if let Some(msg) = Self::handle_event(&event::read()?, model) {
                        tracing::trace!(?msg, "message");
                        Self::apply(terminal, model, msg, now_ms)?;
                        needs_render = true;
                    }
                    if model.should_quit || !event::poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    fn apply(
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        msg: Message,
        now_ms: u64,
    ) -> Result<()> {
        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        Self::handle_message_side_effects(terminal, model, &side_msg, now_ms)?;
        model.session.after_edit(now_ms);
        Ok(())
    }
}
