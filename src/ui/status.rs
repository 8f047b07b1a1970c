use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::app::Model;
use crate::session::ToastLevel;

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let session = &model.session;
    let stats = session.stats();
    let cursor = session.buffer().cursor();
    let column = session
        .buffer()
        .line_at(cursor.line)
        .and_then(|line| line.get(..cursor.col).map(UnicodeWidthStr::width))
        .unwrap_or(cursor.col);
    let save_status = session
        .save_status()
        .map_or_else(String::new, |s| format!("  [{}]", s.label()));

    let status = format!(
        " {}{}  {} words · {} chars  Ln {}, Col {}  {}  F1:help  Ctrl-q:quit",
        session.document().display_name(),
        save_status,
        stats.words,
        stats.chars,
        cursor.line + 1,
        column + 1,
        session.theme().as_str(),
    );

    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Success => ("[ok]", Style::default().bg(Color::Green).fg(Color::Black)),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
