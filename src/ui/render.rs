use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::app::{Focus, Model};
use crate::editor::EditorBuffer;

use super::{EDITOR_WIDTH_PERCENT, PREVIEW_WIDTH_PERCENT, overlays, preview, status};

/// Screen regions of the main view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneLayout {
    pub editor: Rect,
    pub preview: Rect,
    pub status: Rect,
}

pub fn split_panes(area: Rect) -> PaneLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(EDITOR_WIDTH_PERCENT),
            Constraint::Percentage(PREVIEW_WIDTH_PERCENT),
        ])
        .split(rows[0]);
    PaneLayout {
        editor: columns[0],
        preview: columns[1],
        status: rows[1],
    }
}

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let layout = split_panes(area);

    render_editor(model, frame, layout.editor);
    render_preview(model, frame, layout.preview);
    status::render_status_bar(model, frame, layout.status);

    if model.active_toast().is_some() && layout.status.y > area.y {
        let toast_area = Rect {
            y: layout.status.y - 1,
            height: 1,
            ..layout.status
        };
        status::render_toast_bar(model, frame, toast_area);
    }

    if model.help_visible {
        overlays::render_help_overlay(frame, area);
    }
}

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border)
}

fn render_editor(model: &Model, frame: &mut Frame, area: Rect) {
    let buf = model.session.buffer();
    let document = model.session.document();
    let dirty = if document.dirty { " ●" } else { "" };
    let focused = model.focus == Focus::Editor;
    let block = pane_block(format!(" {}{dirty} ", document.display_name()), focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let total_lines = buf.line_count();
    let gutter_width = line_number_width(total_lines);
    let start = model.editor_scroll.min(total_lines.saturating_sub(1));
    let end = (start + inner.height as usize).min(total_lines);

    let content: Vec<Line> = (start..end)
        .map(|line_idx| editor_line(buf, line_idx, gutter_width))
        .collect();
    frame.render_widget(Paragraph::new(content), inner);

    let cursor = buf.cursor();
    if focused && !model.help_visible && (start..end).contains(&cursor.line) {
        let line_text = buf.line_at(cursor.line).unwrap_or_default();
        let before = line_text.get(..cursor.col).unwrap_or(&line_text);
        #[allow(clippy::cast_possible_truncation)]
        let x = inner.x + gutter_width + 1 + before.width() as u16;
        #[allow(clippy::cast_possible_truncation)]
        let y = inner.y + (cursor.line - start) as u16;
        frame.set_cursor_position(Position::new(
            x.min(inner.right().saturating_sub(1)),
            y,
        ));
    }
}

fn editor_line(buf: &EditorBuffer, line_idx: usize, gutter_width: u16) -> Line<'static> {
    let line_text = buf.line_at(line_idx).unwrap_or_default();
    let line_num = format!("{:>width$} ", line_idx + 1, width = gutter_width as usize);
    let mut spans = vec![Span::styled(line_num, Style::default().fg(Color::DarkGray))];

    let selected = buf.selection().and_then(|sel| {
        if line_idx < sel.start.line || line_idx > sel.end.line {
            return None;
        }
        let from = if line_idx == sel.start.line { sel.start.col } else { 0 };
        let to = if line_idx == sel.end.line {
            sel.end.col
        } else {
            line_text.len()
        };
        Some((from.min(line_text.len()), to.min(line_text.len())))
    });

    match selected {
        Some((from, to)) if line_text.is_char_boundary(from) && line_text.is_char_boundary(to) => {
            let selection_style = Style::default().bg(Color::Indexed(24)).fg(Color::White);
            spans.push(Span::raw(line_text[..from].to_string()));
            // Show selected line breaks as a highlighted blank.
            let body = if from == to { " " } else { &line_text[from..to] };
            spans.push(Span::styled(body.to_string(), selection_style));
            spans.push(Span::raw(line_text[to..].to_string()));
        }
        _ => spans.push(Span::raw(line_text)),
    }
    Line::from(spans)
}

fn render_preview(model: &Model, frame: &mut Frame, area: Rect) {
    let theme = model.session.theme();
    let focused = model.focus == Focus::Preview;
    let block = pane_block(format!(" Preview ({}) ", theme.as_str()), focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = preview::preview_lines(model.session.snapshot(), theme);
    let max_scroll = lines.len().saturating_sub(inner.height as usize);
    let scroll = u16::try_from(model.preview_scroll.min(max_scroll)).unwrap_or(u16::MAX);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        inner,
    );
}

/// Calculate the width needed for line numbers.
pub const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else if total_lines < 10_000 {
        4
    } else if total_lines < 100_000 {
        5
    } else {
        6
    }
}
