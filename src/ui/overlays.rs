use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::keymap::{Modifier as KeyModifier, SHORTCUTS};

pub fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(4).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(Color::Indexed(245));

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::styled("Commands", section_style));
    for pair in SHORTCUTS.chunks(2) {
        let cells: Vec<String> = pair
            .iter()
            .map(|shortcut| {
                let modifier = match shortcut.modifier {
                    KeyModifier::Ctrl => "Ctrl",
                    KeyModifier::Alt => "Alt",
                };
                format!("{:<10}{:<16}", format!("{modifier}-{}", shortcut.key), shortcut.description)
            })
            .collect();
        lines.push(Line::raw(format!("  {}", cells.concat())));
    }
    lines.push(Line::raw("  Alt-1 .. Alt-9      Copy code block N"));
    lines.push(Line::raw(""));

    lines.push(Line::styled("Editing", section_style));
    lines.push(Line::raw("  Arrows, Home/End    Move"));
    lines.push(Line::raw("  Shift+Arrows        Select"));
    lines.push(Line::raw("  Ctrl-a              Select all"));
    lines.push(Line::raw("  Ctrl+Left/Right     Word movement"));
    lines.push(Line::raw("  Ctrl+Home/End       Buffer start / end"));
    lines.push(Line::raw("  Paste a file path   Open it (drag and drop)"));
    lines.push(Line::raw(""));

    lines.push(Line::styled("View", section_style));
    lines.push(Line::raw("  F2 / Shift-Tab      Switch editor / preview focus"));
    lines.push(Line::raw("  Mouse wheel         Scroll pane"));
    lines.push(Line::raw("  F1                  Toggle help"));
    lines.push(Line::raw("  Ctrl-q / Ctrl-c     Quit"));

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    // Inner area: border(1) + padding(1) on each side = 4
    let inner = Rect::new(
        popup.x + 2,
        popup.y + 2,
        popup.width.saturating_sub(4),
        popup.height.saturating_sub(4),
    );
    let content_height = inner.height.saturating_sub(1);
    let content_area = Rect::new(inner.x, inner.y, inner.width, content_height);
    frame.render_widget(Paragraph::new(lines), content_area);

    let footer_area = Rect::new(inner.x, inner.y + content_height, inner.width, 1);
    let footer = Line::styled("any key closes", dim_style);
    frame.render_widget(Paragraph::new(footer), footer_area);
}

pub fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
