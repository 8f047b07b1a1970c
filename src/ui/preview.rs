//! Terminal rendition of the preview HTML.
//!
//! The render pipeline produces HTML. This walks that HTML with a small tag
//! scanner and turns the block structure into styled lines. It understands
//! the markup comrak and the preview rules emit, not arbitrary HTML.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::highlight::{ClassColors, Theme};
use crate::render::RenderSnapshot;

/// Lines for the preview pane.
pub fn preview_lines(snapshot: &RenderSnapshot, theme: Theme) -> Vec<Line<'static>> {
    match snapshot {
        RenderSnapshot::Placeholder => vec![Line::styled(
            crate::render::PLACEHOLDER,
            Style::default()
                .fg(Color::Indexed(245))
                .add_modifier(Modifier::ITALIC),
        )],
        RenderSnapshot::Rendered(view) => html_to_lines(&view.html, theme),
    }
}

/// Convert rendered HTML into styled terminal lines.
pub fn html_to_lines(html: &str, theme: Theme) -> Vec<Line<'static>> {
    let mut walker = Walker::new(Palette::for_theme(theme), ClassColors::new(theme));
    let mut rest = html;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("<!--") {
            rest = after.find("-->").map_or("", |end| &after[end + 3..]);
            continue;
        }
        if rest.starts_with('<')
            && let Some(end) = rest.find('>')
        {
            walker.tag(&rest[1..end]);
            rest = &rest[end + 1..];
            continue;
        }
        // A stray '<' with no closing '>' is text.
        let end = match rest.find('<') {
            Some(0) | None => rest.len(),
            Some(at) => at,
        };
        walker.text(&decode_entities(&rest[..end]));
        rest = &rest[end..];
    }
    walker.finish()
}

struct Palette {
    heading: [Color; 3],
    code: Color,
    link: Color,
    quote: Color,
    dim: Color,
}

impl Palette {
    const fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                heading: [Color::Indexed(24), Color::Indexed(22), Color::Indexed(58)],
                code: Color::Indexed(238),
                link: Color::Indexed(25),
                quote: Color::Indexed(24),
                dim: Color::Indexed(244),
            },
            Theme::Dark => Self {
                heading: [Color::Cyan, Color::Green, Color::Yellow],
                code: Color::Indexed(250),
                link: Color::Cyan,
                quote: Color::Blue,
                dim: Color::Indexed(245),
            },
        }
    }
}

struct ListFrame {
    ordered: bool,
    next: usize,
}

struct Walker {
    palette: Palette,
    colors: ClassColors,
    /// Classes of the highlight spans open inside the current `<pre>`.
    code_spans: Vec<String>,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    lists: Vec<ListFrame>,
    quote_depth: usize,
    in_pre: bool,
    /// Code block index and label while inside a copy button.
    button: Option<(usize, String)>,
    href: Option<String>,
    in_row: bool,
    in_cell: bool,
    first_cell: bool,
    /// A list marker was written and no item text has followed yet.
    marker_pending: bool,
}

impl Walker {
    fn new(palette: Palette, colors: ClassColors) -> Self {
        Self {
            palette,
            colors,
            code_spans: Vec::new(),
            lines: Vec::new(),
            current: Vec::new(),
            styles: vec![Style::default()],
            lists: Vec::new(),
            quote_depth: 0,
            in_pre: false,
            button: None,
            href: None,
            in_row: false,
            in_cell: false,
            first_cell: true,
            marker_pending: false,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, patch: Style) {
        let style = self.style().patch(patch);
        self.styles.push(style);
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn push_span(&mut self, text: impl Into<String>, style: Style) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        if self.current.is_empty() && self.quote_depth > 0 {
            self.current.push(Span::styled(
                "│ ".repeat(self.quote_depth),
                Style::default().fg(self.palette.quote),
            ));
        }
        self.current.push(Span::styled(text, style));
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
        }
    }

    /// End the current line and leave one empty line, never two.
    fn blank(&mut self) {
        self.flush();
        if self.lines.last().is_some_and(|line| line.width() > 0) {
            self.lines.push(Line::raw(""));
        }
    }

    fn text(&mut self, text: &str) {
        if let Some((_, label)) = &mut self.button {
            label.push_str(text);
            return;
        }
        if self.in_pre {
            let style = self.style();
            let mut parts = text.split('\n').peekable();
            while let Some(part) = parts.next() {
                self.push_span(part, style);
                if parts.peek().is_some() {
                    if self.current.is_empty() {
                        self.lines.push(Line::raw(""));
                    }
                    self.flush();
                }
            }
            return;
        }
        let collapsed = text.replace(['\n', '\r'], " ");
        if collapsed.trim().is_empty() && (self.marker_pending || (self.in_row && !self.in_cell)) {
            return;
        }
        self.marker_pending = false;
        let collapsed = if self.current.is_empty() {
            collapsed.trim_start().to_string()
        } else {
            collapsed
        };
        self.push_span(collapsed, self.style());
    }

    fn tag(&mut self, raw: &str) {
        let raw = raw.trim_end_matches('/').trim();
        let (closing, raw) = raw
            .strip_prefix('/')
            .map_or((false, raw), |rest| (true, rest));
        let (name, attrs) = raw
            .split_once(char::is_whitespace)
            .unwrap_or((raw, ""));
        let name = name.to_ascii_lowercase();

        match (name.as_str(), closing) {
            ("h1" | "h2" | "h3" | "h4" | "h5" | "h6", false) => {
                let level = name[1..].parse::<usize>().unwrap_or(1);
                self.blank();
                let color = self.palette.heading[(level - 1).min(2)];
                let mut style = Style::default().fg(color).add_modifier(Modifier::BOLD);
                if level == 1 {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                self.push_span(
                    format!("{} ", "#".repeat(level)),
                    Style::default().fg(self.palette.dim),
                );
                self.push_style(style);
            }
            ("h1" | "h2" | "h3" | "h4" | "h5" | "h6", true) => {
                self.pop_style();
                self.blank();
            }
            ("p", false) => {
                if !self.marker_pending {
                    self.flush();
                }
            }
            ("p", true) => {
                if self.lists.is_empty() {
                    self.blank();
                } else {
                    self.flush();
                }
            }
            ("br", _) => self.flush(),
            ("hr", _) => {
                self.blank();
                self.push_span("─".repeat(40), Style::default().fg(self.palette.dim));
                self.blank();
            }
            ("strong" | "b", false) => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            ("em" | "i", false) => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            ("del" | "s", false) => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT));
            }
            ("code", false) if !self.in_pre => {
                self.push_style(Style::default().fg(self.palette.code).bg(Color::Indexed(236)));
            }
            ("strong" | "b" | "em" | "i" | "del" | "s", true) => self.pop_style(),
            ("code", true) if !self.in_pre => self.pop_style(),
            ("a", false) => {
                self.href = attr(attrs, "href");
                self.push_style(
                    Style::default()
                        .fg(self.palette.link)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            ("a", true) => {
                self.pop_style();
                if let Some(href) = self.href.take().filter(|h| !h.is_empty()) {
                    self.push_span(format!(" <{href}>"), Style::default().fg(self.palette.dim));
                }
            }
            ("img", _) => {
                let alt = attr(attrs, "alt").unwrap_or_default();
                let src = attr(attrs, "src").unwrap_or_default();
                let label = if alt.is_empty() { src } else { alt };
                self.push_span(
                    format!("[image: {label}]"),
                    Style::default().fg(Color::Magenta),
                );
            }
            ("figure", _) => self.blank(),
            ("figcaption", false) => {
                self.flush();
                self.push_style(
                    Style::default()
                        .fg(self.palette.dim)
                        .add_modifier(Modifier::ITALIC),
                );
            }
            ("figcaption", true) => {
                self.pop_style();
                self.flush();
            }
            ("blockquote", false) => {
                self.flush();
                self.quote_depth += 1;
                self.push_style(Style::default().add_modifier(Modifier::ITALIC));
            }
            ("blockquote", true) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.pop_style();
                self.blank();
            }
            ("pre", false) => {
                self.blank();
                self.in_pre = true;
                self.push_style(Style::default().fg(self.palette.code));
            }
            ("pre", true) => {
                self.flush();
                self.in_pre = false;
                for _ in 0..self.code_spans.len() {
                    self.pop_style();
                }
                self.code_spans.clear();
                self.pop_style();
                self.blank();
            }
            ("span", false) if self.in_pre => {
                self.code_spans.push(attr(attrs, "class").unwrap_or_default());
                let style = self
                    .colors
                    .foreground(&self.code_spans)
                    .map_or_else(Style::default, |(r, g, b)| {
                        Style::default().fg(Color::Rgb(r, g, b))
                    });
                self.push_style(style);
            }
            ("span", true) if self.in_pre && !self.code_spans.is_empty() => {
                self.code_spans.pop();
                self.pop_style();
            }
            ("button", false) => {
                let index = attr(attrs, "data-code-block")
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(0);
                self.button = Some((index, String::new()));
            }
            ("button", true) => {
                if let Some((index, label)) = self.button.take() {
                    self.flush();
                    let hint = if index < crate::keymap::MAX_COPY_SHORTCUT {
                        format!("[{label} · Alt+{}]", index + 1)
                    } else {
                        format!("[{label}]")
                    };
                    self.push_span(hint, Style::default().fg(Color::Black).bg(Color::Indexed(245)));
                    self.flush();
                }
            }
            ("ul" | "ol", false) => {
                self.flush();
                let start = attr(attrs, "start").and_then(|n| n.parse().ok()).unwrap_or(1);
                self.lists.push(ListFrame {
                    ordered: name == "ol",
                    next: start,
                });
            }
            ("ul" | "ol", true) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            ("li", false) => {
                self.flush();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(list) if list.ordered => {
                        let n = list.next;
                        list.next += 1;
                        format!("{n}. ")
                    }
                    _ => "• ".to_string(),
                };
                self.push_span(
                    format!("{}{marker}", "  ".repeat(depth)),
                    Style::default().fg(self.palette.dim),
                );
                self.marker_pending = true;
            }
            ("li", true) => {
                self.marker_pending = false;
                self.flush();
            }
            ("input", _) => {
                let mark = if attrs.contains("checked") { "[x] " } else { "[ ] " };
                self.push_span(mark, self.style());
            }
            ("table", true) => self.blank(),
            ("tr", false) => {
                self.flush();
                self.in_row = true;
                self.first_cell = true;
            }
            ("tr", true) => {
                self.in_row = false;
                self.flush();
            }
            ("th" | "td", false) => {
                if !self.first_cell {
                    self.push_span(" │ ", Style::default().fg(self.palette.dim));
                }
                self.first_cell = false;
                self.in_cell = true;
                if name == "th" {
                    self.push_style(Style::default().add_modifier(Modifier::BOLD));
                } else {
                    self.push_style(Style::default());
                }
            }
            ("th" | "td", true) => {
                self.in_cell = false;
                self.pop_style();
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|line| line.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }
}

/// Value of `name="..."` in a tag's attribute text.
fn attr(attrs: &str, name: &str) -> Option<String> {
    let needle = format!("{name}=\"");
    let mut search = attrs;
    loop {
        let at = search.find(&needle)?;
        let preceded_ok = at == 0
            || search[..at]
                .chars()
                .last()
                .is_some_and(char::is_whitespace);
        let value = &search[at + needle.len()..];
        if preceded_ok {
            let end = value.find('"')?;
            return Some(decode_entities(&value[..end]));
        }
        search = value;
    }
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(at) = rest.find('&') {
        out.push_str(&rest[..at]);
        rest = &rest[at..];
        let decoded = rest.find(';').filter(|end| *end <= 10).and_then(|end| {
            let entity = &rest[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity.strip_prefix('#').and_then(|num| {
                    num.strip_prefix(['x', 'X'])
                        .map_or_else(|| num.parse().ok(), |hex| u32::from_str_radix(hex, 16).ok())
                        .and_then(char::from_u32)
                }),
            };
            ch.map(|ch| (ch, end))
        });
        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
