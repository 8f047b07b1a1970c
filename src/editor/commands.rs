//! Markdown editing commands.
//!
//! Each command is a single range replacement on the buffer, so it is one
//! undo step. Commands that need a selection check for it before touching
//! anything and leave the buffer untouched when it is missing.

use std::sync::LazyLock;

use regex::Regex;

use super::buffer::{EditorBuffer, Position};
use super::input::InputProvider;
use crate::error::{Error, Result};

/// Deepest heading level markdown supports.
pub const MAX_HEADING_LEVEL: usize = 6;

/// Language suggested when inserting a code fence.
pub const DEFAULT_FENCE_LANGUAGE: &str = "javascript";

/// Pre-filled value of the link URL prompt.
pub const DEFAULT_LINK_URL: &str = "https://";

static HEADING_PREFIX: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^(#+)\s*").ok());

/// A buffer-mutating editing command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditCommand {
    PromoteHeading,
    Bold,
    Italic,
    Link,
    Image,
    UnorderedList,
    OrderedList,
    CodeFence,
    Quote,
}

impl EditCommand {
    /// Human-readable name, used in warnings.
    pub const fn label(self) -> &'static str {
        match self {
            Self::PromoteHeading => "heading",
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Link => "link",
            Self::Image => "image",
            Self::UnorderedList => "bullet list",
            Self::OrderedList => "numbered list",
            Self::CodeFence => "code block",
            Self::Quote => "quote",
        }
    }

    pub const fn requires_selection(self) -> bool {
        matches!(self, Self::Bold | Self::Italic | Self::Link | Self::Image)
    }

    /// Apply the command to `buffer`, asking `input` for any missing values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PreconditionNotMet`] when a selection is required and
    /// absent, and [`Error::UserAbandoned`] when a required prompt is
    /// cancelled or left empty. The buffer is unchanged in both cases.
    pub fn apply(self, buffer: &mut EditorBuffer, input: &mut dyn InputProvider) -> Result<()> {
        if self.requires_selection() && buffer.selection().is_none() {
            return Err(Error::PreconditionNotMet {
                command: self.label(),
            });
        }

        match self {
            Self::PromoteHeading => promote_heading(buffer),
            Self::Bold => wrap_selection(buffer, "**"),
            Self::Italic => wrap_selection(buffer, "*"),
            Self::Link => insert_link(buffer, input)?,
            Self::Image => insert_image(buffer, input)?,
            Self::UnorderedList => prefix_line(buffer, "- "),
            Self::OrderedList => prefix_line(buffer, "1. "),
            Self::CodeFence => insert_code_fence(buffer, input)?,
            Self::Quote => prefix_line(buffer, "> "),
        }
        Ok(())
    }
}

/// Compute the promoted form of a heading line, or `None` when the line is
/// already at the deepest level.
pub fn promote_heading_line(line: &str) -> Option<String> {
    if !line.starts_with('#') {
        return Some(format!("# {line}"));
    }
    let caps = HEADING_PREFIX.as_ref()?.captures(line)?;
    let hashes = caps.get(1)?.as_str().len();
    if hashes >= MAX_HEADING_LEVEL {
        return None;
    }
    let rest = &line[caps.get(0)?.end()..];
    Some(format!("{} {rest}", "#".repeat(hashes + 1)))
}

fn current_line_range(buffer: &EditorBuffer) -> (Position, Position, String) {
    let line_idx = buffer.cursor().line;
    let line = buffer.line_at(line_idx).unwrap_or_default();
    (
        Position::new(line_idx, 0),
        Position::new(line_idx, line.len()),
        line,
    )
}

fn promote_heading(buffer: &mut EditorBuffer) {
    let (start, end, line) = current_line_range(buffer);
    if let Some(promoted) = promote_heading_line(&line) {
        buffer.replace_range(start, end, &promoted);
    }
}

fn prefix_line(buffer: &mut EditorBuffer, prefix: &str) {
    let (start, end, line) = current_line_range(buffer);
    buffer.replace_range(start, end, &format!("{prefix}{line}"));
}

fn wrap_selection(buffer: &mut EditorBuffer, marker: &str) {
    let text = buffer.selected_text();
    buffer.replace_selection(&format!("{marker}{text}{marker}"));
}

fn insert_link(buffer: &mut EditorBuffer, input: &mut dyn InputProvider) -> Result<()> {
    let text = buffer.selected_text();
    let url = input
        .prompt("Link URL", Some(DEFAULT_LINK_URL))
        .filter(|url| !url.is_empty())
        .ok_or(Error::UserAbandoned)?;
    buffer.replace_selection(&format!("[{text}]({url})"));
    Ok(())
}

fn insert_image(buffer: &mut EditorBuffer, input: &mut dyn InputProvider) -> Result<()> {
    let selection = buffer.selected_text();
    let url = input
        .prompt("Image URL", None)
        .filter(|url| !url.is_empty())
        .ok_or(Error::UserAbandoned)?;
    let alt = input
        .prompt("Image description", Some(&selection))
        .filter(|alt| !alt.is_empty())
        .unwrap_or(selection);
    buffer.replace_selection(&format!("![{alt}]({url})"));
    Ok(())
}

fn insert_code_fence(buffer: &mut EditorBuffer, input: &mut dyn InputProvider) -> Result<()> {
    let language = input
        .prompt(
            "Language (e.g. javascript, python, html)",
            Some(DEFAULT_FENCE_LANGUAGE),
        )
        .ok_or(Error::UserAbandoned)?;
    let at = buffer.cursor().position();
    let fence = format!("```{}\n\n```", language.trim());
    buffer.replace_range(at, at, &fence);
    buffer.move_to(at.line + 1, 0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::input::{Reply, ScriptedInput};

    fn run(cmd: EditCommand, buffer: &mut EditorBuffer, input: &mut ScriptedInput) -> Result<()> {
        cmd.apply(buffer, input)
    }

    fn select(buffer: &mut EditorBuffer, line: usize, from: usize, to: usize) {
        buffer.set_selection(Position::new(line, from), Position::new(line, to));
    }

    // --- Heading promotion ---

    #[test]
    fn test_promote_heading_line_ladder() {
        let mut line = "Title".to_string();
        let expected = [
            "# Title",
            "## Title",
            "### Title",
            "#### Title",
            "##### Title",
            "###### Title",
        ];
        for want in expected {
            line = promote_heading_line(&line).unwrap();
            assert_eq!(line, want);
        }
        assert_eq!(promote_heading_line(&line), None);
    }

    #[test]
    fn test_promote_heading_normalizes_missing_space() {
        assert_eq!(promote_heading_line("#Title").as_deref(), Some("## Title"));
        assert_eq!(promote_heading_line("##   Title").as_deref(), Some("### Title"));
    }

    #[test]
    fn test_promote_heading_beyond_six_hashes_is_noop() {
        assert_eq!(promote_heading_line("####### deep"), None);
    }

    #[test]
    fn test_promote_heading_on_empty_line() {
        assert_eq!(promote_heading_line("").as_deref(), Some("# "));
    }

    #[test]
    fn test_promote_heading_touches_only_cursor_line() {
        let mut buf = EditorBuffer::from_text("intro\nTitle\nbody");
        buf.move_to(1, 2);
        run(EditCommand::PromoteHeading, &mut buf, &mut ScriptedInput::default()).unwrap();
        assert_eq!(buf.text(), "intro\n# Title\nbody");
    }

    #[test]
    fn test_promote_heading_at_six_leaves_buffer_unchanged() {
        let mut buf = EditorBuffer::from_text("###### Title");
        run(EditCommand::PromoteHeading, &mut buf, &mut ScriptedInput::default()).unwrap();
        assert_eq!(buf.text(), "###### Title");
        assert!(!buf.take_change());
    }

    #[test]
    fn test_promote_heading_is_one_undo_step() {
        let mut buf = EditorBuffer::from_text("## Title");
        run(EditCommand::PromoteHeading, &mut buf, &mut ScriptedInput::default()).unwrap();
        assert!(buf.undo());
        assert_eq!(buf.text(), "## Title");
        assert!(!buf.undo());
    }

    // --- Inline style ---

    #[test]
    fn test_bold_wraps_selection() {
        let mut buf = EditorBuffer::from_text("make this bold");
        select(&mut buf, 0, 10, 14);
        run(EditCommand::Bold, &mut buf, &mut ScriptedInput::default()).unwrap();
        assert_eq!(buf.text(), "make this **bold**");
    }

    #[test]
    fn test_italic_wraps_selection() {
        let mut buf = EditorBuffer::from_text("lean");
        buf.select_all();
        run(EditCommand::Italic, &mut buf, &mut ScriptedInput::default()).unwrap();
        assert_eq!(buf.text(), "*lean*");
    }

    #[test]
    fn test_style_without_selection_fails_without_mutation() {
        for cmd in [
            EditCommand::Bold,
            EditCommand::Italic,
            EditCommand::Link,
            EditCommand::Image,
        ] {
            let mut buf = EditorBuffer::from_text("plain");
            let mut input = ScriptedInput::answers(["https://example.com"]);
            let err = run(cmd, &mut buf, &mut input).unwrap_err();
            assert_eq!(
                err,
                Error::PreconditionNotMet {
                    command: cmd.label()
                }
            );
            assert_eq!(buf.text(), "plain");
            assert!(!buf.take_change());
            assert!(input.asked().is_empty(), "{cmd:?} prompted before checking");
        }
    }

    // --- Link ---

    #[test]
    fn test_link_uses_selection_as_text() {
        let mut buf = EditorBuffer::from_text("see docs here");
        select(&mut buf, 0, 4, 8);
        let mut input = ScriptedInput::answers(["https://docs.rs"]);
        run(EditCommand::Link, &mut buf, &mut input).unwrap();
        assert_eq!(buf.text(), "see [docs](https://docs.rs) here");
    }

    #[test]
    fn test_link_cancel_is_abandoned() {
        let mut buf = EditorBuffer::from_text("docs");
        buf.select_all();
        let mut input = ScriptedInput::new([Reply::Cancel]);
        let err = run(EditCommand::Link, &mut buf, &mut input).unwrap_err();
        assert_eq!(err, Error::UserAbandoned);
        assert_eq!(buf.text(), "docs");
    }

    #[test]
    fn test_link_empty_url_is_abandoned() {
        let mut buf = EditorBuffer::from_text("docs");
        buf.select_all();
        let mut input = ScriptedInput::answers([""]);
        assert_eq!(
            run(EditCommand::Link, &mut buf, &mut input),
            Err(Error::UserAbandoned)
        );
        assert_eq!(buf.text(), "docs");
    }

    // --- Image ---

    #[test]
    fn test_image_with_alt() {
        let mut buf = EditorBuffer::from_text("logo");
        buf.select_all();
        let mut input = ScriptedInput::answers(["/logo.png", "Company logo"]);
        run(EditCommand::Image, &mut buf, &mut input).unwrap();
        assert_eq!(buf.text(), "![Company logo](/logo.png)");
    }

    #[test]
    fn test_image_alt_defaults_to_selection() {
        let mut buf = EditorBuffer::from_text("logo");
        buf.select_all();
        let mut input = ScriptedInput::new([Reply::Text("/logo.png".into()), Reply::Cancel]);
        run(EditCommand::Image, &mut buf, &mut input).unwrap();
        assert_eq!(buf.text(), "![logo](/logo.png)");
    }

    #[test]
    fn test_image_without_url_is_abandoned() {
        let mut buf = EditorBuffer::from_text("logo");
        buf.select_all();
        let mut input = ScriptedInput::answers([""]);
        assert_eq!(
            run(EditCommand::Image, &mut buf, &mut input),
            Err(Error::UserAbandoned)
        );
        assert_eq!(buf.text(), "logo");
        assert_eq!(input.asked().len(), 1);
    }

    // --- Line prefixes ---

    #[test]
    fn test_list_and_quote_prefixes() {
        let cases = [
            (EditCommand::UnorderedList, "- item"),
            (EditCommand::OrderedList, "1. item"),
            (EditCommand::Quote, "> item"),
        ];
        for (cmd, want) in cases {
            let mut buf = EditorBuffer::from_text("item");
            run(cmd, &mut buf, &mut ScriptedInput::default()).unwrap();
            assert_eq!(buf.text(), want);
        }
    }

    #[test]
    fn test_prefix_ignores_selection_and_uses_cursor_line() {
        let mut buf = EditorBuffer::from_text("one\ntwo");
        buf.set_selection(Position::new(0, 0), Position::new(1, 1));
        run(EditCommand::Quote, &mut buf, &mut ScriptedInput::default()).unwrap();
        assert_eq!(buf.text(), "one\n> two");
    }

    // --- Code fence ---

    #[test]
    fn test_code_fence_python() {
        let mut buf = EditorBuffer::empty();
        let mut input = ScriptedInput::answers(["python"]);
        run(EditCommand::CodeFence, &mut buf, &mut input).unwrap();
        assert_eq!(buf.text(), "```python\n\n```");
        assert_eq!(buf.cursor().position(), Position::new(1, 0));
        assert_eq!(buf.line_at(1), Some(String::new()));
    }

    #[test]
    fn test_code_fence_default_language() {
        let mut buf = EditorBuffer::empty();
        let mut input = ScriptedInput::new([Reply::AcceptDefault]);
        run(EditCommand::CodeFence, &mut buf, &mut input).unwrap();
        assert_eq!(buf.text(), "```javascript\n\n```");
    }

    #[test]
    fn test_code_fence_empty_language_is_untagged() {
        let mut buf = EditorBuffer::empty();
        let mut input = ScriptedInput::answers([""]);
        run(EditCommand::CodeFence, &mut buf, &mut input).unwrap();
        assert_eq!(buf.text(), "```\n\n```");
    }

    #[test]
    fn test_code_fence_cancel_is_abandoned() {
        let mut buf = EditorBuffer::from_text("text");
        let mut input = ScriptedInput::new([Reply::Cancel]);
        assert_eq!(
            run(EditCommand::CodeFence, &mut buf, &mut input),
            Err(Error::UserAbandoned)
        );
        assert_eq!(buf.text(), "text");
    }

    #[test]
    fn test_code_fence_inserts_at_cursor_mid_document() {
        let mut buf = EditorBuffer::from_text("before\n\nafter");
        buf.move_to(1, 0);
        let mut input = ScriptedInput::answers(["rust"]);
        run(EditCommand::CodeFence, &mut buf, &mut input).unwrap();
        assert_eq!(buf.text(), "before\n```rust\n\n```\nafter");
        assert_eq!(buf.cursor().position(), Position::new(2, 0));
    }
}
