use std::collections::VecDeque;

use ropey::Rope;

/// Undo steps kept; older ones are dropped first.
pub const UNDO_DEPTH: usize = 500;

/// A location in the buffer.
///
/// Ordering is line-major, so `a < b` means `a` comes first in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column (byte offset within the line).
    pub col: usize,
}

impl Position {
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// Cursor position in the editor buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column (byte offset within the line).
    pub col: usize,
    /// Remembered column for vertical movement (sticky column).
    col_memory: usize,
}

impl Cursor {
    /// Create a cursor at line 0, column 0.
    pub const fn new() -> Self {
        Self {
            line: 0,
            col: 0,
            col_memory: 0,
        }
    }

    /// Create a cursor at a specific position.
    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            col_memory: col,
        }
    }

    pub const fn position(self) -> Position {
        Position::new(self.line, self.col)
    }

    /// Update column and reset column memory to match.
    const fn set_col(&mut self, col: usize) {
        self.col = col;
        self.col_memory = col;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// An ordered, non-empty text range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone)]
struct Snapshot {
    rope: Rope,
    cursor: Cursor,
}

/// A text buffer backed by a rope data structure.
///
/// Every mutation funnels through [`EditorBuffer::replace_range`], which
/// records one undo step and raises the change notification read by
/// [`EditorBuffer::take_change`]. The selection is the span between an
/// optional anchor and the cursor.
pub struct EditorBuffer {
    rope: Rope,
    cursor: Cursor,
    anchor: Option<Position>,
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
    changed: bool,
    revision: u64,
}

impl EditorBuffer {
    /// Create a new buffer from a string.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::new(),
            anchor: None,
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            changed: false,
            revision: 0,
        }
    }

    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// The current cursor position.
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Number of mutations applied since creation.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns true once per batch of mutations since the last call.
    pub const fn take_change(&mut self) -> bool {
        let changed = self.changed;
        self.changed = false;
        changed
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get the content of a line (without trailing newline).
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let s = self.rope.line(line_idx).to_string();
        Some(s.trim_end_matches('\n').trim_end_matches('\r').to_string())
    }

    /// Length of a line in bytes (without trailing newline).
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.len())
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    // --- Selection ---

    /// The selected range, if the selection is non-empty.
    pub fn selection(&self) -> Option<Selection> {
        let anchor = self.anchor?;
        let head = self.cursor.position();
        if anchor == head {
            return None;
        }
        Some(Selection {
            start: anchor.min(head),
            end: anchor.max(head),
        })
    }

    /// The selected text, empty when nothing is selected.
    pub fn selected_text(&self) -> String {
        let Some(sel) = self.selection() else {
            return String::new();
        };
        let start = self.char_idx(sel.start);
        let end = self.char_idx(sel.end);
        self.rope.slice(start..end).to_string()
    }

    /// Select from `anchor` to `head`, leaving the cursor at `head`.
    pub fn set_selection(&mut self, anchor: Position, head: Position) {
        let anchor = self.clamp(anchor);
        let head = self.clamp(head);
        self.anchor = Some(anchor);
        self.cursor = Cursor::at(head.line, head.col);
    }

    pub const fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// Select the whole buffer.
    pub fn select_all(&mut self) {
        let last = self.line_count().saturating_sub(1);
        self.set_selection(Position::default(), Position::new(last, self.line_len(last)));
    }

    // --- Mutation ---

    /// Replace the text between `from` and `to` with `text`.
    ///
    /// Positions before the range are untouched, positions inside it move
    /// to the end of the inserted text, positions after it shift with the
    /// edit. Returns the end of the inserted text.
    pub fn replace_range(&mut self, from: Position, to: Position, text: &str) -> Position {
        let start = self.clamp(from.min(to));
        let old_end = self.clamp(from.max(to));
        if start == old_end && text.is_empty() {
            return start;
        }

        self.push_undo();
        let start_idx = self.char_idx(start);
        let end_idx = self.char_idx(old_end);
        self.rope.remove(start_idx..end_idx);
        self.rope.insert(start_idx, text);

        let new_end = end_of_insert(start, text);
        let head = map_position(self.cursor.position(), start, old_end, new_end);
        self.cursor = Cursor::at(head.line, head.col);
        self.anchor = self
            .anchor
            .map(|anchor| map_position(anchor, start, old_end, new_end))
            .filter(|anchor| *anchor != head);
        self.note_change();
        new_end
    }

    /// Replace the selection (or insert at the cursor) and collapse the
    /// selection after the inserted text.
    pub fn replace_selection(&mut self, text: &str) {
        let (from, to) = self.selection().map_or_else(
            || (self.cursor.position(), self.cursor.position()),
            |sel| (sel.start, sel.end),
        );
        let end = self.replace_range(from, to, text);
        self.anchor = None;
        self.cursor = Cursor::at(end.line, end.col);
    }

    /// Replace the whole content, putting the cursor at the start.
    pub fn set_text(&mut self, text: &str) {
        let last = self.line_count().saturating_sub(1);
        let end = Position::new(last, self.line_len(last));
        if self.rope.len_chars() == 0 && text.is_empty() {
            return;
        }
        self.replace_range(Position::default(), end, text);
        self.anchor = None;
        self.cursor = Cursor::new();
    }

    /// Insert a character at the cursor position.
    pub fn insert_char(&mut self, ch: char) {
        let mut tmp = [0u8; 4];
        self.replace_selection(ch.encode_utf8(&mut tmp));
    }

    /// Insert a string at the cursor position.
    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() && self.selection().is_none() {
            return;
        }
        self.replace_selection(s);
    }

    /// Split the current line at the cursor (Enter key).
    pub fn split_line(&mut self) {
        self.replace_selection("\n");
    }

    /// Delete the selection or the character before the cursor (Backspace).
    ///
    /// Returns `true` if anything was deleted.
    pub fn delete_back(&mut self) -> bool {
        if self.selection().is_some() {
            self.replace_selection("");
            return true;
        }
        let here = self.cursor.position();
        let prev = if here.col > 0 {
            let line = self.line_at(here.line).unwrap_or_default();
            let before = &line[..here.col.min(line.len())];
            let prev_char_len = before.chars().next_back().map_or(1, char::len_utf8);
            Position::new(here.line, here.col - prev_char_len)
        } else if here.line > 0 {
            Position::new(here.line - 1, self.line_len(here.line - 1))
        } else {
            return false;
        };
        self.replace_range(prev, here, "");
        self.anchor = None;
        true
    }

    /// Delete the selection or the character at the cursor (Delete key).
    ///
    /// Returns `true` if anything was deleted.
    pub fn delete_forward(&mut self) -> bool {
        if self.selection().is_some() {
            self.replace_selection("");
            return true;
        }
        let here = self.cursor.position();
        let line_len = self.line_len(here.line);
        let next = if here.col < line_len {
            let line = self.line_at(here.line).unwrap_or_default();
            let next_char_len = line[here.col..].chars().next().map_or(1, char::len_utf8);
            Position::new(here.line, here.col + next_char_len)
        } else if here.line + 1 < self.line_count() {
            Position::new(here.line + 1, 0)
        } else {
            return false;
        };
        self.replace_range(here, next, "");
        self.anchor = None;
        true
    }

    /// Restore the content before the last mutation.
    pub fn undo(&mut self) -> bool {
        let Some(prev) = self.undo_stack.pop_back() else {
            return false;
        };
        self.redo_stack.push(Snapshot {
            rope: self.rope.clone(),
            cursor: self.cursor,
        });
        self.restore(prev);
        true
    }

    /// Re-apply the last undone mutation.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push_back(Snapshot {
            rope: self.rope.clone(),
            cursor: self.cursor,
        });
        self.restore(next);
        true
    }

    // --- Movement ---

    /// Move the cursor in the given direction, dropping any selection.
    pub fn move_cursor(&mut self, direction: Direction) {
        self.anchor = None;
        self.step(direction);
    }

    /// Move the cursor while keeping (or starting) a selection.
    pub fn extend_selection(&mut self, direction: Direction) {
        if self.anchor.is_none() {
            self.anchor = Some(self.cursor.position());
        }
        self.step(direction);
    }

    /// Move cursor to the beginning of the line (Home).
    pub const fn move_home(&mut self) {
        self.anchor = None;
        self.cursor.set_col(0);
    }

    /// Move cursor to the end of the line (End).
    pub fn move_end(&mut self) {
        self.anchor = None;
        let len = self.line_len(self.cursor.line);
        self.cursor.set_col(len);
    }

    /// Move cursor one word to the left (Ctrl+Left).
    pub fn move_word_left(&mut self) {
        self.anchor = None;
        if self.cursor.col == 0 {
            if self.cursor.line > 0 {
                self.cursor.line -= 1;
                self.cursor.set_col(self.line_len(self.cursor.line));
            }
            return;
        }

        let line = self.line_at(self.cursor.line).unwrap_or_default();
        let trimmed = line[..self.cursor.col.min(line.len())].trim_end();
        let pos = trimmed
            .rfind(|c: char| !c.is_alphanumeric() && c != '_')
            .map_or(0, |i| i + 1);
        self.cursor.set_col(pos);
    }

    /// Move cursor one word to the right (Ctrl+Right).
    pub fn move_word_right(&mut self) {
        self.anchor = None;
        let line_len = self.line_len(self.cursor.line);
        if self.cursor.col >= line_len {
            if self.cursor.line + 1 < self.line_count() {
                self.cursor.line += 1;
                self.cursor.set_col(0);
            }
            return;
        }

        let line = self.line_at(self.cursor.line).unwrap_or_default();
        let after = &line[self.cursor.col..];
        let word_end = after
            .find(|c: char| !c.is_alphanumeric() && c != '_')
            .unwrap_or(after.len());
        let rest = &after[word_end..];
        let space_end = rest
            .find(|c: char| c.is_alphanumeric() || c == '_')
            .unwrap_or(rest.len());
        self.cursor.set_col(self.cursor.col + word_end + space_end);
    }

    /// Move cursor to a specific line and column, dropping any selection.
    pub fn move_to(&mut self, line: usize, col: usize) {
        self.anchor = None;
        let pos = self.clamp(Position::new(line, col));
        self.cursor = Cursor::at(pos.line, pos.col);
    }

    /// Move cursor to the start of the buffer (Ctrl+Home).
    pub const fn move_to_start(&mut self) {
        self.anchor = None;
        self.cursor = Cursor::new();
    }

    /// Move cursor to the end of the buffer (Ctrl+End).
    pub fn move_to_end(&mut self) {
        let last_line = self.line_count().saturating_sub(1);
        self.move_to(last_line, self.line_len(last_line));
    }

    // --- Private helpers ---

    fn push_undo(&mut self) {
        if self.undo_stack.len() == UNDO_DEPTH {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(Snapshot {
            rope: self.rope.clone(),
            cursor: self.cursor,
        });
        self.redo_stack.clear();
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.rope = snapshot.rope;
        let pos = self.clamp(snapshot.cursor.position());
        self.cursor = Cursor::at(pos.line, pos.col);
        self.anchor = None;
        self.note_change();
    }

    const fn note_change(&mut self) {
        self.changed = true;
        self.revision += 1;
    }

    /// Clamp a position to an existing line and a column inside it.
    fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.line_count().saturating_sub(1));
        let text = self.line_at(line).unwrap_or_default();
        let mut col = pos.col.min(text.len());
        while !text.is_char_boundary(col) {
            col -= 1;
        }
        Position::new(line, col)
    }

    /// Convert a position to a ropey char index.
    fn char_idx(&self, pos: Position) -> usize {
        let pos = self.clamp(pos);
        let line_start = self.rope.line_to_char(pos.line);
        let line = self.rope.line(pos.line);
        line_start + line.byte_to_char(pos.col.min(line.len_bytes()))
    }

    fn step(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.step_left(),
            Direction::Right => self.step_right(),
            Direction::Up => self.step_up(),
            Direction::Down => self.step_down(),
        }
    }

    fn step_left(&mut self) {
        if self.cursor.col > 0 {
            let line = self.line_at(self.cursor.line).unwrap_or_default();
            let before = &line[..self.cursor.col.min(line.len())];
            let prev_char_len = before.chars().next_back().map_or(1, char::len_utf8);
            self.cursor.set_col(self.cursor.col - prev_char_len);
        } else if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.cursor.set_col(self.line_len(self.cursor.line));
        }
    }

    fn step_right(&mut self) {
        let line_len = self.line_len(self.cursor.line);
        if self.cursor.col < line_len {
            let line = self.line_at(self.cursor.line).unwrap_or_default();
            let next_char_len = line[self.cursor.col..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
            self.cursor.set_col(self.cursor.col + next_char_len);
        } else if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            self.cursor.set_col(0);
        }
    }

    fn step_up(&mut self) {
        if self.cursor.line > 0 {
            self.cursor.line -= 1;
            let target = Position::new(self.cursor.line, self.cursor.col_memory);
            self.cursor.col = self.clamp(target).col;
        }
    }

    fn step_down(&mut self) {
        if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            let target = Position::new(self.cursor.line, self.cursor.col_memory);
            self.cursor.col = self.clamp(target).col;
        }
    }
}

fn end_of_insert(start: Position, text: &str) -> Position {
    match text.rfind('\n') {
        None => Position::new(start.line, start.col + text.len()),
        Some(idx) => Position::new(
            start.line + text.matches('\n').count(),
            text.len() - idx - 1,
        ),
    }
}

fn map_position(pos: Position, start: Position, old_end: Position, new_end: Position) -> Position {
    if pos < start {
        pos
    } else if pos <= old_end {
        new_end
    } else if pos.line == old_end.line {
        Position::new(new_end.line, new_end.col + (pos.col - old_end.col))
    } else {
        Position::new(pos.line - old_end.line + new_end.line, pos.col)
    }
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("cursor", &self.cursor)
            .field("anchor", &self.anchor)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- Construction and basic queries ---

    #[test]
    fn test_empty_buffer_has_one_line() {
        let buf = EditorBuffer::empty();
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line_at(0), Some(String::new()));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_from_text_trailing_newline() {
        let buf = EditorBuffer::from_text("hello\n");
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line_at(0), Some("hello".to_string()));
        assert_eq!(buf.line_at(1), Some(String::new()));
    }

    #[test]
    fn test_line_at_out_of_bounds_returns_none() {
        let buf = EditorBuffer::from_text("hello");
        assert_eq!(buf.line_at(1), None);
    }

    // --- Change notification ---

    #[test]
    fn test_new_buffer_has_no_pending_change() {
        let mut buf = EditorBuffer::from_text("hello");
        assert!(!buf.take_change());
        assert_eq!(buf.revision(), 0);
    }

    #[test]
    fn test_mutation_raises_change_once() {
        let mut buf = EditorBuffer::from_text("hello");
        buf.insert_char('!');
        assert!(buf.take_change());
        assert!(!buf.take_change());
        assert_eq!(buf.revision(), 1);
    }

    #[test]
    fn test_cursor_movement_is_not_a_change() {
        let mut buf = EditorBuffer::from_text("hello\nworld");
        buf.move_cursor(Direction::Down);
        buf.extend_selection(Direction::Right);
        assert!(!buf.take_change());
    }

    // --- Range replacement ---

    #[test]
    fn test_replace_range_inside_line() {
        let mut buf = EditorBuffer::from_text("hello world");
        let end = buf.replace_range(Position::new(0, 6), Position::new(0, 11), "there");
        assert_eq!(buf.text(), "hello there");
        assert_eq!(end, Position::new(0, 11));
    }

    #[test]
    fn test_replace_range_accepts_reversed_endpoints() {
        let mut buf = EditorBuffer::from_text("abcdef");
        buf.replace_range(Position::new(0, 4), Position::new(0, 2), "X");
        assert_eq!(buf.text(), "abXef");
    }

    #[test]
    fn test_replace_range_clamps_out_of_bounds() {
        let mut buf = EditorBuffer::from_text("abc");
        buf.replace_range(Position::new(0, 1), Position::new(9, 99), "Z");
        assert_eq!(buf.text(), "aZ");
    }

    #[test]
    fn test_cursor_before_range_is_untouched() {
        let mut buf = EditorBuffer::from_text("one\ntwo");
        buf.replace_range(Position::new(1, 0), Position::new(1, 3), "three");
        assert_eq!(buf.cursor(), Cursor::at(0, 0));
    }

    #[test]
    fn test_cursor_inside_range_moves_to_insert_end() {
        let mut buf = EditorBuffer::from_text("hello");
        buf.move_to(0, 3);
        buf.replace_range(Position::new(0, 0), Position::new(0, 5), "- hello");
        assert_eq!(buf.cursor(), Cursor::at(0, 7));
    }

    #[test]
    fn test_cursor_after_range_shifts_on_same_line() {
        let mut buf = EditorBuffer::from_text("ab cd");
        buf.move_to(0, 4);
        buf.replace_range(Position::new(0, 0), Position::new(0, 2), "xyz");
        assert_eq!(buf.text(), "xyz cd");
        assert_eq!(buf.cursor(), Cursor::at(0, 5));
    }

    #[test]
    fn test_cursor_after_multiline_insert_shifts_lines() {
        let mut buf = EditorBuffer::from_text("a\nb");
        buf.move_to(1, 1);
        buf.replace_range(Position::new(0, 0), Position::new(0, 0), "x\ny\n");
        assert_eq!(buf.text(), "x\ny\na\nb");
        assert_eq!(buf.cursor(), Cursor::at(3, 1));
    }

    #[test]
    fn test_empty_replace_of_empty_range_is_noop() {
        let mut buf = EditorBuffer::from_text("abc");
        buf.replace_range(Position::new(0, 1), Position::new(0, 1), "");
        assert!(!buf.take_change());
    }

    // --- Selection ---

    #[test]
    fn test_selection_is_ordered() {
        let mut buf = EditorBuffer::from_text("hello world");
        buf.set_selection(Position::new(0, 11), Position::new(0, 6));
        let sel = buf.selection().unwrap();
        assert_eq!(sel.start, Position::new(0, 6));
        assert_eq!(sel.end, Position::new(0, 11));
        assert_eq!(buf.selected_text(), "world");
    }

    #[test]
    fn test_collapsed_selection_is_none() {
        let mut buf = EditorBuffer::from_text("hello");
        buf.set_selection(Position::new(0, 2), Position::new(0, 2));
        assert!(buf.selection().is_none());
        assert_eq!(buf.selected_text(), "");
    }

    #[test]
    fn test_replace_selection_collapses_after_text() {
        let mut buf = EditorBuffer::from_text("make bold now");
        buf.set_selection(Position::new(0, 5), Position::new(0, 9));
        buf.replace_selection("**bold**");
        assert_eq!(buf.text(), "make **bold** now");
        assert!(buf.selection().is_none());
        assert_eq!(buf.cursor(), Cursor::at(0, 13));
    }

    #[test]
    fn test_extend_selection_across_lines() {
        let mut buf = EditorBuffer::from_text("ab\ncd");
        buf.move_to(0, 1);
        buf.extend_selection(Direction::Down);
        assert_eq!(buf.selected_text(), "b\nc");
    }

    #[test]
    fn test_typing_replaces_selection() {
        let mut buf = EditorBuffer::from_text("hello");
        buf.select_all();
        buf.insert_char('x');
        assert_eq!(buf.text(), "x");
    }

    #[test]
    fn test_backspace_deletes_selection() {
        let mut buf = EditorBuffer::from_text("hello world");
        buf.set_selection(Position::new(0, 5), Position::new(0, 11));
        assert!(buf.delete_back());
        assert_eq!(buf.text(), "hello");
    }

    // --- Character insertion and deletion ---

    #[test]
    fn test_insert_char_advances_cursor() {
        let mut buf = EditorBuffer::from_text("hllo");
        buf.move_cursor(Direction::Right);
        buf.insert_char('e');
        assert_eq!(buf.line_at(0), Some("hello".to_string()));
        assert_eq!(buf.cursor(), Cursor::at(0, 2));
    }

    #[test]
    fn test_insert_multibyte_char() {
        let mut buf = EditorBuffer::from_text("caf");
        buf.move_end();
        buf.insert_char('é');
        assert_eq!(buf.text(), "café");
        assert_eq!(buf.cursor().col, 5);
    }

    #[test]
    fn test_split_line_in_middle() {
        let mut buf = EditorBuffer::from_text("hello world");
        buf.move_to(0, 5);
        buf.split_line();
        assert_eq!(buf.line_at(0), Some("hello".to_string()));
        assert_eq!(buf.line_at(1), Some(" world".to_string()));
        assert_eq!(buf.cursor(), Cursor::at(1, 0));
    }

    #[test]
    fn test_delete_back_at_start_is_noop() {
        let mut buf = EditorBuffer::from_text("hello");
        assert!(!buf.delete_back());
        assert!(!buf.take_change());
    }

    #[test]
    fn test_delete_back_joins_lines() {
        let mut buf = EditorBuffer::from_text("hello\nworld");
        buf.move_to(1, 0);
        buf.delete_back();
        assert_eq!(buf.text(), "helloworld");
        assert_eq!(buf.cursor(), Cursor::at(0, 5));
    }

    #[test]
    fn test_delete_back_multibyte() {
        let mut buf = EditorBuffer::from_text("café");
        buf.move_end();
        buf.delete_back();
        assert_eq!(buf.text(), "caf");
    }

    #[test]
    fn test_delete_forward_joins_lines() {
        let mut buf = EditorBuffer::from_text("hello\nworld");
        buf.move_to(0, 5);
        buf.delete_forward();
        assert_eq!(buf.text(), "helloworld");
        assert_eq!(buf.cursor(), Cursor::at(0, 5));
    }

    #[test]
    fn test_delete_forward_at_end_is_noop() {
        let mut buf = EditorBuffer::from_text("hello");
        buf.move_end();
        assert!(!buf.delete_forward());
    }

    // --- Undo / redo ---

    #[test]
    fn test_undo_restores_previous_text_and_cursor() {
        let mut buf = EditorBuffer::from_text("title");
        buf.replace_range(Position::new(0, 0), Position::new(0, 5), "# title");
        assert!(buf.undo());
        assert_eq!(buf.text(), "title");
        assert_eq!(buf.cursor(), Cursor::at(0, 0));
        assert!(buf.redo());
        assert_eq!(buf.text(), "# title");
    }

    #[test]
    fn test_undo_raises_change() {
        let mut buf = EditorBuffer::from_text("a");
        buf.insert_char('b');
        buf.take_change();
        buf.undo();
        assert!(buf.take_change());
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut buf = EditorBuffer::from_text("a");
        buf.insert_char('b');
        buf.undo();
        buf.insert_char('c');
        assert!(!buf.redo());
        assert_eq!(buf.text(), "ca");
    }

    #[test]
    fn test_undo_history_is_bounded() {
        let mut buf = EditorBuffer::empty();
        for _ in 0..UNDO_DEPTH + 20 {
            buf.insert_char('x');
        }
        let mut undone = 0;
        while buf.undo() {
            undone += 1;
        }
        assert_eq!(undone, UNDO_DEPTH);
        assert_eq!(buf.text(), "x".repeat(20));
    }

    #[test]
    fn test_undo_on_fresh_buffer_is_noop() {
        let mut buf = EditorBuffer::from_text("a");
        assert!(!buf.undo());
    }

    #[test]
    fn test_set_text_replaces_everything_and_resets_cursor() {
        let mut buf = EditorBuffer::from_text("old\ncontent");
        buf.move_to_end();
        buf.set_text("new");
        assert_eq!(buf.text(), "new");
        assert_eq!(buf.cursor(), Cursor::at(0, 0));
        assert!(buf.undo());
        assert_eq!(buf.text(), "old\ncontent");
    }

    // --- Cursor movement ---

    #[test]
    fn test_move_left_wraps_to_prev_line() {
        let mut buf = EditorBuffer::from_text("hello\nworld");
        buf.move_to(1, 0);
        buf.move_cursor(Direction::Left);
        assert_eq!(buf.cursor(), Cursor::at(0, 5));
    }

    #[test]
    fn test_move_right_wraps_to_next_line() {
        let mut buf = EditorBuffer::from_text("hello\nworld");
        buf.move_to(0, 5);
        buf.move_cursor(Direction::Right);
        assert_eq!(buf.cursor(), Cursor::at(1, 0));
    }

    #[test]
    fn test_column_memory_across_short_line() {
        let mut buf = EditorBuffer::from_text("hello\nhi\nworld");
        buf.move_to(0, 4);
        buf.move_cursor(Direction::Down);
        assert_eq!(buf.cursor().col, 2);
        buf.move_cursor(Direction::Down);
        assert_eq!(buf.cursor().line, 2);
        assert_eq!(buf.cursor().col, 4);
    }

    #[test]
    fn test_vertical_move_snaps_to_char_boundary() {
        let mut buf = EditorBuffer::from_text("abc\né");
        buf.move_to(0, 1);
        buf.move_cursor(Direction::Down);
        assert_eq!(buf.cursor().col, 0);
    }

    #[test]
    fn test_move_word_left_and_right() {
        let mut buf = EditorBuffer::from_text("hello world");
        buf.move_word_right();
        assert_eq!(buf.cursor().col, 6);
        buf.move_to(0, 8);
        buf.move_word_left();
        assert_eq!(buf.cursor().col, 6);
    }

    #[test]
    fn test_move_to_clamps() {
        let mut buf = EditorBuffer::from_text("hello");
        buf.move_to(100, 100);
        assert_eq!(buf.cursor(), Cursor::at(0, 5));
    }

    #[test]
    fn test_move_to_end() {
        let mut buf = EditorBuffer::from_text("hello\nworld");
        buf.move_to_end();
        assert_eq!(buf.cursor(), Cursor::at(1, 5));
    }

    #[test]
    fn test_plain_move_drops_selection() {
        let mut buf = EditorBuffer::from_text("hello");
        buf.extend_selection(Direction::Right);
        assert!(buf.selection().is_some());
        buf.move_cursor(Direction::Right);
        assert!(buf.selection().is_none());
    }
}
