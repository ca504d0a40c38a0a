//! Cursor-addressable multi-line text buffer backing the message editor.
//!
//! Columns are counted in characters, not bytes. Every operation keeps the
//! cursor inside the buffer: motions that would run past an edge stop there
//! and edits at an edge that have nothing to act on are no-ops.
//!
//! A word is a maximal run of non-whitespace characters. Line breaks count as
//! whitespace, so word motions and word deletions cross lines the same way.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Cursor {
    pub line: usize,
    pub column: usize,
}

impl Cursor {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

#[derive(Debug, Clone)]
pub struct EditorBuffer {
    lines: Vec<String>,
    cursor: Cursor,
    revision: u64,
}

impl PartialEq for EditorBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.lines == other.lines && self.cursor == other.cursor
    }
}

impl Eq for EditorBuffer {}

impl Default for EditorBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EditorBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl EditorBuffer {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor: Cursor::default(),
            revision: 0,
        }
    }

    /// Builds a buffer from newline-separated text with the cursor at the end.
    pub fn from_text(text: &str) -> Self {
        let mut buffer = Self::new();
        buffer.set_lines(text.split('\n').map(str::to_string).collect());
        buffer
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Bumped on every content change; cursor motion leaves it alone.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    pub fn current_line(&self) -> &str {
        &self.lines[self.cursor.line]
    }

    fn line_len(&self, line: usize) -> usize {
        self.lines[line].chars().count()
    }

    fn current_line_len(&self) -> usize {
        self.line_len(self.cursor.line)
    }

    /// Character under the cursor, `None` at end of line.
    pub fn char_at_cursor(&self) -> Option<char> {
        self.current_line().chars().nth(self.cursor.column)
    }

    /// Character immediately left of the cursor, `None` at column 0.
    pub fn char_before_cursor(&self) -> Option<char> {
        let column = self.cursor.column.checked_sub(1)?;
        self.current_line().chars().nth(column)
    }

    pub fn cursor_at_eol(&self) -> bool {
        self.cursor.column == self.current_line_len()
    }

    fn at_start(&self) -> bool {
        self.cursor == Cursor::default()
    }

    fn at_end(&self) -> bool {
        self.cursor.line + 1 == self.lines.len() && self.cursor_at_eol()
    }

    /// Places the cursor, clamping both coordinates into the buffer.
    pub fn set_cursor(&mut self, cursor: Cursor) {
        let line = cursor.line.min(self.lines.len() - 1);
        let column = cursor.column.min(self.line_len(line));
        self.cursor = Cursor::new(line, column);
    }

    /// Replaces the whole content. An empty list yields one empty line.
    pub fn set_lines(&mut self, lines: Vec<String>) {
        self.lines = if lines.is_empty() {
            vec![String::new()]
        } else {
            lines
        };
        self.revision += 1;
        let last = self.lines.len() - 1;
        self.cursor = Cursor::new(last, self.line_len(last));
    }

    pub fn clear(&mut self) {
        self.lines = vec![String::new()];
        self.cursor = Cursor::default();
        self.revision += 1;
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' {
            self.break_line();
            return;
        }
        let column = self.cursor.column;
        let line = &mut self.lines[self.cursor.line];
        let byte_idx = char_to_byte_index(line, column);
        line.insert(byte_idx, ch);
        self.cursor.column += 1;
        self.revision += 1;
    }

    /// Inserts text in one step. Embedded newlines split lines.
    pub fn insert_str(&mut self, text: &str) {
        let mut parts = text.split('\n');
        if let Some(first) = parts.next() {
            self.insert_segment(first);
        }
        for part in parts {
            self.break_line();
            self.insert_segment(part);
        }
    }

    fn insert_segment(&mut self, segment: &str) {
        if segment.is_empty() {
            return;
        }
        let column = self.cursor.column;
        let line = &mut self.lines[self.cursor.line];
        let byte_idx = char_to_byte_index(line, column);
        line.insert_str(byte_idx, segment);
        self.cursor.column += segment.chars().count();
        self.revision += 1;
    }

    pub fn break_line(&mut self) {
        let column = self.cursor.column;
        let line = &mut self.lines[self.cursor.line];
        let byte_idx = char_to_byte_index(line, column);
        let rest = line.split_off(byte_idx);
        self.lines.insert(self.cursor.line + 1, rest);
        self.cursor = Cursor::new(self.cursor.line + 1, 0);
        self.revision += 1;
    }

    /// Backspace. At column 0 the line joins the previous one.
    pub fn delete_prev_char(&mut self) {
        if self.at_start() {
            return;
        }
        let end = self.cursor;
        self.move_left();
        let start = self.cursor;
        self.delete_range(start, end);
    }

    /// Forward delete. At end of line the next line joins this one.
    pub fn delete_char(&mut self) {
        if self.at_end() {
            return;
        }
        let start = self.cursor;
        self.move_right();
        let end = self.cursor;
        self.delete_range(start, end);
    }

    pub fn delete_prev_word(&mut self) {
        let end = self.cursor;
        self.move_word_left();
        let start = self.cursor;
        self.delete_range(start, end);
    }

    pub fn delete_word(&mut self) {
        let start = self.cursor;
        self.move_word_right();
        let end = self.cursor;
        self.delete_range(start, end);
    }

    /// Removes everything from the cursor to the end of the line and returns it.
    pub fn kill_to_eol(&mut self) -> String {
        let start = self.cursor;
        let end = Cursor::new(start.line, self.current_line_len());
        self.delete_range(start, end)
    }

    /// Removes everything from the start of the line to the cursor and returns it.
    pub fn kill_to_bol(&mut self) -> String {
        let end = self.cursor;
        let start = Cursor::new(end.line, 0);
        self.delete_range(start, end)
    }

    /// Swaps the characters around the cursor. At end of line the two
    /// characters before the cursor are swapped instead.
    pub fn transpose_chars(&mut self) {
        let column = self.cursor.column;
        let mut chars: Vec<char> = self.current_line().chars().collect();
        if column == 0 || chars.len() < 2 {
            return;
        }
        if column == chars.len() {
            chars.swap(column - 2, column - 1);
        } else {
            chars.swap(column - 1, column);
            self.cursor.column += 1;
        }
        self.lines[self.cursor.line] = chars.into_iter().collect();
        self.revision += 1;
    }

    pub fn move_left(&mut self) {
        if self.cursor.column > 0 {
            self.cursor.column -= 1;
        } else if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.cursor.column = self.current_line_len();
        }
    }

    pub fn move_right(&mut self) {
        if !self.cursor_at_eol() {
            self.cursor.column += 1;
        } else if self.cursor.line + 1 < self.lines.len() {
            self.cursor = Cursor::new(self.cursor.line + 1, 0);
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor.line > 0 {
            self.set_cursor(Cursor::new(self.cursor.line - 1, self.cursor.column));
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor.line + 1 < self.lines.len() {
            self.set_cursor(Cursor::new(self.cursor.line + 1, self.cursor.column));
        }
    }

    pub fn goto_bol(&mut self) {
        self.cursor.column = 0;
    }

    pub fn goto_eol(&mut self) {
        self.cursor.column = self.current_line_len();
    }

    pub fn move_word_left(&mut self) {
        while !self.at_start() && self.char_before_cursor().is_none_or(char::is_whitespace) {
            self.move_left();
        }
        while self.char_before_cursor().is_some_and(|c| !c.is_whitespace()) {
            self.move_left();
        }
    }

    pub fn move_word_right(&mut self) {
        while !self.at_end() && self.char_at_cursor().is_none_or(char::is_whitespace) {
            self.move_right();
        }
        while self.char_at_cursor().is_some_and(|c| !c.is_whitespace()) {
            self.move_right();
        }
    }

    /// Removes the text between two positions (`start <= end`), leaves the
    /// cursor at `start` and returns the removed text.
    fn delete_range(&mut self, start: Cursor, end: Cursor) -> String {
        if start >= end {
            self.set_cursor(start);
            return String::new();
        }

        let start_byte = char_to_byte_index(&self.lines[start.line], start.column);
        let end_byte = char_to_byte_index(&self.lines[end.line], end.column);

        let removed = if start.line == end.line {
            self.lines[start.line]
                .drain(start_byte..end_byte)
                .collect::<String>()
        } else {
            let tail = self.lines[end.line][end_byte..].to_string();
            let mut removed = self.lines[start.line].split_off(start_byte);
            for line in self.lines.drain(start.line + 1..=end.line) {
                removed.push('\n');
                removed.push_str(&line);
            }
            let kept_len = removed.len() - tail.len();
            removed.truncate(kept_len);
            self.lines[start.line].push_str(&tail);
            removed
        };

        self.cursor = start;
        self.revision += 1;
        removed
    }
}

fn char_to_byte_index(input: &str, char_index: usize) -> usize {
    if char_index == 0 {
        return 0;
    }
    input
        .char_indices()
        .nth(char_index)
        .map(|(idx, _)| idx)
        .unwrap_or(input.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_at(text: &str, line: usize, column: usize) -> EditorBuffer {
        let mut buffer = EditorBuffer::from_text(text);
        buffer.set_cursor(Cursor::new(line, column));
        buffer
    }

    #[test]
    fn new_buffer_is_one_empty_line() {
        let buffer = EditorBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.line_count(), 1);
        assert_eq!(buffer.cursor(), Cursor::new(0, 0));
    }

    #[test]
    fn insert_char_tracks_cursor() {
        let mut buffer = EditorBuffer::new();
        for ch in "héllo".chars() {
            buffer.insert_char(ch);
        }
        buffer.move_left();
        buffer.move_left();
        buffer.insert_char('X');
        assert_eq!(buffer.text(), "hélXlo");
        assert_eq!(buffer.cursor(), Cursor::new(0, 4));
    }

    #[test]
    fn insert_str_splits_lines_and_lands_after_text() {
        let mut buffer = buffer_at("ab", 0, 1);
        buffer.insert_str("1\n2\n3");
        assert_eq!(buffer.lines(), ["a1", "2", "3b"]);
        assert_eq!(buffer.cursor(), Cursor::new(2, 1));
    }

    #[test]
    fn delete_prev_char_joins_lines_at_column_zero() {
        let mut buffer = buffer_at("one\ntwo", 1, 0);
        buffer.delete_prev_char();
        assert_eq!(buffer.text(), "onetwo");
        assert_eq!(buffer.cursor(), Cursor::new(0, 3));
    }

    #[test]
    fn deletes_at_edges_are_noops() {
        let mut buffer = buffer_at("abc", 0, 0);
        buffer.delete_prev_char();
        assert_eq!(buffer.text(), "abc");

        buffer.goto_eol();
        buffer.delete_char();
        assert_eq!(buffer.text(), "abc");
        assert_eq!(buffer.cursor(), Cursor::new(0, 3));
    }

    #[test]
    fn motions_clamp_at_buffer_edges() {
        let mut buffer = buffer_at("ab\ncd", 0, 0);
        buffer.move_left();
        assert_eq!(buffer.cursor(), Cursor::new(0, 0));

        buffer.set_cursor(Cursor::new(9, 9));
        assert_eq!(buffer.cursor(), Cursor::new(1, 2));
        buffer.move_right();
        assert_eq!(buffer.cursor(), Cursor::new(1, 2));

        buffer.move_left();
        buffer.move_left();
        buffer.move_left();
        assert_eq!(buffer.cursor(), Cursor::new(0, 2));
    }

    #[test]
    fn vertical_motion_clamps_column() {
        let mut buffer = buffer_at("a long line\nxy", 0, 8);
        buffer.move_down();
        assert_eq!(buffer.cursor(), Cursor::new(1, 2));
        buffer.move_up();
        assert_eq!(buffer.cursor(), Cursor::new(0, 2));
    }

    #[test]
    fn word_motion_treats_non_whitespace_runs_as_words() {
        let mut buffer = buffer_at("foo.bar  baz-qux", 0, 0);
        buffer.move_word_right();
        assert_eq!(buffer.cursor().column, 7);
        buffer.move_word_right();
        assert_eq!(buffer.cursor().column, 16);
        buffer.move_word_left();
        assert_eq!(buffer.cursor().column, 9);
        buffer.move_word_left();
        assert_eq!(buffer.cursor().column, 0);
    }

    #[test]
    fn word_motion_crosses_lines() {
        let mut buffer = buffer_at("alpha\n  beta", 1, 2);
        buffer.move_word_left();
        assert_eq!(buffer.cursor(), Cursor::new(0, 0));
        buffer.move_word_right();
        buffer.move_word_right();
        assert_eq!(buffer.cursor(), Cursor::new(1, 6));
    }

    #[test]
    fn delete_prev_word_matches_word_motion() {
        let mut buffer = buffer_at("send the_file now", 0, 13);
        buffer.delete_prev_word();
        assert_eq!(buffer.text(), "send  now");
        assert_eq!(buffer.cursor().column, 5);
    }

    #[test]
    fn delete_word_removes_leading_space_and_word() {
        let mut buffer = buffer_at("hello big world", 0, 5);
        buffer.delete_word();
        assert_eq!(buffer.text(), "hello world");
        assert_eq!(buffer.cursor().column, 5);
    }

    #[test]
    fn delete_word_spans_line_break() {
        let mut buffer = buffer_at("end\nnext line", 0, 3);
        buffer.delete_word();
        assert_eq!(buffer.text(), "end line");
        assert_eq!(buffer.cursor(), Cursor::new(0, 3));
    }

    #[test]
    fn kill_to_eol_returns_killed_span() {
        let mut buffer = buffer_at("hello world", 0, 5);
        assert_eq!(buffer.kill_to_eol(), " world");
        assert_eq!(buffer.text(), "hello");
        assert_eq!(buffer.cursor().column, 5);
        assert_eq!(buffer.kill_to_eol(), "");
    }

    #[test]
    fn kill_to_bol_moves_cursor_to_line_start() {
        let mut buffer = buffer_at("first\nsecond line", 1, 6);
        assert_eq!(buffer.kill_to_bol(), "second");
        assert_eq!(buffer.lines(), ["first", " line"]);
        assert_eq!(buffer.cursor(), Cursor::new(1, 0));
    }

    #[test]
    fn transpose_swaps_around_cursor_and_advances() {
        let mut buffer = buffer_at("abcd", 0, 1);
        buffer.transpose_chars();
        assert_eq!(buffer.text(), "bacd");
        assert_eq!(buffer.cursor().column, 2);
    }

    #[test]
    fn transpose_at_eol_swaps_last_two() {
        let mut buffer = buffer_at("abcd", 0, 4);
        buffer.transpose_chars();
        assert_eq!(buffer.text(), "abdc");
        assert_eq!(buffer.cursor().column, 4);

        let mut start = buffer_at("abcd", 0, 0);
        start.transpose_chars();
        assert_eq!(start.text(), "abcd");
    }

    #[test]
    fn clear_resets_to_origin() {
        let mut buffer = buffer_at("a\nb\nc", 2, 1);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.cursor(), Cursor::default());
    }

    #[test]
    fn set_lines_with_nothing_keeps_one_line() {
        let mut buffer = EditorBuffer::from_text("x");
        buffer.set_lines(Vec::new());
        assert!(buffer.is_empty());
        assert_eq!(buffer.cursor(), Cursor::default());
    }
}
