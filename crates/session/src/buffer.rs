//! Editable script buffer.
//!
//! Plain-text editing with a byte cursor, sticky column for vertical moves,
//! and a cached line table used by both cursor movement and rendering.
//! Content loaded from the server is kept byte-for-byte. A `\r\n` pair is
//! one line break for every cursor move and deletion, so the cursor never
//! sits between its two bytes. Typed or pasted line breaks follow the
//! buffer's convention: CRLF once the text holds a CRLF, LF otherwise.

/// Snap a byte position to the nearest char boundary at or before it.
fn snap_to_char_boundary(text: &str, pos: usize) -> usize {
    let mut p = pos.min(text.len());
    while p > 0 && !text.is_char_boundary(p) {
        p -= 1;
    }
    p
}

/// Normalize \r\n and lone \r to `newline`.
fn normalize_newlines<'a>(text: &'a str, newline: &str) -> std::borrow::Cow<'a, str> {
    let has_cr = text.as_bytes().contains(&b'\r');
    if !has_cr && (newline == "\n" || !text.contains('\n')) {
        return text.into();
    }
    let lf = text.replace("\r\n", "\n").replace('\r', "\n");
    if newline == "\n" {
        lf.into()
    } else {
        lf.replace('\n', newline).into()
    }
}

/// True when `pos` falls between the two bytes of a `\r\n` pair.
fn inside_crlf(text: &str, pos: usize) -> bool {
    let bytes = text.as_bytes();
    pos > 0 && pos < bytes.len() && bytes[pos - 1] == b'\r' && bytes[pos] == b'\n'
}

#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    text: String,
    cursor: usize,
    scroll_offset: usize,
    /// Sticky column for up/down navigation (prevents cursor drift through short lines).
    preferred_col: Option<usize>,
    /// Bumped on every mutation; the line table is rebuilt when it falls behind.
    revision: u64,
    lines_revision: Option<u64>,
    /// (line_start_byte, line_end_byte) for each line, excluding the line break.
    line_offsets: Vec<(usize, usize)>,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Replace contents verbatim, cursor to start.
    pub fn set_text(&mut self, text: String) {
        self.text = text;
        self.cursor = 0;
        self.scroll_offset = 0;
        self.preferred_col = None;
        self.touch();
    }

    /// Place the cursor, snapping back onto a char boundary and out of a CRLF pair.
    pub fn set_cursor(&mut self, pos: usize) {
        let mut pos = snap_to_char_boundary(&self.text, pos);
        if inside_crlf(&self.text, pos) {
            pos -= 1;
        }
        self.cursor = pos;
        self.preferred_col = None;
    }

    fn newline(&self) -> &'static str {
        if self.text.contains("\r\n") {
            "\r\n"
        } else {
            "\n"
        }
    }

    /// Insert text at cursor. Line breaks are converted to the buffer's convention.
    pub fn insert(&mut self, text: &str) {
        let text = normalize_newlines(text, self.newline());
        self.text.insert_str(self.cursor, &text);
        self.cursor += text.len();
        self.preferred_col = None;
        self.touch();
    }

    pub fn insert_char(&mut self, c: char) {
        let mut tmp = [0u8; 4];
        self.insert(c.encode_utf8(&mut tmp));
    }

    /// Insert spaces up to the next multiple of `width` columns.
    pub fn insert_tab(&mut self, width: usize) {
        let width = width.max(1);
        let (_, col) = self.cursor_line_col();
        let fill = width - (col % width);
        self.insert(&" ".repeat(fill));
    }

    /// Start of the character (or CRLF pair) before the cursor.
    fn prev_boundary(&self) -> usize {
        if self.text[..self.cursor].ends_with("\r\n") {
            return self.cursor - 2;
        }
        self.text[..self.cursor]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// End of the character (or CRLF pair) at the cursor.
    fn next_boundary(&self) -> usize {
        if self.text[self.cursor..].starts_with("\r\n") {
            return self.cursor + 2;
        }
        self.text[self.cursor..]
            .char_indices()
            .nth(1)
            .map(|(i, _)| self.cursor + i)
            .unwrap_or(self.text.len())
    }

    /// Delete character before cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.prev_boundary();
            self.text.replace_range(prev..self.cursor, "");
            self.cursor = prev;
            self.after_delete();
        }
    }

    /// Delete character at cursor (delete key).
    pub fn delete(&mut self) {
        if self.cursor < self.text.len() {
            let next = self.next_boundary();
            self.text.replace_range(self.cursor..next, "");
            self.after_delete();
        }
    }

    /// Closing the gap can join a lone `\r` and a `\n` into a pair around the cursor.
    fn after_delete(&mut self) {
        if inside_crlf(&self.text, self.cursor) {
            self.cursor -= 1;
        }
        self.preferred_col = None;
        self.touch();
    }

    pub fn cursor_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.prev_boundary();
            self.preferred_col = None;
        }
    }

    pub fn cursor_right(&mut self) {
        if self.cursor < self.text.len() {
            self.cursor = self.next_boundary();
            self.preferred_col = None;
        }
    }

    /// Move cursor to start of current line.
    pub fn cursor_home(&mut self) {
        self.cursor = self.text[..self.cursor]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        self.preferred_col = None;
    }

    /// Move cursor to end of current line, before its line break.
    pub fn cursor_end(&mut self) {
        let mut end = self.text[self.cursor..]
            .find('\n')
            .map(|i| self.cursor + i)
            .unwrap_or(self.text.len());
        if inside_crlf(&self.text, end) {
            end -= 1;
        }
        self.cursor = end.max(self.cursor);
        self.preferred_col = None;
    }

    pub fn cursor_buffer_home(&mut self) {
        self.cursor = 0;
        self.preferred_col = None;
    }

    pub fn cursor_buffer_end(&mut self) {
        self.cursor = self.text.len();
        self.preferred_col = None;
    }

    pub fn cursor_up(&mut self) {
        self.move_lines(-1);
    }

    pub fn cursor_down(&mut self) {
        self.move_lines(1);
    }

    pub fn page_up(&mut self, lines: usize) {
        self.move_lines(-(lines.max(1) as isize));
    }

    pub fn page_down(&mut self, lines: usize) {
        self.move_lines(lines.max(1) as isize);
    }

    /// Move the cursor `delta` lines, clamped to the buffer, keeping the
    /// preferred column across short lines.
    fn move_lines(&mut self, delta: isize) {
        let (current_line, current_col) = self.cursor_line_col();
        let last_line = self.line_offsets().len() - 1;
        let target_line = if delta < 0 {
            current_line.saturating_sub(delta.unsigned_abs())
        } else {
            (current_line + delta as usize).min(last_line)
        };
        if target_line == current_line {
            return;
        }

        let target_col = *self.preferred_col.get_or_insert(current_col);
        let (start, end) = self.line_offsets[target_line];
        let pos = start + target_col.min(end - start);
        self.cursor = snap_to_char_boundary(&self.text, pos);
    }

    /// Adjust scroll_offset so the cursor line is visible within `visible_lines`.
    pub fn ensure_cursor_visible(&mut self, visible_lines: usize) {
        let visible_lines = visible_lines.max(1);
        let (cursor_line, _) = self.cursor_line_col();
        if cursor_line < self.scroll_offset {
            self.scroll_offset = cursor_line;
        } else if cursor_line >= self.scroll_offset + visible_lines {
            self.scroll_offset = cursor_line + 1 - visible_lines;
        }
    }

    /// Line table (start, end byte pairs), rebuilt if the text changed.
    /// `end` stops before the `\r` of a CRLF break.
    pub fn line_offsets(&mut self) -> &[(usize, usize)] {
        if self.lines_revision != Some(self.revision) {
            self.line_offsets.clear();
            let mut start = 0;
            for line in self.text.split('\n') {
                let next = start + line.len() + 1;
                let end = if inside_crlf(&self.text, start + line.len()) {
                    start + line.len() - 1
                } else {
                    start + line.len()
                };
                self.line_offsets.push((start, end));
                start = next;
            }
            self.lines_revision = Some(self.revision);
        }
        &self.line_offsets
    }

    pub fn line_count(&self) -> usize {
        self.text.matches('\n').count() + 1
    }

    /// (line, column) of the cursor, both 0-indexed, column in bytes.
    /// Use [`TextBuffer::cursor_line_prefix`] for display columns.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let before = &self.text[..self.cursor];
        let line = before.matches('\n').count();
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        (line, self.cursor - line_start)
    }

    /// Text between the start of the cursor's line and the cursor.
    pub fn cursor_line_prefix(&self) -> &str {
        let (_, col) = self.cursor_line_col();
        &self.text[self.cursor - col..self.cursor]
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> TextBuffer {
        let mut buf = TextBuffer::new();
        buf.insert(text);
        buf
    }

    #[test]
    fn test_set_text_is_verbatim() {
        let mut buf = TextBuffer::new();
        buf.set_text("echo hi\r\nexit 0\r\n".to_string());
        assert_eq!(buf.text(), "echo hi\r\nexit 0\r\n");
        assert_eq!(buf.cursor(), 0);
        assert_eq!(buf.scroll_offset(), 0);
    }

    #[test]
    fn test_insert_normalizes_pasted_newlines() {
        let buf = buffer("a\r\nb\rc\nd");
        assert_eq!(buf.text(), "a\nb\nc\nd");
        assert_eq!(buf.cursor(), 7);
    }

    #[test]
    fn test_backspace_and_delete() {
        let mut buf = buffer("abc");
        buf.backspace();
        assert_eq!(buf.text(), "ab");
        buf.set_cursor(0);
        buf.backspace();
        assert_eq!(buf.text(), "ab");
        buf.delete();
        assert_eq!(buf.text(), "b");
        buf.cursor_buffer_end();
        buf.delete();
        assert_eq!(buf.text(), "b");
    }

    #[test]
    fn test_multibyte_cursor_moves() {
        let mut buf = buffer("é😀x");
        buf.cursor_left();
        assert_eq!(buf.cursor(), "é😀".len());
        buf.cursor_left();
        assert_eq!(buf.cursor(), "é".len());
        buf.backspace();
        assert_eq!(buf.text(), "😀x");
        buf.set_cursor(2); // inside the emoji
        assert_eq!(buf.cursor(), 0);
    }

    #[test]
    fn test_home_end() {
        let mut buf = buffer("line1\nline2\nline3");
        buf.cursor_home();
        assert_eq!(buf.cursor(), 12);
        buf.cursor_end();
        assert_eq!(buf.cursor(), 17);
        buf.set_cursor(8);
        buf.cursor_home();
        assert_eq!(buf.cursor(), 6);
        buf.cursor_end();
        assert_eq!(buf.cursor(), 11);
    }

    #[test]
    fn test_preferred_col_through_short_line() {
        let mut buf = buffer("longline\na\nlongline");
        assert_eq!(buf.cursor(), 19);
        buf.cursor_up();
        assert_eq!(buf.cursor(), 10);
        buf.cursor_up();
        assert_eq!(buf.cursor(), 8);
        buf.cursor_down();
        buf.cursor_down();
        assert_eq!(buf.cursor(), 19);
    }

    #[test]
    fn test_page_moves_clamp() {
        let mut buf = buffer("0\n1\n2\n3\n4\n5\n6\n7\n8\n9");
        buf.cursor_buffer_home();
        buf.page_down(4);
        assert_eq!(buf.cursor_line_col(), (4, 0));
        buf.page_down(100);
        assert_eq!(buf.cursor_line_col(), (9, 0));
        buf.page_up(100);
        assert_eq!(buf.cursor_line_col(), (0, 0));
    }

    #[test]
    fn test_insert_tab_aligns_to_width() {
        let mut buf = buffer("ab");
        buf.insert_tab(4);
        assert_eq!(buf.text(), "ab  ");
        buf.insert_tab(4);
        assert_eq!(buf.text(), "ab      ");
        buf.insert("\n");
        buf.insert_tab(0);
        assert_eq!(buf.text(), "ab      \n ");
    }

    #[test]
    fn test_ensure_cursor_visible() {
        let mut buf = buffer("a\nb\nc\nd\ne\nf\ng\nh\ni\nj");
        buf.ensure_cursor_visible(3);
        assert_eq!(buf.scroll_offset(), 7);
        buf.cursor_buffer_home();
        buf.ensure_cursor_visible(3);
        assert_eq!(buf.scroll_offset(), 0);
    }

    #[test]
    fn test_line_table_tracks_edits() {
        let mut buf = TextBuffer::new();
        assert_eq!(buf.line_offsets(), &[(0, 0)]);

        buf.insert("echo hi\nexit");
        assert_eq!(buf.line_offsets(), &[(0, 7), (8, 12)]);
        assert_eq!(buf.line_count(), 2);

        buf.insert("\n");
        assert_eq!(buf.line_offsets(), &[(0, 7), (8, 12), (13, 13)]);

        buf.backspace();
        buf.set_cursor(0);
        buf.delete();
        assert_eq!(buf.text(), "cho hi\nexit");
        assert_eq!(buf.line_offsets(), &[(0, 6), (7, 11)]);
    }

    struct Rng(u32);

    impl Rng {
        fn next(&mut self) -> u32 {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 17;
            self.0 ^= self.0 << 5;
            self.0
        }

        fn range(&mut self, max: u32) -> u32 {
            self.next() % max
        }
    }

    fn crlf_buffer() -> TextBuffer {
        let mut buf = TextBuffer::new();
        buf.set_text("echo hi\r\nexit 0\r\n".to_string());
        buf
    }

    #[test]
    fn test_crlf_end_then_type() {
        let mut buf = crlf_buffer();
        buf.cursor_end();
        assert_eq!(buf.cursor(), 7);
        buf.insert_char('!');
        assert_eq!(buf.text(), "echo hi!\r\nexit 0\r\n");
    }

    #[test]
    fn test_crlf_end_then_backspace() {
        let mut buf = crlf_buffer();
        buf.cursor_end();
        buf.backspace();
        assert_eq!(buf.text(), "echo h\r\nexit 0\r\n");
    }

    #[test]
    fn test_crlf_up_down_land_before_cr() {
        let mut buf = crlf_buffer();
        assert_eq!(buf.line_offsets(), &[(0, 7), (9, 15), (17, 17)]);

        buf.cursor_end();
        // "exit 0" is one byte shorter; the cursor stops before its \r
        buf.cursor_down();
        assert_eq!(buf.cursor(), 15);
        assert_eq!(buf.cursor_line_col(), (1, 6));
        buf.cursor_up();
        assert_eq!(buf.cursor(), 7);

        buf.cursor_down();
        buf.insert_char(';');
        assert_eq!(buf.text(), "echo hi\r\nexit 0;\r\n");

        buf.cursor_down();
        assert_eq!(buf.cursor(), buf.len());
        buf.cursor_up();
        assert_eq!(buf.cursor(), 16);
        buf.insert_char('x');
        assert_eq!(buf.text(), "echo hi\r\nexit 0;x\r\n");
    }

    #[test]
    fn test_crlf_is_one_step_for_moves_and_deletes() {
        let mut buf = crlf_buffer();
        buf.set_cursor(7);
        buf.cursor_right();
        assert_eq!(buf.cursor(), 9);
        buf.cursor_left();
        assert_eq!(buf.cursor(), 7);

        buf.delete();
        assert_eq!(buf.text(), "echo hiexit 0\r\n");
        buf.cursor_buffer_end();
        buf.backspace();
        assert_eq!(buf.text(), "echo hiexit 0");
    }

    #[test]
    fn test_crlf_set_cursor_snaps_out_of_pair() {
        let mut buf = crlf_buffer();
        buf.set_cursor(8);
        assert_eq!(buf.cursor(), 7);
        buf.set_cursor(16);
        assert_eq!(buf.cursor(), 15);
    }

    #[test]
    fn test_typed_newline_follows_buffer_convention() {
        let mut buf = crlf_buffer();
        buf.cursor_end();
        buf.insert("\n");
        assert_eq!(buf.text(), "echo hi\r\n\r\nexit 0\r\n");
        buf.insert("a\nb\rc");
        assert_eq!(buf.text(), "echo hi\r\na\r\nb\r\nc\r\nexit 0\r\n");
    }

    #[test]
    fn test_delete_joining_lone_cr_keeps_cursor_outside_pair() {
        let mut buf = TextBuffer::new();
        buf.set_text("a\rb\nc".to_string());
        buf.set_cursor(2);
        buf.delete();
        assert_eq!(buf.text(), "a\r\nc");
        assert_eq!(buf.cursor(), 1);
        assert_eq!(buf.line_offsets(), &[(0, 1), (3, 4)]);
    }

    /// Pseudo-random edits; the line table and cursor stay consistent.
    /// Run once on a typed (LF) buffer and once on loaded CRLF content.
    #[test]
    fn test_fuzz_lite_invariants() {
        let snippets = ["a", "echo", "\n", "  ", "if [ -f x ]; then\n  rm x\nfi", "\r\n", "\r", "\u{00e9}", "\u{1f600}"];
        let mut rng = Rng(0x5EED_1234);

        let mut lf = TextBuffer::new();
        run_steps(&mut rng, &mut lf, &snippets);
        assert!(!lf.text().contains('\r'));

        let mut crlf = TextBuffer::new();
        crlf.set_text("#!/bin/sh\r\nif [ -f x ]; then\r\n  rm x\r\nfi\r\n\u{00e9}\r\n".to_string());
        run_steps(&mut rng, &mut crlf, &snippets);
    }

    fn run_steps(rng: &mut Rng, buf: &mut TextBuffer, snippets: &[&str]) {
        for step in 0..500 {
            match rng.range(11) {
                0 => buf.insert(snippets[rng.range(snippets.len() as u32) as usize]),
                1 => buf.backspace(),
                2 => buf.delete(),
                3 => buf.cursor_left(),
                4 => buf.cursor_right(),
                5 => buf.cursor_up(),
                6 => buf.cursor_down(),
                7 => buf.insert_tab(4),
                8 => buf.cursor_end(),
                9 => buf.cursor_home(),
                _ => {
                    let pos = rng.range(buf.len() as u32 + 1) as usize;
                    buf.set_cursor(pos);
                }
            }

            let text = buf.text().to_string();
            let cursor = buf.cursor();
            let offsets = buf.line_offsets().to_vec();
            assert_eq!(offsets[0].0, 0, "step {step}");
            assert_eq!(offsets.last().unwrap().1, text.len(), "step {step}");
            for (i, &(start, end)) in offsets.iter().enumerate() {
                assert!(!text[start..end].contains('\n'), "step {step}: line {i}");
                if i > 0 {
                    let brk = &text[offsets[i - 1].1..start];
                    assert!(brk == "\n" || brk == "\r\n", "step {step}: line {i} break {brk:?}");
                }
            }
            assert_eq!(offsets.len(), buf.line_count(), "step {step}");
            assert!(text.is_char_boundary(cursor), "step {step}");
            assert!(!inside_crlf(&text, cursor), "step {step}: cursor inside CRLF");
            // editing never leaves a lone \r
            assert!(
                text.match_indices('\r').all(|(i, _)| text[i + 1..].starts_with('\n')),
                "step {step}: lone CR in {text:?}"
            );
        }
    }
}
