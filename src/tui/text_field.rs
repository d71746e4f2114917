use crate::util::unicode;

/// An editable string with a byte-offset cursor that always sits on a
/// grapheme boundary. Newlines are only inserted by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    text: String,
    cursor: usize,
}

impl TextField {
    /// A field holding `text` with the cursor at the end
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        TextField { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the contents and move the cursor to the end
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.len();
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = unicode::prev_grapheme_boundary(&self.text, self.cursor) {
            self.text.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if let Some(next) = unicode::next_grapheme_boundary(&self.text, self.cursor) {
            self.text.replace_range(self.cursor..next, "");
        }
    }

    /// Ctrl+W: delete back to the previous word start
    pub fn delete_word_back(&mut self) {
        let start = unicode::word_boundary_left(&self.text, self.cursor);
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = unicode::prev_grapheme_boundary(&self.text, self.cursor) {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = unicode::next_grapheme_boundary(&self.text, self.cursor) {
            self.cursor = next;
        }
    }

    pub fn word_left(&mut self) {
        self.cursor = unicode::word_boundary_left(&self.text, self.cursor);
    }

    pub fn word_right(&mut self) {
        self.cursor = unicode::word_boundary_right(&self.text, self.cursor);
    }

    /// Start of the current line
    pub fn home(&mut self) {
        self.cursor = self.line_start(self.cursor);
    }

    /// End of the current line
    pub fn end(&mut self) {
        self.cursor = self.line_end(self.cursor);
    }

    /// Move to the previous line, keeping the display column where possible.
    /// Returns false on the first line.
    pub fn move_up(&mut self) -> bool {
        let start = self.line_start(self.cursor);
        if start == 0 {
            return false;
        }
        let col = unicode::byte_offset_to_display_col(&self.text[start..], self.cursor - start);
        let prev_start = self.line_start(start - 1);
        let prev_line = &self.text[prev_start..start - 1];
        self.cursor = prev_start + unicode::display_col_to_byte_offset(prev_line, col);
        true
    }

    /// Move to the next line, keeping the display column where possible.
    /// Returns false on the last line.
    pub fn move_down(&mut self) -> bool {
        let end = self.line_end(self.cursor);
        if end == self.text.len() {
            return false;
        }
        let start = self.line_start(self.cursor);
        let col = unicode::byte_offset_to_display_col(&self.text[start..], self.cursor - start);
        let next_start = end + 1;
        let next_end = self.line_end(next_start);
        let next_line = &self.text[next_start..next_end];
        self.cursor = next_start + unicode::display_col_to_byte_offset(next_line, col);
        true
    }

    /// Zero-based line index and display column of the cursor
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let before = &self.text[..self.cursor];
        let line = before.matches('\n').count();
        let start = self.line_start(self.cursor);
        (line, unicode::display_width(&self.text[start..self.cursor]))
    }

    fn line_start(&self, offset: usize) -> usize {
        self.text[..offset].rfind('\n').map_or(0, |i| i + 1)
    }

    fn line_end(&self, offset: usize) -> usize {
        self.text[offset..]
            .find('\n')
            .map_or(self.text.len(), |i| offset + i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_delete_at_cursor() {
        let mut field = TextField::new("hello");
        field.move_left();
        field.insert_char('X');
        assert_eq!(field.text(), "hellXo");
        field.backspace();
        field.delete();
        assert_eq!(field.text(), "hell");
        field.home();
        field.insert_str(">> ");
        assert_eq!(field.text(), ">> hell");
        assert_eq!(field.cursor(), 3);
    }

    #[test]
    fn grapheme_aware_editing() {
        let mut field = TextField::new("caf\u{e9}\u{1F600}");
        field.backspace();
        assert_eq!(field.text(), "caf\u{e9}");
        field.move_left();
        field.delete();
        assert_eq!(field.text(), "caf");
    }

    #[test]
    fn delete_word_back() {
        let mut field = TextField::new("fix the parser");
        field.delete_word_back();
        assert_eq!(field.text(), "fix the ");
        field.delete_word_back();
        assert_eq!(field.text(), "fix ");
    }

    #[test]
    fn vertical_movement_keeps_column() {
        let mut field = TextField::new("first line\nab\nthird line");
        assert_eq!(field.cursor_line_col(), (2, 10));
        assert!(field.move_up());
        assert_eq!(field.cursor_line_col(), (1, 2));
        assert!(field.move_up());
        assert_eq!(field.cursor_line_col(), (0, 2));
        assert!(!field.move_up());
        field.end();
        assert!(field.move_down());
        assert_eq!(field.cursor_line_col(), (1, 2));
        assert!(field.move_down());
        assert!(!field.move_down());
    }

    #[test]
    fn home_and_end_are_line_relative() {
        let mut field = TextField::new("one\ntwo");
        field.home();
        assert_eq!(field.cursor(), 4);
        field.move_left();
        field.home();
        assert_eq!(field.cursor(), 0);
        field.end();
        assert_eq!(field.cursor(), 3);
    }
}
