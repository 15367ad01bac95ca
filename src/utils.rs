pub mod markdown;

pub use markdown::render_markdown;

use ratatui::text::Text;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Shorten `s` to at most `max_len` characters, ending in "..." when cut.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Single-line or multi-line text field with a byte-offset cursor that
/// always sits on a char boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    pub fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.len();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn insert(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        self.value.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    pub fn backspace(&mut self) {
        if let Some(c) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
            self.value.remove(self.cursor);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.len() {
            self.value.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        if let Some(c) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.value[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
}

/// Visual lines as ratatui `Wrap { trim: true }` would lay them out.
/// Returns (line_text, start_byte, end_byte) per line.
fn simulate_wrapped_lines(text: &str, max_width: usize) -> Vec<(String, usize, usize)> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut width = 0;
    let mut start = 0;

    for (idx, ch) in text.char_indices() {
        if ch == '\n' {
            lines.push((current.trim_end().to_string(), start, idx));
            current.clear();
            width = 0;
            start = idx + 1;
            continue;
        }
        let ch_width = ch.width().unwrap_or(1);
        if width + ch_width > max_width && width > 0 {
            lines.push((current.trim_end().to_string(), start, idx));
            current = ch.to_string();
            width = ch_width;
            start = idx;
        } else {
            current.push(ch);
            width += ch_width;
        }
    }

    if !current.is_empty() || text.ends_with('\n') {
        lines.push((current.trim_end().to_string(), start, text.len()));
    }
    lines
}

/// (line, column) of a byte cursor within wrapped text.
pub fn calculate_wrapped_cursor_position(
    text: &str,
    cursor_index: usize,
    max_width: usize,
) -> (usize, usize) {
    if text.is_empty() || cursor_index == 0 || max_width == 0 {
        return (0, 0);
    }

    let wrapped = simulate_wrapped_lines(text, max_width);
    for (line_idx, (_, start, end)) in wrapped.iter().enumerate() {
        if cursor_index >= *start && cursor_index <= *end {
            let column = text
                .get(*start..cursor_index)
                .map(UnicodeWidthStr::width)
                .unwrap_or(0);
            return (line_idx, column);
        }
    }

    match wrapped.last() {
        Some((last_text, _, _)) => (wrapped.len() - 1, last_text.width()),
        None => (0, 0),
    }
}

/// Rows `text` occupies when wrapped to `width` columns.
pub fn estimate_text_height(text: &Text<'_>, width: usize) -> usize {
    if width == 0 {
        return text.lines.len();
    }
    text.lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum()
}

pub fn calculate_max_scroll(content_height: usize, visible_height: usize) -> u16 {
    content_height
        .saturating_sub(visible_height)
        .min(u16::MAX as usize) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::text::Line;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Short string", 20), "Short string");
        assert_eq!(
            truncate_string("This is a very long string that should be truncated", 20),
            "This is a very lo..."
        );
        assert_eq!(truncate_string("", 20), "");
    }

    #[test]
    fn test_truncate_string_multibyte() {
        assert_eq!(truncate_string("Ünïcödé everywhere", 8), "Ünïcö...");
    }

    #[test]
    fn test_text_input_editing() {
        let mut input = TextInput::default();
        for c in "Algbra".chars() {
            input.insert(c);
        }
        input.move_left();
        input.move_left();
        input.move_left();
        input.insert('e');
        assert_eq!(input.value(), "Algebra");

        input.end();
        input.backspace();
        assert_eq!(input.value(), "Algebr");
        input.home();
        input.delete();
        assert_eq!(input.value(), "lgebr");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_text_input_multibyte_cursor() {
        let mut input = TextInput::with_value("né");
        input.backspace();
        assert_eq!(input.value(), "n");
        input.insert('ö');
        input.move_left();
        input.move_right();
        assert_eq!(input.cursor(), "nö".len());
    }

    #[test]
    fn test_cursor_position_single_line() {
        assert_eq!(calculate_wrapped_cursor_position("", 0, 10), (0, 0));
        assert_eq!(calculate_wrapped_cursor_position("Hello", 3, 10), (0, 3));
        assert_eq!(calculate_wrapped_cursor_position("Hi", 10, 10), (0, 2));
    }

    #[test]
    fn test_cursor_position_wraps() {
        let text = "This is a long line that should wrap";
        assert_eq!(calculate_wrapped_cursor_position(text, 15, 10), (1, 5));

        let boundary = "0123456789A";
        assert_eq!(calculate_wrapped_cursor_position(boundary, 10, 10), (0, 10));
        assert_eq!(calculate_wrapped_cursor_position(boundary, 11, 10), (1, 1));
    }

    #[test]
    fn test_cursor_position_with_newlines() {
        let lines = simulate_wrapped_lines("Line 1\nLine 2\nLine 3", 20);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2].0, "Line 3");
        assert_eq!(
            calculate_wrapped_cursor_position("Line 1\nLine 2", 8, 20),
            (1, 1)
        );
    }

    #[test]
    fn test_text_height_and_scroll() {
        let text = Text::from(vec![
            Line::from("a".repeat(25)),
            Line::from(""),
            Line::from("short"),
        ]);
        assert_eq!(estimate_text_height(&text, 10), 5);
        assert_eq!(calculate_max_scroll(5, 3), 2);
        assert_eq!(calculate_max_scroll(2, 3), 0);
    }
}
