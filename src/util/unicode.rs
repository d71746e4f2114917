//! Terminal-cell arithmetic for the editor fields and list rows.
//! Offsets are byte offsets into `&str`; columns are terminal cells.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const TAB_WIDTH: usize = 4;

fn is_blank(g: &str) -> bool {
    g.chars().all(char::is_whitespace)
}

fn grapheme_width(g: &str) -> usize {
    if g == "\t" {
        TAB_WIDTH
    } else {
        UnicodeWidthStr::width(g)
    }
}

/// Display width in terminal cells. Tabs count as 4 cells.
pub fn display_width(s: &str) -> usize {
    s.split('\t')
        .enumerate()
        .map(|(i, part)| {
            let w = UnicodeWidthStr::width(part);
            if i > 0 { w + TAB_WIDTH } else { w }
        })
        .sum()
}

/// Cut `s` to `max_cells`, ending in `…` when anything was dropped
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 0 {
        return String::new();
    }
    let budget = max_cells - 1;
    let mut width = 0;
    let mut result = String::new();
    for g in s.graphemes(true) {
        width += grapheme_width(g);
        if width > budget {
            break;
        }
        result.push_str(g);
    }
    result.push('\u{2026}');
    result
}

/// Offset of the grapheme after the one at `byte_offset`; None at the end
pub fn next_grapheme_boundary(s: &str, byte_offset: usize) -> Option<usize> {
    let g = s.get(byte_offset..)?.graphemes(true).next()?;
    Some(byte_offset + g.len())
}

/// Offset of the grapheme before `byte_offset`; None at the start
pub fn prev_grapheme_boundary(s: &str, byte_offset: usize) -> Option<usize> {
    let g = s.get(..byte_offset)?.graphemes(true).next_back()?;
    Some(byte_offset - g.len())
}

pub fn byte_offset_to_display_col(s: &str, byte_offset: usize) -> usize {
    display_width(&s[..byte_offset.min(s.len())])
}

/// Byte offset of the grapheme covering `target_col`. Lands on the start of a
/// wide character; `s.len()` past the end.
pub fn display_col_to_byte_offset(s: &str, target_col: usize) -> usize {
    let mut col = 0;
    for (i, g) in s.grapheme_indices(true) {
        col += grapheme_width(g);
        if col > target_col {
            return i;
        }
    }
    s.len()
}

/// Start of the word before `byte_offset` (whitespace-delimited)
pub fn word_boundary_left(s: &str, byte_offset: usize) -> usize {
    let graphemes: Vec<(usize, &str)> = s[..byte_offset].grapheme_indices(true).collect();
    let mut idx = graphemes.len();
    while idx > 0 && is_blank(graphemes[idx - 1].1) {
        idx -= 1;
    }
    while idx > 0 && !is_blank(graphemes[idx - 1].1) {
        idx -= 1;
    }
    graphemes.get(idx).map_or(0, |(i, _)| *i)
}

/// Start of the next word after `byte_offset` (whitespace-delimited)
pub fn word_boundary_right(s: &str, byte_offset: usize) -> usize {
    let mut graphemes = s[byte_offset.min(s.len())..].grapheme_indices(true).peekable();
    while graphemes.next_if(|(_, g)| !is_blank(g)).is_some() {}
    while graphemes.next_if(|(_, g)| is_blank(g)).is_some() {}
    graphemes
        .peek()
        .map_or(s.len(), |(i, _)| byte_offset + i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_counts_cells() {
        assert_eq!(display_width("hello"), 5);
        assert_eq!(display_width("你好"), 4);
        assert_eq!(display_width("cafe\u{0301}"), 4);
        assert_eq!(display_width("a\tb"), 6);
        assert_eq!(display_width("\u{2500}\u{2502}"), 2);
    }

    #[test]
    fn truncation_marks_the_cut() {
        assert_eq!(truncate_to_width("hi", 10), "hi");
        assert_eq!(truncate_to_width("hello", 5), "hello");
        assert_eq!(truncate_to_width("hello world", 8), "hello w\u{2026}");
        assert_eq!(truncate_to_width("你好世界", 5), "你好\u{2026}");
        assert_eq!(truncate_to_width("你好世界", 4), "你\u{2026}");
        assert_eq!(truncate_to_width("hello", 1), "\u{2026}");
        assert_eq!(truncate_to_width("hello", 0), "");
    }

    #[test]
    fn grapheme_steps() {
        assert_eq!(next_grapheme_boundary("hello", 4), Some(5));
        assert_eq!(next_grapheme_boundary("hello", 5), None);
        assert_eq!(prev_grapheme_boundary("hello", 1), Some(0));
        assert_eq!(prev_grapheme_boundary("hello", 0), None);

        let s = "cafe\u{0301}!";
        assert_eq!(next_grapheme_boundary(s, 3), Some(6));
        assert_eq!(prev_grapheme_boundary(s, 6), Some(3));

        let family = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}";
        assert_eq!(next_grapheme_boundary(family, 0), Some(family.len()));
    }

    #[test]
    fn columns_and_offsets() {
        assert_eq!(byte_offset_to_display_col("你好", 3), 2);
        assert_eq!(byte_offset_to_display_col("hi", 9), 2);
        assert_eq!(display_col_to_byte_offset("你好", 2), 3);
        // Inside a wide character snaps to its start
        assert_eq!(display_col_to_byte_offset("你好", 1), 0);
        assert_eq!(display_col_to_byte_offset("hi", 10), 2);
    }

    #[test]
    fn word_jumps() {
        let s = "fix  #42 now";
        assert_eq!(word_boundary_left(s, s.len()), 9);
        assert_eq!(word_boundary_left(s, 9), 5);
        assert_eq!(word_boundary_left(s, 3), 0);
        assert_eq!(word_boundary_left(s, 0), 0);
        assert_eq!(word_boundary_right(s, 0), 5);
        assert_eq!(word_boundary_right(s, 5), 9);
        assert_eq!(word_boundary_right(s, 9), s.len());
        assert_eq!(word_boundary_right("hello 你好", 0), 6);
    }
}
