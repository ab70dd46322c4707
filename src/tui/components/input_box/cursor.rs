//! Cursor placement inside the wrapped draft.
//!
//! The cursor is a byte offset into the draft. Everything visual (row,
//! column, scroll) is derived from the wrapped layout on demand, so the
//! draft can be replaced wholesale without the cursor going stale beyond
//! a clamp.

use std::ops::Range;

use ratatui::layout::Rect;

use super::text_wrap::{
    BORDER_OFFSET, MAX_VISIBLE_LINES, display_width, inner_width, wrap_options,
};

pub(super) struct CursorState {
    /// Byte offset into the draft, always on a char boundary.
    pub pos: usize,
    /// First visible wrapped row.
    pub scroll_offset: u16,
    /// Box width at the last render, used for Up/Down between frames.
    pub last_box_width: u16,
}

impl CursorState {
    const DEFAULT_WIDTH: u16 = 80;

    pub fn new() -> Self {
        Self {
            pos: 0,
            scroll_offset: 0,
            last_box_width: Self::DEFAULT_WIDTH,
        }
    }

    /// Park the cursor at the end of a freshly replaced draft.
    pub fn move_to_end(&mut self, buffer: &str) {
        self.pos = buffer.len();
        self.scroll_offset = 0;
    }

    /// Move one wrapped row up (`-1`) or down (`1`), keeping the display
    /// column where the target row is long enough.
    ///
    /// Returns `false` at the first or last row.
    pub fn move_vertically(&mut self, buffer: &str, direction: i16, box_width: u16) -> bool {
        let rows = wrapped_rows(buffer, inner_width(box_width));
        let current = row_of(&rows, self.pos);
        let target = match direction.signum() {
            -1 if current > 0 => current - 1,
            1 if current + 1 < rows.len() => current + 1,
            _ => return false,
        };

        let column = display_width(&buffer[rows[current].start..self.pos]);
        self.pos = offset_at_column(buffer, rows[target].clone(), column);
        true
    }

    /// Wrapped row (0-based) the cursor sits on.
    pub fn row(&self, buffer: &str, box_width: u16) -> u16 {
        let rows = wrapped_rows(buffer, inner_width(box_width));
        row_of(&rows, self.pos) as u16
    }

    /// Scroll just enough to keep the cursor row visible.
    pub fn update_scroll_offset(&mut self, buffer: &str, box_width: u16) {
        let rows = wrapped_rows(buffer, inner_width(box_width));
        if rows.len() as u16 <= MAX_VISIBLE_LINES {
            self.scroll_offset = 0;
            return;
        }

        let row = row_of(&rows, self.pos) as u16;
        if row < self.scroll_offset {
            self.scroll_offset = row;
        } else if row >= self.scroll_offset + MAX_VISIBLE_LINES {
            self.scroll_offset = row + 1 - MAX_VISIBLE_LINES;
        }
    }

    /// Terminal cell for the cursor given the box's area.
    pub fn screen_pos(&self, buffer: &str, area: Rect) -> (u16, u16) {
        let width = inner_width(area.width);
        let origin = (area.x + BORDER_OFFSET, area.y + BORDER_OFFSET);
        if width == 0 {
            return origin;
        }

        let rows = wrapped_rows(buffer, width);
        let row = row_of(&rows, self.pos);
        let column = display_width(&buffer[rows[row].start..self.pos]).min(width);
        let visible_row = (row as u16).saturating_sub(self.scroll_offset);

        (origin.0 + column, origin.1 + visible_row)
    }
}

/// Byte ranges of each wrapped row, in order. Never empty.
///
/// Separators that textwrap drops at a soft break (spaces) and the `\n`
/// ending a hard break belong to no row.
pub(super) fn wrapped_rows(buffer: &str, width: u16) -> Vec<Range<usize>> {
    if width == 0 || buffer.is_empty() {
        return vec![0..buffer.len()];
    }

    let mut rows = Vec::new();
    let mut offset = 0;
    for line in textwrap::wrap(buffer, wrap_options(width)) {
        let end = (offset + line.len()).min(buffer.len());
        rows.push(offset..end);
        offset = end;
        while buffer[offset..].starts_with(' ') {
            offset += 1;
        }
        if buffer[offset..].starts_with('\n') {
            offset += 1;
        }
    }

    if buffer.ends_with('\n') && rows.last().is_none_or(|r| r.end < buffer.len()) {
        rows.push(buffer.len()..buffer.len());
    }
    if rows.is_empty() {
        rows.push(0..buffer.len());
    }
    rows
}

/// Index of the row containing `pos`. A position between rows belongs to
/// the later one.
fn row_of(rows: &[Range<usize>], pos: usize) -> usize {
    rows.iter().rposition(|r| r.start <= pos).unwrap_or(0)
}

/// Byte offset in `row` whose display column is closest to `column`
/// without passing it.
fn offset_at_column(buffer: &str, row: Range<usize>, column: u16) -> usize {
    let mut used = 0u16;
    for (i, c) in buffer[row.clone()].char_indices() {
        let w = display_width(c.encode_utf8(&mut [0; 4]));
        if used + w > column {
            return row.start + i;
        }
        used += w;
    }
    row.end
}

#[cfg(test)]
mod tests {
    use super::*;

    // Box width 14 leaves 10 usable columns.
    const BOX: u16 = 14;

    #[test]
    fn rows_split_on_newlines_and_soft_breaks() {
        let text = "first line\nsecond one here";
        let rows = wrapped_rows(text, inner_width(BOX));
        let slices: Vec<&str> = rows.iter().map(|r| &text[r.clone()]).collect();
        assert_eq!(slices, vec!["first line", "second one", "here"]);
    }

    #[test]
    fn trailing_newline_has_its_own_row() {
        let text = "ask\n";
        let rows = wrapped_rows(text, inner_width(BOX));
        assert_eq!(rows.len(), 2);
        assert_eq!(row_of(&rows, text.len()), 1);
    }

    #[test]
    fn vertical_moves_keep_column_and_stop_at_edges() {
        let text = "abcdef\nxy\nlonger row";
        let mut cursor = CursorState::new();
        cursor.pos = 4; // after "abcd"

        assert!(!cursor.move_vertically(text, -1, BOX));
        assert!(cursor.move_vertically(text, 1, BOX));
        assert_eq!(cursor.pos, 9, "clamped to the end of \"xy\"");
        assert!(cursor.move_vertically(text, 1, BOX));
        assert_eq!(&text[..cursor.pos], "abcdef\nxy\nlo");
        assert!(!cursor.move_vertically(text, 1, BOX));
    }

    #[test]
    fn screen_column_counts_wide_glyphs() {
        let text = "日本";
        let mut cursor = CursorState::new();
        cursor.pos = text.len();
        let area = Rect::new(0, 0, BOX, 3);
        assert_eq!(cursor.screen_pos(text, area), (5, 1));
    }

    #[test]
    fn scroll_follows_cursor_past_visible_rows() {
        let text = "1\n2\n3\n4\n5\n6\n7";
        let mut cursor = CursorState::new();
        cursor.move_to_end(text);
        cursor.update_scroll_offset(text, BOX);
        assert_eq!(cursor.row(text, BOX), 6);
        assert_eq!(cursor.scroll_offset, 2);

        cursor.pos = 0;
        cursor.update_scroll_offset(text, BOX);
        assert_eq!(cursor.scroll_offset, 0);
    }
}
