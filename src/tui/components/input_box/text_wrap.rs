//! Wrapping math and box dimensions for the draft editor.

use unicode_width::UnicodeWidthStr;

/// Left/right border plus one column of padding on each side.
pub(super) const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top and bottom border.
pub(super) const VERTICAL_OVERHEAD: u16 = 2;
/// Rows shown before the editor scrolls internally.
pub(super) const MAX_VISIBLE_LINES: u16 = 5;
/// Distance from the box edge to the first content cell.
pub(super) const BORDER_OFFSET: u16 = 1;

pub(super) fn wrap_options(inner_width: u16) -> textwrap::Options<'static> {
    textwrap::Options::new(inner_width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

/// Usable columns inside the box, 0 when the area is too narrow.
pub(super) fn inner_width(box_width: u16) -> u16 {
    box_width.saturating_sub(HORIZONTAL_OVERHEAD)
}

/// Rows needed to show `text` at `width`, never less than one.
///
/// A trailing newline opens a fresh row the cursor can sit on, even though
/// textwrap does not always report it.
pub(super) fn wrap_line_count(text: &str, width: u16) -> u16 {
    if width == 0 || text.is_empty() {
        return 1;
    }

    let lines = textwrap::wrap(text, wrap_options(width));
    let mut count = (lines.len() as u16).max(1);
    if text.ends_with('\n') && !lines.last().is_some_and(|l| l.is_empty()) {
        count += 1;
    }
    count
}

/// Terminal columns occupied by `text`. Wide glyphs count double.
pub(super) fn display_width(text: &str) -> u16 {
    text.width().min(u16::MAX as usize) as u16
}

pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map(|c| pos + c.len_utf8())
        .unwrap_or(text.len())
}
