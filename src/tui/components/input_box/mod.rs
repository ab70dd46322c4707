//! # InputBox Component
//!
//! The draft editor. Owns the text being typed and the cursor; the
//! application's copy of the draft is kept in sync through
//! `InputEvent::Changed`.
//!
//! ## Props
//!
//! - `disabled`: set while a turn is in flight. Edits are ignored and the
//!   box is drawn dimmed, like a disabled form field.
//! - `can_submit`: whether the send affordance is lit.
//!
//! Submit does not clear the buffer. The app decides whether the submit was
//! admitted and the parent pushes the resulting draft back via `set_text`.

mod cursor;
mod text_wrap;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use cursor::{CursorState, wrapped_rows};
use text_wrap::{
    MAX_VISIBLE_LINES, VERTICAL_OVERHEAD, inner_width, next_char_boundary, prev_char_boundary,
    wrap_line_count,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// The buffer changed; carries the full new text.
    Changed(String),
    /// Enter was pressed.
    Submit,
    /// Only the cursor moved.
    CursorMoved,
}

pub struct InputBox {
    buffer: String,
    cursor: CursorState,
    pub disabled: bool,
    pub can_submit: bool,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: CursorState::new(),
            disabled: false,
            can_submit: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Replace the buffer (e.g. after the app consumed the draft).
    pub fn set_text(&mut self, text: &str) {
        self.buffer = text.to_string();
        self.cursor.move_to_end(&self.buffer);
    }

    /// Rows the box needs for the current buffer, borders included.
    pub fn calculate_height(&self, box_width: u16) -> u16 {
        let rows = wrap_line_count(&self.buffer, inner_width(box_width));
        rows.min(MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    fn visible_text(&self, box_width: u16) -> String {
        let rows = wrapped_rows(&self.buffer, inner_width(box_width));
        let start = (self.cursor.scroll_offset as usize).min(rows.len());
        let end = (start + MAX_VISIBLE_LINES as usize).min(rows.len());
        rows[start..end]
            .iter()
            .map(|r| &self.buffer[r.clone()])
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_scrollbar(&self, frame: &mut Frame, area: Rect) {
        let total = wrap_line_count(&self.buffer, inner_width(area.width));
        if total <= MAX_VISIBLE_LINES {
            return;
        }

        let mut state = ScrollbarState::default()
            .content_length(total.saturating_sub(MAX_VISIBLE_LINES) as usize)
            .position(self.cursor.scroll_offset as usize);
        let track = Rect {
            x: area.x + area.width.saturating_sub(1),
            y: area.y + 1,
            width: 1,
            height: area.height.saturating_sub(2),
        };
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            track,
            &mut state,
        );
    }

    fn edited(&self) -> Option<InputEvent> {
        Some(InputEvent::Changed(self.buffer.clone()))
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.cursor.last_box_width = area.width;
        self.cursor.update_scroll_offset(&self.buffer, area.width);

        let (text_style, border_style) = if self.disabled {
            let dim = Style::default().fg(Color::DarkGray);
            (dim, dim)
        } else {
            (Style::default().fg(Color::Green), Style::default())
        };

        let send_style = if self.can_submit {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(if self.disabled { "Message (waiting for reply)" } else { "Message" })
            .title_bottom(Line::from(Span::styled(" Send ⏎ ", send_style)).right_aligned());

        let input = Paragraph::new(self.visible_text(area.width))
            .block(block)
            .style(text_style);
        frame.render_widget(input, area);
        self.render_scrollbar(frame, area);

        if !self.disabled {
            frame.set_cursor_position(self.cursor.screen_pos(&self.buffer, area));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if matches!(event, TuiEvent::Submit) {
            return Some(InputEvent::Submit);
        }
        if self.disabled {
            return None;
        }

        let pos = self.cursor.pos;
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(pos, *c);
                self.cursor.pos += c.len_utf8();
                self.edited()
            }
            TuiEvent::Paste(text) => {
                // Normalise CRLF so pasted text matches typed newlines.
                let text = text.replace("\r\n", "\n");
                self.buffer.insert_str(pos, &text);
                self.cursor.pos += text.len();
                self.edited()
            }
            TuiEvent::Backspace if pos > 0 => {
                let prev = prev_char_boundary(&self.buffer, pos);
                self.buffer.drain(prev..pos);
                self.cursor.pos = prev;
                self.edited()
            }
            TuiEvent::Delete if pos < self.buffer.len() => {
                let next = next_char_boundary(&self.buffer, pos);
                self.buffer.drain(pos..next);
                self.edited()
            }
            TuiEvent::CursorLeft if pos > 0 => {
                self.cursor.pos = prev_char_boundary(&self.buffer, pos);
                Some(InputEvent::CursorMoved)
            }
            TuiEvent::CursorRight if pos < self.buffer.len() => {
                self.cursor.pos = next_char_boundary(&self.buffer, pos);
                Some(InputEvent::CursorMoved)
            }
            TuiEvent::CursorHome => {
                let start = self.buffer[..pos].rfind('\n').map_or(0, |i| i + 1);
                self.cursor.pos = start;
                (start != pos).then_some(InputEvent::CursorMoved)
            }
            TuiEvent::CursorEnd => {
                let end = self.buffer[pos..]
                    .find('\n')
                    .map_or(self.buffer.len(), |i| pos + i);
                self.cursor.pos = end;
                (end != pos).then_some(InputEvent::CursorMoved)
            }
            TuiEvent::CursorUp | TuiEvent::CursorDown => {
                let direction = if matches!(event, TuiEvent::CursorUp) { -1 } else { 1 };
                let width = self.cursor.last_box_width;
                self.cursor
                    .move_vertically(&self.buffer, direction, width)
                    .then_some(InputEvent::CursorMoved)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn type_str(input: &mut InputBox, s: &str) {
        for c in s.chars() {
            input.handle_event(&TuiEvent::InputChar(c));
        }
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn typing_reports_the_whole_buffer() {
        let mut input = InputBox::new();
        assert_eq!(
            input.handle_event(&TuiEvent::InputChar('o')),
            Some(InputEvent::Changed("o".to_string()))
        );
        assert_eq!(
            input.handle_event(&TuiEvent::InputChar('i')),
            Some(InputEvent::Changed("oi".to_string()))
        );
        assert_eq!(
            input.handle_event(&TuiEvent::Backspace),
            Some(InputEvent::Changed("o".to_string()))
        );
    }

    #[test]
    fn submit_leaves_the_buffer_to_the_parent() {
        let mut input = InputBox::new();
        type_str(&mut input, "status of pump 3?");
        assert_eq!(input.handle_event(&TuiEvent::Submit), Some(InputEvent::Submit));
        assert_eq!(input.text(), "status of pump 3?");

        input.set_text("");
        assert_eq!(input.text(), "");
        assert_eq!(
            input.handle_event(&TuiEvent::InputChar('x')),
            Some(InputEvent::Changed("x".to_string()))
        );
    }

    #[test]
    fn disabled_box_ignores_edits_but_reports_submit() {
        let mut input = InputBox::new();
        type_str(&mut input, "draft");
        input.disabled = true;

        assert_eq!(input.handle_event(&TuiEvent::InputChar('!')), None);
        assert_eq!(input.handle_event(&TuiEvent::Backspace), None);
        assert_eq!(input.handle_event(&TuiEvent::Paste("more".into())), None);
        assert_eq!(input.text(), "draft");
        assert_eq!(input.handle_event(&TuiEvent::Submit), Some(InputEvent::Submit));
    }

    #[test]
    fn newline_is_just_another_character() {
        let mut input = InputBox::new();
        type_str(&mut input, "line one\nline two");
        assert_eq!(input.text(), "line one\nline two");
    }

    #[test]
    fn paste_normalises_crlf() {
        let mut input = InputBox::new();
        input.handle_event(&TuiEvent::Paste("a\r\nb".into()));
        assert_eq!(input.text(), "a\nb");
    }

    #[test]
    fn editing_in_the_middle_of_multibyte_text() {
        let mut input = InputBox::new();
        type_str(&mut input, "não");
        input.handle_event(&TuiEvent::CursorLeft);
        input.handle_event(&TuiEvent::CursorLeft);
        input.handle_event(&TuiEvent::Backspace);
        assert_eq!(input.text(), "ão");
        input.handle_event(&TuiEvent::Delete);
        assert_eq!(input.text(), "o");
    }

    #[test]
    fn home_and_end_stay_on_the_current_line() {
        let mut input = InputBox::new();
        type_str(&mut input, "ab\ncd");
        assert_eq!(input.handle_event(&TuiEvent::CursorHome), Some(InputEvent::CursorMoved));
        input.handle_event(&TuiEvent::InputChar('>'));
        assert_eq!(input.text(), "ab\n>cd");
        assert_eq!(input.handle_event(&TuiEvent::CursorEnd), Some(InputEvent::CursorMoved));
        assert_eq!(input.handle_event(&TuiEvent::CursorEnd), None);
    }

    #[test]
    fn height_grows_with_lines_up_to_the_cap() {
        let mut input = InputBox::new();
        assert_eq!(input.calculate_height(40), 3);
        input.set_text("1\n2\n3");
        assert_eq!(input.calculate_height(40), 5);
        input.set_text("1\n2\n3\n4\n5\n6\n7\n8");
        assert_eq!(input.calculate_height(40), MAX_VISIBLE_LINES + VERTICAL_OVERHEAD);
    }

    #[test]
    fn render_marks_disabled_state() {
        let mut terminal = Terminal::new(TestBackend::new(50, 3)).unwrap();
        let mut input = InputBox::new();
        input.set_text("hello");
        input.disabled = true;

        terminal.draw(|f| input.render(f, f.area())).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("waiting for reply"));
        assert!(text.contains("hello"));
    }
}
