//! # MessageList Component
//!
//! Scrollable view of the conversation.
//!
//! `MessageList` is transient (built each frame) and wraps a persistent
//! `&mut MessageListState` plus the conversation as props. Heights are
//! cached: the thread is append-only, so a cached height stays valid until
//! the width changes.
//!
//! While a turn is in flight a "Processing..." row with a spinner is drawn
//! below the last message.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::config::ReplyRendering;
use crate::core::state::Message;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::MessageView;
use crate::tui::event::TuiEvent;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
/// Blank row above the indicator plus the indicator itself.
const PROCESSING_ROW_HEIGHT: u16 = 2;

pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// Follow new content at the bottom.
    pub stick_to_bottom: bool,
    /// Viewport height at the last render, for clamping between frames.
    pub viewport_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            viewport_height: 0,
        }
    }

    fn max_offset(&self) -> u16 {
        self.layout.total_height().saturating_sub(self.viewport_height)
    }

    /// Keep the offset inside the content.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position { x: current.x, y: max_y });
        }
    }

    /// Re-attach to the bottom once the user scrolls all the way down.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position { x: current.x, y: max_y });
        }
    }
}

pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub messages: &'a [Message],
    pub rendering: ReplyRendering,
    pub is_busy: bool,
    pub spinner_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        messages: &'a [Message],
        rendering: ReplyRendering,
        is_busy: bool,
        spinner_frame: usize,
    ) -> Self {
        Self {
            state,
            messages,
            rendering,
            is_busy,
            spinner_frame,
        }
    }

    fn processing_line(&self) -> Line<'static> {
        let glyph = SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()];
        Line::from(vec![
            Span::styled(format!("{glyph} "), Style::default().fg(Color::Yellow)),
            Span::styled(
                "Processing...",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ),
        ])
    }
}

impl Component for MessageList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        // One column is kept free for the scrollbar.
        let content_width = area.width.saturating_sub(1);
        let rendering = self.rendering;

        let layout = &mut self.state.layout;
        let reusable = layout.reusable_count(self.messages.len(), content_width);
        layout.heights.truncate(reusable);
        for message in self.messages.iter().skip(layout.heights.len()) {
            let height = MessageView::new(message, rendering).calculate_height(content_width);
            layout.heights.push(height);
        }
        layout.rebuild_prefix_heights();
        layout.content_width = content_width;

        let messages_height = layout.total_height();
        let canvas_height = if self.is_busy {
            messages_height.saturating_add(PROCESSING_ROW_HEIGHT)
        } else {
            messages_height
        };

        self.state.viewport_height = area.height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let scroll_offset = self.state.scroll_state.offset().y;
        let visible = self.state.layout.visible_range(scroll_offset, area.height);

        let mut scroll_view = ScrollView::new(Size::new(content_width, canvas_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y = self.state.layout.top_of(visible.start);
        for i in visible {
            let height = self.state.layout.heights[i];
            let view = MessageView::new(&self.messages[i], rendering);
            scroll_view.render_widget(view, Rect::new(0, y, content_width, height));
            y = y.saturating_add(height);
        }

        if self.is_busy {
            let row = Rect::new(0, messages_height.saturating_add(1), content_width, 1);
            scroll_view.render_widget(Paragraph::new(self.processing_line()), row);
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

/// Per-message heights at one width.
pub struct LayoutCache {
    pub heights: Vec<u16>,
    /// Running sums: `prefix_heights[i]` is the bottom edge of message `i`.
    pub prefix_heights: Vec<u16>,
    content_width: u16,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            content_width: 0,
        }
    }

    /// How many cached heights are still valid for `message_count`
    /// messages at `content_width`.
    pub fn reusable_count(&self, message_count: usize, content_width: u16) -> usize {
        if self.content_width != content_width {
            return 0;
        }
        self.heights.len().min(message_count)
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    /// Top edge of message `index`.
    pub fn top_of(&self, index: usize) -> u16 {
        match index {
            0 => 0,
            i => self.prefix_heights.get(i - 1).copied().unwrap_or_else(|| self.total_height()),
        }
    }

    /// Messages intersecting the viewport, padded by half a screen either
    /// side so fast scrolling does not expose blank rows.
    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let pad = viewport_height / 2;
        let from = scroll_offset.saturating_sub(pad);
        let to = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(pad);

        let start = self.prefix_heights.partition_point(|&end| end <= from);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < to)
            .saturating_add(1)
            .min(self.prefix_heights.len());
        start..end.max(start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn cache_with(heights: &[u16], width: u16) -> LayoutCache {
        let mut cache = LayoutCache::new();
        cache.heights = heights.to_vec();
        cache.content_width = width;
        cache.rebuild_prefix_heights();
        cache
    }

    fn render(
        state: &mut MessageListState,
        messages: &[Message],
        busy: bool,
        width: u16,
        height: u16,
    ) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| {
                MessageList::new(state, messages, ReplyRendering::PlainText, busy, 0)
                    .render(f, f.area())
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn cached_heights_survive_appends_but_not_resizes() {
        let cache = cache_with(&[3, 4, 3], 80);
        assert_eq!(cache.reusable_count(3, 80), 3);
        assert_eq!(cache.reusable_count(5, 80), 3);
        assert_eq!(cache.reusable_count(3, 60), 0);
        assert_eq!(cache.reusable_count(1, 80), 1);
    }

    #[test]
    fn prefix_heights_give_edges() {
        let cache = cache_with(&[3, 4, 3], 80);
        assert_eq!(cache.prefix_heights, vec![3, 7, 10]);
        assert_eq!(cache.total_height(), 10);
        assert_eq!(cache.top_of(0), 0);
        assert_eq!(cache.top_of(2), 7);
    }

    #[test]
    fn visible_range_covers_viewport() {
        let cache = cache_with(&[5; 20], 80);
        let range = cache.visible_range(50, 10);
        // rows 45..65 with padding: messages 9 through 13
        assert_eq!(range, 9..13);
        assert_eq!(LayoutCache::new().visible_range(0, 10), 0..0);
    }

    #[test]
    fn scrolling_up_detaches_and_scrolling_to_end_repins() {
        let mut state = MessageListState::new();
        state.layout = cache_with(&[10, 10, 10], 79);
        state.viewport_height = 10;
        state.scroll_state.set_offset(Position { x: 0, y: 20 });

        state.handle_event(&TuiEvent::ScrollUp);
        assert!(!state.stick_to_bottom);

        state.scroll_state.set_offset(Position { x: 0, y: 20 });
        state.handle_event(&TuiEvent::ScrollDown);
        assert!(state.stick_to_bottom);
        assert_eq!(state.scroll_state.offset().y, 20);
    }

    #[test]
    fn busy_list_shows_processing_row() {
        let messages = vec![Message::user("status of pump 3?")];
        let mut state = MessageListState::new();

        let idle = render(&mut state, &messages, false, 40, 12);
        assert!(idle.contains("status of pump 3?"));
        assert!(!idle.contains("Processing..."));

        let busy = render(&mut state, &messages, true, 40, 12);
        assert!(busy.contains("Processing..."));
    }

    #[test]
    fn thread_taller_than_the_canvas_limit_still_renders() {
        let huge = "line\n".repeat(40_000);
        let messages = vec![
            Message::user("dump the sensor log"),
            Message::model(huge.clone()),
            Message::model(huge),
        ];
        let mut state = MessageListState::new();

        render(&mut state, &messages, true, 12, 10);
        let screen = render(&mut state, &messages, true, 12, 10);

        assert_eq!(state.layout.heights.len(), 3);
        assert_eq!(state.layout.heights[1], 40_002);
        assert_eq!(state.layout.total_height(), u16::MAX);
        assert!(!screen.is_empty());
    }

    #[test]
    fn long_thread_sticks_to_newest_message() {
        let messages: Vec<Message> = (0..30)
            .map(|i| Message::user(format!("message number {i}")))
            .collect();
        let mut state = MessageListState::new();

        render(&mut state, &messages, false, 40, 12);
        let screen = render(&mut state, &messages, false, 40, 12);
        assert!(screen.contains("message number 29"));
        assert!(!screen.contains("message number 0 "));
    }
}
