use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::config::ReplyRendering;
use crate::core::state::{Message, Role};
use crate::tui::component::Component;
use crate::tui::rich_text::render_body;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Borders (1 left + 1 right) plus padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Top and bottom borders.
const VERTICAL_OVERHEAD: u16 = 2;

/// Caption under every model reply.
pub const MODEL_CAPTION: &str = "AI assistant";

/// One conversation entry drawn as a bordered card.
///
/// Created fresh each frame. Height is predicted with the same `Paragraph`
/// that is later rendered, so the list's scroll math and the drawn card
/// never disagree.
#[derive(Clone, Copy)]
pub struct MessageView<'a> {
    pub message: &'a Message,
    pub rendering: ReplyRendering,
}

impl<'a> MessageView<'a> {
    pub fn new(message: &'a Message, rendering: ReplyRendering) -> Self {
        Self { message, rendering }
    }

    pub fn calculate_height(&self, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return 1;
        }
        // Replies have no length cap; an oversized card is clipped at the
        // largest height a terminal coordinate can hold.
        let rows = u16::try_from(self.paragraph().line_count(content_width)).unwrap_or(u16::MAX);
        rows.max(1).saturating_add(VERTICAL_OVERHEAD)
    }

    fn body(&self) -> Text<'static> {
        render_body(
            self.message.role,
            &self.message.content,
            self.rendering,
            role_color(self.message.role),
        )
    }

    fn paragraph(&self) -> Paragraph<'static> {
        Paragraph::new(self.body()).wrap(Wrap { trim: false })
    }
}

pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Model => "assistant",
        Role::Error => "error",
    }
}

pub fn role_color(role: Role) -> Color {
    match role {
        Role::User => Color::Green,
        Role::Model => Color::Blue,
        Role::Error => Color::Red,
    }
}

impl Widget for MessageView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let role = self.message.role;
        let color = role_color(role);
        let border_style = match role {
            Role::Error => Style::default().fg(color),
            _ => Style::default().fg(color).add_modifier(Modifier::DIM),
        };

        let mut block = Block::bordered()
            .title(role_label(role))
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));
        if role == Role::Model {
            block = block.title_bottom(
                Line::from(Span::styled(
                    format!(" {MODEL_CAPTION} "),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                ))
                .right_aligned(),
            );
        }

        let inner = block.inner(area);
        block.render(area, buf);
        self.paragraph().render(inner, buf);
    }
}

impl Component for MessageView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}
