//! # TitleBar Component
//!
//! One-line header: app name, the endpoint being talked to, its health as
//! seen by the startup probe, and the transient status message.
//!
//! ```text
//! Parley · localhost:8000 ● online | Processing...
//! ```
//!
//! Stateless. All fields are props set by the parent every frame.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::state::EndpointHealth;
use crate::tui::component::Component;

pub struct TitleBar {
    pub endpoint_label: String,
    pub health: EndpointHealth,
    pub status_message: String,
}

impl TitleBar {
    pub fn new(endpoint_label: String, health: EndpointHealth, status_message: String) -> Self {
        Self {
            endpoint_label,
            health,
            status_message,
        }
    }

    fn health_color(&self) -> Color {
        match self.health {
            EndpointHealth::Unknown => Color::DarkGray,
            EndpointHealth::Online => Color::Green,
            EndpointHealth::Offline => Color::Red,
        }
    }

    fn line(&self) -> Line<'static> {
        let mut spans = vec![
            Span::styled("Parley", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(" · {} ", self.endpoint_label)),
            Span::styled(
                format!("● {}", self.health.label()),
                Style::default().fg(self.health_color()),
            ),
        ];
        if !self.status_message.is_empty() {
            spans.push(Span::raw(format!(" | {}", self.status_message)));
        }
        Line::from(spans)
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(self.line(), area);
    }
}
