//! # Landing Page Component
//!
//! Shown in place of the message list while the conversation is empty.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;

pub const HEADLINE: &str = "How can I help?";

pub struct LandingPage {
    /// Gently pulses the headline, 0.0..=1.0.
    pub pulse: f32,
}

impl LandingPage {
    pub fn new(pulse: f32) -> Self {
        Self { pulse }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let mut headline = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
        if self.pulse < 0.3 {
            headline = headline.add_modifier(Modifier::DIM);
        }

        vec![
            Line::from(Span::styled(HEADLINE, headline)),
            Line::default(),
            Line::from(Span::styled(
                "Ask a question and the assistant will answer here.",
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                format!("Parley v{}", env!("CARGO_PKG_VERSION")),
                Style::default().fg(Color::DarkGray),
            )),
        ]
    }
}

impl Component for LandingPage {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let lines = self.lines();
        let [centered] = Layout::vertical([Constraint::Length(lines.len() as u16)])
            .flex(Flex::Center)
            .areas(area);

        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), centered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn renders_headline() {
        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        let mut landing = LandingPage::new(1.0);
        terminal.draw(|f| landing.render(f, f.area())).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains(HEADLINE));
    }
}
