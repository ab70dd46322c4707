use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{LandingPage, MessageList, TitleBar};

const HINT_SEND: &str = "Enter to send";
const HINT_REST: &str = " - Shift+Enter for newline - Esc to cancel";

/// Lays out one frame:
///
/// ```text
/// ┌ title bar (1) ────────────────┐
/// │ landing page or message list  │
/// │ input box (3..=7)             │
/// └ hint line (1) ────────────────┘
/// ```
pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    tui.input_box.disabled = app.is_busy();
    tui.input_box.can_submit = app.can_submit();

    let input_height = tui.input_box.calculate_height(frame.area().width);
    let [title_area, main_area, input_area, hint_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(input_height),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    TitleBar::new(
        app.backend.name().to_string(),
        app.health.clone(),
        app.status_message.clone(),
    )
    .render(frame, title_area);

    if app.conversation.is_empty() && !app.is_busy() {
        LandingPage::new(tui.pulse_value).render(frame, main_area);
    } else {
        MessageList::new(
            &mut tui.message_list,
            app.conversation.messages(),
            app.reply_rendering,
            app.is_busy(),
            spinner_frame,
        )
        .render(frame, main_area);
    }

    tui.input_box.render(frame, input_area);

    let send_style = if app.can_submit() {
        Style::default().fg(Color::Gray)
    } else {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
    };
    frame.render_widget(
        Line::from(vec![
            Span::styled(HINT_SEND, send_style),
            Span::styled(HINT_REST, Style::default().fg(Color::DarkGray)),
        ]),
        hint_area,
    );
}
