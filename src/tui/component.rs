use ratatui::Frame;
use ratatui::layout::Rect;

/// A piece of the screen.
///
/// Components receive data as struct fields ("props") and may keep their own
/// presentation state. `render` takes `&mut self` so a component can refresh
/// caches such as layout heights or scroll offsets while drawing.
pub trait Component {
    /// Render the component into the given area.
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that reacts to terminal events.
pub trait EventHandler {
    /// The type of high-level event this component emits.
    type Event;

    /// Handle a low-level `TuiEvent` and optionally return a high-level event.
    fn handle_event(&mut self, event: &super::event::TuiEvent) -> Option<Self::Event>;
}
