use ratatui::Frame;
use ratatui::layout::Rect;

/// A reusable UI component.
///
/// Components follow the props pattern:
/// - They receive data via props (struct fields), usually borrowed from
///   the focus shell's state for one frame.
/// - They render to a `Frame` within a given `Rect`.
///
/// `render` takes `&mut self` so a component can update presentation state
/// it holds by reference (e.g. a scroll offset) while drawing, the same way
/// ratatui's `StatefulWidget` does.
pub trait Component {
    /// Render the component into the given area.
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that handles terminal events.
pub trait EventHandler {
    /// The type of high-level event this component emits.
    type Event;

    /// Handle a low-level `TuiEvent` and optionally return a high-level event.
    fn handle_event(&mut self, event: &super::event::TuiEvent) -> Option<Self::Event>;
}
