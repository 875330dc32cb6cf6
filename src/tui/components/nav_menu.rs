//! # NavMenu Component
//!
//! Left-hand navigation panel drawn from the overlay's state.
//!
//! ```text
//!  Collapsed      Expanded
//!  ┌────┐         ┌──────────────────────┐
//!  │▸ H │         │▸ Home                │
//!  │  S │         │  Search              │
//!  │  L │         │  Live                │
//!  │    │         │                      │
//!  │  ⏻ │         │  ⏻ Exit              │
//!  └────┘         └──────────────────────┘
//! ```
//!
//! Invisible draws nothing. A locked panel is drawn dimmed.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::core::focusable::NodeId;
use crate::core::overlay::{MenuEntry, OverlayState};
use crate::tui::component::Component;

pub struct NavMenu<'a> {
    pub entries: &'a [MenuEntry],
    /// Entry of the screen shown.
    pub current: Option<NodeId>,
    pub exit: Option<NodeId>,
    pub focused: Option<NodeId>,
    pub state: OverlayState,
    pub locked: bool,
}

impl NavMenu<'_> {
    fn label(&self, title: &str) -> String {
        match self.state {
            OverlayState::Expanded => title.to_string(),
            _ => title.chars().next().map(|c| c.to_uppercase().collect()).unwrap_or_default(),
        }
    }

    fn style_for(&self, node: NodeId) -> Style {
        let mut style = Style::default().fg(Color::Gray);
        if Some(node) == self.current {
            style = style.fg(Color::Cyan);
        }
        if Some(node) == self.focused {
            style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
        }
        if self.locked {
            style = style.add_modifier(Modifier::DIM);
        }
        style
    }
}

impl Component for NavMenu<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if self.state == OverlayState::Invisible || area.width == 0 {
            return;
        }

        let block = Block::default().borders(Borders::RIGHT);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines: Vec<Line> = self
            .entries
            .iter()
            .map(|entry| {
                let marker = if Some(entry.node) == self.current { "▸ " } else { "  " };
                Line::from(vec![
                    Span::raw(marker),
                    Span::styled(self.label(&entry.title), self.style_for(entry.node)),
                ])
            })
            .collect();

        let [entries_area, exit_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(inner);
        frame.render_widget(Paragraph::new(lines), entries_area);

        if let Some(exit) = self.exit {
            let label = match self.state {
                OverlayState::Expanded => "⏻ Exit",
                _ => "⏻",
            };
            let line = Line::from(vec![
                Span::raw("  "),
                Span::styled(label, self.style_for(exit)),
            ]);
            frame.render_widget(Paragraph::new(line), exit_area);
        }
    }
}
