//! # RailsView Component
//!
//! Draws a [`RenderPlan`]: one bordered row per materialized section, each
//! holding the materialized window of its items as fixed-width tiles.
//!
//! ```text
//! ┌ Ballet & Dance (12) ─────────────────────────────┐
//! │◀ Swan Lake        [Romeo and Jul…]  Don Quixote ▶│
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Vertical scrolling goes through a `ScrollView`. The focused rail is kept
//! inside the viewport the same way a message list keeps its selection in
//! view: scroll up to its top, or down to its bottom.

use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::focusable::NodeId;
use crate::core::rails::{RenderPlan, RenderedSection};
use crate::tui::component::Component;

/// Rows taken by one rail: border, tiles, border.
pub const RAIL_HEIGHT: u16 = 3;
/// Cells per item tile, padding included.
const TILE_WIDTH: usize = 18;

pub struct RailsView<'a> {
    pub plan: &'a RenderPlan,
    pub focused: Option<NodeId>,
    pub scroll_state: &'a mut ScrollViewState,
}

impl RailsView<'_> {
    fn focused_row(&self) -> Option<usize> {
        let focused = self.focused?;
        self.plan
            .sections
            .iter()
            .position(|s| s.items.iter().any(|item| item.node == focused))
    }

    fn keep_in_view(&mut self, row: usize, viewport_height: u16) {
        let top = row as u16 * RAIL_HEIGHT;
        let bottom = top + RAIL_HEIGHT;
        let offset_y = self.scroll_state.offset().y;
        if top < offset_y {
            self.scroll_state.set_offset(Position { x: 0, y: top });
        } else if bottom > offset_y + viewport_height {
            self.scroll_state.set_offset(Position {
                x: 0,
                y: bottom.saturating_sub(viewport_height),
            });
        }
    }

    fn rail_line(&self, section: &RenderedSection) -> Line<'static> {
        let mut spans = Vec::with_capacity(section.items.len() + 2);
        let first = section.items.first().map_or(0, |item| item.item_index);
        let last = section.items.last().map_or(0, |item| item.item_index);
        spans.push(Span::raw(if first > 0 { "◀ " } else { "  " }));
        for item in &section.items {
            let tile = fit(&item.title, TILE_WIDTH - 2);
            if Some(item.node) == self.focused {
                spans.push(Span::styled(
                    format!("[{tile}]"),
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ));
            } else {
                spans.push(Span::raw(format!(" {tile} ")));
            }
        }
        if last + 1 < section.item_count {
            spans.push(Span::raw(" ▶"));
        }
        Line::from(spans)
    }
}

impl Component for RailsView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if self.plan.is_empty() {
            let empty = Paragraph::new("Nothing to show here")
                .alignment(Alignment::Center)
                .style(Style::default().add_modifier(Modifier::DIM));
            frame.render_widget(empty, area);
            return;
        }

        let content_width = area.width.saturating_sub(1);
        // One spare row for the invisible sentinel.
        let canvas_height = self.plan.sections.len() as u16 * RAIL_HEIGHT + 1;
        if let Some(row) = self.focused_row() {
            self.keep_in_view(row, area.height);
        }

        let mut scroll_view = ScrollView::new(Size::new(content_width, canvas_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset = 0;
        for section in &self.plan.sections {
            let focused_rail = section
                .items
                .iter()
                .any(|item| Some(item.node) == self.focused);
            let border_style = if focused_rail {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().add_modifier(Modifier::DIM)
            };
            let block = Block::bordered()
                .title(format!("{} ({})", section.title, section.item_count))
                .border_style(border_style);
            let paragraph = Paragraph::new(self.rail_line(section)).block(block);
            scroll_view.render_widget(paragraph, Rect::new(0, y_offset, content_width, RAIL_HEIGHT));
            y_offset += RAIL_HEIGHT;
        }

        if self.focused == Some(self.plan.sentinel) {
            let hint = Paragraph::new("↑ back to the first rail")
                .alignment(Alignment::Center)
                .style(Style::default().add_modifier(Modifier::DIM));
            scroll_view.render_widget(hint, Rect::new(0, y_offset, content_width, 1));
        }

        frame.render_stateful_widget(scroll_view, area, &mut *self.scroll_state);
    }
}

/// Pad or cut `title` to exactly `width` terminal cells.
fn fit(title: &str, width: usize) -> String {
    let mut out = String::with_capacity(width);
    let used = if title.width() <= width {
        out.push_str(title);
        title.width()
    } else {
        let mut used = 0;
        for c in title.chars() {
            let w = c.width().unwrap_or(0);
            if used + w + 1 > width {
                break;
            }
            out.push(c);
            used += w;
        }
        out.push('…');
        used + 1
    };
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(used)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rails::RenderedItem;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn plan() -> RenderPlan {
        let items = ["Swan Lake", "Giselle", "Coppelia"]
            .iter()
            .enumerate()
            .map(|(i, title)| RenderedItem {
                item_index: i + 1,
                item_id: format!("item-{i}"),
                title: title.to_string(),
                node: NodeId::from_raw(i as u64 + 10),
                preferred: false,
            })
            .collect();
        RenderPlan {
            sections: vec![RenderedSection {
                section_index: 0,
                title: "Ballet".to_string(),
                items,
                item_count: 8,
            }],
            section_count: 1,
            sentinel: NodeId::from_raw(99),
            sentinel_accessible: false,
        }
    }

    fn rendered(plan: &RenderPlan, focused: Option<NodeId>) -> String {
        let mut state = ScrollViewState::default();
        let mut view = RailsView {
            plan,
            focused,
            scroll_state: &mut state,
        };
        let mut terminal = Terminal::new(TestBackend::new(80, 6)).unwrap();
        terminal.draw(|f| view.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_fit_pads_and_truncates() {
        assert_eq!(fit("Tosca", 8), "Tosca   ");
        assert_eq!(fit("Swan Lake", 6), "Swan …");
        assert_eq!(fit("Swan Lake", 6).width(), 6);
    }

    #[test]
    fn test_focused_tile_is_bracketed() {
        let plan = plan();
        let text = rendered(&plan, Some(NodeId::from_raw(11)));
        assert!(text.contains("Ballet (8)"));
        assert!(text.contains("[Giselle"));
        // Items before and after the window.
        assert!(text.contains('◀'));
        assert!(text.contains('▶'));
    }

    #[test]
    fn test_empty_plan_says_so() {
        let mut plan = plan();
        plan.sections.clear();
        let text = rendered(&plan, None);
        assert!(text.contains("Nothing to show here"));
    }

    #[test]
    fn test_focused_rail_scrolls_into_view() {
        let mut plan = plan();
        let template = plan.sections[0].clone();
        for section_index in 1..5 {
            let mut section = template.clone();
            section.section_index = section_index;
            for item in section.items.iter_mut() {
                item.node = NodeId::from_raw(item.node.raw() + 100 * section_index as u64);
            }
            plan.sections.push(section);
        }
        let mut state = ScrollViewState::default();
        let mut view = RailsView {
            plan: &plan,
            focused: Some(NodeId::from_raw(410)),
            scroll_state: &mut state,
        };
        let mut terminal = Terminal::new(TestBackend::new(80, 6)).unwrap();
        terminal.draw(|f| view.render(f, f.area())).unwrap();
        // Rail 4 spans rows 12..15; a 6-row viewport must start at 9.
        assert_eq!(state.offset().y, 9);
    }
}
