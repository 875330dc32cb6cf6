//! # DetailView Component
//!
//! Full-bleed item screen: a back button and a play control.
//!
//! ```text
//! ┌ Swan Lake ───────────────────────────┐
//! │ [← Back]   ▶ Play                    │
//! │                                      │
//! │ Paused                               │
//! └──────────────────────────────────────┘
//! ```

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use crate::tui::component::Component;

pub struct DetailView<'a> {
    pub title: &'a str,
    pub back_focused: bool,
    pub play_focused: bool,
    pub playing: bool,
}

fn button(label: &str, focused: bool) -> Span<'static> {
    if focused {
        Span::styled(
            format!("[{label}]"),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::raw(format!(" {label} "))
    }
}

impl Component for DetailView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let play_label = if self.playing { "❚❚ Pause" } else { "▶ Play" };
        let status = if self.playing { "Playing" } else { "Paused" };
        let lines = vec![
            Line::from(vec![
                button("← Back", self.back_focused),
                Span::raw("  "),
                button(play_label, self.play_focused),
            ]),
            Line::default(),
            Line::styled(status, Style::default().add_modifier(Modifier::DIM)),
        ];
        let paragraph = Paragraph::new(lines).block(Block::bordered().title(self.title));
        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rendered(view: &mut DetailView) -> String {
        let mut terminal = Terminal::new(TestBackend::new(40, 5)).unwrap();
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
    fn test_paused_with_back_focused() {
        let mut view = DetailView {
            title: "Swan Lake",
            back_focused: true,
            play_focused: false,
            playing: false,
        };
        let text = rendered(&mut view);
        assert!(text.contains("Swan Lake"));
        assert!(text.contains("[← Back]"));
        assert!(text.contains("Paused"));
    }

    #[test]
    fn test_playing_shows_pause() {
        let mut view = DetailView {
            title: "Tosca",
            back_focused: false,
            play_focused: true,
            playing: true,
        };
        let text = rendered(&mut view);
        assert!(text.contains("Pause]"));
        assert!(text.contains("Playing"));
    }
}
