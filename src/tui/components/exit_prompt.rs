//! # ExitPrompt Component
//!
//! Modal "leave the app?" confirmation raised by the nav overlay. While it
//! is open every key goes to it.

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Clear, Paragraph};

use crate::core::event::RemoteKey;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitChoice {
    Confirm,
    Cancel,
}

#[derive(Debug, Default)]
pub struct ExitPrompt;

impl ExitPrompt {
    pub fn new() -> Self {
        Self
    }
}

impl EventHandler for ExitPrompt {
    type Event = ExitChoice;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<ExitChoice> {
        match event {
            TuiEvent::Char('y' | 'Y') | TuiEvent::Remote(RemoteKey::Select) => {
                Some(ExitChoice::Confirm)
            }
            TuiEvent::Char('n' | 'N') | TuiEvent::Remote(RemoteKey::Back) => {
                Some(ExitChoice::Cancel)
            }
            _ => None,
        }
    }
}

impl Component for ExitPrompt {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [row] = Layout::vertical([Constraint::Length(3)])
            .flex(Flex::Center)
            .areas(area);
        let [popup] = Layout::horizontal([Constraint::Length(36)])
            .flex(Flex::Center)
            .areas(row);

        frame.render_widget(Clear, popup);
        let prompt = Paragraph::new(" Exit railfocus?  y / n ")
            .centered()
            .block(
                Block::bordered()
                    .title("Exit")
                    .border_style(Style::default().fg(Color::Yellow)),
            );
        frame.render_widget(prompt, popup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_choices() {
        let mut prompt = ExitPrompt::new();
        assert_eq!(
            prompt.handle_event(&TuiEvent::Char('y')),
            Some(ExitChoice::Confirm)
        );
        assert_eq!(
            prompt.handle_event(&TuiEvent::Remote(RemoteKey::Back)),
            Some(ExitChoice::Cancel)
        );
        assert_eq!(
            prompt.handle_event(&TuiEvent::Remote(RemoteKey::Left)),
            None
        );
    }

    #[test]
    fn test_renders_centered_popup() {
        let mut terminal = Terminal::new(TestBackend::new(60, 9)).unwrap();
        terminal
            .draw(|f| ExitPrompt::new().render(f, f.area()))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Exit railfocus?"));
    }
}
