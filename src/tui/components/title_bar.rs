//! # TitleBar Component
//!
//! Top status bar: which screen is shown, which rail holds focus, and the
//! latest status message.
//!
//! ## Conditional Formatting
//!
//! 1. **Rail and status**: `"railfocus | home | rail 2/6 | Focused swan-lake"`
//! 2. **Status only**: `"railfocus | search | Nothing to show"`
//! 3. **Default**: `"railfocus | home"`
//!
//! The screen name always comes first so it stays visible on narrow
//! terminals.

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Span;

/// Top status bar component.
pub struct TitleBar {
    /// Route of the screen shown (e.g. "home", "detail")
    pub screen: String,
    /// `(focused rail, rail count)` when a rails screen has focus
    pub rail: Option<(usize, usize)>,
    pub status_message: String,
}

impl TitleBar {
    pub fn new(screen: String, rail: Option<(usize, usize)>, status_message: String) -> Self {
        Self {
            screen,
            rail,
            status_message,
        }
    }

    fn text(&self) -> String {
        let mut parts = vec!["railfocus".to_string(), self.screen.clone()];
        if let Some((rail, count)) = self.rail {
            parts.push(format!("rail {}/{}", rail + 1, count));
        }
        if !self.status_message.is_empty() {
            parts.push(self.status_message.clone());
        }
        parts.join(" | ")
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Span::raw(self.text()), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rendered(title_bar: &mut TitleBar) -> String {
        let backend = TestBackend::new(80, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                title_bar.render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_title_bar_with_rail_and_status() {
        let mut title_bar = TitleBar::new(
            "home".to_string(),
            Some((1, 6)),
            "Focused swan-lake".to_string(),
        );
        let text = rendered(&mut title_bar);
        assert!(text.contains("railfocus | home"));
        assert!(text.contains("rail 2/6"));
        assert!(text.contains("Focused swan-lake"));
    }

    #[test]
    fn test_title_bar_default_no_status() {
        let mut title_bar = TitleBar::new("search".to_string(), None, String::new());
        let text = rendered(&mut title_bar);
        assert!(text.contains("railfocus | search"));
        assert!(!text.contains("rail "));
        assert_eq!(text.matches('|').count(), 1);
    }

    #[test]
    fn test_title_bar_props_are_mutable() {
        let mut title_bar = TitleBar::new("home".to_string(), None, String::new());
        title_bar.screen = "detail".to_string();
        title_bar.status_message = "Playing".to_string();
        assert_eq!(title_bar.text(), "railfocus | detail | Playing");
    }
}
