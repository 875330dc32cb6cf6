use crate::tui::component::Component;
use crate::tui::components::{DetailView, NavMenu, RailsView, TitleBar};
use crate::tui::{Screen, TuiState};

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

pub fn draw_ui(frame: &mut Frame, tui: &mut TuiState) {
    use Constraint::{Length, Min};
    let [title_area, body_area] = Layout::vertical([Length(1), Min(0)]).areas(frame.area());

    let menu_width = tui.shell.overlay_width().min(body_area.width);
    let [menu_area, content_area] =
        Layout::horizontal([Length(menu_width), Min(0)]).areas(body_area);

    let focused = tui.platform.focused();

    // Title bar
    let rail = match (&tui.screen, tui.focused_section, &tui.plan) {
        (Screen::Rails { .. }, Some(section), Some(plan)) => Some((section, plan.section_count)),
        _ => None,
    };
    let screen_name = match &tui.screen {
        Screen::Rails { route } => route.clone(),
        Screen::Detail { .. } => "detail".to_string(),
    };
    TitleBar::new(screen_name, rail, tui.status_message.clone()).render(frame, title_area);

    // Navigation overlay
    {
        let overlay = tui.shell.overlay();
        NavMenu {
            entries: overlay.entries(),
            current: overlay.current_entry().map(|e| e.node),
            exit: overlay.exit_node(),
            focused,
            state: overlay.state(),
            locked: overlay.is_locked(),
        }
        .render(frame, menu_area);
    }

    // Content
    match &tui.screen {
        Screen::Rails { .. } => {
            if let Some(plan) = &tui.plan {
                RailsView {
                    plan,
                    focused,
                    scroll_state: &mut tui.rails_scroll,
                }
                .render(frame, content_area);
            }
        }
        Screen::Detail {
            title,
            go_back,
            play,
            playing,
            ..
        } => {
            DetailView {
                title,
                back_focused: focused == Some(*go_back),
                play_focused: focused == Some(*play),
                playing: *playing,
            }
            .render(frame, content_area);
        }
    }

    if let Some(prompt) = tui.exit_prompt.as_mut() {
        prompt.render(frame, frame.area());
    }
}
