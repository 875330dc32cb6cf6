use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::core::event::RemoteKey;

/// TUI-specific input events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuiEvent {
    // Remote-control keys (published to the focus engine)
    Remote(RemoteKey),

    // TUI-local events (handled directly in TUI)
    Char(char),
    Reset, // r: logout / navigation reset
    Resize,
    Quit,
}

/// Poll for an event without blocking (returns immediately)
pub fn poll_event_immediate() -> Option<TuiEvent> {
    poll_event_timeout(std::time::Duration::ZERO)
}

/// Poll for an event, blocking up to `timeout`
pub fn poll_event_timeout(timeout: std::time::Duration) -> Option<TuiEvent> {
    if !matches!(event::poll(timeout), Ok(true)) {
        return None;
    }
    match event::read() {
        Ok(Event::Key(key_event)) => {
            log::debug!(
                "Key event: {:?} with modifiers {:?}",
                key_event.code,
                key_event.modifiers
            );
            map_key(key_event)
        }
        Ok(Event::Resize(_, _)) => Some(TuiEvent::Resize),
        Ok(_) => None,
        Err(e) => {
            log::warn!("Failed to read terminal event: {e}");
            None
        }
    }
}

/// Keyboard stand-in for a TV remote.
pub fn map_key(key_event: KeyEvent) -> Option<TuiEvent> {
    if key_event.kind != KeyEventKind::Press {
        return None;
    }
    match (key_event.modifiers, key_event.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(TuiEvent::Quit),
        (_, KeyCode::Up) => Some(TuiEvent::Remote(RemoteKey::Up)),
        (_, KeyCode::Down) => Some(TuiEvent::Remote(RemoteKey::Down)),
        (_, KeyCode::Left) => Some(TuiEvent::Remote(RemoteKey::Left)),
        (_, KeyCode::Right) => Some(TuiEvent::Remote(RemoteKey::Right)),
        (_, KeyCode::Enter) => Some(TuiEvent::Remote(RemoteKey::Select)),
        (_, KeyCode::Esc | KeyCode::Backspace) => Some(TuiEvent::Remote(RemoteKey::Back)),
        (_, KeyCode::Char(' ' | 'p')) => Some(TuiEvent::Remote(RemoteKey::PlayPause)),
        (_, KeyCode::Char('q')) => Some(TuiEvent::Quit),
        (_, KeyCode::Char('r')) => Some(TuiEvent::Reset),
        (_, KeyCode::Char(c)) => Some(TuiEvent::Char(c)),
        _ => None,
    }
}
