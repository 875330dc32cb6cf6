//! # Collapsible Nav Overlay
//!
//! The persistent side menu. Its width class is a small state machine
//! driven by where raw focus lands and by the hardware back button.
//!
//! ```text
//!              show()                     focus inside
//!  Invisible ──────────▶ Collapsed ◀──────────────────▶ Expanded
//!      ▲                   │   ▲     focus outside         │
//!      └──── hide() ───────┘   └───────────────────────────┘
//!
//!  back: Invisible → ignored, Collapsed → Expanded, Expanded → exit prompt
//! ```
//!
//! While `Invisible`, focus events are recorded but never move the state;
//! only `show()` brings the panel back. Every transition depends only on the
//! incoming node and the recorded previous owner, so replaying an event is a
//! no-op.

use std::fmt;

use log::{debug, info};

use crate::core::action::Effect;
use crate::core::config::{MenuEntryConfig, OverlayConfig};
use crate::core::event::{HwEvent, HwEventKind, RemoteKey};
use crate::core::focusable::{NodeAllocator, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayState {
    Invisible,
    Collapsed,
    Expanded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub route: String,
    pub title: String,
    pub is_default: bool,
    pub node: NodeId,
}

/// Result of offering a back press to a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackOutcome {
    /// Not for us; let the next handler have it.
    Ignored,
    Handled(Vec<Effect>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    UnknownDestination(String),
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavError::UnknownDestination(route) => {
                write!(f, "no screen registered for route '{route}'")
            }
        }
    }
}

impl std::error::Error for NavError {}

#[derive(Debug)]
pub struct CollapsibleNavOverlay {
    state: OverlayState,
    entries: Vec<MenuEntry>,
    exit_node: Option<NodeId>,
    locked: bool,
    /// Entry of the screen currently shown.
    current: usize,
    /// Whether the previous focus owner was one of ours.
    previous_inside: Option<bool>,
}

impl CollapsibleNavOverlay {
    pub fn new(menu: &[MenuEntryConfig], can_exit: bool, nodes: &mut NodeAllocator) -> Self {
        let entries: Vec<MenuEntry> = menu
            .iter()
            .map(|entry| MenuEntry {
                route: entry.route.clone(),
                title: entry.title.clone(),
                is_default: entry.default,
                node: nodes.allocate(),
            })
            .collect();
        let current = entries.iter().position(|e| e.is_default).unwrap_or(0);
        Self {
            state: OverlayState::Collapsed,
            entries,
            exit_node: can_exit.then(|| nodes.allocate()),
            locked: false,
            current,
            previous_inside: None,
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn exit_node(&self) -> Option<NodeId> {
        self.exit_node
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn current_entry(&self) -> Option<&MenuEntry> {
        self.entries.get(self.current)
    }

    pub fn default_entry(&self) -> Option<&MenuEntry> {
        self.entries
            .iter()
            .find(|e| e.is_default)
            .or_else(|| self.entries.first())
    }

    /// Entry nodes plus the exit action.
    pub fn contains(&self, node: NodeId) -> bool {
        self.exit_node == Some(node) || self.entries.iter().any(|e| e.node == node)
    }

    /// Whether directional focus may enter the panel.
    pub fn is_accessible(&self) -> bool {
        !self.locked && self.state != OverlayState::Invisible
    }

    pub fn width(&self, config: &OverlayConfig) -> u16 {
        match self.state {
            OverlayState::Invisible => config.invisible_width,
            OverlayState::Collapsed => config.collapsed_width,
            OverlayState::Expanded => config.expanded_width,
        }
    }

    fn transition(&mut self, next: OverlayState) {
        if self.state != next {
            debug!("overlay: {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    pub fn show(&mut self) {
        self.transition(OverlayState::Collapsed);
    }

    pub fn hide(&mut self) {
        self.transition(OverlayState::Invisible);
    }

    pub fn expand(&mut self) {
        self.transition(OverlayState::Expanded);
    }

    pub fn lock(&mut self) {
        debug!("overlay: locked");
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        debug!("overlay: unlocked");
        self.locked = false;
    }

    /// Raw focus landed on `node`.
    pub fn on_focus(&mut self, node: NodeId) {
        let inside = self.contains(node);
        let previous = self.previous_inside.replace(inside);
        if self.state == OverlayState::Invisible {
            return;
        }
        if inside {
            self.transition(OverlayState::Expanded);
        } else {
            if previous == Some(true) {
                debug!("overlay: focus left the panel");
            }
            self.transition(OverlayState::Collapsed);
        }
    }

    /// Router listener entry point.
    pub fn on_hw_event(&mut self, event: &HwEvent) -> Vec<Effect> {
        let Some(node) = event.node else {
            return Vec::new();
        };
        match event.kind {
            HwEventKind::Focus => {
                self.on_focus(node);
                Vec::new()
            }
            HwEventKind::Key(RemoteKey::Select) => {
                if self.exit_node == Some(node) && !self.locked {
                    return vec![Effect::ConfirmExit];
                }
                match self.entries.iter().position(|e| e.node == node) {
                    Some(index) => self.navigate_to(index),
                    None => Vec::new(),
                }
            }
            HwEventKind::Blur | HwEventKind::Key(_) => Vec::new(),
        }
    }

    pub fn on_back(&mut self) -> BackOutcome {
        if self.locked {
            self.unlock();
            self.expand();
            return BackOutcome::Handled(self.focus_current_entry());
        }
        match self.state {
            OverlayState::Invisible => BackOutcome::Ignored,
            OverlayState::Collapsed => {
                self.expand();
                BackOutcome::Handled(self.focus_current_entry())
            }
            OverlayState::Expanded => {
                if self.exit_node.is_some() {
                    info!("overlay: back on expanded menu, confirming exit");
                    BackOutcome::Handled(vec![Effect::ConfirmExit])
                } else {
                    BackOutcome::Handled(Vec::new())
                }
            }
        }
    }

    /// Navigate to the screen behind `route`.
    pub fn select_entry(&mut self, route: &str) -> Result<Vec<Effect>, NavError> {
        let index = self
            .entries
            .iter()
            .position(|e| e.route == route)
            .ok_or_else(|| NavError::UnknownDestination(route.to_string()))?;
        Ok(self.navigate_to(index))
    }

    fn navigate_to(&mut self, index: usize) -> Vec<Effect> {
        if self.locked {
            debug!("overlay: selection ignored while locked");
            return Vec::new();
        }
        let Some(entry) = self.entries.get(index) else {
            return Vec::new();
        };
        info!("overlay: navigating to {}", entry.route);
        let effect = Effect::navigate(entry.route.clone());
        self.current = index;
        self.expand();
        vec![effect]
    }

    pub fn focus_current_entry(&self) -> Vec<Effect> {
        self.current_entry()
            .map(|e| vec![Effect::RequestFocus(e.node)])
            .unwrap_or_default()
    }

    /// Answer to the exit prompt.
    pub fn resolve_exit(&mut self, confirmed: bool) -> Vec<Effect> {
        if confirmed {
            info!("overlay: exit confirmed");
            return vec![Effect::ExitApp];
        }
        self.default_entry()
            .map(|e| vec![Effect::RequestFocus(e.node)])
            .unwrap_or_default()
    }
}
