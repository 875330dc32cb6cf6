//! # Go-Back Button
//!
//! Back affordance on full-bleed detail screens. Leaving through it carries
//! the anchor of the item that opened the screen back to where it came
//! from, and brings the nav overlay back.

use log::info;

use crate::core::action::Effect;
use crate::core::catalog::FocusAnchor;
use crate::core::event::{HwEvent, HwEventKind, RemoteKey};
use crate::core::focusable::NodeId;
use crate::core::overlay::BackOutcome;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoBackButton {
    node: NodeId,
    shown: bool,
    accessible: bool,
    /// Route of the screen that opened this one.
    origin: Option<String>,
    anchor: Option<FocusAnchor>,
}

impl GoBackButton {
    pub fn new(node: NodeId, origin: Option<String>, anchor: Option<FocusAnchor>) -> Self {
        Self {
            node,
            shown: true,
            accessible: true,
            origin,
            anchor,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn show(&mut self) {
        self.shown = true;
    }

    pub fn hide(&mut self) {
        self.shown = false;
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn set_accessible(&mut self, accessible: bool) {
        self.accessible = accessible;
    }

    /// Shown and reachable: only then does it take back presses.
    pub fn is_active(&self) -> bool {
        self.shown && self.accessible
    }

    pub fn on_back(&mut self) -> BackOutcome {
        if !self.is_active() {
            return BackOutcome::Ignored;
        }
        BackOutcome::Handled(self.leave())
    }

    /// Left or select on the button itself leaves the screen.
    pub fn on_hw_event(&mut self, event: &HwEvent) -> Vec<Effect> {
        if event.node != Some(self.node) || !self.is_active() {
            return Vec::new();
        }
        match event.kind {
            HwEventKind::Key(RemoteKey::Left | RemoteKey::Select) => self.leave(),
            _ => Vec::new(),
        }
    }

    fn leave(&mut self) -> Vec<Effect> {
        let navigate = match &self.origin {
            Some(route) => {
                info!("go back: returning to {route}");
                Effect::Navigate {
                    route: route.clone(),
                    anchor: self.anchor.take(),
                }
            }
            None => Effect::GoBack,
        };
        vec![navigate, Effect::ShowOverlay]
    }
}
