//! # Focus Context
//!
//! Process-lifetime focus state, owned by the app shell and passed to
//! whoever needs it instead of living in globals.
//!
//! ```text
//! FocusContext
//! ├── first_launch: bool          // true until the first focus anywhere
//! ├── last_focused: Option<NodeId> // last-write-wins register
//! └── listeners                   // first-launch flag observers
//! ```
//!
//! The flag only returns to `true` through [`FocusContext::reset`] (logout,
//! navigation reset) or an explicit [`FocusContext::switch_on_first_launch`].

use log::debug;

use crate::core::catalog::{FocusAnchor, Section};
use crate::core::focusable::NodeId;
use crate::core::resolver::{self, Resolution};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FirstLaunchListenerId(u64);

type FirstLaunchListener = Box<dyn FnMut(bool)>;

pub struct FocusContext {
    first_launch: bool,
    last_focused: Option<NodeId>,
    listeners: Vec<(FirstLaunchListenerId, FirstLaunchListener)>,
    next_listener: u64,
}

impl Default for FocusContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FocusContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusContext")
            .field("first_launch", &self.first_launch)
            .field("last_focused", &self.last_focused)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl FocusContext {
    pub fn new() -> Self {
        Self {
            first_launch: true,
            last_focused: None,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn is_first_launch(&self) -> bool {
        self.first_launch
    }

    pub fn switch_off_first_launch(&mut self) {
        self.set_first_launch(false);
    }

    pub fn switch_on_first_launch(&mut self) {
        self.set_first_launch(true);
    }

    fn set_first_launch(&mut self, value: bool) {
        if self.first_launch == value {
            return;
        }
        debug!("first launch flag -> {value}");
        self.first_launch = value;
        for (_, listener) in self.listeners.iter_mut() {
            listener(value);
        }
    }

    /// Record a focus event. The first one anywhere ends the cold start.
    pub fn note_focus(&mut self, node: NodeId) {
        self.last_focused = Some(node);
        self.switch_off_first_launch();
    }

    pub fn last_focused(&self) -> Option<NodeId> {
        self.last_focused
    }

    pub fn add_first_launch_listener(
        &mut self,
        listener: impl FnMut(bool) + 'static,
    ) -> FirstLaunchListenerId {
        self.next_listener += 1;
        let id = FirstLaunchListenerId(self.next_listener);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_first_launch_listener(&mut self, id: FirstLaunchListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn resolve(&self, anchor: &FocusAnchor, sections: &[Section]) -> Resolution {
        resolver::resolve(anchor, sections, self.first_launch)
    }

    /// Logout / navigation reset.
    pub fn reset(&mut self) {
        self.last_focused = None;
        self.switch_on_first_launch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolver::FocusPosition;
    use crate::test_support::scenario_sections;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_first_focus_clears_flag() {
        let mut ctx = FocusContext::new();
        assert!(ctx.is_first_launch());
        ctx.note_focus(NodeId::from_raw(3));
        assert!(!ctx.is_first_launch());
        assert_eq!(ctx.last_focused(), Some(NodeId::from_raw(3)));
    }

    #[test]
    fn test_resolve_does_not_reenter_cold_start() {
        let mut ctx = FocusContext::new();
        let sections = scenario_sections();
        let anchor = FocusAnchor::for_item("E", 0, 0);

        assert_eq!(
            ctx.resolve(&anchor, &sections),
            Resolution::At(FocusPosition::INITIAL)
        );
        ctx.note_focus(NodeId::from_raw(1));
        let first = ctx.resolve(&anchor, &sections);
        let second = ctx.resolve(&anchor, &sections);
        assert_eq!(first, Resolution::At(FocusPosition::new(1, 1)));
        assert_eq!(first, second);
    }

    #[test]
    fn test_listeners_hear_changes_only() {
        let mut ctx = FocusContext::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = ctx.add_first_launch_listener(move |value| sink.borrow_mut().push(value));

        ctx.note_focus(NodeId::from_raw(1));
        ctx.note_focus(NodeId::from_raw(2));
        ctx.reset();
        assert_eq!(*seen.borrow(), vec![false, true]);

        assert!(ctx.remove_first_launch_listener(id));
        ctx.switch_off_first_launch();
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_reset_clears_register() {
        let mut ctx = FocusContext::new();
        ctx.note_focus(NodeId::from_raw(8));
        ctx.reset();
        assert!(ctx.is_first_launch());
        assert_eq!(ctx.last_focused(), None);
    }
}
