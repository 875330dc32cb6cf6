//! # Hardware Key Router
//!
//! Pub/sub bus for raw remote-control events. The platform publishes
//! `(node, event)`; each subscriber filters by the node set it owns.
//!
//! ```text
//!  platform ──▶ dispatch(event)
//!                 ├─ FocusContext: last focused, first launch off
//!                 ├─ focused pressable register (play/pause proxy)
//!                 ├─ back press → back handler stack, top first
//!                 └─ every listener in subscription order
//! ```
//!
//! Subscriptions are scoped: whoever subscribes on mount unsubscribes on
//! unmount with the returned id. `capture` temporarily swaps every listener
//! out for a single one (modal player controls) until `release`.
//!
//! A held back key repeats. Presses arriving inside `back_guard` of the last
//! one that reached the handler stack are dropped.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use log::debug;

use crate::core::action::Effect;
use crate::core::context::FocusContext;
use crate::core::debounce::DebouncedDispatcher;
use crate::core::event::{HwEvent, HwEventKind, RemoteKey};
use crate::core::focusable::NodeId;
use crate::core::overlay::BackOutcome;

pub type Listener = Box<dyn FnMut(&HwEvent, &FocusContext, Instant) -> Vec<Effect>>;
pub type BackHandler = Box<dyn FnMut() -> BackOutcome>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackHandlerId(u64);

/// Proof of an active capture; hand it back to [`HardwareKeyRouter::release`].
#[derive(Debug, PartialEq, Eq)]
pub struct CaptureToken {
    capture: u64,
    subscription: SubscriptionId,
}

struct Snapshot {
    capture: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

pub struct HardwareKeyRouter {
    listeners: Vec<(SubscriptionId, Listener)>,
    back_handlers: Vec<(BackHandlerId, BackHandler)>,
    captured: Vec<Snapshot>,
    pressables: HashSet<NodeId>,
    focused_pressable: Option<NodeId>,
    repeat_guard: DebouncedDispatcher<RemoteKey, ()>,
    next_id: u64,
}

impl Default for HardwareKeyRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareKeyRouter {
    /// Router without a back repeat guard.
    pub fn new() -> Self {
        Self::with_back_guard(Duration::ZERO)
    }

    pub fn with_back_guard(back_guard: Duration) -> Self {
        Self {
            listeners: Vec::new(),
            back_handlers: Vec::new(),
            captured: Vec::new(),
            pressables: HashSet::new(),
            focused_pressable: None,
            repeat_guard: DebouncedDispatcher::new(back_guard),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&HwEvent, &FocusContext, Instant) -> Vec<Effect> + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id());
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        if self.listeners.len() != before {
            return true;
        }
        // Might be parked behind a capture.
        for snapshot in self.captured.iter_mut() {
            let before = snapshot.listeners.len();
            snapshot.listeners.retain(|(existing, _)| *existing != id);
            if snapshot.listeners.len() != before {
                return true;
            }
        }
        false
    }

    #[cfg(test)]
    fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn push_back_handler(&mut self, handler: impl FnMut() -> BackOutcome + 'static) -> BackHandlerId {
        let id = BackHandlerId(self.next_id());
        self.back_handlers.push((id, Box::new(handler)));
        id
    }

    pub fn remove_back_handler(&mut self, id: BackHandlerId) -> bool {
        let before = self.back_handlers.len();
        self.back_handlers.retain(|(existing, _)| *existing != id);
        self.back_handlers.len() != before
    }

    /// Mark `node` as a media control that play/pause may press.
    pub fn register_pressable(&mut self, node: NodeId) {
        self.pressables.insert(node);
    }

    pub fn unregister_pressable(&mut self, node: NodeId) {
        self.pressables.remove(&node);
        if self.focused_pressable == Some(node) {
            self.focused_pressable = None;
        }
    }

    pub fn focused_pressable(&self) -> Option<NodeId> {
        self.focused_pressable
    }

    /// Route every event to `listener` alone until released.
    pub fn capture(
        &mut self,
        listener: impl FnMut(&HwEvent, &FocusContext, Instant) -> Vec<Effect> + 'static,
    ) -> CaptureToken {
        let capture = self.next_id();
        let listeners = std::mem::take(&mut self.listeners);
        debug!("router: capture {capture} parks {} listeners", listeners.len());
        self.captured.push(Snapshot { capture, listeners });
        let subscription = self.subscribe(listener);
        CaptureToken {
            capture,
            subscription,
        }
    }

    pub fn release(&mut self, token: CaptureToken) {
        self.unsubscribe(token.subscription);
        if let Some(index) = self.captured.iter().position(|s| s.capture == token.capture) {
            let snapshot = self.captured.remove(index);
            debug!(
                "router: release {} restores {} listeners",
                token.capture,
                snapshot.listeners.len()
            );
            let added = std::mem::replace(&mut self.listeners, snapshot.listeners);
            self.listeners.extend(added);
        }
    }

    /// Offer a back press to the handler stack, most recent first.
    pub fn press_back(&mut self) -> Vec<Effect> {
        for (id, handler) in self.back_handlers.iter_mut().rev() {
            if let BackOutcome::Handled(effects) = handler() {
                debug!("router: back handled by {id:?}");
                return effects;
            }
        }
        debug!("router: back press unhandled");
        Vec::new()
    }

    pub fn dispatch(&mut self, event: &HwEvent, ctx: &mut FocusContext, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();
        match (event.kind, event.node) {
            (HwEventKind::Focus, Some(node)) => {
                ctx.note_focus(node);
                self.focused_pressable = self.pressables.contains(&node).then_some(node);
            }
            (HwEventKind::Blur, Some(node)) => {
                if self.focused_pressable == Some(node) {
                    self.focused_pressable = None;
                }
            }
            (HwEventKind::Key(RemoteKey::PlayPause), _) => {
                if let Some(node) = self.focused_pressable {
                    debug!("router: play/pause presses {node}");
                    effects.push(Effect::Press(node));
                }
            }
            (HwEventKind::Key(RemoteKey::Back), _) => {
                self.repeat_guard.drain_due(now);
                if self.repeat_guard.is_pending(&RemoteKey::Back) {
                    debug!("router: back repeat dropped");
                } else {
                    if !self.repeat_guard.delay().is_zero() {
                        self.repeat_guard.call(RemoteKey::Back, (), now);
                    }
                    effects.extend(self.press_back());
                }
            }
            _ => {}
        }

        for (_, listener) in self.listeners.iter_mut() {
            effects.extend(listener(event, ctx, now));
        }
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(router: &mut HardwareKeyRouter, tag: &'static str, log: &Rc<RefCell<Vec<String>>>) -> SubscriptionId {
        let log = Rc::clone(log);
        router.subscribe(move |event, _, _| {
            log.borrow_mut().push(format!("{tag}:{:?}", event.kind));
            Vec::new()
        })
    }

    #[test]
    fn test_fan_out_and_unsubscribe() {
        let mut router = HardwareKeyRouter::new();
        let mut ctx = FocusContext::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = recorder(&mut router, "a", &log);
        recorder(&mut router, "b", &log);

        let now = Instant::now();
        router.dispatch(&HwEvent::focus(NodeId::from_raw(1)), &mut ctx, now);
        assert!(router.unsubscribe(a));
        assert!(!router.unsubscribe(a));
        router.dispatch(&HwEvent::blur(NodeId::from_raw(1)), &mut ctx, now);

        assert_eq!(*log.borrow(), vec!["a:Focus", "b:Focus", "b:Blur"]);
    }

    #[test]
    fn test_focus_updates_context_before_listeners() {
        let mut router = HardwareKeyRouter::new();
        let mut ctx = FocusContext::new();
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        router.subscribe(move |_, ctx, _| {
            *sink.borrow_mut() = Some((ctx.is_first_launch(), ctx.last_focused()));
            Vec::new()
        });

        let node = NodeId::from_raw(5);
        router.dispatch(&HwEvent::focus(node), &mut ctx, Instant::now());
        assert_eq!(*seen.borrow(), Some((false, Some(node))));
    }

    #[test]
    fn test_play_pause_presses_focused_pressable() {
        let mut router = HardwareKeyRouter::new();
        let mut ctx = FocusContext::new();
        let now = Instant::now();
        let play = NodeId::from_raw(10);
        let other = NodeId::from_raw(11);
        router.register_pressable(play);
        let play_pause = HwEvent::key(RemoteKey::PlayPause, None);

        assert!(router.dispatch(&play_pause, &mut ctx, now).is_empty());

        router.dispatch(&HwEvent::focus(play), &mut ctx, now);
        assert_eq!(router.dispatch(&play_pause, &mut ctx, now), vec![Effect::Press(play)]);

        // A non-pressable taking focus clears the register.
        router.dispatch(&HwEvent::focus(other), &mut ctx, now);
        assert!(router.dispatch(&play_pause, &mut ctx, now).is_empty());

        router.dispatch(&HwEvent::focus(play), &mut ctx, now);
        router.dispatch(&HwEvent::blur(play), &mut ctx, now);
        assert_eq!(router.focused_pressable(), None);
    }

    #[test]
    fn test_back_stack_is_lifo() {
        let mut router = HardwareKeyRouter::new();
        let bottom = router.push_back_handler(|| BackOutcome::Handled(vec![Effect::GoBack]));
        let top = router.push_back_handler(|| BackOutcome::Ignored);
        // Ignored by the top handler, so the one below answers.
        assert_eq!(router.press_back(), vec![Effect::GoBack]);

        let confirm = router.push_back_handler(|| BackOutcome::Handled(vec![Effect::ConfirmExit]));
        assert_eq!(router.press_back(), vec![Effect::ConfirmExit]);

        assert!(router.remove_back_handler(confirm));
        assert!(router.remove_back_handler(top));
        assert!(!router.remove_back_handler(top));
        assert_eq!(router.press_back(), vec![Effect::GoBack]);

        assert!(router.remove_back_handler(bottom));
        assert!(router.press_back().is_empty());
    }

    #[test]
    fn test_back_key_runs_stack_then_listeners() {
        let mut router = HardwareKeyRouter::new();
        let mut ctx = FocusContext::new();
        router.push_back_handler(|| BackOutcome::Handled(vec![Effect::GoBack]));
        router.subscribe(|event, _, _| {
            if event.is_key(RemoteKey::Back) {
                vec![Effect::ShowOverlay]
            } else {
                Vec::new()
            }
        });
        let effects = router.dispatch(&HwEvent::key(RemoteKey::Back, None), &mut ctx, Instant::now());
        assert_eq!(effects, vec![Effect::GoBack, Effect::ShowOverlay]);
    }

    #[test]
    fn test_back_repeat_inside_guard_is_dropped() {
        use std::time::Duration;

        let mut router = HardwareKeyRouter::with_back_guard(Duration::from_millis(120));
        let mut ctx = FocusContext::new();
        let t0 = Instant::now();
        router.push_back_handler(|| BackOutcome::Handled(vec![Effect::GoBack]));
        let back = HwEvent::key(RemoteKey::Back, None);

        assert_eq!(router.dispatch(&back, &mut ctx, t0), vec![Effect::GoBack]);
        assert!(router.dispatch(&back, &mut ctx, t0 + Duration::from_millis(50)).is_empty());
        assert_eq!(
            router.dispatch(&back, &mut ctx, t0 + Duration::from_millis(200)),
            vec![Effect::GoBack]
        );
    }

    #[test]
    fn test_capture_and_release_restore_listeners() {
        let mut router = HardwareKeyRouter::new();
        let mut ctx = FocusContext::new();
        let now = Instant::now();
        let log = Rc::new(RefCell::new(Vec::new()));
        recorder(&mut router, "screen", &log);
        let parked = recorder(&mut router, "parked", &log);

        let sink = Rc::clone(&log);
        let token = router.capture(move |_, _, _| {
            sink.borrow_mut().push("player".to_string());
            Vec::new()
        });
        assert_eq!(router.listener_count(), 1);
        router.dispatch(&HwEvent::key(RemoteKey::Select, None), &mut ctx, now);

        // Unsubscribing while parked still works.
        assert!(router.unsubscribe(parked));
        router.release(token);
        assert_eq!(router.listener_count(), 1);
        router.dispatch(&HwEvent::key(RemoteKey::Select, None), &mut ctx, now);

        assert_eq!(*log.borrow(), vec!["player", "screen:Key(Select)"]);
    }
}
