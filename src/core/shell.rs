//! # Focus Shell
//!
//! App-shell owner of the focus engine. It wires the components to the
//! router and applies the effects that only concern them.
//!
//! ```text
//! FocusShell
//! ├── context: FocusContext            // first launch, last focused
//! ├── router: HardwareKeyRouter        // pub/sub + back stack
//! ├── nodes: NodeAllocator
//! ├── overlay: Rc<RefCell<Overlay>>    // lives as long as the shell
//! ├── rails: Option<MountedRails>      // current rails or list screen
//! ├── go_back: Option<MountedGoBack>   // current detail screen
//! └── player: Option<MountedPlayer>    // media controls, capture the remote
//! ```
//!
//! Router listeners hold `Weak` references, so a listener outliving its
//! component does nothing. Everything runs on one thread.

use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};
use std::time::Instant;

use log::{error, info};

use crate::core::action::Effect;
use crate::core::catalog::{FocusAnchor, Item, Section};
use crate::core::config::ResolvedConfig;
use crate::core::context::FocusContext;
use crate::core::event::{HwEvent, HwEventKind, RemoteKey};
use crate::core::focusable::{NodeAllocator, NodeId};
use crate::core::go_back::GoBackButton;
use crate::core::overlay::{BackOutcome, CollapsibleNavOverlay, OverlayState};
use crate::core::rails::{RailVirtualizer, RenderPlan};
use crate::core::router::{BackHandlerId, CaptureToken, HardwareKeyRouter, SubscriptionId};

struct MountedRails {
    rails: Rc<RefCell<RailVirtualizer>>,
    subscription: SubscriptionId,
}

struct MountedGoBack {
    button: Rc<RefCell<GoBackButton>>,
    subscription: SubscriptionId,
    back_handler: BackHandlerId,
}

struct MountedPlayer {
    play: NodeId,
    capture: CaptureToken,
}

pub struct FocusShell {
    config: ResolvedConfig,
    context: FocusContext,
    router: HardwareKeyRouter,
    nodes: NodeAllocator,
    overlay: Rc<RefCell<CollapsibleNavOverlay>>,
    rails: Option<MountedRails>,
    go_back: Option<MountedGoBack>,
    player: Option<MountedPlayer>,
}

impl FocusShell {
    pub fn new(config: ResolvedConfig) -> Self {
        let mut nodes = NodeAllocator::new();
        let overlay = Rc::new(RefCell::new(CollapsibleNavOverlay::new(
            &config.menu,
            config.overlay.can_exit,
            &mut nodes,
        )));

        let mut router = HardwareKeyRouter::with_back_guard(config.timing.back_guard);
        let weak = Rc::downgrade(&overlay);
        router.subscribe(move |event, _, _| {
            weak.upgrade()
                .map(|overlay| overlay.borrow_mut().on_hw_event(event))
                .unwrap_or_default()
        });
        let weak = Rc::downgrade(&overlay);
        router.push_back_handler(move || {
            weak.upgrade()
                .map_or(BackOutcome::Ignored, |overlay| overlay.borrow_mut().on_back())
        });

        Self {
            config,
            context: FocusContext::new(),
            router,
            nodes,
            overlay,
            rails: None,
            go_back: None,
            player: None,
        }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn context(&self) -> &FocusContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut FocusContext {
        &mut self.context
    }

    pub fn overlay(&self) -> Ref<'_, CollapsibleNavOverlay> {
        self.overlay.borrow()
    }

    pub fn overlay_state(&self) -> OverlayState {
        self.overlay.borrow().state()
    }

    pub fn overlay_width(&self) -> u16 {
        self.overlay.borrow().width(&self.config.overlay)
    }

    pub fn allocate_node(&mut self) -> NodeId {
        self.nodes.allocate()
    }

    // ------------------------------------------------------------------
    // Screens
    // ------------------------------------------------------------------

    /// Mount a rails screen and resolve where focus should land on it.
    pub fn mount_rails(
        &mut self,
        sections: Vec<Section>,
        anchor: Option<FocusAnchor>,
        now: Instant,
    ) -> Vec<Effect> {
        let anchor = anchor.unwrap_or_default();
        self.mount_sections(sections, now, |rails, ctx, now| {
            rails.activate(&anchor, ctx, now)
        })
    }

    /// Mount a single-list screen. Focus lands on `target_id` when it is
    /// still listed, else on the first item; no target leaves focus alone.
    pub fn mount_list(
        &mut self,
        title: impl Into<String>,
        items: Vec<Item>,
        target_id: Option<&str>,
        now: Instant,
    ) -> Vec<Effect> {
        let sections = vec![Section::new(0, title, items)];
        self.mount_sections(sections, now, |rails, _, now| {
            rails.activate_list(target_id, now)
        })
    }

    fn mount_sections(
        &mut self,
        sections: Vec<Section>,
        now: Instant,
        activate: impl FnOnce(&mut RailVirtualizer, &FocusContext, Instant) -> Vec<Effect>,
    ) -> Vec<Effect> {
        self.unmount_rails();
        let rails = Rc::new(RefCell::new(RailVirtualizer::new(
            sections,
            self.config.windowing,
            self.config.timing,
            &mut self.nodes,
        )));
        let weak: Weak<RefCell<RailVirtualizer>> = Rc::downgrade(&rails);
        let subscription = self.router.subscribe(move |event, _, now| {
            weak.upgrade()
                .map(|rails| rails.borrow_mut().on_hw_event(event, now))
                .unwrap_or_default()
        });

        let effects = activate(&mut rails.borrow_mut(), &self.context, now);
        self.rails = Some(MountedRails {
            rails,
            subscription,
        });
        self.apply(effects)
    }

    pub fn unmount_rails(&mut self) {
        if let Some(mounted) = self.rails.take() {
            self.router.unsubscribe(mounted.subscription);
            mounted.rails.borrow_mut().unmount();
        }
    }

    pub fn rails(&self) -> Option<Ref<'_, RailVirtualizer>> {
        self.rails.as_ref().map(|m| m.rails.borrow())
    }

    pub fn render_rails(&mut self) -> Option<RenderPlan> {
        let mounted = self.rails.as_ref()?;
        let plan = mounted.rails.borrow_mut().render(&mut self.nodes);
        Some(plan)
    }

    /// Mount the back button of a detail screen opened from `origin`.
    pub fn mount_go_back(&mut self, origin: Option<String>, anchor: Option<FocusAnchor>) -> NodeId {
        self.unmount_go_back();
        let node = self.nodes.allocate();
        let button = Rc::new(RefCell::new(GoBackButton::new(node, origin, anchor)));

        let weak = Rc::downgrade(&button);
        let subscription = self.router.subscribe(move |event, _, _| {
            weak.upgrade()
                .map(|button| button.borrow_mut().on_hw_event(event))
                .unwrap_or_default()
        });
        let weak = Rc::downgrade(&button);
        let back_handler = self.router.push_back_handler(move || {
            weak.upgrade()
                .map_or(BackOutcome::Ignored, |button| button.borrow_mut().on_back())
        });

        self.go_back = Some(MountedGoBack {
            button,
            subscription,
            back_handler,
        });
        node
    }

    pub fn unmount_go_back(&mut self) {
        if let Some(mounted) = self.go_back.take() {
            self.router.unsubscribe(mounted.subscription);
            self.router.remove_back_handler(mounted.back_handler);
        }
    }

    pub fn go_back_button(&self) -> Option<Ref<'_, GoBackButton>> {
        self.go_back.as_ref().map(|m| m.button.borrow())
    }

    /// Full-bleed playback takes the back button out of reach.
    pub fn set_go_back_accessible(&mut self, accessible: bool) {
        if let Some(mounted) = &self.go_back {
            mounted.button.borrow_mut().set_accessible(accessible);
        }
    }

    /// Mount the media controls of a detail screen. Until `unmount_player`
    /// they own the remote: every listener mounted before them is parked,
    /// and select on `play` presses it.
    pub fn mount_player(&mut self, play: NodeId) {
        self.unmount_player();
        self.router.register_pressable(play);
        let capture = self.router.capture(move |event, _, _| match event.kind {
            HwEventKind::Key(RemoteKey::Select) if event.node == Some(play) => {
                vec![Effect::Press(play)]
            }
            _ => Vec::new(),
        });
        self.player = Some(MountedPlayer { play, capture });
    }

    pub fn unmount_player(&mut self) {
        if let Some(player) = self.player.take() {
            self.router.unregister_pressable(player.play);
            self.router.release(player.capture);
        }
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Feed one raw platform event through the router.
    pub fn handle_event(&mut self, event: HwEvent, now: Instant) -> Vec<Effect> {
        let effects = self.router.dispatch(&event, &mut self.context, now);
        self.apply(effects)
    }

    pub fn press_back(&mut self, now: Instant) -> Vec<Effect> {
        let focused = self.context.last_focused();
        self.handle_event(HwEvent::key(RemoteKey::Back, focused), now)
    }

    /// Run deferred handlers that are due.
    pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
        let effects = match &self.rails {
            Some(mounted) => mounted.rails.borrow_mut().tick(now),
            None => Vec::new(),
        };
        self.apply(effects)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.rails
            .as_ref()
            .and_then(|m| m.rails.borrow().next_deadline())
    }

    pub fn select_menu_entry(&mut self, route: &str) -> Vec<Effect> {
        let result = self.overlay.borrow_mut().select_entry(route);
        match result {
            Ok(effects) => self.apply(effects),
            Err(e) => {
                error!("Menu navigation failed: {e}");
                Vec::new()
            }
        }
    }

    pub fn resolve_exit(&mut self, confirmed: bool) -> Vec<Effect> {
        let effects = self.overlay.borrow_mut().resolve_exit(confirmed);
        self.apply(effects)
    }

    pub fn show_overlay(&mut self) {
        self.overlay.borrow_mut().show();
    }

    pub fn hide_overlay(&mut self) {
        self.overlay.borrow_mut().hide();
    }

    /// Logout: forget focus history and tear down screens.
    pub fn reset(&mut self) {
        info!("Focus shell reset");
        self.unmount_player();
        self.unmount_go_back();
        self.unmount_rails();
        self.context.reset();
        let mut overlay = self.overlay.borrow_mut();
        overlay.unlock();
        overlay.show();
    }

    /// Consume internal effects, return the rest for the platform.
    fn apply(&mut self, effects: Vec<Effect>) -> Vec<Effect> {
        let mut out = Vec::with_capacity(effects.len());
        for effect in effects {
            let mut overlay = self.overlay.borrow_mut();
            match effect {
                Effect::LockOverlay => overlay.lock(),
                Effect::UnlockOverlay => overlay.unlock(),
                Effect::ShowOverlay => overlay.show(),
                Effect::HideOverlay => overlay.hide(),
                Effect::FocusMenu => out.extend(overlay.focus_current_entry()),
                other => out.push(other),
            }
        }
        out
    }
}
