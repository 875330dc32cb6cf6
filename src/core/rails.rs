//! # Rail Virtualizer
//!
//! Windowed rendering of sections × items with scroll/focus reconciliation.
//!
//! ```text
//!   outer list (sections)          inner lists (items per rail)
//!   ┌──────────────────────┐
//!   │ rail 3  ◀ a b [c] d ▶│  ← only `item_window` items materialized
//!   │ rail 4  ◀ e f  g  h ▶│
//!   │ rail 5  ◀ i j  k    ▶│  ← only `section_window` rails materialized
//!   └──────────────────────┘
//!     sentinel (invisible)    ← focus here jumps back to rail 0
//! ```
//!
//! Three scroll positions move independently: the outer list, each rail,
//! and the endless-scroll sentinel's jump to the top. They are reconciled
//! with the focused item through deferred work queued on a
//! [`DebouncedDispatcher`] and drained by [`RailVirtualizer::tick`]:
//!
//! - viewability evaluation after every scroll (clears jump flags),
//! - rail-focus-changed notification (debounced against key repeat),
//! - focus settle (records the current position),
//! - scroll retry when the target index is not measured yet.
//!
//! Each list keeps a measured high-water mark. A scroll to an index past it
//! fails, grows the list by one batch, and is retried after `scroll_retry`.

use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::time::Instant;

use log::{debug, info};

use crate::core::action::{Effect, ScrollRequest, ScrollTarget};
use crate::core::catalog::{FocusAnchor, Section};
use crate::core::config::{Timing, Windowing};
use crate::core::context::FocusContext;
use crate::core::debounce::DebouncedDispatcher;
use crate::core::event::{HwEvent, HwEventKind};
use crate::core::focusable::{NodeAllocator, NodeId};
use crate::core::resolver::{FocusPosition, Resolution, resolve_in_list};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ListCursor {
    offset: usize,
    measured: usize,
}

impl ListCursor {
    fn new(measured: usize) -> Self {
        Self {
            offset: 0,
            measured,
        }
    }
}

/// Programmatic "jump to remembered position" in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingJump {
    target: FocusPosition,
    sections_in_flight: bool,
    rail_in_flight: bool,
    focus_pending: bool,
}

impl PendingJump {
    fn scrolling(&self) -> bool {
        self.sections_in_flight || self.rail_in_flight
    }

    fn done(&self) -> bool {
        !self.scrolling() && !self.focus_pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RailTimer {
    SectionsViewability,
    RailViewability(usize),
    RailFocus,
    Settle,
    Retry(ScrollTarget),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RailTask {
    EvaluateSections,
    EvaluateRail(usize),
    RailFocusChanged { item_id: String, section_index: usize },
    Settle(FocusPosition),
    Retry(ScrollRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedItem {
    pub item_index: usize,
    pub item_id: String,
    pub title: String,
    pub node: NodeId,
    /// Should take focus as soon as it is on screen.
    pub preferred: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSection {
    pub section_index: usize,
    pub title: String,
    pub items: Vec<RenderedItem>,
    pub item_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPlan {
    pub sections: Vec<RenderedSection>,
    pub section_count: usize,
    pub sentinel: NodeId,
    pub sentinel_accessible: bool,
}

impl RenderPlan {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn preferred(&self) -> Option<NodeId> {
        self.sections
            .iter()
            .flat_map(|s| s.items.iter())
            .find(|item| item.preferred)
            .map(|item| item.node)
    }
}

pub struct RailVirtualizer {
    sections: Vec<Section>,
    windowing: Windowing,
    timing: Timing,
    outer: ListCursor,
    rails: Vec<ListCursor>,
    nodes: HashMap<NodeId, FocusPosition>,
    slots: HashMap<FocusPosition, NodeId>,
    sentinel: NodeId,
    /// Last raw focus landed on a rail item or the sentinel.
    focus_inside: bool,
    current_position: Option<FocusPosition>,
    prev_rail_request: Option<usize>,
    /// Rail request that arrived while a jump was scrolling.
    blocked_rail_request: Option<usize>,
    prev_focused_section: Option<usize>,
    jump: Option<PendingJump>,
    scroll_to_top: bool,
    focused_item_id: Option<String>,
    focused_section: Option<usize>,
    timers: DebouncedDispatcher<RailTimer, RailTask>,
}

impl RailVirtualizer {
    pub fn new(
        sections: Vec<Section>,
        windowing: Windowing,
        timing: Timing,
        nodes: &mut NodeAllocator,
    ) -> Self {
        let mut rails = Self {
            sections: Vec::new(),
            windowing,
            timing,
            outer: ListCursor::new(windowing.initial_sections),
            rails: Vec::new(),
            nodes: HashMap::new(),
            slots: HashMap::new(),
            sentinel: nodes.allocate(),
            focus_inside: false,
            current_position: None,
            prev_rail_request: None,
            blocked_rail_request: None,
            prev_focused_section: None,
            jump: None,
            scroll_to_top: false,
            focused_item_id: None,
            focused_section: None,
            timers: DebouncedDispatcher::new(timing.viewability_debounce),
        };
        rails.set_sections(sections);
        rails
    }

    /// Replace the dataset snapshot. Registrations are dropped; the next
    /// `render` materializes fresh nodes.
    pub fn set_sections(&mut self, sections: Vec<Section>) {
        debug!("rails: new snapshot with {} sections", sections.len());
        self.outer = ListCursor::new(self.windowing.initial_sections);
        self.rails = sections
            .iter()
            .map(|_| ListCursor::new(self.windowing.initial_items))
            .collect();
        self.sections = sections;
        self.nodes.clear();
        self.slots.clear();
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Materialize the current window, registering nodes for items entering
    /// it and dropping registrations for items leaving it.
    pub fn render(&mut self, nodes: &mut NodeAllocator) -> RenderPlan {
        let outer_range = window(
            self.outer.offset,
            self.windowing.section_window,
            self.sections.len(),
        );
        self.outer.measured = self.outer.measured.max(outer_range.end);

        let preferred_target = self
            .jump
            .filter(|jump| jump.focus_pending)
            .map(|jump| jump.target);

        let mut live = HashSet::new();
        let mut rendered = Vec::with_capacity(outer_range.len());
        for section_index in outer_range {
            let section = &self.sections[section_index];
            let cursor = &mut self.rails[section_index];
            let item_range = window(cursor.offset, self.windowing.item_window, section.items.len());
            cursor.measured = cursor.measured.max(item_range.end);

            let mut items = Vec::with_capacity(item_range.len());
            for item_index in item_range {
                let item = &section.items[item_index];
                let position = FocusPosition::new(section_index, item_index);
                let node = match self.slots.get(&position) {
                    Some(node) => *node,
                    None => {
                        let node = nodes.allocate();
                        self.slots.insert(position, node);
                        self.nodes.insert(node, position);
                        node
                    }
                };
                live.insert(position);
                items.push(RenderedItem {
                    item_index,
                    item_id: item.id.clone(),
                    title: item.title.clone(),
                    node,
                    preferred: preferred_target == Some(position),
                });
            }
            rendered.push(RenderedSection {
                section_index,
                title: section.title.clone(),
                items,
                item_count: section.items.len(),
            });
        }

        self.slots.retain(|position, _| live.contains(position));
        self.nodes.retain(|_, position| live.contains(position));

        RenderPlan {
            sections: rendered,
            section_count: self.sections.len(),
            sentinel: self.sentinel,
            sentinel_accessible: self.sentinel_accessible(),
        }
    }

    // ------------------------------------------------------------------
    // Activation and scrolling
    // ------------------------------------------------------------------

    /// Resolve the initial focus for this screen activation and start the
    /// programmatic jump towards it.
    pub fn activate(&mut self, anchor: &FocusAnchor, ctx: &FocusContext, now: Instant) -> Vec<Effect> {
        let resolution = ctx.resolve(anchor, &self.sections);
        self.start(resolution, now)
    }

    /// Activation of a single-list screen: the list is the first section and
    /// focus lands on `target_id`, or on the first item when it is gone.
    pub fn activate_list(&mut self, target_id: Option<&str>, now: Instant) -> Vec<Effect> {
        let items = self.sections.first().map_or(&[][..], |s| s.items.as_slice());
        let resolution = resolve_in_list(target_id, items);
        self.start(resolution, now)
    }

    fn start(&mut self, resolution: Resolution, now: Instant) -> Vec<Effect> {
        match resolution {
            Resolution::DeferToMenu => {
                info!("rails: nothing to focus, deferring to menu");
                vec![Effect::FocusMenu]
            }
            Resolution::NoPosition => {
                debug!("rails: no initial focus position");
                Vec::new()
            }
            Resolution::At(target) => {
                debug!(
                    "rails: jumping to ({}, {})",
                    target.section_index, target.item_index
                );
                self.jump = Some(PendingJump {
                    target,
                    sections_in_flight: true,
                    rail_in_flight: true,
                    focus_pending: true,
                });
                self.prev_rail_request = Some(target.section_index);
                self.run_jump(now)
            }
        }
    }

    fn run_jump(&mut self, now: Instant) -> Vec<Effect> {
        let Some(jump) = self.jump else {
            return Vec::new();
        };
        let mut effects = Vec::new();
        if jump.sections_in_flight {
            effects.extend(self.try_scroll(
                ScrollRequest {
                    target: ScrollTarget::Sections,
                    index: jump.target.section_index,
                    animated: false,
                },
                now,
            ));
        }
        if jump.rail_in_flight {
            effects.extend(self.try_scroll(
                ScrollRequest {
                    target: ScrollTarget::Rail(jump.target.section_index),
                    index: jump.target.item_index,
                    animated: false,
                },
                now,
            ));
        }
        effects
    }

    pub fn jump_in_flight(&self) -> bool {
        self.jump.is_some_and(|jump| jump.scrolling())
    }

    /// Bring section `index` into view, unless a jump is still in flight or
    /// this is a repeat of the previous request.
    pub fn scroll_to_rail(&mut self, index: usize, now: Instant) -> Vec<Effect> {
        if self.jump_in_flight() {
            debug!("rails: scroll to rail {index} held until the jump lands");
            self.blocked_rail_request = Some(index);
            return Vec::new();
        }
        if self.prev_rail_request == Some(index) {
            return Vec::new();
        }
        self.prev_rail_request = Some(index);
        self.try_scroll(
            ScrollRequest {
                target: ScrollTarget::Sections,
                index,
                animated: true,
            },
            now,
        )
    }

    /// Scroll rail `section_index` to `item_index`. Only honored when the
    /// rail is the one focused immediately before.
    pub fn scroll_to_item(&mut self, section_index: usize, item_index: usize, now: Instant) -> Vec<Effect> {
        let previous = self.prev_focused_section.replace(section_index);
        if previous != Some(section_index) {
            debug!("rails: stale scroll for rail {section_index} dropped");
            return Vec::new();
        }
        self.try_scroll(
            ScrollRequest {
                target: ScrollTarget::Rail(section_index),
                index: item_index,
                animated: true,
            },
            now,
        )
    }

    fn try_scroll(&mut self, request: ScrollRequest, now: Instant) -> Vec<Effect> {
        let (len, batch) = match request.target {
            ScrollTarget::Sections => (self.sections.len(), self.windowing.sections_per_batch),
            ScrollTarget::Rail(s) => match self.sections.get(s) {
                Some(section) => (section.items.len(), self.windowing.items_per_batch),
                None => (0, 0),
            },
        };

        if request.index >= len {
            debug!(
                "rails: scroll to {} in {:?} is out of range ({len})",
                request.index, request.target
            );
            self.abandon_jump(request.target);
            return Vec::new();
        }

        let Some(cursor) = self.cursor_mut(request.target) else {
            return Vec::new();
        };
        if request.index < cursor.measured {
            cursor.offset = request.index;
            self.timers.cancel(&RailTimer::Retry(request.target));
            self.schedule_viewability(request.target, now);
            return vec![Effect::Scroll(request)];
        }

        cursor.measured = (cursor.measured + batch).min(len);
        debug!(
            "rails: {} in {:?} not measured yet, retrying in {:?}",
            request.index, request.target, self.timing.scroll_retry
        );
        self.timers.defer(
            RailTimer::Retry(request.target),
            RailTask::Retry(request),
            now,
            self.timing.scroll_retry,
        );
        Vec::new()
    }

    fn cursor_mut(&mut self, target: ScrollTarget) -> Option<&mut ListCursor> {
        match target {
            ScrollTarget::Sections => Some(&mut self.outer),
            ScrollTarget::Rail(s) => self.rails.get_mut(s),
        }
    }

    fn abandon_jump(&mut self, target: ScrollTarget) {
        if let Some(jump) = self.jump.as_mut() {
            match target {
                ScrollTarget::Sections => jump.sections_in_flight = false,
                ScrollTarget::Rail(_) => jump.rail_in_flight = false,
            }
        }
        self.finish_jump_if_done();
    }

    fn finish_jump_if_done(&mut self) {
        if self.jump.is_some_and(|jump| jump.done()) {
            debug!("rails: jump complete");
            self.jump = None;
        }
    }

    fn schedule_viewability(&mut self, target: ScrollTarget, now: Instant) {
        match target {
            ScrollTarget::Sections => {
                self.timers
                    .call(RailTimer::SectionsViewability, RailTask::EvaluateSections, now)
            }
            ScrollTarget::Rail(s) => {
                self.timers
                    .call(RailTimer::RailViewability(s), RailTask::EvaluateRail(s), now)
            }
        }
    }

    // ------------------------------------------------------------------
    // Hardware events
    // ------------------------------------------------------------------

    /// Router listener entry point.
    pub fn on_hw_event(&mut self, event: &HwEvent, now: Instant) -> Vec<Effect> {
        let Some(node) = event.node else {
            return Vec::new();
        };
        match event.kind {
            HwEventKind::Blur => {
                if self.owns(node) {
                    self.focus_inside = false;
                }
                Vec::new()
            }
            HwEventKind::Focus => {
                self.focus_inside = self.owns(node);
                if node == self.sentinel {
                    self.on_sentinel_focus(now)
                } else if let Some(position) = self.nodes.get(&node).copied() {
                    self.on_item_focus(position, now)
                } else {
                    Vec::new()
                }
            }
            HwEventKind::Key(_) => Vec::new(),
        }
    }

    fn on_item_focus(&mut self, position: FocusPosition, now: Instant) -> Vec<Effect> {
        if let Some(jump) = self.jump.as_mut() {
            jump.focus_pending = false;
            if jump.target != position {
                let target = jump.target;
                self.drop_jump(target, position);
            }
        }
        self.finish_jump_if_done();

        self.timers.defer(
            RailTimer::Settle,
            RailTask::Settle(position),
            now,
            self.timing.focus_settle,
        );

        let mut effects = self.scroll_to_rail(position.section_index, now);
        effects.extend(self.scroll_to_item(position.section_index, position.item_index, now));

        if let Some(item) = self
            .sections
            .get(position.section_index)
            .and_then(|s| s.items.get(position.item_index))
        {
            self.timers.defer(
                RailTimer::RailFocus,
                RailTask::RailFocusChanged {
                    item_id: item.id.clone(),
                    section_index: position.section_index,
                },
                now,
                self.timing.rail_focus_debounce,
            );
        }
        effects
    }

    /// The user moved focus elsewhere before the jump landed. Its pending
    /// scrolls would drag the windows away from the focused item.
    fn drop_jump(&mut self, target: FocusPosition, focused: FocusPosition) {
        debug!(
            "rails: focus on ({}, {}) before the jump to ({}, {}) landed, dropping it",
            focused.section_index, focused.item_index, target.section_index, target.item_index
        );
        self.jump = None;
        self.blocked_rail_request = None;
        self.timers.cancel(&RailTimer::Retry(ScrollTarget::Sections));
        self.timers
            .cancel(&RailTimer::Retry(ScrollTarget::Rail(target.section_index)));
    }

    fn on_sentinel_focus(&mut self, now: Instant) -> Vec<Effect> {
        info!("rails: endless scroll back to the first rail");
        self.scroll_to_top = true;
        self.jump = None;
        self.blocked_rail_request = None;
        self.prev_rail_request = Some(0);
        let mut effects = vec![Effect::LockOverlay];
        for target in [ScrollTarget::Sections, ScrollTarget::Rail(0)] {
            effects.extend(self.try_scroll(
                ScrollRequest {
                    target,
                    index: 0,
                    animated: false,
                },
                now,
            ));
        }
        if self.sections.first().is_some_and(|s| s.items.is_empty()) {
            // Nothing to land on; evaluation hands focus to the menu.
            self.schedule_viewability(ScrollTarget::Sections, now);
        }
        effects
    }

    // ------------------------------------------------------------------
    // Deferred work
    // ------------------------------------------------------------------

    /// Run every deferred handler due at `now`.
    pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();
        for (_, task) in self.timers.drain_due(now) {
            effects.extend(self.run_task(task, now));
            effects.extend(self.replay_blocked_rail(now));
        }
        effects
    }

    fn replay_blocked_rail(&mut self, now: Instant) -> Vec<Effect> {
        if self.jump_in_flight() {
            return Vec::new();
        }
        match self.blocked_rail_request.take() {
            Some(index) => {
                debug!("rails: jump landed, replaying scroll to rail {index}");
                self.scroll_to_rail(index, now)
            }
            None => Vec::new(),
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    fn run_task(&mut self, task: RailTask, now: Instant) -> Vec<Effect> {
        match task {
            RailTask::EvaluateSections => self.evaluate_sections(now),
            RailTask::EvaluateRail(section_index) => {
                if let Some(jump) = self.jump.as_mut()
                    && jump.rail_in_flight
                    && jump.target.section_index == section_index
                    && self.slots.contains_key(&jump.target)
                {
                    jump.rail_in_flight = false;
                }
                self.finish_jump_if_done();
                Vec::new()
            }
            RailTask::RailFocusChanged {
                item_id,
                section_index,
            } => {
                self.focused_item_id = Some(item_id.clone());
                let mut effects = vec![Effect::ItemFocused { item_id }];
                if self.focused_section != Some(section_index) {
                    self.focused_section = Some(section_index);
                    effects.push(Effect::SectionChanged { section_index });
                }
                effects
            }
            RailTask::Settle(position) => {
                self.current_position = Some(position);
                Vec::new()
            }
            RailTask::Retry(request) => {
                if self.jump_in_flight() {
                    self.run_jump(now)
                } else {
                    self.try_scroll(request, now)
                }
            }
        }
    }

    fn evaluate_sections(&mut self, now: Instant) -> Vec<Effect> {
        if let Some(jump) = self.jump.as_mut() {
            jump.sections_in_flight = false;
        }
        self.finish_jump_if_done();

        if !self.scroll_to_top {
            return Vec::new();
        }
        if self.sections.first().is_none_or(|s| s.items.is_empty()) {
            self.scroll_to_top = false;
            return vec![Effect::UnlockOverlay, Effect::FocusMenu];
        }
        let first = FocusPosition::INITIAL;
        match self.slots.get(&first).copied() {
            Some(node) if self.outer.offset == 0 => {
                self.scroll_to_top = false;
                vec![Effect::RequestFocus(node), Effect::UnlockOverlay]
            }
            _ => {
                // First rail not on screen yet.
                self.schedule_viewability(ScrollTarget::Sections, now);
                Vec::new()
            }
        }
    }

    /// Cancel every pending handler and retry.
    pub fn unmount(&mut self) {
        let cancelled = self.timers.cancel_all();
        debug!("rails: unmounted, {cancelled} pending handlers cancelled");
        self.jump = None;
        self.scroll_to_top = false;
        self.focus_inside = false;
        self.prev_rail_request = None;
        self.blocked_rail_request = None;
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn sentinel(&self) -> NodeId {
        self.sentinel
    }

    /// Rail item nodes plus the sentinel.
    pub fn owns(&self, node: NodeId) -> bool {
        node == self.sentinel || self.nodes.contains_key(&node)
    }

    pub fn sentinel_accessible(&self) -> bool {
        let len = self.sections.len();
        len > 2
            && self.focus_inside
            && self
                .current_position
                .is_some_and(|p| p.section_index + 1 == len)
    }

    pub fn current_position(&self) -> Option<FocusPosition> {
        self.current_position
    }

    pub fn focused_item_id(&self) -> Option<&str> {
        self.focused_item_id.as_deref()
    }

    pub fn position_of(&self, node: NodeId) -> Option<FocusPosition> {
        self.nodes.get(&node).copied()
    }

    pub fn node_at(&self, position: FocusPosition) -> Option<NodeId> {
        self.slots.get(&position).copied()
    }

    /// Current node of `item_id` in `section_index`, if materialized.
    pub fn focused_node_for(&self, item_id: &str, section_index: usize) -> Option<NodeId> {
        let item_index = self.sections.get(section_index)?.position_of(item_id)?;
        self.node_at(FocusPosition::new(section_index, item_index))
    }

    /// Anchor describing the item at `position`, for carrying across navigation.
    pub fn anchor_for(&self, position: FocusPosition) -> Option<FocusAnchor> {
        let item = self
            .sections
            .get(position.section_index)?
            .items
            .get(position.item_index)?;
        Some(FocusAnchor::for_item(
            item.id.clone(),
            position.section_index,
            position.item_index,
        ))
    }

    #[cfg(test)]
    fn is_scroll_to_top_pending(&self) -> bool {
        self.scroll_to_top
    }

    pub fn outer_offset(&self) -> usize {
        self.outer.offset
    }

    pub fn rail_offset(&self, section_index: usize) -> Option<usize> {
        self.rails.get(section_index).map(|c| c.offset)
    }
}

/// Index range of at most `size` entries around `offset`, clamped to `len`.
fn window(offset: usize, size: usize, len: usize) -> Range<usize> {
    let start = offset
        .saturating_sub(size / 2)
        .min(len.saturating_sub(size));
    start..(start + size).min(len)
}
