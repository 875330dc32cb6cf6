//! # Simulated Platform
//!
//! Stands in for the TV's native focus system. It owns the on-screen
//! [`FocusableElement`]s, runs the directional focus search, and reports
//! the resulting focus changes as raw [`HwEvent`]s.
//!
//! Elements sit on a logical grid instead of pixel rectangles:
//!
//! ```text
//!  Menu(0)   │ Item(0,0) Item(0,1) Item(0,2) …
//!  Menu(1)   │ Item(1,0) Item(1,1) …
//!  …         │ …
//!  Exit      │ Sentinel (when accessible)
//! ```
//!
//! Search order for a directional press: a pinned direction keeps focus
//! where it is, otherwise the grid neighbour wins. Inaccessible elements
//! are never targets.

use std::collections::HashMap;

use log::debug;

use crate::core::event::HwEvent;
use crate::core::focusable::{Direction, Focusable, FocusableElement, MoveCaps, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Menu row; `current` marks the entry of the screen shown.
    Menu { row: usize, current: bool },
    Exit,
    /// `column` is the on-screen position inside the rail window.
    Item {
        section: usize,
        item: usize,
        column: usize,
    },
    Sentinel,
    GoBack,
    Play,
}

impl Slot {
    fn is_menu(self) -> bool {
        matches!(self, Slot::Menu { .. } | Slot::Exit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneNode {
    pub node: NodeId,
    pub slot: Slot,
    pub caps: MoveCaps,
    pub accessible: bool,
}

impl SceneNode {
    pub fn new(node: NodeId, slot: Slot) -> Self {
        Self {
            node,
            slot,
            caps: MoveCaps::default(),
            accessible: true,
        }
    }

    pub fn with_caps(mut self, caps: MoveCaps) -> Self {
        self.caps = caps;
        self
    }

    pub fn accessible(mut self, accessible: bool) -> Self {
        self.accessible = accessible;
        self
    }
}

struct Placed {
    element: FocusableElement,
    slot: Slot,
    /// Sequence number of the last focus request aimed at this element.
    requested_at: u64,
}

#[derive(Default)]
pub struct Platform {
    placed: HashMap<NodeId, Placed>,
    focused: Option<NodeId>,
    /// Last non-menu element that held focus.
    last_content: Option<NodeId>,
    /// Force-focus request for a node not on screen yet.
    pending_request: Option<(NodeId, u64)>,
    next_request: u64,
}

impl Platform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn slot_of(&self, node: NodeId) -> Option<Slot> {
        self.placed.get(&node).map(|p| p.slot)
    }

    pub fn is_focused(&self, node: NodeId) -> bool {
        self.placed
            .get(&node)
            .is_some_and(|p| p.element.is_focused())
    }

    /// Replace the scene. Elements keep their focus state across frames.
    pub fn sync(&mut self, scene: &[SceneNode]) {
        let mut next = HashMap::with_capacity(scene.len());
        for entry in scene {
            let mut placed = self.placed.remove(&entry.node).unwrap_or_else(|| Placed {
                element: FocusableElement::new(entry.node),
                slot: entry.slot,
                requested_at: 0,
            });
            placed.slot = entry.slot;
            placed.element.caps = entry.caps;
            placed.element.accessible = entry.accessible;
            next.insert(entry.node, placed);
        }
        self.placed = next;
        if let Some(node) = self.focused
            && !self.placed.contains_key(&node)
        {
            debug!("platform: focused {node} left the screen");
            self.focused = None;
        }
    }

    /// Imperative "take focus" for `node`, honoured on the next `settle`.
    pub fn request_focus(&mut self, node: NodeId) {
        self.next_request += 1;
        let seq = self.next_request;
        match self.placed.get_mut(&node) {
            Some(placed) => {
                placed.element.request_focus();
                placed.requested_at = seq;
            }
            None => self.pending_request = Some((node, seq)),
        }
    }

    /// Move focus to the element that asked for it most recently. Every
    /// other request made since the last settle is dropped.
    pub fn settle(&mut self) -> Vec<HwEvent> {
        if let Some((node, seq)) = self.pending_request
            && let Some(placed) = self.placed.get_mut(&node)
        {
            placed.element.request_focus();
            placed.requested_at = seq;
            self.pending_request = None;
        }
        let latest = self
            .placed
            .values_mut()
            .filter_map(|p| {
                p.element
                    .take_preferred_focus()
                    .then(|| (p.requested_at, p.element.handle()))
            })
            .max();
        match latest {
            Some((_, node)) => self.focus_to(node),
            None => Vec::new(),
        }
    }

    /// Directional press. Returns the blur/focus pair when focus moved.
    pub fn navigate(&mut self, direction: Direction) -> Vec<HwEvent> {
        let Some(current) = self.focused else {
            return match self.fallback_target() {
                Some(node) => self.focus_to(node),
                None => Vec::new(),
            };
        };
        let Some(placed) = self.placed.get(&current) else {
            return Vec::new();
        };
        if placed.element.next_focus_override(direction).is_some() {
            debug!("platform: {current} pinned {direction:?}");
            return Vec::new();
        }
        match self.neighbour(placed.slot, direction) {
            Some(target) => self.focus_to(target),
            None => Vec::new(),
        }
    }

    fn focus_to(&mut self, target: NodeId) -> Vec<HwEvent> {
        if self.focused == Some(target) {
            return Vec::new();
        }
        let mut events = Vec::with_capacity(2);
        if let Some(old) = self.focused.take()
            && let Some(placed) = self.placed.get_mut(&old)
        {
            placed.element.handle_blur();
            events.push(HwEvent::blur(old));
        }
        if let Some(placed) = self.placed.get_mut(&target) {
            placed.element.handle_focus();
            if !placed.slot.is_menu() {
                self.last_content = Some(target);
            }
            self.focused = Some(target);
            events.push(HwEvent::focus(target));
        }
        events
    }

    fn targets(&self) -> impl Iterator<Item = (NodeId, Slot)> + '_ {
        self.placed
            .iter()
            .filter(|(_, p)| p.element.accessible)
            .map(|(node, p)| (*node, p.slot))
    }

    fn find(&self, wanted: impl Fn(Slot) -> bool) -> Option<NodeId> {
        self.targets()
            .find(|(_, slot)| wanted(*slot))
            .map(|(node, _)| node)
    }

    fn menu_entry(&self) -> Option<NodeId> {
        self.find(|slot| matches!(slot, Slot::Menu { current: true, .. }))
            .or_else(|| self.find(|slot| matches!(slot, Slot::Menu { row: 0, .. })))
    }

    fn content_entry(&self) -> Option<NodeId> {
        if let Some(node) = self.last_content
            && self
                .placed
                .get(&node)
                .is_some_and(|p| p.element.accessible)
        {
            return Some(node);
        }
        self.targets()
            .filter_map(|(node, slot)| match slot {
                Slot::Item { section, column, .. } => Some(((0, section, column), node)),
                Slot::GoBack => Some(((1, 0, 0), node)),
                Slot::Play => Some(((2, 0, 0), node)),
                _ => None,
            })
            .min()
            .map(|(_, node)| node)
    }

    fn fallback_target(&self) -> Option<NodeId> {
        self.content_entry().or_else(|| self.menu_entry())
    }

    fn menu_rows(&self) -> usize {
        self.targets()
            .filter(|(_, slot)| matches!(slot, Slot::Menu { .. }))
            .count()
    }

    /// Rendered item of `section` closest to `column`.
    fn nearest_in(&self, section: usize, column: usize) -> Option<NodeId> {
        self.targets()
            .filter_map(|(node, slot)| match slot {
                Slot::Item {
                    section: s,
                    column: c,
                    ..
                } if s == section => Some((c.abs_diff(column), node)),
                _ => None,
            })
            .min()
            .map(|(_, node)| node)
    }

    fn item_at(&self, section: usize, item: usize) -> Option<NodeId> {
        self.find(|slot| {
            matches!(slot, Slot::Item { section: s, item: i, .. } if s == section && i == item)
        })
    }

    fn rendered_sections(&self) -> Vec<usize> {
        let mut sections: Vec<usize> = self
            .targets()
            .filter_map(|(_, slot)| match slot {
                Slot::Item { section, .. } => Some(section),
                _ => None,
            })
            .collect();
        sections.sort_unstable();
        sections.dedup();
        sections
    }

    fn neighbour(&self, from: Slot, direction: Direction) -> Option<NodeId> {
        match (from, direction) {
            (Slot::Menu { row, .. }, Direction::Up) => row
                .checked_sub(1)
                .and_then(|r| self.find(|slot| matches!(slot, Slot::Menu { row, .. } if row == r))),
            (Slot::Menu { row, .. }, Direction::Down) => {
                if row + 1 >= self.menu_rows() {
                    self.find(|slot| slot == Slot::Exit)
                } else {
                    self.find(|slot| matches!(slot, Slot::Menu { row: r, .. } if r == row + 1))
                }
            }
            (Slot::Exit, Direction::Up) => {
                let last = self.menu_rows().checked_sub(1)?;
                self.find(|slot| matches!(slot, Slot::Menu { row, .. } if row == last))
            }
            (Slot::Menu { .. } | Slot::Exit, Direction::Right) => self.content_entry(),
            (Slot::Menu { .. } | Slot::Exit, _) => None,

            (Slot::Item { section, item, .. }, Direction::Left) => match item.checked_sub(1) {
                Some(previous) => self
                    .item_at(section, previous)
                    .or_else(|| self.menu_entry()),
                None => self.menu_entry(),
            },
            (Slot::Item { section, item, .. }, Direction::Right) => self.item_at(section, item + 1),
            (Slot::Item { section, column, .. }, Direction::Up) => {
                let sections = self.rendered_sections();
                let above = sections.iter().rev().find(|s| **s < section)?;
                self.nearest_in(*above, column)
            }
            (Slot::Item { section, column, .. }, Direction::Down) => {
                let sections = self.rendered_sections();
                match sections.iter().find(|s| **s > section) {
                    Some(below) => self.nearest_in(*below, column),
                    None => self.find(|slot| slot == Slot::Sentinel),
                }
            }

            (Slot::GoBack, Direction::Right) => self.find(|slot| slot == Slot::Play),
            (Slot::Play, Direction::Left) => self.find(|slot| slot == Slot::GoBack),
            (Slot::GoBack | Slot::Play | Slot::Sentinel, _) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::HwEventKind;

    fn node(raw: u64) -> NodeId {
        NodeId::from_raw(raw)
    }

    fn item(raw: u64, section: usize, item: usize) -> SceneNode {
        SceneNode::new(
            node(raw),
            Slot::Item {
                section,
                item,
                column: item,
            },
        )
    }

    fn scene() -> Vec<SceneNode> {
        vec![
            SceneNode::new(node(1), Slot::Menu { row: 0, current: true }),
            SceneNode::new(node(2), Slot::Menu { row: 1, current: false }),
            SceneNode::new(node(3), Slot::Exit),
            item(10, 0, 0),
            item(11, 0, 1),
            item(20, 1, 0),
            item(21, 1, 1),
            SceneNode::new(node(99), Slot::Sentinel)
                .with_caps(MoveCaps::pinned())
                .accessible(false),
        ]
    }

    fn focused_on(platform: &mut Platform, raw: u64) {
        platform.request_focus(node(raw));
        platform.settle();
    }

    #[test]
    fn test_request_focus_emits_blur_then_focus() {
        let mut platform = Platform::new();
        platform.sync(&scene());
        focused_on(&mut platform, 10);

        platform.request_focus(node(11));
        let events = platform.settle();
        assert_eq!(events, vec![HwEvent::blur(node(10)), HwEvent::focus(node(11))]);
        assert!(platform.is_focused(node(11)));
        assert!(!platform.is_focused(node(10)));
    }

    #[test]
    fn test_latest_request_wins() {
        let mut platform = Platform::new();
        platform.sync(&scene());
        platform.request_focus(node(11));
        platform.request_focus(node(10));
        assert_eq!(platform.settle(), vec![HwEvent::focus(node(10))]);

        platform.request_focus(node(10));
        platform.request_focus(node(21));
        assert_eq!(
            platform.settle(),
            vec![HwEvent::blur(node(10)), HwEvent::focus(node(21))]
        );
        // Losing requests do not linger into the next settle.
        assert!(platform.settle().is_empty());
    }

    #[test]
    fn test_arriving_node_loses_to_newer_request() {
        let mut platform = Platform::new();
        platform.sync(&scene());
        platform.request_focus(node(50));
        platform.request_focus(node(20));

        let mut later = scene();
        later.push(item(50, 2, 0));
        platform.sync(&later);
        assert_eq!(platform.settle(), vec![HwEvent::focus(node(20))]);
        assert!(platform.settle().is_empty());
    }

    #[test]
    fn test_request_for_future_node_waits_for_it() {
        let mut platform = Platform::new();
        platform.sync(&scene());
        platform.request_focus(node(50));
        assert!(platform.settle().is_empty());

        let mut later = scene();
        later.push(item(50, 2, 0));
        platform.sync(&later);
        assert_eq!(platform.settle(), vec![HwEvent::focus(node(50))]);
    }

    #[test]
    fn test_grid_moves() {
        let mut platform = Platform::new();
        platform.sync(&scene());
        focused_on(&mut platform, 10);

        let events = platform.navigate(Direction::Down);
        assert_eq!(events.last(), Some(&HwEvent::focus(node(20))));
        platform.navigate(Direction::Right);
        assert_eq!(platform.focused(), Some(node(21)));
        platform.navigate(Direction::Up);
        assert_eq!(platform.focused(), Some(node(11)));
    }

    #[test]
    fn test_left_edge_enters_menu_and_right_returns() {
        let mut platform = Platform::new();
        platform.sync(&scene());
        focused_on(&mut platform, 21);

        platform.navigate(Direction::Left);
        platform.navigate(Direction::Left);
        assert_eq!(platform.focused(), Some(node(1)));

        platform.navigate(Direction::Right);
        assert_eq!(platform.focused(), Some(node(20)));
    }

    #[test]
    fn test_inaccessible_sentinel_is_skipped() {
        let mut platform = Platform::new();
        platform.sync(&scene());
        focused_on(&mut platform, 20);
        assert!(platform.navigate(Direction::Down).is_empty());

        let mut reachable = scene();
        reachable[7] = reachable[7].accessible(true);
        platform.sync(&reachable);
        let events = platform.navigate(Direction::Down);
        assert_eq!(events.last(), Some(&HwEvent::focus(node(99))));

        // Pinned in every direction.
        for direction in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            assert!(platform.navigate(direction).is_empty());
        }
    }

    #[test]
    fn test_menu_down_reaches_exit() {
        let mut platform = Platform::new();
        platform.sync(&scene());
        focused_on(&mut platform, 2);
        platform.navigate(Direction::Down);
        assert_eq!(platform.focused(), Some(node(3)));
        platform.navigate(Direction::Up);
        assert_eq!(platform.focused(), Some(node(2)));
    }

    #[test]
    fn test_focus_lost_when_element_leaves() {
        let mut platform = Platform::new();
        platform.sync(&scene());
        focused_on(&mut platform, 21);
        platform.sync(&scene()[..4]);
        assert_eq!(platform.focused(), None);

        // Next press lands somewhere sensible.
        let events = platform.navigate(Direction::Right);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, HwEventKind::Focus);
        assert_eq!(events[0].node, Some(node(10)));
    }
}
