//! # Focusable Elements
//!
//! The primitive every remote-control target is built from.
//!
//! A `FocusableElement` wraps one pressable node. It knows its own
//! `NodeId` (the handle raw hardware events carry), whether it currently
//! holds focus, and which directions it refuses to let focus escape through.
//! It owns no cross-element state; coordination happens elsewhere.
//!
//! ```text
//!            can_move_up = false
//!                 ┌───┐
//!   left  ◀──────│ N │──────▶  right
//!                 └───┘
//!                   │ down
//!                   ▼
//!   Up is pinned back onto N itself instead of escaping to a sibling.
//! ```

use std::fmt;

/// Stable opaque identity of a rendered focusable node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out node ids. Ids are never reused within one allocator.
#[derive(Debug)]
pub struct NodeAllocator {
    next: u64,
}

impl Default for NodeAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn allocate(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Capability to be the target of an imperative "take focus now" request.
///
/// The coordination core only ever talks to UI elements through this trait.
pub trait Focusable {
    fn handle(&self) -> NodeId;
    fn request_focus(&mut self);
}

/// Which directions focus may leave an element through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveCaps {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Default for MoveCaps {
    fn default() -> Self {
        Self {
            up: true,
            down: true,
            left: true,
            right: true,
        }
    }
}

impl MoveCaps {
    /// Every direction pinned.
    pub fn pinned() -> Self {
        Self {
            up: false,
            down: false,
            left: false,
            right: false,
        }
    }

    pub fn allows(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub fn block(mut self, direction: Direction) -> Self {
        match direction {
            Direction::Up => self.up = false,
            Direction::Down => self.down = false,
            Direction::Left => self.left = false,
            Direction::Right => self.right = false,
        }
        self
    }
}

type FocusCallback = Box<dyn FnMut(NodeId)>;

pub struct FocusableElement {
    node: NodeId,
    pub caps: MoveCaps,
    pub accessible: bool,
    focused: bool,
    preferred_focus: bool,
    on_focus: Option<FocusCallback>,
    on_blur: Option<FocusCallback>,
}

impl fmt::Debug for FocusableElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusableElement")
            .field("node", &self.node)
            .field("caps", &self.caps)
            .field("accessible", &self.accessible)
            .field("focused", &self.focused)
            .field("preferred_focus", &self.preferred_focus)
            .finish_non_exhaustive()
    }
}

impl FocusableElement {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            caps: MoveCaps::default(),
            accessible: true,
            focused: false,
            preferred_focus: false,
            on_focus: None,
            on_blur: None,
        }
    }

    pub fn with_caps(mut self, caps: MoveCaps) -> Self {
        self.caps = caps;
        self
    }

    pub fn on_focus(mut self, callback: impl FnMut(NodeId) + 'static) -> Self {
        self.on_focus = Some(Box::new(callback));
        self
    }

    pub fn on_blur(mut self, callback: impl FnMut(NodeId) + 'static) -> Self {
        self.on_blur = Some(Box::new(callback));
        self
    }

    /// Identity to compare against raw hardware event payloads.
    pub fn node_handle(&self) -> NodeId {
        self.node
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Explicit next-focus target for `direction`: the element itself when
    /// movement that way is pinned, `None` when spatial search should decide.
    pub fn next_focus_override(&self, direction: Direction) -> Option<NodeId> {
        (!self.caps.allows(direction)).then_some(self.node)
    }

    pub fn handle_focus(&mut self) {
        self.focused = true;
        self.preferred_focus = false;
        if let Some(callback) = self.on_focus.as_mut() {
            callback(self.node);
        }
    }

    pub fn handle_blur(&mut self) {
        self.focused = false;
        if let Some(callback) = self.on_blur.as_mut() {
            callback(self.node);
        }
    }

    /// Consume a pending force-focus request.
    pub fn take_preferred_focus(&mut self) -> bool {
        std::mem::take(&mut self.preferred_focus)
    }
}

impl Focusable for FocusableElement {
    fn handle(&self) -> NodeId {
        self.node
    }

    fn request_focus(&mut self) {
        self.preferred_focus = true;
    }
}
