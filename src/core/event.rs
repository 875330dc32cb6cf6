//! # Hardware Events
//!
//! Raw remote-control events as the platform reports them: a focus change,
//! a blur, or a key press, each optionally tagged with the node it concerns.

use crate::core::focusable::{Direction, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteKey {
    Up,
    Down,
    Left,
    Right,
    Select,
    PlayPause,
    Back,
}

impl RemoteKey {
    pub fn direction(self) -> Option<Direction> {
        match self {
            RemoteKey::Up => Some(Direction::Up),
            RemoteKey::Down => Some(Direction::Down),
            RemoteKey::Left => Some(Direction::Left),
            RemoteKey::Right => Some(Direction::Right),
            RemoteKey::Select | RemoteKey::PlayPause | RemoteKey::Back => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwEventKind {
    Focus,
    Blur,
    Key(RemoteKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HwEvent {
    pub kind: HwEventKind,
    /// Node the event targets. Key presses carry the focused node, if any.
    pub node: Option<NodeId>,
}

impl HwEvent {
    pub fn focus(node: NodeId) -> Self {
        Self {
            kind: HwEventKind::Focus,
            node: Some(node),
        }
    }

    pub fn blur(node: NodeId) -> Self {
        Self {
            kind: HwEventKind::Blur,
            node: Some(node),
        }
    }

    pub fn key(key: RemoteKey, node: Option<NodeId>) -> Self {
        Self {
            kind: HwEventKind::Key(key),
            node,
        }
    }

    pub fn is_key(&self, key: RemoteKey) -> bool {
        self.kind == HwEventKind::Key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_arrows_have_directions() {
        assert_eq!(RemoteKey::Left.direction(), Some(Direction::Left));
        assert_eq!(RemoteKey::Down.direction(), Some(Direction::Down));
        assert_eq!(RemoteKey::Select.direction(), None);
        assert_eq!(RemoteKey::PlayPause.direction(), None);
        assert_eq!(RemoteKey::Back.direction(), None);
    }

    #[test]
    fn test_constructors_tag_nodes() {
        let node = NodeId::from_raw(4);
        assert_eq!(HwEvent::focus(node).node, Some(node));
        assert_eq!(HwEvent::blur(node).kind, HwEventKind::Blur);
        assert!(HwEvent::key(RemoteKey::Back, None).is_key(RemoteKey::Back));
    }
}
