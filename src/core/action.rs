//! # Effects
//!
//! Everything the focus engine wants to happen becomes an `Effect`.
//! Components never call into the platform or into each other; they return
//! effects and the shell sorts them out.
//!
//! ```text
//! HwEvent  →  component  →  Vec<Effect>  →  shell applies internal ones
//!                                         →  adapter applies the rest
//! ```
//!
//! Internal effects (overlay lock/show/hide, focus-the-menu) are consumed by
//! `FocusShell`. The rest are commands for the platform (force focus,
//! scroll) or notifications for screens (item focused, navigate).

use crate::core::catalog::FocusAnchor;
use crate::core::focusable::NodeId;

/// Which scrollable list a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollTarget {
    /// The vertical list of sections.
    Sections,
    /// The horizontal item list of one section.
    Rail(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub target: ScrollTarget,
    pub index: usize,
    pub animated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Force platform focus onto a node.
    RequestFocus(NodeId),
    Scroll(ScrollRequest),
    ItemFocused { item_id: String },
    SectionChanged { section_index: usize },
    /// Proxy press on a media control.
    Press(NodeId),
    Navigate {
        route: String,
        anchor: Option<FocusAnchor>,
    },
    GoBack,
    FocusMenu,
    LockOverlay,
    UnlockOverlay,
    ShowOverlay,
    HideOverlay,
    ConfirmExit,
    ExitApp,
}

impl Effect {
    pub fn navigate(route: impl Into<String>) -> Self {
        Effect::Navigate {
            route: route.into(),
            anchor: None,
        }
    }

    /// True for effects the shell handles itself.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Effect::FocusMenu
                | Effect::LockOverlay
                | Effect::UnlockOverlay
                | Effect::ShowOverlay
                | Effect::HideOverlay
        )
    }
}
