//! # Focus Position Resolver
//!
//! Decides which coordinate should receive focus when a screen (re)gains
//! visibility, given the remembered anchor and the current dataset.
//!
//! Search order for a remembered target:
//!
//! ```text
//!   1. (section_hint, item_hint) holds the target?      → fast path
//!   2. target elsewhere in sections[section_hint]?      → same rail
//!   3. target in any other section, in original order?  → first match wins
//!   4. nowhere                                          → INITIAL
//! ```
//!
//! Same-rail lookup is the common case (re-focusing the item the user just
//! left). The cross-section scan covers datasets regrouped since the anchor
//! was recorded.

use crate::core::catalog::{FocusAnchor, Item, Section};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusPosition {
    pub section_index: usize,
    pub item_index: usize,
}

impl FocusPosition {
    /// First section, first item.
    pub const INITIAL: Self = Self::new(0, 0);

    pub const fn new(section_index: usize, item_index: usize) -> Self {
        Self {
            section_index,
            item_index,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    At(FocusPosition),
    /// Nothing on this screen should take focus.
    NoPosition,
    /// Nothing here can take focus; hand it to an outer element (the nav menu).
    DeferToMenu,
}

impl Resolution {
    pub fn position(self) -> Option<FocusPosition> {
        match self {
            Resolution::At(position) => Some(position),
            Resolution::NoPosition | Resolution::DeferToMenu => None,
        }
    }

    /// Index pair with `(-1, -1)` standing for "no focusable position".
    pub fn indices(self) -> (isize, isize) {
        match self {
            Resolution::At(p) => (p.section_index as isize, p.item_index as isize),
            Resolution::NoPosition | Resolution::DeferToMenu => (-1, -1),
        }
    }

    pub fn defers_to_menu(self) -> bool {
        self == Resolution::DeferToMenu
    }
}

/// Resolve the initial focus coordinate for a sectioned screen.
pub fn resolve(anchor: &FocusAnchor, sections: &[Section], first_launch: bool) -> Resolution {
    if sections.is_empty() {
        if anchor.target_id.is_some() || !first_launch {
            return Resolution::DeferToMenu;
        }
        return Resolution::NoPosition;
    }

    // Cold start ignores whatever was remembered.
    if first_launch {
        return Resolution::At(FocusPosition::INITIAL);
    }

    let (Some(target), Some(section_hint), Some(item_hint)) = (
        anchor.target_id.as_deref(),
        anchor.section_hint,
        anchor.item_hint,
    ) else {
        return Resolution::NoPosition;
    };

    if let Some(section) = sections.get(section_hint) {
        if section
            .items
            .get(item_hint)
            .is_some_and(|item| item.id == target)
        {
            return Resolution::At(FocusPosition::new(section_hint, item_hint));
        }
        if let Some(found) = section.position_of(target) {
            return Resolution::At(FocusPosition::new(section_hint, found));
        }
    }

    sections
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != section_hint)
        .find_map(|(index, section)| {
            section
                .position_of(target)
                .map(|found| FocusPosition::new(index, found))
        })
        .map_or(Resolution::At(FocusPosition::INITIAL), Resolution::At)
}

/// Resolve the initial focus for a flat, single-list screen.
pub fn resolve_in_list(target_id: Option<&str>, items: &[Item]) -> Resolution {
    if items.is_empty() {
        return if target_id.is_some() {
            Resolution::DeferToMenu
        } else {
            Resolution::NoPosition
        };
    }
    let Some(target) = target_id else {
        return Resolution::NoPosition;
    };
    let found = items.iter().position(|item| item.id == target).unwrap_or(0);
    Resolution::At(FocusPosition::new(0, found))
}
