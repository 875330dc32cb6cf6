//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use crate::core::catalog::{Item, Section};
use crate::core::resolver::FocusPosition;

/// Items whose id and title are both the given name.
pub fn items(ids: &[&str]) -> Vec<Item> {
    ids.iter().map(|id| Item::new(*id, *id)).collect()
}

/// `[[A, B, C], [D, E]]`
pub fn scenario_sections() -> Vec<Section> {
    vec![
        Section::new(0, "First", items(&["A", "B", "C"])),
        Section::new(1, "Second", items(&["D", "E"])),
    ]
}

/// One section per entry, with that many items. Ids are `s{section}-i{item}`.
pub fn sections_of(counts: &[usize]) -> Vec<Section> {
    counts
        .iter()
        .enumerate()
        .map(|(s, count)| {
            let items = (0..*count)
                .map(|i| Item::new(format!("s{s}-i{i}"), format!("Item {s}.{i}")))
                .collect();
            Section::new(s, format!("Rail {s}"), items)
        })
        .collect()
}

pub fn at(section_index: usize, item_index: usize) -> FocusPosition {
    FocusPosition::new(section_index, item_index)
}
