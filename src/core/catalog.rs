//! # Catalog
//!
//! The data the focus engine navigates: an ordered list of sections, each an
//! ordered list of items. The engine compares items by `id` only; everything
//! else is screen payload.
//!
//! Catalogs are loaded from JSON:
//!
//! ```json
//! [
//!   { "title": "Ballet", "items": [{ "id": "swan-lake", "title": "Swan Lake" }] }
//! ]
//! ```

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

impl Item {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Position in the current snapshot; the windowing key.
    #[serde(default)]
    pub section_index: usize,
    pub title: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Section {
    pub fn new(section_index: usize, title: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            section_index,
            title: title.into(),
            items,
        }
    }

    /// First position of `id` in this section.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}

/// "The item the user was last looking at", carried across navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusAnchor {
    pub target_id: Option<String>,
    pub section_hint: Option<usize>,
    pub item_hint: Option<usize>,
}

impl FocusAnchor {
    pub fn new(
        target_id: Option<String>,
        section_hint: Option<usize>,
        item_hint: Option<usize>,
    ) -> Self {
        Self {
            target_id,
            section_hint,
            item_hint,
        }
    }

    pub fn for_item(target_id: impl Into<String>, section_hint: usize, item_hint: usize) -> Self {
        Self::new(Some(target_id.into()), Some(section_hint), Some(item_hint))
    }

    pub fn is_empty(&self) -> bool {
        self.target_id.is_none()
    }
}

#[derive(Debug)]
pub enum CatalogError {
    Io(io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Io(e) => write!(f, "catalog I/O error: {e}"),
            CatalogError::Parse(e) => write!(f, "catalog parse error: {e}"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Rewrite `section_index` to each section's position in the snapshot.
pub fn index_sections(mut sections: Vec<Section>) -> Vec<Section> {
    for (index, section) in sections.iter_mut().enumerate() {
        section.section_index = index;
    }
    sections
}

pub fn parse_catalog(json: &str) -> Result<Vec<Section>, CatalogError> {
    let sections: Vec<Section> = serde_json::from_str(json).map_err(CatalogError::Parse)?;
    Ok(index_sections(sections))
}

pub fn load_catalog(path: &Path) -> Result<Vec<Section>, CatalogError> {
    let contents = fs::read_to_string(path).map_err(CatalogError::Io)?;
    let sections = parse_catalog(&contents)?;
    info!(
        "Loaded catalog from {} ({} sections)",
        path.display(),
        sections.len()
    );
    Ok(sections)
}

/// Built-in catalog used when no catalog file is given.
pub fn demo_catalog() -> Vec<Section> {
    let rails: [(&str, &[&str]); 6] = [
        (
            "Continue Watching",
            &["La Traviata", "Giselle", "Carmen", "The Nutcracker"],
        ),
        (
            "Ballet & Dance",
            &[
                "Swan Lake",
                "Romeo and Juliet",
                "Don Quixote",
                "Sleeping Beauty",
                "Coppelia",
                "La Bayadere",
                "Manon",
                "Onegin",
                "Mayerling",
                "The Firebird",
                "Raymonda",
                "Le Corsaire",
            ],
        ),
        (
            "Opera & Music",
            &[
                "Tosca",
                "La Boheme",
                "Madama Butterfly",
                "Rigoletto",
                "Aida",
                "Don Giovanni",
                "The Magic Flute",
                "Turandot",
            ],
        ),
        ("Live Now", &["Gala Concert", "Masterclass"]),
        (
            "New Productions",
            &[
                "Das Rheingold",
                "Die Walkure",
                "Siegfried",
                "Gotterdammerung",
                "Parsifal",
                "Lohengrin",
            ],
        ),
        (
            "Behind the Curtain",
            &["Rehearsal Diaries", "Costume Workshop", "Orchestra Pit"],
        ),
    ];

    let sections = rails
        .iter()
        .map(|(title, items)| Section {
            section_index: 0,
            title: (*title).to_string(),
            items: items
                .iter()
                .map(|name| Item::new(slug(title, name), *name))
                .collect(),
        })
        .collect();
    index_sections(sections)
}

fn slug(section: &str, name: &str) -> String {
    format!("{section}-{name}")
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}
