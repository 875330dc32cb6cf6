//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.railfocus/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RailfocusConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub windowing: WindowingConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub overlay: OverlayFileConfig,
    #[serde(default)]
    pub menu: Vec<MenuEntryConfig>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub catalog: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct WindowingConfig {
    pub section_window: Option<usize>,
    pub item_window: Option<usize>,
    pub initial_sections: Option<usize>,
    pub initial_items: Option<usize>,
    pub sections_per_batch: Option<usize>,
    pub items_per_batch: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TimingConfig {
    pub viewability_debounce_ms: Option<u64>,
    pub rail_focus_debounce_ms: Option<u64>,
    pub scroll_retry_ms: Option<u64>,
    pub focus_settle_ms: Option<u64>,
    pub back_guard_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OverlayFileConfig {
    pub invisible_width: Option<u16>,
    pub collapsed_width: Option<u16>,
    pub expanded_width: Option<u16>,
    pub can_exit: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MenuEntryConfig {
    pub route: String,
    pub title: String,
    #[serde(default)]
    pub default: bool,
}

impl MenuEntryConfig {
    pub fn new(route: &str, title: &str, default: bool) -> Self {
        Self {
            route: route.to_string(),
            title: title.to_string(),
            default,
        }
    }
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_SECTION_WINDOW: usize = 3;
pub const DEFAULT_ITEM_WINDOW: usize = 10;
pub const DEFAULT_INITIAL_SECTIONS: usize = 2;
pub const DEFAULT_INITIAL_ITEMS: usize = 5;

pub const DEFAULT_VIEWABILITY_DEBOUNCE_MS: u64 = 250;
pub const DEFAULT_RAIL_FOCUS_DEBOUNCE_MS: u64 = 250;
pub const DEFAULT_SCROLL_RETRY_MS: u64 = 500;
pub const DEFAULT_FOCUS_SETTLE_MS: u64 = 200;
pub const DEFAULT_BACK_GUARD_MS: u64 = 120;

pub const DEFAULT_COLLAPSED_WIDTH: u16 = 6;
pub const DEFAULT_EXPANDED_WIDTH: u16 = 24;

fn default_menu() -> Vec<MenuEntryConfig> {
    vec![
        MenuEntryConfig::new("home", "Home", true),
        MenuEntryConfig::new("search", "Search", false),
        MenuEntryConfig::new("live", "Live", false),
        MenuEntryConfig::new("my-list", "My List", false),
        MenuEntryConfig::new("settings", "Settings", false),
    ]
}

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

/// Window sizes for the rail virtualizer. Counts, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Windowing {
    pub section_window: usize,
    pub item_window: usize,
    pub initial_sections: usize,
    pub initial_items: usize,
    pub sections_per_batch: usize,
    pub items_per_batch: usize,
}

impl Default for Windowing {
    fn default() -> Self {
        Self {
            section_window: DEFAULT_SECTION_WINDOW,
            item_window: DEFAULT_ITEM_WINDOW,
            initial_sections: DEFAULT_INITIAL_SECTIONS,
            initial_items: DEFAULT_INITIAL_ITEMS,
            sections_per_batch: DEFAULT_INITIAL_SECTIONS,
            items_per_batch: DEFAULT_INITIAL_ITEMS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub viewability_debounce: Duration,
    pub rail_focus_debounce: Duration,
    pub scroll_retry: Duration,
    pub focus_settle: Duration,
    /// Repeated back presses inside this window count once.
    pub back_guard: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            viewability_debounce: Duration::from_millis(DEFAULT_VIEWABILITY_DEBOUNCE_MS),
            rail_focus_debounce: Duration::from_millis(DEFAULT_RAIL_FOCUS_DEBOUNCE_MS),
            scroll_retry: Duration::from_millis(DEFAULT_SCROLL_RETRY_MS),
            focus_settle: Duration::from_millis(DEFAULT_FOCUS_SETTLE_MS),
            back_guard: Duration::from_millis(DEFAULT_BACK_GUARD_MS),
        }
    }
}

/// Overlay widths per state, in terminal columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayConfig {
    pub invisible_width: u16,
    pub collapsed_width: u16,
    pub expanded_width: u16,
    pub can_exit: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            invisible_width: 0,
            collapsed_width: DEFAULT_COLLAPSED_WIDTH,
            expanded_width: DEFAULT_EXPANDED_WIDTH,
            can_exit: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub windowing: Windowing,
    pub timing: Timing,
    pub overlay: OverlayConfig,
    pub menu: Vec<MenuEntryConfig>,
    pub catalog_path: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        resolve_from(&RailfocusConfig::default(), None, |_| None)
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.railfocus/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".railfocus").join("config.toml"))
}

/// Load config from `explicit` or from `~/.railfocus/config.toml`.
///
/// A missing default file is generated (commented out) and yields
/// `RailfocusConfig::default()`. A missing explicit file is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<RailfocusConfig, ConfigError> {
    if let Some(path) = explicit {
        return read_config(path);
    }

    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(RailfocusConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(RailfocusConfig::default());
    }

    read_config(&path)
}

fn read_config(path: &Path) -> Result<RailfocusConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: RailfocusConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# railfocus configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# catalog = "catalog.json"           # Or RAILFOCUS_CATALOG / --catalog

# [windowing]
# section_window = 3                 # sections materialized around the focus
# item_window = 10                   # items materialized per rail
# initial_sections = 2
# initial_items = 5
# sections_per_batch = 2             # growth step when a scroll overshoots
# items_per_batch = 5

# [timing]
# viewability_debounce_ms = 250
# rail_focus_debounce_ms = 250
# scroll_retry_ms = 500              # Or RAILFOCUS_SCROLL_RETRY_MS
# focus_settle_ms = 200
# back_guard_ms = 120                # held back key repeats inside this window are dropped

# [overlay]
# invisible_width = 0
# collapsed_width = 6
# expanded_width = 24
# can_exit = true                    # Or RAILFOCUS_CAN_EXIT

# [[menu]]
# route = "home"
# title = "Home"
# default = true

# [[menu]]
# route = "search"
# title = "Search"
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &RailfocusConfig, cli_catalog: Option<&Path>) -> ResolvedConfig {
    resolve_from(config, cli_catalog, |key| std::env::var(key).ok())
}

/// [`resolve`] with an injectable environment lookup.
pub fn resolve_from(
    config: &RailfocusConfig,
    cli_catalog: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Catalog: CLI → env → config → built-in demo
    let catalog_path = cli_catalog
        .map(Path::to_path_buf)
        .or_else(|| env("RAILFOCUS_CATALOG").map(PathBuf::from))
        .or_else(|| config.general.catalog.as_ref().map(PathBuf::from));

    let w = &config.windowing;
    let initial_sections = w.initial_sections.unwrap_or(DEFAULT_INITIAL_SECTIONS).max(1);
    let initial_items = w.initial_items.unwrap_or(DEFAULT_INITIAL_ITEMS).max(1);
    let windowing = Windowing {
        section_window: w.section_window.unwrap_or(DEFAULT_SECTION_WINDOW).max(1),
        item_window: w.item_window.unwrap_or(DEFAULT_ITEM_WINDOW).max(1),
        initial_sections,
        initial_items,
        sections_per_batch: w.sections_per_batch.unwrap_or(initial_sections).max(1),
        items_per_batch: w.items_per_batch.unwrap_or(initial_items).max(1),
    };

    let t = &config.timing;
    // Scroll retry: env → config → default
    let scroll_retry_ms = parse_env(&env, "RAILFOCUS_SCROLL_RETRY_MS")
        .or(t.scroll_retry_ms)
        .unwrap_or(DEFAULT_SCROLL_RETRY_MS);
    let timing = Timing {
        viewability_debounce: Duration::from_millis(
            t.viewability_debounce_ms
                .unwrap_or(DEFAULT_VIEWABILITY_DEBOUNCE_MS),
        ),
        rail_focus_debounce: Duration::from_millis(
            t.rail_focus_debounce_ms
                .unwrap_or(DEFAULT_RAIL_FOCUS_DEBOUNCE_MS),
        ),
        scroll_retry: Duration::from_millis(scroll_retry_ms),
        focus_settle: Duration::from_millis(t.focus_settle_ms.unwrap_or(DEFAULT_FOCUS_SETTLE_MS)),
        back_guard: Duration::from_millis(t.back_guard_ms.unwrap_or(DEFAULT_BACK_GUARD_MS)),
    };

    let o = &config.overlay;
    let defaults = OverlayConfig::default();
    let overlay = OverlayConfig {
        invisible_width: o.invisible_width.unwrap_or(defaults.invisible_width),
        collapsed_width: o.collapsed_width.unwrap_or(defaults.collapsed_width),
        expanded_width: o.expanded_width.unwrap_or(defaults.expanded_width),
        can_exit: parse_env(&env, "RAILFOCUS_CAN_EXIT")
            .or(o.can_exit)
            .unwrap_or(defaults.can_exit),
    };

    let menu = if config.menu.is_empty() {
        default_menu()
    } else {
        config.menu.clone()
    };

    ResolvedConfig {
        windowing,
        timing,
        overlay,
        menu,
        catalog_path,
    }
}

fn parse_env<T: std::str::FromStr>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = env(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparsable {key}={raw}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config_parses() {
        let config = RailfocusConfig::default();
        assert!(config.menu.is_empty());
        assert!(config.general.catalog.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_from(&RailfocusConfig::default(), None, no_env);
        assert_eq!(resolved.windowing, Windowing::default());
        assert_eq!(resolved.timing.scroll_retry, Duration::from_millis(500));
        assert_eq!(resolved.timing.viewability_debounce, Duration::from_millis(250));
        assert!(resolved.overlay.can_exit);
        assert_eq!(resolved.menu.len(), 5);
        assert!(resolved.menu[0].default);
        assert!(resolved.catalog_path.is_none());
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = RailfocusConfig {
            windowing: WindowingConfig {
                section_window: Some(4),
                initial_items: Some(3),
                ..Default::default()
            },
            timing: TimingConfig {
                focus_settle_ms: Some(50),
                ..Default::default()
            },
            overlay: OverlayFileConfig {
                can_exit: Some(false),
                ..Default::default()
            },
            menu: vec![MenuEntryConfig::new("guide", "Guide", true)],
            ..Default::default()
        };
        let resolved = resolve_from(&config, None, no_env);
        assert_eq!(resolved.windowing.section_window, 4);
        assert_eq!(resolved.windowing.initial_items, 3);
        // Batch size follows the initial count unless set.
        assert_eq!(resolved.windowing.items_per_batch, 3);
        assert_eq!(resolved.timing.focus_settle, Duration::from_millis(50));
        assert!(!resolved.overlay.can_exit);
        assert_eq!(resolved.menu, vec![MenuEntryConfig::new("guide", "Guide", true)]);
    }

    #[test]
    fn test_zero_windows_are_clamped() {
        let config = RailfocusConfig {
            windowing: WindowingConfig {
                item_window: Some(0),
                initial_sections: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve_from(&config, None, no_env);
        assert_eq!(resolved.windowing.item_window, 1);
        assert_eq!(resolved.windowing.initial_sections, 1);
    }

    #[test]
    fn test_precedence_cli_env_file() {
        let config = RailfocusConfig {
            general: GeneralConfig {
                catalog: Some("file.json".to_string()),
            },
            timing: TimingConfig {
                scroll_retry_ms: Some(900),
                ..Default::default()
            },
            overlay: OverlayFileConfig {
                can_exit: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };
        let env = |key: &str| match key {
            "RAILFOCUS_CATALOG" => Some("env.json".to_string()),
            "RAILFOCUS_SCROLL_RETRY_MS" => Some("120".to_string()),
            "RAILFOCUS_CAN_EXIT" => Some("false".to_string()),
            _ => None,
        };

        let from_env = resolve_from(&config, None, env);
        assert_eq!(from_env.catalog_path, Some(PathBuf::from("env.json")));
        assert_eq!(from_env.timing.scroll_retry, Duration::from_millis(120));
        assert!(!from_env.overlay.can_exit);

        let from_cli = resolve_from(&config, Some(Path::new("cli.json")), env);
        assert_eq!(from_cli.catalog_path, Some(PathBuf::from("cli.json")));

        let from_file = resolve_from(&config, None, no_env);
        assert_eq!(from_file.catalog_path, Some(PathBuf::from("file.json")));
        assert_eq!(from_file.timing.scroll_retry, Duration::from_millis(900));
    }

    #[test]
    fn test_unparsable_env_falls_through() {
        let env = |key: &str| (key == "RAILFOCUS_SCROLL_RETRY_MS").then(|| "soon".to_string());
        let resolved = resolve_from(&RailfocusConfig::default(), None, env);
        assert_eq!(resolved.timing.scroll_retry, Duration::from_millis(DEFAULT_SCROLL_RETRY_MS));
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[general]
catalog = "rails.json"

[windowing]
section_window = 5
items_per_batch = 8

[timing]
scroll_retry_ms = 750

[overlay]
expanded_width = 30
can_exit = false

[[menu]]
route = "home"
title = "Home"
default = true

[[menu]]
route = "search"
title = "Search"
"#;
        let config: RailfocusConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.catalog.as_deref(), Some("rails.json"));
        assert_eq!(config.windowing.section_window, Some(5));
        assert_eq!(config.windowing.items_per_batch, Some(8));
        assert_eq!(config.timing.scroll_retry_ms, Some(750));
        assert_eq!(config.overlay.expanded_width, Some(30));
        assert_eq!(config.menu.len(), 2);
        assert!(config.menu[0].default);
        assert!(!config.menu[1].default);
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing; everything else stays default
        let toml_str = r#"
[timing]
focus_settle_ms = 10
"#;
        let config: RailfocusConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.timing.focus_settle_ms, Some(10));
        assert!(config.timing.scroll_retry_ms.is_none());
        assert!(config.windowing.section_window.is_none());
        assert!(config.menu.is_empty());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let err = load_config(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
