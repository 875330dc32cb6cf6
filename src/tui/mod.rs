//! # TUI Adapter
//!
//! The ratatui-specific layer. It plays the part of the TV platform: owns
//! the on-screen focusable elements, moves focus on arrow keys, reports
//! focus changes as raw hardware events, and carries out the effects the
//! focus shell hands back.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Frame Pump
//!
//! Every loop iteration runs [`TuiState::pump`]:
//!
//! 1. run deferred engine work that is due (`FocusShell::tick`),
//! 2. render the rails window and sync the scene into the [`Platform`],
//! 3. honour preferred-focus and force-focus requests,
//! 4. publish the resulting blur/focus events back through the shell,
//!
//! repeating 2-4 until focus settles. The poll timeout is derived from the
//! engine's next deadline, so debounced work fires on time while idle.

mod component;
mod components;
mod event;
pub mod platform;
mod ui;

use std::io::stdout;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, info};
use tui_scrollview::ScrollViewState;

use crate::core::action::Effect;
use crate::core::catalog::{FocusAnchor, Item, Section, index_sections};
use crate::core::config::ResolvedConfig;
use crate::core::event::{HwEvent, RemoteKey};
use crate::core::focusable::{Direction, MoveCaps, NodeId};
use crate::core::rails::RenderPlan;
use crate::core::resolver::FocusPosition;
use crate::core::shell::FocusShell;
use crate::tui::component::EventHandler;
use crate::tui::components::{ExitChoice, ExitPrompt};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::platform::{Platform, SceneNode, Slot};

/// Upper bound on scene/settle rounds per frame.
const MAX_SETTLE_ROUNDS: usize = 4;
/// Longest idle sleep between polls.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Which screen fills the content area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Rails {
        route: String,
    },
    Detail {
        /// Rails route that opened this screen.
        route: String,
        title: String,
        go_back: NodeId,
        play: NodeId,
        playing: bool,
    },
}

impl Screen {
    pub fn route(&self) -> &str {
        match self {
            Screen::Rails { route } | Screen::Detail { route, .. } => route,
        }
    }
}

/// Sections shown on the screen behind `route`.
fn sections_for_route(catalog: &[Section], route: &str) -> Vec<Section> {
    let picked = match route {
        "live" => catalog
            .iter()
            .filter(|s| s.title.contains("Live"))
            .cloned()
            .collect(),
        "search" | "settings" => Vec::new(),
        _ => catalog.to_vec(),
    };
    index_sections(picked)
}

/// Items of the single-list screen behind `route`, if it is one. My list
/// holds the lead item of every rail.
fn list_for_route(catalog: &[Section], route: &str) -> Option<Vec<Item>> {
    (route == "my-list").then(|| {
        catalog
            .iter()
            .filter_map(|s| s.items.first().cloned())
            .collect()
    })
}

/// TUI-side state: the platform stand-in plus presentation state.
pub struct TuiState {
    shell: FocusShell,
    platform: Platform,
    catalog: Vec<Section>,
    screen: Screen,
    plan: Option<RenderPlan>,
    focused_section: Option<usize>,
    status_message: String,
    exit_prompt: Option<ExitPrompt>,
    rails_scroll: ScrollViewState,
    /// Bumped on every screen change.
    generation: u64,
    should_quit: bool,
}

impl TuiState {
    pub fn new(config: ResolvedConfig, catalog: Vec<Section>, now: Instant) -> Self {
        let shell = FocusShell::new(config);
        let route = shell
            .overlay()
            .default_entry()
            .map(|e| e.route.clone())
            .unwrap_or_else(|| "home".to_string());
        let mut tui = Self {
            shell,
            platform: Platform::new(),
            catalog,
            screen: Screen::Rails {
                route: route.clone(),
            },
            plan: None,
            focused_section: None,
            status_message: String::new(),
            exit_prompt: None,
            rails_scroll: ScrollViewState::default(),
            generation: 0,
            should_quit: false,
        };
        tui.open_route(route, None, now);
        tui
    }

    pub fn shell(&self) -> &FocusShell {
        &self.shell
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn is_exit_prompt_open(&self) -> bool {
        self.exit_prompt.is_some()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// How long the loop may sleep before the engine needs a tick.
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        self.shell
            .next_deadline()
            .map_or(IDLE_POLL, |deadline| {
                deadline.saturating_duration_since(now).min(IDLE_POLL)
            })
    }

    // ------------------------------------------------------------------
    // Frame pump
    // ------------------------------------------------------------------

    /// Run due engine work and settle focus. Returns whether anything
    /// visible may have changed.
    pub fn pump(&mut self, now: Instant) -> bool {
        let effects = self.shell.tick(now);
        let mut changed = !effects.is_empty();
        self.apply_effects(effects, now);

        for _ in 0..MAX_SETTLE_ROUNDS {
            let plan = self.shell.render_rails();
            changed |= plan != self.plan;
            self.plan = plan;

            let scene = self.scene();
            self.platform.sync(&scene);
            if let Some(node) = self.plan.as_ref().and_then(RenderPlan::preferred)
                && self.platform.focused() != Some(node)
            {
                self.platform.request_focus(node);
            }

            let events = self.platform.settle();
            if events.is_empty() {
                break;
            }
            changed = true;
            self.publish(events, now);
        }
        changed
    }

    /// Every focusable element on screen, in platform terms.
    fn scene(&self) -> Vec<SceneNode> {
        let mut scene = Vec::new();
        {
            let overlay = self.shell.overlay();
            let accessible = overlay.is_accessible();
            let current = overlay.current_entry().map(|e| e.node);
            for (row, entry) in overlay.entries().iter().enumerate() {
                let slot = Slot::Menu {
                    row,
                    current: Some(entry.node) == current,
                };
                scene.push(SceneNode::new(entry.node, slot).accessible(accessible));
            }
            if let Some(exit) = overlay.exit_node() {
                scene.push(SceneNode::new(exit, Slot::Exit).accessible(accessible));
            }
        }

        match &self.screen {
            Screen::Rails { .. } => {
                if let Some(plan) = &self.plan {
                    for section in &plan.sections {
                        for (column, item) in section.items.iter().enumerate() {
                            let slot = Slot::Item {
                                section: section.section_index,
                                item: item.item_index,
                                column,
                            };
                            scene.push(SceneNode::new(item.node, slot));
                        }
                    }
                    scene.push(
                        SceneNode::new(plan.sentinel, Slot::Sentinel)
                            .with_caps(MoveCaps::pinned())
                            .accessible(plan.sentinel_accessible),
                    );
                }
            }
            Screen::Detail { go_back, play, .. } => {
                let active = self.shell.go_back_button().is_some_and(|b| b.is_active());
                // Left stays on the button so the key reaches its handler.
                scene.push(
                    SceneNode::new(*go_back, Slot::GoBack)
                        .with_caps(MoveCaps::default().block(Direction::Left))
                        .accessible(active),
                );
                scene.push(SceneNode::new(*play, Slot::Play));
            }
        }
        scene
    }

    fn publish(&mut self, events: Vec<HwEvent>, now: Instant) {
        for event in events {
            let effects = self.shell.handle_event(event, now);
            self.apply_effects(effects, now);
        }
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    pub fn handle_event(&mut self, event: TuiEvent, now: Instant) {
        if event == TuiEvent::Quit {
            self.should_quit = true;
            return;
        }
        if let Some(prompt) = self.exit_prompt.as_mut() {
            if let Some(choice) = prompt.handle_event(&event) {
                self.exit_prompt = None;
                let effects = self.shell.resolve_exit(choice == ExitChoice::Confirm);
                self.apply_effects(effects, now);
            }
            return;
        }
        match event {
            TuiEvent::Remote(key) => self.press_remote(key, now),
            TuiEvent::Reset => self.reset(now),
            TuiEvent::Char(_) | TuiEvent::Resize | TuiEvent::Quit => {}
        }
    }

    /// A remote key: publish it, then let the platform move focus.
    fn press_remote(&mut self, key: RemoteKey, now: Instant) {
        let focused = self.platform.focused();
        let generation = self.generation;
        let effects = self.shell.handle_event(HwEvent::key(key, focused), now);
        self.apply_effects(effects, now);
        if self.generation != generation {
            return;
        }

        if let Some(direction) = key.direction() {
            let events = self.platform.navigate(direction);
            self.publish(events, now);
            return;
        }
        if key == RemoteKey::Select
            && let Some(node) = focused
        {
            self.select(node);
        }
    }

    /// Select on a rail item opens it. The detail screen's play control is
    /// pressed by the player's own listener.
    fn select(&mut self, node: NodeId) {
        if let Screen::Rails { .. } = self.screen {
            let position = self.shell.rails().and_then(|rails| rails.position_of(node));
            if let Some(position) = position {
                self.open_detail(position);
            }
        }
    }

    fn toggle_playback(&mut self) {
        let Screen::Detail { playing, title, .. } = &mut self.screen else {
            return;
        };
        *playing = !*playing;
        self.status_message = if *playing {
            format!("Playing {title}")
        } else {
            format!("Paused {title}")
        };
        let playing = *playing;
        // Full-bleed playback: back is out of reach until paused.
        self.shell.set_go_back_accessible(!playing);
    }

    // ------------------------------------------------------------------
    // Effects and screens
    // ------------------------------------------------------------------

    fn apply_effects(&mut self, effects: Vec<Effect>, now: Instant) {
        for effect in effects {
            match effect {
                Effect::RequestFocus(node) => self.platform.request_focus(node),
                Effect::Scroll(request) => debug!("tui: scroll {request:?}"),
                Effect::ItemFocused { item_id } => {
                    self.status_message = format!("Focused {item_id}");
                }
                Effect::SectionChanged { section_index } => {
                    self.focused_section = Some(section_index);
                }
                Effect::Press(node) => match self.screen {
                    Screen::Detail { play, .. } if play == node => self.toggle_playback(),
                    _ => debug!("tui: press on {node} ignored"),
                },
                Effect::Navigate { route, anchor } => self.open_route(route, anchor, now),
                Effect::GoBack => {
                    let route = self.default_route();
                    self.open_route(route, None, now);
                }
                Effect::ConfirmExit => self.exit_prompt = Some(ExitPrompt::new()),
                Effect::ExitApp => self.should_quit = true,
                other => debug!("tui: unexpected effect {other:?}"),
            }
        }
    }

    fn default_route(&self) -> String {
        self.shell
            .overlay()
            .default_entry()
            .map(|e| e.route.clone())
            .unwrap_or_else(|| "home".to_string())
    }

    fn open_route(&mut self, route: String, anchor: Option<FocusAnchor>, now: Instant) {
        self.shell.unmount_go_back();
        self.shell.unmount_player();

        info!("Opening {route}");
        let effects = match list_for_route(&self.catalog, &route) {
            Some(items) => {
                let target = anchor.as_ref().and_then(|a| a.target_id.as_deref());
                self.shell.mount_list("My List", items, target, now)
            }
            None => {
                let sections = sections_for_route(&self.catalog, &route);
                self.shell.mount_rails(sections, anchor, now)
            }
        };
        self.screen = Screen::Rails { route };
        self.rails_scroll = ScrollViewState::default();
        self.focused_section = None;
        self.generation += 1;
        self.apply_effects(effects, now);
    }

    fn open_detail(&mut self, position: FocusPosition) {
        let picked = self.shell.rails().and_then(|rails| {
            let anchor = rails.anchor_for(position)?;
            let title = rails
                .sections()
                .get(position.section_index)?
                .items
                .get(position.item_index)?
                .title
                .clone();
            Some((anchor, title))
        });
        let Some((anchor, title)) = picked else {
            return;
        };

        let route = self.screen.route().to_string();
        info!("Opening detail of {}", anchor.target_id.as_deref().unwrap_or("?"));
        self.shell.unmount_rails();
        self.shell.hide_overlay();
        // The player captures first so the back button keeps hearing keys.
        let play = self.shell.allocate_node();
        self.shell.mount_player(play);
        let go_back = self.shell.mount_go_back(Some(route.clone()), Some(anchor));
        self.platform.request_focus(play);

        self.screen = Screen::Detail {
            route,
            title,
            go_back,
            play,
            playing: false,
        };
        self.plan = None;
        self.generation += 1;
    }

    /// Logout: forget focus history and start over on the default screen.
    fn reset(&mut self, now: Instant) {
        self.shell.reset();
        self.status_message = "Signed out".to_string();
        let route = self.default_route();
        let effects = self.shell.select_menu_entry(&route);
        self.shell.show_overlay();
        self.apply_effects(effects, now);
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Esc must arrive as a key of its own: it is the remote's Back.
        execute!(
            stdout(),
            Hide,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
        info!("Terminal modes enabled (hidden cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), PopKeyboardEnhancementFlags, Show);
    }
}

pub fn run(config: ResolvedConfig, catalog: Vec<Section>) -> std::io::Result<()> {
    let mut tui = TuiState::new(config, catalog, Instant::now());

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();
    let result = event_loop(&mut terminal, &mut tui);
    ratatui::restore();
    result
}

fn event_loop(terminal: &mut ratatui::DefaultTerminal, tui: &mut TuiState) -> std::io::Result<()> {
    let mut needs_redraw = true; // Force first frame

    loop {
        if tui.pump(Instant::now()) {
            needs_redraw = true;
        }

        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, tui))?;
            needs_redraw = false;
        }

        let first_event = poll_event_timeout(tui.poll_timeout(Instant::now()));
        if first_event.is_some() {
            needs_redraw = true;
        }
        // Drain everything pending before the next frame
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            tui.handle_event(event, Instant::now());
            // Settle between keys so focus moves from where the last key left it.
            tui.pump(Instant::now());
        }

        if tui.should_quit() {
            info!("Quitting");
            break;
        }
    }
    Ok(())
}
