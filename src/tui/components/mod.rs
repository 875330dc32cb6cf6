//! # TUI Components
//!
//! UI components for the terminal stand-in of a TV screen.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive everything they draw as props:
//! - `TitleBar`: screen, focused rail, status message
//! - `NavMenu`: the collapsible navigation overlay
//! - `DetailView`: back button and play control of an item screen
//!
//! ### Stateful Components
//!
//! - `RailsView`: borrows a scroll state and keeps the focused rail in view
//! - `ExitPrompt`: modal, emits an [`ExitChoice`] from key events
//!
//! Focus itself never lives here. Components only draw which node the
//! platform reports as focused.
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── title_bar.rs     (Top status bar)
//! ├── nav_menu.rs      (Overlay panel)
//! ├── rails_view.rs    (Windowed rails)
//! ├── detail_view.rs   (Item screen)
//! └── exit_prompt.rs   (Exit confirmation)
//! ```

mod detail_view;
mod exit_prompt;
mod nav_menu;
mod rails_view;
mod title_bar;

pub use detail_view::DetailView;
pub use exit_prompt::{ExitChoice, ExitPrompt};
pub use nav_menu::NavMenu;
pub use rails_view::RailsView;
pub use title_bar::TitleBar;
