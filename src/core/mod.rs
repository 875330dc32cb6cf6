//! # Focus Engine
//!
//! Remote-control focus coordination. Decides which logical element holds
//! focus, where focus lands when a screen is (re)activated, how the side
//! menu reacts, and how virtualized rails scroll to keep focus visible.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • FocusShell (owner)   │
//!                    │  • HwEvent  (input)     │
//!                    │  • Effect   (output)    │
//!                    │                         │
//!                    │  No rendering. No I/O   │
//!                    │  beyond config/catalog. │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │   TV app   │      │   tests    │
//!     │  Adapter   │      │  (future)  │      │ (scripted  │
//!     │ (ratatui)  │      │            │      │  platform) │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`focusable`]: node identity, the `Focusable` capability, move pinning
//! - [`resolver`]: where focus lands on screen activation
//! - [`rails`]: windowed sections × items with scroll reconciliation
//! - [`overlay`]: the collapsible side menu state machine
//! - [`router`]: pub/sub for raw remote events
//! - [`shell`]: owner that wires it all together

pub mod action;
pub mod catalog;
pub mod config;
pub mod context;
pub mod debounce;
pub mod event;
pub mod focusable;
pub mod go_back;
pub mod overlay;
pub mod rails;
pub mod resolver;
pub mod router;
pub mod shell;

pub use action::Effect;
pub use shell::FocusShell;
