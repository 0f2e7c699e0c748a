//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background load completion handling
//! - `render` - Layout and view dispatch
//! - `entries` - Entry list and summary pane
//! - `feeds` - Feed menu panel
//! - `status` - Status bar with load spinner
//! - `help` - Keybinding overlay

mod entries;
mod events;
mod feeds;
mod help;
mod input;
mod loop_runner;
mod render;
mod status;

pub use entries::format_relative_time;
pub use loop_runner::{run, Action};
