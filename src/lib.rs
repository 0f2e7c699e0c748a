//! feedview: a terminal reader that switches between a fixed list of
//! RSS/Atom feeds.
//!
//! The pipeline for one load is `registry -> fetcher -> parser -> render
//! sink`, driven by [`loader::FeedLoader`]. The TUI in [`ui`] only reads the
//! committed view and reacts to load completions.

pub mod app;
pub mod config;
pub mod feed;
pub mod loader;
pub mod menu;
pub mod registry;
pub mod render;
pub mod ui;
pub mod util;
