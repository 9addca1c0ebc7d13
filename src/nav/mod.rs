//! # Navigation engine
//!
//! Tracks the three-pane window over the filesystem tree.
//!
//! - [`state`]: `NavigationState`, the panes and their load tickets
//! - [`action`]: `Action`, `Effect` and the `update()` reducer
//! - [`path`]: current / parent / child path resolution
//! - [`history`]: bounded cursor-position cache

pub mod action;
pub mod history;
pub mod path;
pub mod state;
