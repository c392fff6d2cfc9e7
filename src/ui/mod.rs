//! UI rendering module for geohazard
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod details;
pub mod help_overlay;
pub mod widgets;
pub mod world_map;

pub use details::render as render_details;
pub use help_overlay::render as render_help_overlay;
pub use world_map::render as render_world_map;
