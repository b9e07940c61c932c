//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, nav/status bars, overlays
//! - `input`: keyboard event handling
//! - `styles`: color scheme and text styling
//! - `views`: the public, login, and panel views

pub mod input;
pub mod render;
pub mod styles;
pub mod views;
