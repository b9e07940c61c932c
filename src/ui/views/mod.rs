//! The three mutually exclusive top-level views.

pub mod login;
pub mod panel;
pub mod public;
