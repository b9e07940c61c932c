//! Data models for the content-sharing service.
//!
//! - `User`, `Role`: the authenticated account and its authorization tier
//! - `ContentItem`, `ContentKind`: uploaded file records and their categories
//! - `ContentStats`: per-kind counters for the panel stats row

pub mod content;
pub mod user;

pub use content::{ContentItem, ContentKind, ContentStats};
pub use user::{Role, User};
