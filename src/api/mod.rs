//! REST API client module for the content-sharing service.
//!
//! Authentication uses a password-grant token exchange; every other
//! endpoint expects the resulting JWT as a bearer token.

pub mod client;
pub mod error;

pub use client::{ApiClient, UploadRequest};
pub use error::ApiError;
