//! Authentication module for managing the user session.
//!
//! - `Session`: in-memory token + validated identity, with a generation
//!   counter for discarding stale request results
//! - `TokenStore`: the persisted opaque token string
//! - `CredentialStore`: optional OS-level credential storage via keyring

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{Session, TokenStore};
