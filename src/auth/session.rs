// Allow dead code: Infrastructure methods for future use
#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::models::User;

/// File holding the persisted token string, under the config directory.
const TOKEN_FILE: &str = "token";

/// In-memory authentication state.
///
/// `user` is only ever set together with a token the backend has just
/// validated; a token with no validated user reads as not authenticated.
/// The generation counter increments on every transition so that results
/// of requests issued under an older session can be recognized and dropped.
#[derive(Debug, Default)]
pub struct Session {
    token: Option<String>,
    user: Option<User>,
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().map(|u| u.is_admin()).unwrap_or(false)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Install a validated token/user pair. The only way `user` becomes set.
    pub fn establish(&mut self, token: String, user: User) {
        self.token = Some(token);
        self.user = Some(user);
        self.generation += 1;
    }

    /// Drop all session state.
    pub fn clear(&mut self) {
        self.token = None;
        self.user = None;
        self.generation += 1;
    }
}

/// Persistence for the opaque token string - the only client state that
/// survives a restart. Identity is always re-fetched, never stored.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            path: dir.join(TOKEN_FILE),
        }
    }

    pub fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let token = contents.trim();
        if token.is_empty() {
            Ok(None)
        } else {
            Ok(Some(token.to_string()))
        }
    }

    pub fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn user(role: Role) -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            email: None,
            role,
        }
    }

    #[test]
    fn test_new_session_is_logged_out() {
        let session = Session::new();
        assert!(!session.is_authenticated());
        assert!(!session.is_admin());
        assert!(session.token().is_none());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_establish_and_clear_bump_generation() {
        let mut session = Session::new();
        let start = session.generation();

        session.establish("tok".to_string(), user(Role::User));
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("tok"));
        assert_eq!(session.generation(), start + 1);

        session.clear();
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
        assert_eq!(session.generation(), start + 2);
    }

    #[test]
    fn test_admin_check_follows_user() {
        let mut session = Session::new();
        session.establish("tok".to_string(), user(Role::Admin));
        assert!(session.is_admin());

        session.establish("tok2".to_string(), user(Role::User));
        assert!(!session.is_admin());
    }

    #[test]
    fn test_token_store_roundtrip() {
        let dir = std::env::temp_dir().join(format!("dropdeck-session-test-{}", std::process::id()));
        let store = TokenStore::new(dir.clone());

        assert_eq!(store.load().expect("load"), None);

        store.save("abc123").expect("save");
        assert_eq!(store.load().expect("load"), Some("abc123".to_string()));

        store.clear().expect("clear");
        assert_eq!(store.load().expect("load"), None);
        // clearing twice is fine
        store.clear().expect("clear again");

        let _ = std::fs::remove_dir_all(dir);
    }
}
