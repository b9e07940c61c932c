use serde::{Deserialize, Serialize};

/// Authorization tier of an account.
///
/// The backend labels registered accounts `"collaborator"`; the service
/// contract calls the tier `user`, so both spellings map to [`Role::User`].
/// Unknown role strings fail to parse, which the session layer treats as
/// not authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[serde(alias = "collaborator")]
    User,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Label shown in the panel header, matching what the backend reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "collaborator",
        }
    }
}

/// The authenticated account as returned by the identity endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identity_response() {
        let json = r#"{"id": 1, "username": "admin", "email": "admin@example.com", "role": "admin"}"#;
        let user: User = serde_json::from_str(json).expect("Failed to parse identity JSON");
        assert_eq!(user.id, 1);
        assert_eq!(user.username, "admin");
        assert_eq!(user.email.as_deref(), Some("admin@example.com"));
        assert!(user.is_admin());
    }

    #[test]
    fn test_parse_collaborator_role() {
        // Registered accounts come back with the legacy "collaborator" label
        let json = r#"{"id": 7, "username": "alice", "role": "collaborator"}"#;
        let user: User = serde_json::from_str(json).expect("Failed to parse collaborator JSON");
        assert_eq!(user.role, Role::User);
        assert!(!user.is_admin());
    }

    #[test]
    fn test_parse_user_role() {
        let json = r#"{"id": 7, "username": "alice", "role": "user"}"#;
        let user: User = serde_json::from_str(json).expect("Failed to parse user JSON");
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn test_unknown_role_fails_parse() {
        let json = r#"{"id": 7, "username": "alice", "role": "superuser"}"#;
        assert!(serde_json::from_str::<User>(json).is_err());
    }

    #[test]
    fn test_role_display_name() {
        assert_eq!(Role::Admin.display_name(), "admin");
        assert_eq!(Role::User.display_name(), "collaborator");
    }
}
