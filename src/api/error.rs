use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - credentials rejected or token expired")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    /// Pull the `detail` field out of a backend error body.
    /// The backend wraps every error it raises as `{"detail": "..."}`;
    /// anything else (proxy pages, panics) comes through as raw text.
    fn extract_detail(body: &str) -> String {
        #[derive(serde::Deserialize)]
        struct Detail {
            detail: String,
        }
        match serde_json::from_str::<Detail>(body) {
            Ok(parsed) => parsed.detail,
            Err(_) => Self::truncate_body(body),
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let detail = Self::extract_detail(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(detail),
            404 => ApiError::NotFound(detail),
            400..=499 => ApiError::Rejected(detail),
            500..=599 => ApiError::ServerError(detail),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, detail)),
        }
    }

    /// The server-provided message, when there is one worth showing.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::AccessDenied(d)
            | ApiError::NotFound(d)
            | ApiError::Rejected(d)
            | ApiError::ServerError(d) => (!d.is_empty()).then_some(d.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_unauthorized() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"detail": "Token expired"}"#);
        assert!(matches!(err, ApiError::Unauthorized));
        assert!(err.detail().is_none());
    }

    #[test]
    fn test_from_status_extracts_detail() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"detail": "Username already exists"}"#,
        );
        assert!(matches!(err, ApiError::Rejected(_)));
        assert_eq!(err.detail(), Some("Username already exists"));
    }

    #[test]
    fn test_from_status_raw_body() {
        // Non-JSON bodies pass through as-is
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "upstream timeout");
        assert_eq!(err.detail(), Some("upstream timeout"));
    }

    #[test]
    fn test_from_status_forbidden() {
        let err = ApiError::from_status(StatusCode::FORBIDDEN, r#"{"detail": "Access denied"}"#);
        assert!(matches!(err, ApiError::AccessDenied(_)));
    }

    #[test]
    fn test_empty_detail_is_none() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "");
        assert!(err.detail().is_none());
    }

    #[test]
    fn test_truncate_long_body() {
        let body = "x".repeat(600);
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
        let detail = err.detail().unwrap();
        assert!(detail.len() < body.len());
        assert!(detail.contains("truncated"));
    }
}
