//! HTTP client for the content-sharing service's REST API.
//!
//! All requests go through one [`ApiClient`]; authenticated endpoints attach
//! the bearer token the client currently holds.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use futures::StreamExt;
use reqwest::{header, multipart, Client};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::models::{ContentItem, ContentKind, User};

use super::ApiError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// An upload about to be submitted: form fields plus the local file to send.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub title: String,
    pub description: String,
    pub kind: ContentKind,
    pub file_path: PathBuf,
}

/// API client for the content service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Drop the bearer token; later requests go out unauthenticated.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    // ===== Authentication =====

    /// Exchange credentials for an access token (password grant).
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let url = self.url("/auth/login");

        let response = self
            .client
            .post(&url)
            .form(&[
                ("username", username),
                ("password", password),
                ("grant_type", "password"),
            ])
            .send()
            .await
            .context("Failed to send login request")?;

        let response = Self::check_response(response).await?;

        let login: LoginResponse = response
            .json()
            .await
            .context("Failed to parse login response")?;

        Ok(login.access_token)
    }

    /// Create a new collaborator account.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<()> {
        let url = self.url("/auth/register");
        let body = serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to send registration request")?;

        Self::check_response(response).await?;
        Ok(())
    }

    /// Fetch the identity record for the current token.
    pub async fn fetch_me(&self) -> Result<User> {
        self.get_json("/users/me").await
    }

    // ===== Content =====

    /// List the current user's uploads.
    pub async fn fetch_my_content(&self) -> Result<Vec<ContentItem>> {
        self.get_json("/content/me").await
    }

    /// List every collaborator's uploads. Admin only; others get a 403.
    pub async fn fetch_all_content(&self) -> Result<Vec<ContentItem>> {
        self.get_json("/content/all").await
    }

    /// Upload a file with its metadata as a multipart form.
    pub async fn upload_content(&self, upload: &UploadRequest) -> Result<()> {
        let url = self.url("/content/upload");

        let file_name = upload
            .file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let bytes = tokio::fs::read(&upload.file_path)
            .await
            .with_context(|| format!("Failed to read {}", upload.file_path.display()))?;
        debug!(file = %file_name, size = bytes.len(), "Uploading file");

        let form = multipart::Form::new()
            .text("title", upload.title.clone())
            .text("description", upload.description.clone())
            .text("type", upload.kind.label())
            .part("file", multipart::Part::bytes(bytes).file_name(file_name));

        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .multipart(form)
            .send()
            .await
            .context("Failed to send upload request")?;

        Self::check_response(response).await?;
        Ok(())
    }

    /// Delete an upload by id.
    pub async fn delete_content(&self, id: i64) -> Result<()> {
        let url = self.url(&format!("/content/{}", id));

        let response = self
            .client
            .delete(&url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .context("Failed to send delete request")?;

        Self::check_response(response).await?;
        Ok(())
    }

    /// Stream a served file to `dest_dir`, returning the written path.
    pub async fn download_file(
        &self,
        content_path: &str,
        file_name: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf> {
        let url = self.url(content_path);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        let response = Self::check_response(response).await?;

        std::fs::create_dir_all(dest_dir)
            .with_context(|| format!("Failed to create {}", dest_dir.display()))?;
        let dest = dest_dir.join(file_name);

        let mut file = std::fs::File::create(&dest)
            .with_context(|| format!("Failed to create {}", dest.display()))?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Failed while reading download stream")?;
            std::io::Write::write_all(&mut file, &chunk)
                .with_context(|| format!("Failed writing {}", dest.display()))?;
        }

        debug!(path = %dest.display(), "Download complete");
        Ok(dest)
    }

    /// Ping the service's health endpoint.
    pub async fn health(&self) -> Result<HealthStatus> {
        self.get_json("/health").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalized() {
        let api = ApiClient::new("http://127.0.0.1:8001/").expect("client");
        assert_eq!(api.url("/users/me"), "http://127.0.0.1:8001/users/me");

        let api = ApiClient::new("https://example.com").expect("client");
        assert_eq!(api.url("/content/me"), "https://example.com/content/me");
    }

    #[test]
    fn test_parse_login_response() {
        let json = r#"{"access_token": "eyJhbGciOi.abc.def", "token_type": "bearer"}"#;
        let parsed: LoginResponse = serde_json::from_str(json).expect("Failed to parse login JSON");
        assert_eq!(parsed.access_token, "eyJhbGciOi.abc.def");
    }

    #[test]
    fn test_parse_health_response() {
        let json = r#"{"status": "ok", "message": "API up"}"#;
        let parsed: HealthStatus = serde_json::from_str(json).expect("Failed to parse health JSON");
        assert_eq!(parsed.status, "ok");
        assert_eq!(parsed.message.as_deref(), Some("API up"));
    }

    #[test]
    fn test_with_token_keeps_base_url() {
        let api = ApiClient::new("http://localhost:8001").expect("client");
        let authed = api.with_token("tok".to_string());
        assert_eq!(authed.url("/content/all"), "http://localhost:8001/content/all");
        assert_eq!(authed.token.as_deref(), Some("tok"));
    }
}
