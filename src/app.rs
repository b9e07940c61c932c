//! Application state management for dropdeck.
//!
//! This module contains the core `App` struct: the session and view state,
//! form fields, flash messages, and the background task channel that carries
//! network results back into the main loop.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError, UploadRequest};
use crate::auth::{CredentialStore, Session, TokenStore};
use crate::config::Config;
use crate::models::{ContentItem, ContentKind, ContentStats, User};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for free-text inputs (title, description, email, path).
const MAX_TEXT_LENGTH: usize = 200;

/// Flash messages auto-dismiss after this long.
const MESSAGE_DISMISS_MS: u64 = 5000;

/// Delay before returning to the home view after a successful sign-in.
const LOGIN_REDIRECT_MS: u64 = 1500;

/// Delay before flipping back to the sign-in pane after registration.
const REGISTER_SWITCH_MS: u64 = 2000;

/// Minimum username length enforced before any network call.
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Minimum password length enforced before any network call.
pub const MIN_PASSWORD_LENGTH: usize = 6;

// ============================================================================
// UI State Types
// ============================================================================

/// Top-level views. Exactly one is current at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Public,
    Login,
    Panel,
}

/// Overall application state (overlays over the current view)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingDelete(i64),
    ConfirmingQuit,
    Quitting,
}

/// Panes of the login view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPane {
    SignIn,
    Register,
}

/// Tabs of the authenticated panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelTab {
    MyFiles,
    Upload,
    AllFiles,
}

impl PanelTab {
    pub fn title(&self) -> &'static str {
        match self {
            PanelTab::MyFiles => "My Files",
            PanelTab::Upload => "Upload",
            PanelTab::AllFiles => "All Files",
        }
    }
}

/// Sign-in form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Username,
    Password,
    Submit,
}

/// Register form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterFocus {
    Username,
    Email,
    Password,
    Terms,
    Submit,
}

/// Upload form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFocus {
    Title,
    Description,
    Kind,
    FilePath,
    Submit,
}

// ============================================================================
// Flash Messages
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

/// A transient, auto-dismissing message tied to one form or the panel.
#[derive(Debug, Clone)]
pub struct Flash {
    pub text: String,
    pub kind: MessageKind,
    posted_at: Instant,
}

impl Flash {
    fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: MessageKind::Success,
            posted_at: Instant::now(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: MessageKind::Error,
            posted_at: Instant::now(),
        }
    }

    fn is_expired(&self) -> bool {
        self.posted_at.elapsed() >= Duration::from_millis(MESSAGE_DISMISS_MS)
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from spawned network tasks back to the main loop.
#[derive(Debug)]
enum TaskOutcome {
    /// Credential exchange and identity fetch both succeeded
    LoginComplete { token: String, user: User },
    /// Credential exchange failed; prior session state is untouched
    LoginRejected(String),
    /// Exchange succeeded but the identity fetch did not
    ProfileUnavailable { token: String },
    Registered,
    RegisterRejected(String),
    MyContent(Vec<ContentItem>),
    AllContent(Vec<ContentItem>),
    UploadFinished,
    UploadFailed(String),
    DeleteFinished,
    DeleteFailed(String),
    DownloadFinished(PathBuf),
    DownloadFailed(String),
}

/// A task outcome tagged with the session generation it was issued under.
/// Results from a superseded session are discarded, never applied.
#[derive(Debug)]
struct TaskResult {
    generation: u64,
    outcome: TaskOutcome,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub session: Session,
    pub api: ApiClient,
    token_store: TokenStore,

    // UI state
    pub state: AppState,
    pub view: View,
    pub auth_pane: AuthPane,
    pub panel_tab: PanelTab,

    // Sign-in form
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_busy: bool,
    pub login_flash: Option<Flash>,

    // Register form
    pub register_username: String,
    pub register_email: String,
    pub register_password: String,
    pub register_terms: bool,
    pub register_focus: RegisterFocus,
    pub register_busy: bool,
    pub register_flash: Option<Flash>,

    // Upload form
    pub upload_title: String,
    pub upload_description: String,
    pub upload_kind: ContentKind,
    pub upload_file: String,
    pub upload_focus: UploadFocus,
    pub upload_busy: bool,

    // Content lists
    pub my_content: Vec<ContentItem>,
    pub all_content: Vec<ContentItem>,
    pub stats: ContentStats,
    pub my_selection: usize,
    pub all_selection: usize,
    pub delete_busy: bool,
    pub download_busy: bool,
    pub panel_flash: Option<Flash>,

    // Timed transitions
    pending_view: Option<(Instant, View)>,
    pending_pane_flip: Option<Instant>,

    // Background task channel
    task_rx: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,
}

impl App {
    /// Create a new application instance. `state_dir` holds the persisted
    /// token (normally the config directory).
    pub fn new(config: Config, state_dir: PathBuf) -> Result<Self> {
        let api = ApiClient::new(&config.api_base_url)?;
        let token_store = TokenStore::new(state_dir);
        let (task_tx, task_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        // Prefill the username from env or the last successful login
        let login_username = std::env::var("DROPDECK_USERNAME")
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();
        let login_focus = if login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };

        Ok(Self {
            config,
            session: Session::new(),
            api,
            token_store,

            state: AppState::Normal,
            view: View::Public,
            auth_pane: AuthPane::SignIn,
            panel_tab: PanelTab::MyFiles,

            login_username,
            login_password: String::new(),
            login_focus,
            login_busy: false,
            login_flash: None,

            register_username: String::new(),
            register_email: String::new(),
            register_password: String::new(),
            register_terms: false,
            register_focus: RegisterFocus::Username,
            register_busy: false,
            register_flash: None,

            upload_title: String::new(),
            upload_description: String::new(),
            upload_kind: ContentKind::Image,
            upload_file: String::new(),
            upload_focus: UploadFocus::Title,
            upload_busy: false,

            my_content: Vec::new(),
            all_content: Vec::new(),
            stats: ContentStats::default(),
            my_selection: 0,
            all_selection: 0,
            delete_busy: false,
            download_busy: false,
            panel_flash: None,

            pending_view: None,
            pending_pane_flip: None,

            task_rx,
            task_tx,
        })
    }

    // =========================================================================
    // Session Operations
    // =========================================================================

    /// Revalidate a persisted token against the identity endpoint.
    ///
    /// Runs once at startup, before the first frame. Any failure leaves the
    /// app logged out on the public view without surfacing an error; an
    /// Unauthorized response additionally removes the dead token from disk.
    pub async fn restore_session(&mut self) {
        let token = match self.token_store.load() {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("No persisted token, starting logged out");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read persisted token, starting logged out");
                return;
            }
        };

        self.api.set_token(token.clone());
        match self.api.fetch_me().await {
            Ok(user) => {
                info!(username = %user.username, role = user.role.display_name(), "Session restored");
                self.session.establish(token, user);
                self.refresh_content();
            }
            Err(e) => {
                debug!(error = %e, "Persisted token rejected, continuing logged out");
                self.api.clear_token();
                if matches!(e.downcast_ref::<ApiError>(), Some(ApiError::Unauthorized)) {
                    if let Err(e) = self.token_store.clear() {
                        warn!(error = %e, "Failed to remove rejected token");
                    }
                }
            }
        }
    }

    /// Submit the sign-in form. No-op while a sign-in is already in flight.
    pub fn submit_login(&mut self) {
        if self.login_busy {
            return;
        }

        let username = self.login_username.trim().to_string();
        let password = self.login_password.clone();
        if let Err(msg) = validate_login(&username, &password) {
            self.login_flash = Some(Flash::error(msg));
            return;
        }

        self.login_busy = true;
        self.login_flash = None;

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        let generation = self.session.generation();

        tokio::spawn(async move {
            let outcome = match api.login(&username, &password).await {
                Ok(token) => {
                    // Always re-derive identity from the backend after the
                    // exchange; sign-in is complete only when this succeeds.
                    let authed = api.with_token(token.clone());
                    match authed.fetch_me().await {
                        Ok(user) => TaskOutcome::LoginComplete { token, user },
                        Err(e) => {
                            warn!(error = %e, "Identity fetch failed after credential exchange");
                            TaskOutcome::ProfileUnavailable { token }
                        }
                    }
                }
                Err(e) => {
                    info!(error = %e, "Sign-in rejected");
                    TaskOutcome::LoginRejected(login_error_message(&e))
                }
            };
            Self::send_result(&tx, TaskResult { generation, outcome }).await;
        });
    }

    /// Submit the register form. Client-side rules block bad submissions
    /// before any network call.
    pub fn submit_register(&mut self) {
        if self.register_busy {
            return;
        }

        let username = self.register_username.trim().to_string();
        let email = self.register_email.trim().to_string();
        let password = self.register_password.clone();
        if let Err(msg) = validate_registration(&username, &email, &password, self.register_terms) {
            self.register_flash = Some(Flash::error(msg));
            return;
        }

        self.register_busy = true;
        self.register_flash = None;

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        let generation = self.session.generation();

        tokio::spawn(async move {
            let outcome = match api.register(&username, &email, &password).await {
                Ok(()) => TaskOutcome::Registered,
                Err(e) => {
                    info!(error = %e, "Registration rejected");
                    TaskOutcome::RegisterRejected(register_error_message(&e))
                }
            };
            Self::send_result(&tx, TaskResult { generation, outcome }).await;
        });
    }

    /// Clear the session and all authenticated UI, unconditionally.
    pub fn logout(&mut self) {
        info!("Signing out");
        self.session.clear();
        self.api.clear_token();
        if let Err(e) = self.token_store.clear() {
            warn!(error = %e, "Failed to remove persisted token");
        }

        self.my_content.clear();
        self.all_content.clear();
        self.stats = ContentStats::default();
        self.my_selection = 0;
        self.all_selection = 0;
        self.panel_tab = PanelTab::MyFiles;
        self.panel_flash = None;
        self.login_flash = None;
        self.pending_view = None;
        self.login_busy = false;
        self.upload_busy = false;
        self.delete_busy = false;
        self.download_busy = false;

        self.set_view(View::Public);
    }

    /// Switch the single visible view. Entering the panel while logged out
    /// lands on the login view instead; entering it logged in refreshes the
    /// content listings.
    pub fn set_view(&mut self, view: View) {
        if view == View::Panel && !self.session.is_authenticated() {
            self.view = View::Login;
            return;
        }
        self.view = view;
        if view == View::Panel {
            self.refresh_content();
        }
    }

    // =========================================================================
    // Content Operations
    // =========================================================================

    /// Fetch the content listings in the background. Non-success responses
    /// are treated as empty lists.
    pub fn refresh_content(&mut self) {
        if !self.session.is_authenticated() {
            return;
        }

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        let generation = self.session.generation();
        let admin = self.session.is_admin();

        tokio::spawn(async move {
            let mine = api.fetch_my_content().await.unwrap_or_else(|e| {
                debug!(error = %e, "Own content fetch failed, treating as empty");
                Vec::new()
            });
            Self::send_result(
                &tx,
                TaskResult {
                    generation,
                    outcome: TaskOutcome::MyContent(mine),
                },
            )
            .await;

            if admin {
                let all = api.fetch_all_content().await.unwrap_or_else(|e| {
                    debug!(error = %e, "Full content fetch failed, treating as empty");
                    Vec::new()
                });
                Self::send_result(
                    &tx,
                    TaskResult {
                        generation,
                        outcome: TaskOutcome::AllContent(all),
                    },
                )
                .await;
            }
        });
    }

    /// Submit the upload form. No-op while an upload is in flight.
    pub fn submit_upload(&mut self) {
        if self.upload_busy {
            return;
        }

        let title = self.upload_title.trim().to_string();
        let file = self.upload_file.trim().to_string();
        if let Err(msg) = validate_upload(&title, &file) {
            self.panel_flash = Some(Flash::error(msg));
            return;
        }
        let file_path = PathBuf::from(&file);
        if !file_path.is_file() {
            self.panel_flash = Some(Flash::error(format!("File not found: {}", file)));
            return;
        }

        self.upload_busy = true;
        self.panel_flash = None;

        let request = UploadRequest {
            title,
            description: self.upload_description.trim().to_string(),
            kind: self.upload_kind,
            file_path,
        };
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        let generation = self.session.generation();

        tokio::spawn(async move {
            let outcome = match api.upload_content(&request).await {
                Ok(()) => TaskOutcome::UploadFinished,
                Err(e) => {
                    warn!(error = %e, "Upload failed");
                    TaskOutcome::UploadFailed(upload_error_message(&e))
                }
            };
            Self::send_result(&tx, TaskResult { generation, outcome }).await;
        });
    }

    /// Ask for confirmation before deleting the selected own upload.
    pub fn request_delete(&mut self) {
        if self.delete_busy || self.panel_tab != PanelTab::MyFiles {
            return;
        }
        if let Some(item) = self.my_content.get(self.my_selection) {
            self.state = AppState::ConfirmingDelete(item.id);
        }
    }

    /// Delete a content item after confirmation.
    pub fn confirm_delete(&mut self, id: i64) {
        self.state = AppState::Normal;
        if self.delete_busy {
            return;
        }
        self.delete_busy = true;

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        let generation = self.session.generation();

        tokio::spawn(async move {
            let outcome = match api.delete_content(id).await {
                Ok(()) => TaskOutcome::DeleteFinished,
                Err(e) => {
                    warn!(error = %e, content_id = id, "Delete failed");
                    TaskOutcome::DeleteFailed(delete_error_message(&e))
                }
            };
            Self::send_result(&tx, TaskResult { generation, outcome }).await;
        });
    }

    /// Download the selected item to the local downloads directory.
    pub fn download_selected(&mut self) {
        if self.download_busy {
            return;
        }
        let Some(item) = self.selected_content() else {
            return;
        };

        let path = item.path.clone();
        let name = item.download_name().to_string();
        self.download_busy = true;

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        let generation = self.session.generation();
        let dest_dir = Config::download_dir();

        tokio::spawn(async move {
            let outcome = match api.download_file(&path, &name, &dest_dir).await {
                Ok(dest) => TaskOutcome::DownloadFinished(dest),
                Err(e) => {
                    warn!(error = %e, "Download failed");
                    TaskOutcome::DownloadFailed("Could not download the file. Try again.".to_string())
                }
            };
            Self::send_result(&tx, TaskResult { generation, outcome }).await;
        });
    }

    /// The item under the cursor in the active listing tab.
    pub fn selected_content(&self) -> Option<&ContentItem> {
        match self.panel_tab {
            PanelTab::MyFiles => self.my_content.get(self.my_selection),
            PanelTab::AllFiles => self.all_content.get(self.all_selection),
            PanelTab::Upload => None,
        }
    }

    pub fn select_next(&mut self) {
        match self.panel_tab {
            PanelTab::MyFiles => {
                if self.my_selection + 1 < self.my_content.len() {
                    self.my_selection += 1;
                }
            }
            PanelTab::AllFiles => {
                if self.all_selection + 1 < self.all_content.len() {
                    self.all_selection += 1;
                }
            }
            PanelTab::Upload => {}
        }
    }

    pub fn select_prev(&mut self) {
        match self.panel_tab {
            PanelTab::MyFiles => self.my_selection = self.my_selection.saturating_sub(1),
            PanelTab::AllFiles => self.all_selection = self.all_selection.saturating_sub(1),
            PanelTab::Upload => {}
        }
    }

    /// Cycle panel tabs, skipping the admin-only listing for non-admins.
    /// Admin status is read from the live session on every call.
    pub fn cycle_panel_tab(&mut self, forward: bool) {
        let admin = self.session.is_admin();
        self.panel_tab = match (self.panel_tab, forward) {
            (PanelTab::MyFiles, true) => PanelTab::Upload,
            (PanelTab::Upload, true) => {
                if admin {
                    PanelTab::AllFiles
                } else {
                    PanelTab::MyFiles
                }
            }
            (PanelTab::AllFiles, true) => PanelTab::MyFiles,
            (PanelTab::MyFiles, false) => {
                if admin {
                    PanelTab::AllFiles
                } else {
                    PanelTab::Upload
                }
            }
            (PanelTab::Upload, false) => PanelTab::MyFiles,
            (PanelTab::AllFiles, false) => PanelTab::Upload,
        };
    }

    // =========================================================================
    // Task Results & Timers
    // =========================================================================

    /// Helper to send task results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<TaskResult>, result: TaskResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send task result - channel closed");
        }
    }

    /// Advance timers and drain completed background tasks.
    /// Called once per iteration of the main loop.
    pub fn tick(&mut self) {
        // Collect all pending results first to avoid borrow conflicts
        let mut results = Vec::new();
        while let Ok(result) = self.task_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.apply_task_result(result);
        }

        for flash in [
            &mut self.login_flash,
            &mut self.register_flash,
            &mut self.panel_flash,
        ] {
            if flash.as_ref().is_some_and(Flash::is_expired) {
                *flash = None;
            }
        }

        if let Some((due, view)) = self.pending_view {
            if Instant::now() >= due {
                self.pending_view = None;
                self.set_view(view);
            }
        }

        if self.pending_pane_flip.is_some_and(|due| Instant::now() >= due) {
            self.pending_pane_flip = None;
            self.auth_pane = AuthPane::SignIn;
        }
    }

    /// Apply one background task result to application state.
    ///
    /// Results tagged with a generation other than the current session's are
    /// dropped here - a sign-in that completes after a sign-out, or a listing
    /// that lands after the session changed, must not mutate anything.
    fn apply_task_result(&mut self, result: TaskResult) {
        if result.generation != self.session.generation() {
            debug!(
                result_generation = result.generation,
                current_generation = self.session.generation(),
                "Discarding stale task result"
            );
            return;
        }

        match result.outcome {
            TaskOutcome::LoginComplete { token, user } => {
                self.login_busy = false;

                if let Err(e) = self.token_store.save(&token) {
                    warn!(error = %e, "Failed to persist token");
                }
                if !self.login_password.is_empty() {
                    if let Err(e) = CredentialStore::store(&user.username, &self.login_password) {
                        debug!(error = %e, "Failed to store credentials in keychain");
                    }
                }
                self.config.last_username = Some(user.username.clone());
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                info!(username = %user.username, "Signed in");
                self.api.set_token(token.clone());
                self.session.establish(token, user);
                self.login_password.clear();
                self.login_flash = Some(Flash::success("Welcome! Taking you home..."));
                self.pending_view = Some((
                    Instant::now() + Duration::from_millis(LOGIN_REDIRECT_MS),
                    View::Public,
                ));
                self.refresh_content();
            }
            TaskOutcome::LoginRejected(message) => {
                self.login_busy = false;
                self.login_flash = Some(Flash::error(message));
            }
            TaskOutcome::ProfileUnavailable { token } => {
                self.login_busy = false;
                // The exchange succeeded, so the token is persisted for the
                // next startup to revalidate; with no validated user the
                // session stays logged out.
                if let Err(e) = self.token_store.save(&token) {
                    warn!(error = %e, "Failed to persist token");
                }
                self.login_flash = Some(Flash::error(
                    "Signed in, but your profile could not be loaded. Try again.",
                ));
            }
            TaskOutcome::Registered => {
                self.register_busy = false;
                self.register_username.clear();
                self.register_email.clear();
                self.register_password.clear();
                self.register_terms = false;
                self.register_focus = RegisterFocus::Username;
                self.register_flash =
                    Some(Flash::success("Account created! You can sign in now."));
                self.pending_pane_flip =
                    Some(Instant::now() + Duration::from_millis(REGISTER_SWITCH_MS));
            }
            TaskOutcome::RegisterRejected(message) => {
                self.register_busy = false;
                self.register_flash = Some(Flash::error(message));
            }
            TaskOutcome::MyContent(items) => {
                self.my_content = items;
                self.stats = ContentStats::from_items(&self.my_content);
                self.my_selection = self
                    .my_selection
                    .min(self.my_content.len().saturating_sub(1));
            }
            TaskOutcome::AllContent(items) => {
                self.all_content = items;
                self.all_selection = self
                    .all_selection
                    .min(self.all_content.len().saturating_sub(1));
            }
            TaskOutcome::UploadFinished => {
                self.upload_busy = false;
                self.upload_title.clear();
                self.upload_description.clear();
                self.upload_file.clear();
                self.upload_kind = ContentKind::Image;
                self.upload_focus = UploadFocus::Title;
                self.panel_flash = Some(Flash::success("File uploaded."));
                self.refresh_content();
            }
            TaskOutcome::UploadFailed(message) => {
                self.upload_busy = false;
                self.panel_flash = Some(Flash::error(message));
            }
            TaskOutcome::DeleteFinished => {
                self.delete_busy = false;
                self.panel_flash = Some(Flash::success("File deleted."));
                self.refresh_content();
            }
            TaskOutcome::DeleteFailed(message) => {
                self.delete_busy = false;
                self.panel_flash = Some(Flash::error(message));
            }
            TaskOutcome::DownloadFinished(dest) => {
                self.download_busy = false;
                self.panel_flash = Some(Flash::success(format!("Saved to {}", dest.display())));
            }
            TaskOutcome::DownloadFailed(message) => {
                self.download_busy = false;
                self.panel_flash = Some(Flash::error(message));
            }
        }
    }
}

// ============================================================================
// Form Validation
// ============================================================================

/// Sign-in form rules checked before any network call.
pub fn validate_login(username: &str, password: &str) -> Result<(), String> {
    if username.is_empty() || password.is_empty() {
        return Err("Username and password are required".to_string());
    }
    Ok(())
}

/// Register form rules checked before any network call.
pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
    terms_accepted: bool,
) -> Result<(), String> {
    if username.chars().count() < MIN_USERNAME_LENGTH {
        return Err(format!(
            "Username must be at least {} characters",
            MIN_USERNAME_LENGTH
        ));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }
    if !email.contains('@') {
        return Err("Enter a valid email address".to_string());
    }
    if !terms_accepted {
        return Err("You must accept the terms and conditions".to_string());
    }
    Ok(())
}

/// Upload form rules checked before any network call.
pub fn validate_upload(title: &str, file_path: &str) -> Result<(), String> {
    if title.is_empty() {
        return Err("Title is required".to_string());
    }
    if file_path.is_empty() {
        return Err("Choose a file to upload".to_string());
    }
    Ok(())
}

// ============================================================================
// Error Message Mapping
// ============================================================================

/// Map a sign-in failure to the message shown inline. Network failures and
/// bad credentials read the same at this layer; the distinction lives in the
/// error itself (and the logs).
fn login_error_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::Unauthorized) => "Incorrect username or password. Try again.".to_string(),
        Some(api_err) => api_err
            .detail()
            .map(str::to_string)
            .unwrap_or_else(|| "Could not sign in. Try again.".to_string()),
        None => "Connection error. Try again.".to_string(),
    }
}

/// Map a registration failure, customizing the common duplicate cases from
/// the server's detail text.
fn register_error_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(api_err) => {
            let detail = api_err.detail().unwrap_or("");
            let lowered = detail.to_lowercase();
            if lowered.contains("username") || lowered.contains("usuario") {
                "That username is already taken".to_string()
            } else if lowered.contains("email") {
                "That email is already registered".to_string()
            } else if !detail.is_empty() {
                detail.to_string()
            } else {
                "Could not create the account".to_string()
            }
        }
        None => "Connection error. Try again.".to_string(),
    }
}

fn upload_error_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(api_err) => match api_err.detail() {
            Some(detail) => format!("Error uploading file: {}", detail),
            None => "Error uploading file".to_string(),
        },
        None => "Connection error. Try again.".to_string(),
    }
}

fn delete_error_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(_) => "Could not delete the file".to_string(),
        None => "Connection error. Try again.".to_string(),
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

/// Check if a free-text character (title, email, path) should be accepted
pub fn can_add_text_char(current_len: usize, c: char) -> bool {
    current_len < MAX_TEXT_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    static TEST_DIR_SEQ: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

    fn test_state_dir() -> PathBuf {
        let seq = TEST_DIR_SEQ.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "dropdeck-app-test-{}-{}",
            std::process::id(),
            seq
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn test_app() -> (App, PathBuf) {
        let dir = test_state_dir();
        let app = App::new(Config::default(), dir.clone()).expect("app");
        (app, dir)
    }

    fn sample_user(role: Role) -> User {
        User {
            id: 2,
            username: "alice".to_string(),
            email: Some("alice@example.com".to_string()),
            role,
        }
    }

    fn result(generation: u64, outcome: TaskOutcome) -> TaskResult {
        TaskResult {
            generation,
            outcome,
        }
    }

    // -------------------------------------------------------------------------
    // View Machine Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_exactly_one_view_after_any_switch() {
        let (mut app, dir) = test_app();
        for view in [View::Login, View::Public, View::Login, View::Public] {
            app.set_view(view);
            assert_eq!(app.view, view);
        }
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_panel_requires_authentication() {
        let (mut app, dir) = test_app();
        app.set_view(View::Panel);
        assert_eq!(app.view, View::Login);

        app.session.establish("tok".to_string(), sample_user(Role::User));
        app.set_view(View::Panel);
        assert_eq!(app.view, View::Panel);
        let _ = std::fs::remove_dir_all(dir);
    }

    // -------------------------------------------------------------------------
    // Session Transition Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_login_complete_establishes_session_and_persists_token() {
        let (mut app, dir) = test_app();
        app.login_password = "secret".to_string();
        let generation = app.session.generation();

        app.apply_task_result(result(
            generation,
            TaskOutcome::LoginComplete {
                token: "tok123".to_string(),
                user: sample_user(Role::User),
            },
        ));

        assert!(app.session.is_authenticated());
        assert_eq!(app.session.token(), Some("tok123"));
        assert!(app.login_password.is_empty());
        assert!(!app.login_busy);
        assert!(matches!(
            app.login_flash.as_ref().map(|f| f.kind),
            Some(MessageKind::Success)
        ));
        // Token is on disk for the next startup
        assert_eq!(
            app.token_store.load().expect("load"),
            Some("tok123".to_string())
        );
        // Home redirect is scheduled
        assert!(matches!(app.pending_view, Some((_, View::Public))));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_login_rejected_leaves_session_untouched() {
        let (mut app, dir) = test_app();
        let generation = app.session.generation();

        app.apply_task_result(result(
            generation,
            TaskOutcome::LoginRejected("Incorrect username or password. Try again.".to_string()),
        ));

        assert!(!app.session.is_authenticated());
        assert_eq!(app.token_store.load().expect("load"), None);
        assert!(matches!(
            app.login_flash.as_ref().map(|f| f.kind),
            Some(MessageKind::Error)
        ));
        assert_eq!(app.session.generation(), generation);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_profile_unavailable_stays_logged_out_but_persists_token() {
        let (mut app, dir) = test_app();
        let generation = app.session.generation();

        app.apply_task_result(result(
            generation,
            TaskOutcome::ProfileUnavailable {
                token: "tok123".to_string(),
            },
        ));

        // Token with no validated user reads as not authenticated
        assert!(!app.session.is_authenticated());
        assert_eq!(
            app.token_store.load().expect("load"),
            Some("tok123".to_string())
        );
        let flash = app.login_flash.as_ref().expect("flash");
        assert_eq!(flash.kind, MessageKind::Error);
        assert!(flash.text.contains("profile could not be loaded"));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let (mut app, dir) = test_app();
        let generation = app.session.generation();
        app.apply_task_result(result(
            generation,
            TaskOutcome::LoginComplete {
                token: "tok".to_string(),
                user: sample_user(Role::Admin),
            },
        ));
        app.set_view(View::Panel);
        app.my_content = vec![];
        app.panel_tab = PanelTab::AllFiles;

        app.logout();

        assert!(!app.session.is_authenticated());
        assert!(app.session.token().is_none());
        assert_eq!(app.token_store.load().expect("load"), None);
        assert_eq!(app.view, View::Public);
        assert_eq!(app.panel_tab, PanelTab::MyFiles);
        assert!(app.my_content.is_empty() && app.all_content.is_empty());
        assert_eq!(app.stats, ContentStats::default());
        assert!(app.pending_view.is_none());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_stale_results_are_discarded() {
        let (mut app, dir) = test_app();
        let old_generation = app.session.generation();

        // A sign-out happens while a sign-in is in flight
        app.session.clear();

        app.apply_task_result(result(
            old_generation,
            TaskOutcome::LoginComplete {
                token: "late".to_string(),
                user: sample_user(Role::User),
            },
        ));

        assert!(!app.session.is_authenticated());
        assert_eq!(app.token_store.load().expect("load"), None);
        assert!(app.login_flash.is_none());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_stale_content_listing_is_discarded() {
        let (mut app, dir) = test_app();
        app.session.establish("tok".to_string(), sample_user(Role::User));
        let old_generation = app.session.generation();
        app.session.clear();

        app.apply_task_result(result(
            old_generation,
            TaskOutcome::MyContent(vec![ContentItem {
                id: 1,
                title: "late".to_string(),
                description: String::new(),
                kind: ContentKind::File,
                path: "/uploads/x".to_string(),
                original_filename: None,
                owner_id: 2,
                created_at: None,
            }]),
        ));

        assert!(app.my_content.is_empty());
        assert_eq!(app.stats.total, 0);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_double_submit_is_ignored_while_busy() {
        let (mut app, dir) = test_app();
        app.login_username = "alice".to_string();
        app.login_password = "secret1".to_string();
        app.login_busy = true;
        app.submit_login();
        // Still exactly the one in-flight attempt; no flash was raised
        assert!(app.login_busy);
        assert!(app.login_flash.is_none());
        let _ = std::fs::remove_dir_all(dir);
    }

    // -------------------------------------------------------------------------
    // Panel Tab Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_panel_tabs_skip_admin_listing_for_users() {
        let (mut app, dir) = test_app();
        app.session.establish("tok".to_string(), sample_user(Role::User));

        assert_eq!(app.panel_tab, PanelTab::MyFiles);
        app.cycle_panel_tab(true);
        assert_eq!(app.panel_tab, PanelTab::Upload);
        app.cycle_panel_tab(true);
        assert_eq!(app.panel_tab, PanelTab::MyFiles);
        app.cycle_panel_tab(false);
        assert_eq!(app.panel_tab, PanelTab::Upload);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_panel_tabs_include_admin_listing_for_admins() {
        let (mut app, dir) = test_app();
        app.session.establish("tok".to_string(), sample_user(Role::Admin));

        app.cycle_panel_tab(true);
        app.cycle_panel_tab(true);
        assert_eq!(app.panel_tab, PanelTab::AllFiles);
        app.cycle_panel_tab(true);
        assert_eq!(app.panel_tab, PanelTab::MyFiles);
        let _ = std::fs::remove_dir_all(dir);
    }

    // -------------------------------------------------------------------------
    // Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_validate_registration_short_password() {
        let err = validate_registration("alice", "a@b.com", "abc", true)
            .expect_err("3-char password must be rejected");
        assert!(err.contains('6'));
    }

    #[test]
    fn test_validate_registration_rules() {
        assert!(validate_registration("alice", "a@b.com", "secret1", true).is_ok());
        assert!(validate_registration("al", "a@b.com", "secret1", true).is_err());
        assert!(validate_registration("alice", "not-an-email", "secret1", true).is_err());
        assert!(validate_registration("alice", "a@b.com", "secret1", false).is_err());
    }

    #[test]
    fn test_validate_login() {
        assert!(validate_login("alice", "pw").is_ok());
        assert!(validate_login("", "pw").is_err());
        assert!(validate_login("alice", "").is_err());
    }

    #[test]
    fn test_validate_upload() {
        assert!(validate_upload("Title", "/tmp/a.png").is_ok());
        assert!(validate_upload("", "/tmp/a.png").is_err());
        assert!(validate_upload("Title", "").is_err());
    }

    // -------------------------------------------------------------------------
    // Error Message Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_login_error_messages() {
        let unauthorized: anyhow::Error = ApiError::Unauthorized.into();
        assert_eq!(
            login_error_message(&unauthorized),
            "Incorrect username or password. Try again."
        );

        let other = anyhow::anyhow!("dns failure");
        assert_eq!(login_error_message(&other), "Connection error. Try again.");
    }

    #[test]
    fn test_register_error_messages() {
        let dup_user: anyhow::Error =
            ApiError::Rejected("Username already exists".to_string()).into();
        assert_eq!(
            register_error_message(&dup_user),
            "That username is already taken"
        );

        let dup_email: anyhow::Error =
            ApiError::Rejected("Email already registered".to_string()).into();
        assert_eq!(
            register_error_message(&dup_email),
            "That email is already registered"
        );

        let other_detail: anyhow::Error =
            ApiError::Rejected("Registration closed".to_string()).into();
        assert_eq!(register_error_message(&other_detail), "Registration closed");

        let network = anyhow::anyhow!("connection refused");
        assert_eq!(
            register_error_message(&network),
            "Connection error. Try again."
        );
    }

    // -------------------------------------------------------------------------
    // Flash & Input Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_flash_expiry() {
        let mut flash = Flash::success("ok");
        assert!(!flash.is_expired());
        flash.posted_at = Instant::now() - Duration::from_millis(MESSAGE_DISMISS_MS + 1);
        assert!(flash.is_expired());
    }

    #[test]
    fn test_can_add_username_char() {
        assert!(can_add_username_char(0, 'a'));
        assert!(can_add_username_char(49, 'z'));
        assert!(!can_add_username_char(50, 'a'));
        assert!(!can_add_username_char(0, '\n'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\x00'));
    }
}
