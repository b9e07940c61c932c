//! dropdeck - a keyboard-driven terminal client for a small
//! content-sharing service.
//!
//! Signs in against the service's REST backend, keeps the authenticated
//! session, and renders the public / login / panel views with upload,
//! download, and (for admins) service-wide listings.

mod api;
mod app;
mod auth;
mod config;
mod models;
mod ui;
mod utils;

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use api::ApiClient;
use app::{App, AppState};
use auth::{CredentialStore, TokenStore};
use config::Config;
use ui::input::handle_input;
use ui::render::render;

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Initialize the tracing subscriber.
///
/// Logs go to a file under the cache directory - the terminal itself
/// belongs to the UI. Use RUST_LOG to control the level.
fn init_tracing() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = Config::log_dir()?;
    std::fs::create_dir_all(&log_dir)?;
    let appender = tracing_appender::rolling::never(log_dir, "dropdeck.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--login" {
        return cli_login().await;
    }
    if args.len() > 1 && args[1] == "--health" {
        return check_health().await;
    }

    let _guard = init_tracing()?;
    info!("dropdeck starting");

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };

    let mut app = App::new(config, Config::config_dir()?)?;

    // Revalidate any persisted token before the first frame is drawn
    app.restore_session().await;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("dropdeck shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow timers and task results
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Drain background task results and advance timers
        app.tick();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

/// Sign in from the command line and persist the token for later runs.
async fn cli_login() -> Result<()> {
    let config = Config::load().unwrap_or_default();
    let api = ApiClient::new(&config.api_base_url)?;

    eprintln!("=== dropdeck login ({}) ===\n", config.api_base_url);

    let username = prompt_username(config.last_username.as_deref())?;
    if username.is_empty() {
        return Err(anyhow::anyhow!("A username is required"));
    }

    let password = if CredentialStore::has_credentials(&username) {
        print!("Use stored password? [Y/n]: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if input.trim().to_lowercase() != "n" {
            CredentialStore::get_password(&username)?
        } else {
            rpassword::prompt_password("Password: ")?
        }
    } else {
        rpassword::prompt_password("Password: ")?
    };

    eprintln!("\nAuthenticating...");
    let token = api.login(&username, &password).await?;
    let authed = api.with_token(token.clone());
    let user = authed.fetch_me().await?;

    TokenStore::new(Config::config_dir()?).save(&token)?;
    if let Err(e) = CredentialStore::store(&username, &password) {
        eprintln!("Note: could not store credentials in the keychain ({})", e);
    }

    let mut config = config;
    config.last_username = Some(user.username.clone());
    config.save()?;

    println!("Signed in as {} ({})", user.username, user.role.display_name());
    Ok(())
}

fn prompt_username(default: Option<&str>) -> Result<String> {
    match default {
        Some(name) => print!("Username [{}]: ", name),
        None => print!("Username: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    if input.is_empty() {
        Ok(default.unwrap_or_default().to_string())
    } else {
        Ok(input.to_string())
    }
}

/// Ping the backend and report whether it is reachable.
async fn check_health() -> Result<()> {
    let config = Config::load().unwrap_or_default();
    let api = ApiClient::new(&config.api_base_url)?;

    match api.health().await {
        Ok(health) => {
            let note = health
                .message
                .map(|m| format!(" - {}", m))
                .unwrap_or_default();
            println!("{}: {}{}", config.api_base_url, health.status, note);
        }
        Err(e) => println!("{}: unreachable ({})", config.api_base_url, e),
    }
    Ok(())
}
