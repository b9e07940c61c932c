//! Keyboard input handling for the TUI.
//!
//! Translates key events into application state changes. Overlays are
//! handled first, then the current view's own bindings.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{
    can_add_password_char, can_add_text_char, can_add_username_char, App, AppState, AuthPane,
    LoginFocus, PanelTab, RegisterFocus, UploadFocus, View,
};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::ShowingHelp => {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingDelete(id) => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.confirm_delete(id);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::Quitting => return Ok(true),
        AppState::Normal => {}
    }

    match app.view {
        View::Public => handle_public_input(app, key),
        View::Login => handle_login_view_input(app, key),
        View::Panel => handle_panel_input(app, key),
    }
}

fn handle_public_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('1') => app.set_view(View::Public),
        KeyCode::Char('2') => {
            if app.session.is_authenticated() {
                app.set_view(View::Panel);
            } else {
                app.set_view(View::Login);
            }
        }
        KeyCode::Char('o') => {
            if app.session.is_authenticated() {
                app.logout();
            }
        }
        _ => {}
    }
    Ok(false)
}

fn handle_login_view_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.set_view(View::Public);
            return Ok(false);
        }
        // Text fields have no cursor, so the arrows are free for pane flips
        KeyCode::Left | KeyCode::Right => {
            app.auth_pane = match app.auth_pane {
                AuthPane::SignIn => AuthPane::Register,
                AuthPane::Register => AuthPane::SignIn,
            };
            return Ok(false);
        }
        _ => {}
    }

    match app.auth_pane {
        AuthPane::SignIn => handle_sign_in_input(app, key),
        AuthPane::Register => handle_register_input(app, key),
    }
    Ok(false)
}

fn handle_sign_in_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab | KeyCode::Down => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Submit,
                LoginFocus::Submit => LoginFocus::Username,
            };
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Submit,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::Submit => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => app.login_focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Submit => app.submit_login(),
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Submit => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login_username.chars().count(), c) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Submit => {}
        },
        _ => {}
    }
}

fn handle_register_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab | KeyCode::Down => {
            app.register_focus = match app.register_focus {
                RegisterFocus::Username => RegisterFocus::Email,
                RegisterFocus::Email => RegisterFocus::Password,
                RegisterFocus::Password => RegisterFocus::Terms,
                RegisterFocus::Terms => RegisterFocus::Submit,
                RegisterFocus::Submit => RegisterFocus::Username,
            };
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.register_focus = match app.register_focus {
                RegisterFocus::Username => RegisterFocus::Submit,
                RegisterFocus::Email => RegisterFocus::Username,
                RegisterFocus::Password => RegisterFocus::Email,
                RegisterFocus::Terms => RegisterFocus::Password,
                RegisterFocus::Submit => RegisterFocus::Terms,
            };
        }
        KeyCode::Enter => match app.register_focus {
            RegisterFocus::Submit => app.submit_register(),
            RegisterFocus::Username => app.register_focus = RegisterFocus::Email,
            RegisterFocus::Email => app.register_focus = RegisterFocus::Password,
            RegisterFocus::Password => app.register_focus = RegisterFocus::Terms,
            RegisterFocus::Terms => app.register_focus = RegisterFocus::Submit,
        },
        KeyCode::Backspace => match app.register_focus {
            RegisterFocus::Username => {
                app.register_username.pop();
            }
            RegisterFocus::Email => {
                app.register_email.pop();
            }
            RegisterFocus::Password => {
                app.register_password.pop();
            }
            RegisterFocus::Terms | RegisterFocus::Submit => {}
        },
        KeyCode::Char(c) => match app.register_focus {
            RegisterFocus::Username => {
                if can_add_username_char(app.register_username.chars().count(), c) {
                    app.register_username.push(c);
                }
            }
            RegisterFocus::Email => {
                if can_add_text_char(app.register_email.chars().count(), c) {
                    app.register_email.push(c);
                }
            }
            RegisterFocus::Password => {
                if can_add_password_char(app.register_password.chars().count(), c) {
                    app.register_password.push(c);
                }
            }
            RegisterFocus::Terms => {
                if c == ' ' {
                    app.register_terms = !app.register_terms;
                }
            }
            RegisterFocus::Submit => {}
        },
        _ => {}
    }
}

fn handle_panel_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    if app.panel_tab == PanelTab::Upload {
        handle_upload_input(app, key);
        return Ok(false);
    }

    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('1') => app.set_view(View::Public),
        KeyCode::Char('o') => app.logout(),
        KeyCode::Up => app.select_prev(),
        KeyCode::Down => app.select_next(),
        KeyCode::Enter | KeyCode::Char('d') => app.download_selected(),
        KeyCode::Char('x') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('r') => app.refresh_content(),
        KeyCode::Left => app.cycle_panel_tab(false),
        KeyCode::Right | KeyCode::Tab => app.cycle_panel_tab(true),
        _ => {}
    }
    Ok(false)
}

fn handle_upload_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.panel_tab = PanelTab::MyFiles;
        }
        KeyCode::Tab | KeyCode::Down => {
            app.upload_focus = match app.upload_focus {
                UploadFocus::Title => UploadFocus::Description,
                UploadFocus::Description => UploadFocus::Kind,
                UploadFocus::Kind => UploadFocus::FilePath,
                UploadFocus::FilePath => UploadFocus::Submit,
                UploadFocus::Submit => UploadFocus::Title,
            };
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.upload_focus = match app.upload_focus {
                UploadFocus::Title => UploadFocus::Submit,
                UploadFocus::Description => UploadFocus::Title,
                UploadFocus::Kind => UploadFocus::Description,
                UploadFocus::FilePath => UploadFocus::Kind,
                UploadFocus::Submit => UploadFocus::FilePath,
            };
        }
        KeyCode::Left | KeyCode::Right => {
            if app.upload_focus == UploadFocus::Kind {
                app.upload_kind = app.upload_kind.next();
            }
        }
        KeyCode::Enter => match app.upload_focus {
            UploadFocus::Submit => app.submit_upload(),
            UploadFocus::Title => app.upload_focus = UploadFocus::Description,
            UploadFocus::Description => app.upload_focus = UploadFocus::Kind,
            UploadFocus::Kind => app.upload_focus = UploadFocus::FilePath,
            UploadFocus::FilePath => app.upload_focus = UploadFocus::Submit,
        },
        KeyCode::Backspace => match app.upload_focus {
            UploadFocus::Title => {
                app.upload_title.pop();
            }
            UploadFocus::Description => {
                app.upload_description.pop();
            }
            UploadFocus::FilePath => {
                app.upload_file.pop();
            }
            UploadFocus::Kind | UploadFocus::Submit => {}
        },
        KeyCode::Char(c) => match app.upload_focus {
            UploadFocus::Title => {
                if can_add_text_char(app.upload_title.chars().count(), c) {
                    app.upload_title.push(c);
                }
            }
            UploadFocus::Description => {
                if can_add_text_char(app.upload_description.chars().count(), c) {
                    app.upload_description.push(c);
                }
            }
            UploadFocus::FilePath => {
                if can_add_text_char(app.upload_file.chars().count(), c) {
                    app.upload_file.push(c);
                }
            }
            UploadFocus::Kind => {
                if c == ' ' {
                    app.upload_kind = app.upload_kind.next();
                }
            }
            UploadFocus::Submit => {}
        },
        _ => {}
    }
}
