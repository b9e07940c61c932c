//! The sign-in / register view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, AuthPane, Flash, LoginFocus, MessageKind, RegisterFocus};
use crate::ui::styles;

/// Width of the centered form column
const FORM_WIDTH: u16 = 56;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(FORM_WIDTH),
            Constraint::Min(1),
        ])
        .split(area);

    match app.auth_pane {
        AuthPane::SignIn => render_sign_in(frame, app, columns[1]),
        AuthPane::Register => render_register(frame, app, columns[1]),
    }
}

fn render_sign_in(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // pane tabs
            Constraint::Length(3), // username
            Constraint::Length(3), // password
            Constraint::Length(3), // submit
            Constraint::Length(2), // flash
            Constraint::Length(1), // hints
            Constraint::Min(0),
        ])
        .split(area);

    render_pane_tabs(frame, app, chunks[0]);
    render_field(
        frame,
        chunks[1],
        "Username",
        &app.login_username,
        app.login_focus == LoginFocus::Username,
        false,
    );
    render_field(
        frame,
        chunks[2],
        "Password",
        &app.login_password,
        app.login_focus == LoginFocus::Password,
        true,
    );
    let label = if app.login_busy { "Signing in..." } else { "Sign In" };
    render_button(
        frame,
        chunks[3],
        label,
        app.login_focus == LoginFocus::Submit,
        app.login_busy,
    );
    render_flash(frame, &app.login_flash, chunks[4]);
    render_hints(frame, chunks[5]);
}

fn render_register(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // pane tabs
            Constraint::Length(3), // username
            Constraint::Length(3), // email
            Constraint::Length(3), // password
            Constraint::Length(1), // terms
            Constraint::Length(3), // submit
            Constraint::Length(2), // flash
            Constraint::Length(1), // hints
            Constraint::Min(0),
        ])
        .split(area);

    render_pane_tabs(frame, app, chunks[0]);
    render_field(
        frame,
        chunks[1],
        "Username",
        &app.register_username,
        app.register_focus == RegisterFocus::Username,
        false,
    );
    render_field(
        frame,
        chunks[2],
        "Email",
        &app.register_email,
        app.register_focus == RegisterFocus::Email,
        false,
    );
    render_field(
        frame,
        chunks[3],
        "Password",
        &app.register_password,
        app.register_focus == RegisterFocus::Password,
        true,
    );

    let checkbox = if app.register_terms { "[x]" } else { "[ ]" };
    let terms_style = if app.register_focus == RegisterFocus::Terms {
        styles::title_style()
    } else {
        styles::list_item_style()
    };
    let terms = Line::from(vec![
        Span::styled(format!(" {} ", checkbox), terms_style),
        Span::raw("I accept the terms and conditions"),
    ]);
    frame.render_widget(Paragraph::new(terms), chunks[4]);

    let label = if app.register_busy {
        "Creating account..."
    } else {
        "Create Account"
    };
    render_button(
        frame,
        chunks[5],
        label,
        app.register_focus == RegisterFocus::Submit,
        app.register_busy,
    );
    render_flash(frame, &app.register_flash, chunks[6]);
    render_hints(frame, chunks[7]);
}

fn render_pane_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let line = Line::from(vec![
        Span::styled("Sign In", styles::tab_style(app.auth_pane == AuthPane::SignIn)),
        Span::styled("  |  ", styles::muted_style()),
        Span::styled(
            "Register",
            styles::tab_style(app.auth_pane == AuthPane::Register),
        ),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    focused: bool,
    mask: bool,
) {
    let shown = if mask {
        "*".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let block = Block::default()
        .title(format!(" {} ", label))
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));
    frame.render_widget(Paragraph::new(shown).block(block), area);
}

fn render_button(frame: &mut Frame, area: Rect, label: &str, focused: bool, busy: bool) {
    let style = if busy {
        styles::muted_style()
    } else if focused {
        styles::title_style()
    } else {
        styles::list_item_style()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused && !busy));
    let button = Paragraph::new(Line::from(Span::styled(label, style)))
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(button, area);
}

pub(super) fn render_flash(frame: &mut Frame, flash: &Option<Flash>, area: Rect) {
    if let Some(flash) = flash {
        let style = match flash.kind {
            MessageKind::Success => styles::success_style(),
            MessageKind::Error => styles::error_style(),
        };
        let line = Line::from(Span::styled(flash.text.as_str(), style))
            .alignment(Alignment::Center);
        frame.render_widget(Paragraph::new(line), area);
    }
}

fn render_hints(frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(
        "[tab] next field  [< >] switch pane  [esc] back",
        styles::muted_style(),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(Paragraph::new(line), area);
}
