use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, View};

use super::styles;
use super::views::{login, panel, public};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Nav bar
            Constraint::Min(10),   // Current view
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, chunks[0]);
    render_nav_bar(frame, app, chunks[1]);

    // Exactly one view renders per frame
    match app.view {
        View::Public => public::render(frame, app, chunks[2]),
        View::Login => login::render(frame, app, chunks[2]),
        View::Panel => panel::render(frame, app, chunks[2]),
    }

    render_status_bar(frame, app, chunks[3]);

    // Overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::ConfirmingDelete(_) => {
            render_confirm_overlay(frame, " Delete ", "Delete this file? [y/n]")
        }
        AppState::ConfirmingQuit => render_confirm_overlay(frame, " Quit ", "Quit dropdeck? [y/n]"),
        AppState::Normal | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, area: Rect) {
    let title = "  dropdeck";
    let help_hint = "[?] Help";

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + help_hint.len() + 4),
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());
    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

/// Navigation links. The collaborate link exists only for guests, the panel
/// link and sign-out control only for authenticated users - both derived
/// from the live session every frame.
fn render_nav_bar(frame: &mut Frame, app: &App, area: Rect) {
    let authed = app.session.is_authenticated();

    let mut links = vec![("[1] Home", app.view == View::Public)];
    if authed {
        links.push(("[2] Panel", app.view == View::Panel));
    } else {
        links.push(("[2] Collaborate", app.view == View::Login));
    }

    let mut spans = vec![Span::raw(" ")];
    for (i, (label, selected)) in links.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        spans.push(Span::styled(*label, styles::tab_style(*selected)));
    }

    if authed {
        let signout = "[o] Sign out";
        let used: usize = spans.iter().map(|s| s.content.len()).sum();
        let padding = (area.width as usize).saturating_sub(used + signout.len() + 2);
        spans.push(Span::raw(" ".repeat(padding)));
        spans.push(Span::styled(signout, styles::muted_style()));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = match app.session.user() {
        Some(user) => format!(" Signed in as {} ({}) ", user.username, user.role.display_name()),
        None => " Browsing as guest ".to_string(),
    };
    let right_text = " [q] Quit ";

    let padding = (area.width as usize)
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

fn render_confirm_overlay(frame: &mut Frame, title: &str, prompt: &str) {
    let area = centered_rect(40, 5, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    let text = Paragraph::new(Line::from(prompt))
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(text, area);
}

fn render_help_overlay(frame: &mut Frame) {
    let entries: &[(&str, &str)] = &[
        ("1", "Home view"),
        ("2", "Collaborate / panel view"),
        ("o", "Sign out"),
        ("up/down", "Move selection"),
        ("left/right", "Switch tabs or panes"),
        ("enter", "Submit / download"),
        ("x", "Delete the selected file"),
        ("r", "Refresh listings"),
        ("?", "This help"),
        ("q", "Quit"),
    ];

    let height = entries.len() as u16 + 4;
    let area = centered_rect(46, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![Line::from("")];
    for (key, desc) in entries {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<12}", key), styles::help_key_style()),
            Span::styled(*desc, styles::help_desc_style()),
        ]));
    }

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// A rect of the given size centered inside `r`, clamped to fit.
fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}
