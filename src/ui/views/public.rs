//! The public landing view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(5)])
        .split(area);

    render_hero(frame, chunks[0]);
    render_cta(frame, app, chunks[1]);
}

fn render_hero(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("dropdeck", styles::title_style())).alignment(Alignment::Center),
        Line::from(Span::styled(
            "a shared shelf for the collective's work",
            styles::muted_style(),
        ))
        .alignment(Alignment::Center),
        Line::from(""),
        Line::from("Collaborators upload images, videos and documents;"),
        Line::from("everything lives in one place, browsable by the whole team."),
        Line::from(""),
        Line::from(vec![
            Span::styled("  - ", styles::muted_style()),
            Span::raw("Keep your uploads together and delete what you outgrow"),
        ]),
        Line::from(vec![
            Span::styled("  - ", styles::muted_style()),
            Span::raw("Pull any shared file straight to your downloads folder"),
        ]),
        Line::from(vec![
            Span::styled("  - ", styles::muted_style()),
            Span::raw("Admins see the whole shelf, collaborators see their own"),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::NONE));
    frame.render_widget(paragraph, area);
}

/// The join call-to-action. Shown only while browsing as a guest; once a
/// user is signed in the home view drops it and points at the panel instead.
fn render_cta(frame: &mut Frame, app: &App, area: Rect) {
    if app.session.is_authenticated() {
        let username = app
            .session
            .user()
            .map(|u| u.username.as_str())
            .unwrap_or_default();
        let line = Line::from(vec![
            Span::styled("Signed in as ", styles::muted_style()),
            Span::styled(username, styles::title_style()),
            Span::styled(" - press [2] to open your panel", styles::muted_style()),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let lines = vec![
        Line::from(Span::styled(
            "Want to share your work?",
            styles::title_style(),
        ))
        .alignment(Alignment::Center),
        Line::from("Press [2] to sign in or create a collaborator account")
            .alignment(Alignment::Center),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false))
        .title(" Join the collaborators ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
