//! The authenticated panel view: listings, stats, and the upload form.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, PanelTab, UploadFocus};
use crate::models::ContentItem;
use crate::ui::styles;
use crate::utils::{format_size, truncate_string};

use super::login::render_flash;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // header
            Constraint::Length(3), // stats
            Constraint::Length(1), // tabs
            Constraint::Min(6),    // tab content
            Constraint::Length(1), // flash
            Constraint::Length(1), // footer
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_stats(frame, app, chunks[1]);
    render_tabs(frame, app, chunks[2]);

    match app.panel_tab {
        PanelTab::MyFiles => render_listing(frame, app, chunks[3], false),
        PanelTab::AllFiles => render_listing(frame, app, chunks[3], true),
        PanelTab::Upload => render_upload_form(frame, app, chunks[3]),
    }

    render_flash(frame, &app.panel_flash, chunks[4]);
    render_footer(frame, app, chunks[5]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let (username, role, email) = match app.session.user() {
        Some(user) => (
            user.username.as_str(),
            user.role.display_name(),
            user.email.as_deref().unwrap_or(""),
        ),
        None => ("?", "?", ""),
    };

    let mut role_line = vec![
        Span::styled("Role: ", styles::muted_style()),
        Span::raw(role),
    ];
    if !email.is_empty() {
        role_line.push(Span::styled(format!("  ({})", email), styles::muted_style()));
    }

    let lines = vec![
        Line::from(Span::styled(
            format!("{}'s panel", username),
            styles::title_style(),
        )),
        Line::from(role_line),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let cells = [
        ("Files", app.stats.total),
        ("Images", app.stats.images),
        ("Videos", app.stats.videos),
        ("Documents", app.stats.documents),
    ];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for ((label, count), column) in cells.iter().zip(columns.iter()) {
        let line = Line::from(vec![
            Span::styled(count.to_string(), styles::title_style()),
            Span::styled(format!(" {}", label), styles::muted_style()),
        ])
        .alignment(Alignment::Center);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(false));
        frame.render_widget(Paragraph::new(line).block(block), *column);
    }
}

/// Tab row. The admin-only listing is offered strictly from the live
/// session's role, checked again on every frame.
fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut tabs = vec![PanelTab::MyFiles, PanelTab::Upload];
    if app.session.is_admin() {
        tabs.push(PanelTab::AllFiles);
    }

    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        spans.push(Span::styled(
            tab.title(),
            styles::tab_style(*tab == app.panel_tab),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_listing(frame: &mut Frame, app: &App, area: Rect, all_files: bool) {
    let (items, selection) = if all_files {
        (&app.all_content, app.all_selection)
    } else {
        (&app.my_content, app.my_selection)
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(1)])
        .split(area);

    if items.is_empty() {
        let text = if all_files {
            "No collaborator uploads yet."
        } else {
            "Nothing here yet - upload your first file from the Upload tab."
        };
        let block = Block::default()
            .title(format!(" {} ", title_for(all_files, 0)))
            .borders(Borders::ALL)
            .border_style(styles::border_style(true));
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(text, styles::muted_style())))
                .block(block),
            chunks[0],
        );
        return;
    }

    let mut header_cells = vec![
        Cell::from("Title"),
        Cell::from("Type"),
        Cell::from("Uploaded"),
    ];
    if all_files {
        header_cells.push(Cell::from("Owner"));
    }
    let header = Row::new(header_cells).style(styles::title_style()).height(1);

    let rows: Vec<Row> = items
        .iter()
        .map(|item| {
            let mut cells = vec![
                Cell::from(item.display_title().to_string()),
                Cell::from(item.kind.label().to_uppercase()),
                Cell::from(item.formatted_date()),
            ];
            if all_files {
                cells.push(Cell::from(format!("#{}", item.owner_id)));
            }
            Row::new(cells).style(styles::list_item_style())
        })
        .collect();

    let mut widths = vec![
        Constraint::Fill(1),
        Constraint::Length(8),
        Constraint::Length(14),
    ];
    if all_files {
        widths.push(Constraint::Length(8));
    }

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!(" {} ", title_for(all_files, items.len())))
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(selection));
    frame.render_stateful_widget(table, chunks[0], &mut state);

    render_selected_detail(frame, items.get(selection), chunks[1]);
}

fn title_for(all_files: bool, count: usize) -> String {
    if all_files {
        format!("All Files ({})", count)
    } else {
        format!("My Files ({})", count)
    }
}

fn render_selected_detail(frame: &mut Frame, item: Option<&ContentItem>, area: Rect) {
    if let Some(item) = item {
        let detail = truncate_string(item.display_description(), area.width.saturating_sub(2) as usize);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(detail, styles::muted_style()))),
            area,
        );
    }
}

fn render_upload_form(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Length(3), // description
            Constraint::Length(1), // kind selector
            Constraint::Length(3), // file path
            Constraint::Length(1), // file info
            Constraint::Length(3), // submit
            Constraint::Min(0),
        ])
        .split(area);

    render_input(
        frame,
        chunks[0],
        "Title",
        &app.upload_title,
        app.upload_focus == UploadFocus::Title,
    );
    render_input(
        frame,
        chunks[1],
        "Description",
        &app.upload_description,
        app.upload_focus == UploadFocus::Description,
    );

    let kind_style = if app.upload_focus == UploadFocus::Kind {
        styles::title_style()
    } else {
        styles::list_item_style()
    };
    let kind_line = Line::from(vec![
        Span::styled(" Type: ", styles::muted_style()),
        Span::styled(format!("< {} >", app.upload_kind.label()), kind_style),
    ]);
    frame.render_widget(Paragraph::new(kind_line), chunks[2]);

    render_input(
        frame,
        chunks[3],
        "File path",
        &app.upload_file,
        app.upload_focus == UploadFocus::FilePath,
    );
    render_file_info(frame, app, chunks[4]);

    let label = if app.upload_busy {
        "Uploading..."
    } else {
        "Upload"
    };
    let style = if app.upload_busy {
        styles::muted_style()
    } else if app.upload_focus == UploadFocus::Submit {
        styles::title_style()
    } else {
        styles::list_item_style()
    };
    let button = Paragraph::new(Line::from(Span::styled(label, style)))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(styles::border_style(
                    app.upload_focus == UploadFocus::Submit && !app.upload_busy,
                )),
        );
    frame.render_widget(button, chunks[5]);
}

fn render_input(frame: &mut Frame, area: Rect, label: &str, value: &str, focused: bool) {
    let block = Block::default()
        .title(format!(" {} ", label))
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));
    frame.render_widget(Paragraph::new(value.to_string()).block(block), area);
}

/// Shows the chosen file's name and size before the upload is submitted.
fn render_file_info(frame: &mut Frame, app: &App, area: Rect) {
    let path = app.upload_file.trim();
    if path.is_empty() {
        return;
    }

    let line = match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => Line::from(Span::styled(
            format!(" {} ({})", path, format_size(meta.len())),
            styles::muted_style(),
        )),
        _ => Line::from(Span::styled(" File not found", styles::error_style())),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let hints = match app.panel_tab {
        PanelTab::MyFiles => {
            "[up/down] select  [enter] download  [x] delete  [r] refresh  [left/right] tabs"
        }
        PanelTab::AllFiles => "[up/down] select  [enter] download  [r] refresh  [left/right] tabs",
        PanelTab::Upload => "[tab] next field  [left/right] change type  [esc] back to files",
    };

    let busy = if app.download_busy {
        "downloading...  "
    } else if app.delete_busy {
        "deleting...  "
    } else {
        ""
    };

    let line = Line::from(vec![
        Span::styled(busy, styles::title_style()),
        Span::styled(hints, styles::muted_style()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
