//! Detail overlay rendering.
//!
//! Displays a modal overlay with the microservices and databases of the
//! selected environment.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::{aggregate, keys, EntityStatus, Scope};

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 16;

/// Render the environment detail as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Skip rendering if terminal is too small for the overlay
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(row) = app.selected_row() else {
        return;
    };
    let env = row.environment;
    let health = &app.state.health;

    let overlay_width = (area.width * 95 / 100).clamp(MIN_OVERLAY_WIDTH, 110);
    let overlay_height = (area.height * 90 / 100).clamp(MIN_OVERLAY_HEIGHT, 50);

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(5), // Environment info
        Constraint::Min(10),   // Microservices / databases
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    // ===== HEADER SECTION =====
    let status = EntityStatus::lookup(health, &keys::environment_key(env));
    let uptime = aggregate(app.state.inventory(), health, Scope::Environment(env));

    let header_lines = vec![
        Line::from(vec![Span::styled(
            format!(" {} / {} ", row.product.name, env.name),
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(vec![Span::raw(" URL: "), Span::raw(env.url.clone())]),
        Line::from(vec![
            Span::raw(" Status: "),
            Span::styled(
                format!("{} {}", status.symbol(), status.label()),
                app.theme.status_style(status).add_modifier(Modifier::BOLD),
            ),
            Span::raw("    Uptime: "),
            Span::styled(
                format!(
                    "{}% ({}/{})",
                    uptime.uptime_percent, uptime.online, uptime.total
                ),
                app.theme.uptime_style(&uptime).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    let header_block = Block::default()
        .title(" Environment Detail ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    frame.render_widget(Paragraph::new(header_lines).block(header_block), chunks[0]);

    let content_chunks =
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).split(chunks[1]);

    // ----- MICROSERVICES -----
    let ms_rows: Vec<Row> = env
        .microservices
        .iter()
        .map(|ms| {
            let status = EntityStatus::lookup(health, &keys::microservice_key(ms));
            let name = if ms.uses_legacy_url() {
                format!("{} (service_url)", ms.display_name())
            } else {
                ms.display_name().to_string()
            };
            Row::new(vec![
                Cell::from(name),
                Cell::from(ms.url().to_string()),
                Cell::from(ms.port.as_ref().map(|p| p.to_string()).unwrap_or_else(|| "-".into())),
                Cell::from(status.label()).style(app.theme.status_style(status)),
            ])
        })
        .collect();

    render_section(
        frame,
        app,
        content_chunks[0],
        &format!(" Microservices ({}) ", env.microservices.len()),
        ["Name", "URL", "Port", "Status"],
        ms_rows,
        "  No microservices",
    );

    // ----- DATABASES -----
    let db_rows: Vec<Row> = env
        .databases
        .iter()
        .map(|db| {
            let status = EntityStatus::lookup(health, &keys::database_key(db));
            Row::new(vec![
                Cell::from(db.database_name.clone()),
                Cell::from(db.host.clone()),
                Cell::from(db.port.to_string()),
                Cell::from(status.label()).style(app.theme.status_style(status)),
            ])
        })
        .collect();

    render_section(
        frame,
        app,
        content_chunks[1],
        &format!(" Databases ({}) ", env.databases.len()),
        ["Database", "Host", "Port", "Status"],
        db_rows,
        "  No databases",
    );

    // ===== FOOTER =====
    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " ↑/↓: previous/next environment  r: refresh  Esc: close ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, chunks[2]);
}

fn render_section(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    title: &str,
    columns: [&'static str; 4],
    rows: Vec<Row<'_>>,
    empty_message: &'static str,
) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if rows.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                empty_message,
                Style::default().add_modifier(Modifier::DIM),
            )),
        ])
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(columns.map(Cell::from))
        .height(1)
        .style(app.theme.header);

    let widths = [
        Constraint::Fill(2),    // Name
        Constraint::Fill(3),    // URL / host
        Constraint::Length(7),  // Port
        Constraint::Length(12), // Status
    ];

    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}
