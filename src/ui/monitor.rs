//! Monitor board rendering.
//!
//! A read-only board of every product, environment, microservice and
//! database, meant for unattended screens. The board is taller than the
//! screen; the view-mode controller scrolls it.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{aggregate, category_stats, keys, EntityStatus, Scope};
use crate::ui::common::tally_spans;
use crate::ui::Theme;

/// Render the monitor board into `area`, recording its extent for auto-scroll.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Category tallies
        Constraint::Min(3),    // Board
    ])
    .split(area);

    render_tallies(frame, app, chunks[0]);

    let lines = board_lines(app);
    let viewport = chunks[1].height.saturating_sub(2);
    app.scroll.set_extent(u32::from(viewport), lines.len() as u32);

    let hint = if app.view.is_fullscreen() {
        " Esc:exit full-screen m:normal "
    } else {
        " m:normal "
    };
    let block = Block::default()
        .title(" Monitor ")
        .title_bottom(Line::from(hint).right_aligned())
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let offset = u16::try_from(app.scroll.offset()).unwrap_or(u16::MAX);
    let board = Paragraph::new(lines).block(block).scroll((offset, 0));
    frame.render_widget(board, chunks[1]);
}

fn render_tallies(frame: &mut Frame, app: &App, area: Rect) {
    let tree = app.state.inventory();
    let overall = aggregate(tree, &app.state.health, Scope::Overall);
    let stats = category_stats(tree, &app.state.health);

    let mut spans = vec![
        Span::styled(" VISION MONITOR ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(
            format!("{}% uptime", overall.uptime_percent),
            app.theme.uptime_style(&overall).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" │ "),
    ];
    spans.extend(tally_spans(app, "Environments", stats.environments));
    spans.extend(tally_spans(app, "Microservices", stats.microservices));
    spans.extend(tally_spans(app, "Databases", stats.databases));
    if app.state.refreshing {
        spans.push(Span::styled("⟳", Style::default().fg(app.theme.highlight)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Every line of the board, top to bottom.
pub fn board_lines(app: &App) -> Vec<Line<'static>> {
    let theme = &app.theme;
    let tree = app.state.inventory();
    let health = &app.state.health;
    let mut lines = Vec::new();

    if tree.is_empty() {
        let message = if app.state.loading {
            "Loading..."
        } else {
            "No environments"
        };
        lines.push(Line::from(Span::styled(
            message,
            Style::default().add_modifier(Modifier::DIM),
        )));
        return lines;
    }

    for product in &tree.products {
        let uptime = aggregate(tree, health, Scope::Product(product));
        lines.push(Line::from(vec![
            Span::styled(
                format!("▌ {} ", product.name),
                theme.header.add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{}% ({}/{})", uptime.uptime_percent, uptime.online, uptime.total),
                theme.uptime_style(&uptime),
            ),
        ]));

        for env in &product.environments {
            let status = EntityStatus::lookup(health, &keys::environment_key(env));
            let uptime = aggregate(tree, health, Scope::Environment(env));
            lines.push(Line::from(vec![
                Span::raw("  "),
                status_span(theme, status),
                Span::styled(
                    format!(" {} ", env.name),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{}%", uptime.uptime_percent),
                    theme.uptime_style(&uptime),
                ),
                Span::styled(
                    format!("  {}", env.url),
                    Style::default().add_modifier(Modifier::DIM),
                ),
            ]));

            for ms in &env.microservices {
                let status = EntityStatus::lookup(health, &keys::microservice_key(ms));
                lines.push(entity_line(theme, status, "ms", ms.display_name()));
            }
            for db in &env.databases {
                let status = EntityStatus::lookup(health, &keys::database_key(db));
                let name = format!("{} @ {}:{}", db.database_name, db.host, db.port);
                lines.push(entity_line(theme, status, "db", &name));
            }
        }
        lines.push(Line::from(""));
    }
    lines
}

fn status_span(theme: &Theme, status: EntityStatus) -> Span<'static> {
    Span::styled(format!("{:<4}", status.symbol()), theme.status_style(status))
}

fn entity_line(theme: &Theme, status: EntityStatus, kind: &str, name: &str) -> Line<'static> {
    Line::from(vec![
        Span::raw("      "),
        status_span(theme, status),
        Span::styled(
            format!(" {kind} "),
            Style::default().add_modifier(Modifier::DIM),
        ),
        Span::raw(name.to_string()),
    ])
}
