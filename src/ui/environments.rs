//! Environments view rendering.
//!
//! Displays a table of every product environment with its own status,
//! uptime, and healthy microservice and database counts.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::{
    aggregate, environment_names, group_status, healthy_count, keys, EntityStatus, HealthMap,
    InventoryTree, Scope,
};

/// Render the Environments view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if app.state.inventory.is_none() {
        let message = if app.state.loading {
            "Loading environments..."
        } else {
            "No environment data. Press r to retry health, or wait for the next poll."
        };
        let paragraph = Paragraph::new(message)
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block.title(" Environments "));
        frame.render_widget(paragraph, area);
        return;
    }

    let tree = app.state.inventory();
    let health = &app.state.health;
    let rows = app.environment_rows();

    let header = Row::new(vec![
        Cell::from("Product"),
        Cell::from("Environment"),
        Cell::from("Status"),
        Cell::from("Uptime"),
        Cell::from("Services"),
        Cell::from("Databases"),
    ])
    .height(1)
    .style(app.theme.header);

    let table_rows: Vec<Row> = rows
        .iter()
        .map(|row| {
            let env = row.environment;
            let status = EntityStatus::lookup(health, &keys::environment_key(env));
            let uptime = aggregate(tree, health, Scope::Environment(env));

            let ms_keys = || env.microservices.iter().map(keys::microservice_key);
            let db_keys = || env.databases.iter().map(keys::database_key);

            let uptime_text = if uptime.total == 0 {
                "-".to_string()
            } else {
                format!("{}%", uptime.uptime_percent)
            };

            Row::new(vec![
                Cell::from(row.product.name.clone()),
                Cell::from(env.name.clone()),
                Cell::from(status.label()).style(app.theme.status_style(status)),
                Cell::from(uptime_text).style(app.theme.uptime_style(&uptime)),
                Cell::from(format!(
                    "{}/{}",
                    healthy_count(ms_keys(), health),
                    env.microservices.len()
                ))
                .style(app.theme.group_style(group_status(ms_keys(), health))),
                Cell::from(format!(
                    "{}/{}",
                    healthy_count(db_keys(), health),
                    env.databases.len()
                ))
                .style(app.theme.group_style(group_status(db_keys(), health))),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2), // Product
        Constraint::Fill(2), // Environment
        Constraint::Min(12), // Status
        Constraint::Min(7),  // Uptime
        Constraint::Min(9),  // Services
        Constraint::Min(10), // Databases
    ];

    let total = tree.environments().count();
    let selected = app.selected_index.min(rows.len().saturating_sub(1));

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let position_info = if !rows.is_empty() {
        format!(" [{}/{}]", selected + 1, rows.len())
    } else {
        String::new()
    };

    let title = format!(
        " Environments ({}/{}){}{} ",
        rows.len(),
        total,
        filter_info,
        position_info
    );

    let table = Table::new(table_rows, widths)
        .header(header)
        .block(block.title(title).title_bottom(tier_line(app, tree, health)))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

/// Uptime per environment name, pooled across products.
fn tier_line(app: &App, tree: &InventoryTree, health: &HealthMap) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for (i, name) in environment_names(tree).into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }
        let uptime = aggregate(tree, health, Scope::EnvironmentName(name));
        let text = if uptime.total == 0 {
            "-".to_string()
        } else {
            format!("{}%", uptime.uptime_percent)
        };
        spans.push(Span::raw(format!("{name} ")));
        spans.push(Span::styled(text, app.theme.uptime_style(&uptime)));
    }
    spans.push(Span::raw(" "));
    Line::from(spans)
}
