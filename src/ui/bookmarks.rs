//! Bookmarks view rendering.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let pane = &app.bookmarks;

    let search_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !pane.query.is_empty() {
        format!(" results for \"{}\" [c:clear]", pane.query)
    } else {
        String::new()
    };
    let loading = if pane.loading { " (loading)" } else { "" };
    let title = format!(
        " Bookmarks ({}/{}){}{} ",
        pane.shown.len(),
        pane.all.len(),
        search_info,
        loading
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if pane.shown.is_empty() {
        let message = match (&pane.error, pane.loading) {
            (Some(err), _) => err.clone(),
            (None, true) => "Loading bookmarks...".to_string(),
            (None, false) if !pane.query.is_empty() => "No bookmarks match".to_string(),
            (None, false) => "No bookmarks".to_string(),
        };
        let paragraph = Paragraph::new(message)
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Name"),
        Cell::from("Category"),
        Cell::from("URL"),
        Cell::from("Description"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = pane
        .shown
        .iter()
        .map(|b| {
            Row::new(vec![
                Cell::from(b.name.clone()),
                Cell::from(b.category.clone().unwrap_or_default()),
                Cell::from(b.url.clone()).style(Style::default().fg(app.theme.highlight)),
                Cell::from(b.description.clone().unwrap_or_default()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Fill(1),
        Constraint::Fill(3),
        Constraint::Fill(3),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(app.selected_bookmark.min(pane.shown.len() - 1)));

    frame.render_stateful_widget(table, area, &mut state);
}
