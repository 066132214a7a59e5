//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::duration::format_age;
use crate::data::{aggregate, category_stats, Scope, Tally};

/// Render the header bar with the overall uptime.
///
/// Displays: status indicator, overall uptime, per-category counts, data age.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    if app.state.inventory.is_none() {
        let status = if app.state.loading {
            "Loading..."
        } else {
            "No data"
        };
        let line = Line::from(vec![
            Span::styled(" VISION ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("| {status}")),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let tree = app.state.inventory();
    let health = &app.state.health;
    let overall = aggregate(tree, health, Scope::Overall);
    let stats = category_stats(tree, health);
    let uptime_style = app.theme.uptime_style(&overall);

    let mut spans = vec![
        Span::styled(" ● ", uptime_style),
        Span::styled("VISION ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(
            format!("{}%", overall.uptime_percent),
            uptime_style.add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" uptime ({}/{}) │ ", overall.online, overall.total)),
    ];
    spans.extend(tally_spans(app, "env", stats.environments));
    spans.extend(tally_spans(app, "ms", stats.microservices));
    spans.extend(tally_spans(app, "db", stats.databases));

    spans.push(Span::raw("│ "));
    match app.state.last_updated {
        Some(at) => spans.push(Span::raw(format!("Updated {} ago", format_age(at.elapsed())))),
        None => spans.push(Span::styled(
            "Health pending",
            Style::default().add_modifier(Modifier::DIM),
        )),
    }
    if app.state.refreshing {
        spans.push(Span::styled(
            " ⟳ refreshing",
            Style::default().fg(app.theme.highlight),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// `label up/total ` colored by the group status.
pub fn tally_spans(app: &App, label: &str, tally: Tally) -> Vec<Span<'static>> {
    vec![
        Span::raw(format!("{label} ")),
        Span::styled(
            format!("{}/{}", tally.up, tally.total),
            app.theme.group_style(tally.status()),
        ),
        Span::raw(" "),
    ]
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![Line::from(" 1:Environments "), Line::from(" 2:Bookmarks ")];

    let selected = match app.current_view {
        View::Environments => 0,
        View::Bookmarks => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: breadcrumb trail, backend, available controls.
/// Also displays temporary status messages and errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(ref err) = app.state.error {
        let paragraph = Paragraph::new(format!(" Error: {} | r:refresh q:quit", err))
            .style(Style::default().fg(app.theme.critical));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = if app.filter_active {
        match app.current_view {
            View::Environments => "Type to filter | Enter:apply Esc:cancel",
            View::Bookmarks => "Type to search | Enter:search Esc:cancel",
        }
    } else {
        match app.current_view {
            View::Environments => "/:filter Enter:detail r:refresh m:monitor Tab:switch ?:help q:quit",
            View::Bookmarks => "/:search c:clear Tab:switch ?:help q:quit",
        }
    };

    let status = format!(
        " {} | {} | {}",
        app.breadcrumb(),
        app.source_description(),
        controls
    );

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Environment detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Environments & Bookmarks",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  /         Filter / search"),
        Line::from("  c         Clear filter"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  m         Toggle monitor mode"),
        Line::from("  r         Refresh health now"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 25u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
