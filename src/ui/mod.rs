//! Terminal rendering using ratatui.
//!
//! - [`common`]: header, tabs, status bar and help overlay
//! - [`environments`]: the environments table
//! - [`detail`]: the environment detail overlay
//! - [`bookmarks`]: the bookmarks list
//! - [`monitor`]: the auto-scrolling monitor board
//! - [`theme`]: colors and styles

pub mod bookmarks;
pub mod common;
pub mod detail;
pub mod environments;
pub mod monitor;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, View};

/// Minimum terminal size for usable display.
const MIN_WIDTH: u16 = 60;
const MIN_HEIGHT: u16 = 12;

/// Draw one frame.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        let centered = Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5);
        frame.render_widget(paragraph, centered.intersection(area));
        return;
    }

    // Full-screen monitor mode hides the chrome.
    if app.in_monitor_mode() && app.view.is_fullscreen() {
        monitor::render(frame, app, area);
    } else {
        let chunks = Layout::vertical([
            Constraint::Length(1), // Header bar
            Constraint::Length(1), // Tabs
            Constraint::Min(8),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        common::render_header(frame, app, chunks[0]);
        common::render_tabs(frame, app, chunks[1]);

        if app.in_monitor_mode() {
            monitor::render(frame, app, chunks[2]);
        } else {
            match app.current_view {
                View::Environments => environments::render(frame, app, chunks[2]),
                View::Bookmarks => bookmarks::render(frame, app, chunks[2]),
            }
        }

        common::render_status_bar(frame, app, chunks[3]);

        if app.show_detail_overlay && !app.in_monitor_mode() {
            detail::render_overlay(frame, app, area);
        }
    }

    if app.show_help {
        common::render_help(frame, app, area);
    }
}
